use crate::filter::filter_tables;
use crate::loader::LoadedTables;
use crate::model::{
    CatalogTable, Field, FrequencyTable, GenreSelection, PerformanceTable, SongRow,
};
use crate::queue::{QueueResolution, resolve_queue};
use crate::stats::{breakdown, frequency_table};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// Headline numbers for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub executions: usize,
    pub distinct_played: usize,
    pub catalog_size: usize,
    pub queue_size: usize,
    pub turnover_ratio: f64,
}

impl Kpis {
    pub fn turnover_label(&self) -> String {
        format!("{:.1}%", self.turnover_ratio * 100.0)
    }
}

/// Everything the presentation layer renders for one selection.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub performances: PerformanceTable,
    pub catalog: CatalogTable,
    pub resolution: QueueResolution,
    pub top_titles: Option<FrequencyTable>,
    pub top_performed_artists: Option<FrequencyTable>,
    pub top_catalog_artists: Option<FrequencyTable>,
    pub top_queue_artists: Option<FrequencyTable>,
    pub performed_genres: Option<FrequencyTable>,
    pub queue_genres: Option<FrequencyTable>,
    pub kpis: Kpis,
}

impl DashboardSnapshot {
    pub fn queue(&self) -> &CatalogTable {
        &self.resolution.queue
    }
}

/// Distinct catalog genres in first-seen order, for the selection control.
/// The blank label is included so "everything selected" keeps every row.
pub fn distinct_genres(catalog: &CatalogTable) -> Vec<String> {
    if !catalog.has_field(Field::Genre) {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    catalog
        .rows()
        .iter()
        .map(|row| row.field(Field::Genre))
        .filter(|genre| seen.insert(*genre))
        .map(str::to_string)
        .collect()
}

pub fn default_selection(catalog: &CatalogTable) -> GenreSelection {
    GenreSelection::new(distinct_genres(catalog))
}

/// Filter, resolve, and aggregate. Cheap enough to run on every selection
/// change; the loaded tables are only read.
pub fn build_snapshot(
    tables: &LoadedTables,
    selection: &GenreSelection,
    top_n: usize,
) -> DashboardSnapshot {
    let started = Instant::now();
    let (performances, catalog) = filter_tables(&tables.performances, &tables.catalog, selection);
    let resolution = resolve_queue(&performances, &catalog);
    let queue = &resolution.queue;

    let kpis = Kpis {
        executions: performances.len(),
        distinct_played: resolution.played_ids.len(),
        catalog_size: catalog.len(),
        queue_size: queue.len(),
        turnover_ratio: resolution.turnover_ratio(),
    };

    let top_titles = frequency_table(&performances, Field::Title, top_n);
    let top_performed_artists = frequency_table(&performances, Field::Artist, top_n);
    let top_catalog_artists = frequency_table(&catalog, Field::Artist, top_n);
    let top_queue_artists = frequency_table(queue, Field::Artist, top_n);
    let performed_genres = breakdown(&performances, Field::Genre);
    let queue_genres = breakdown(queue, Field::Genre);

    let orphans = resolution.orphan_ids().count();
    debug!(
        selected = selection.len(),
        executions = kpis.executions,
        queue = kpis.queue_size,
        orphans,
        elapsed_us = started.elapsed().as_micros() as u64,
        "dashboard recomputed"
    );

    DashboardSnapshot {
        performances,
        catalog,
        resolution,
        top_titles,
        top_performed_artists,
        top_catalog_artists,
        top_queue_artists,
        performed_genres,
        queue_genres,
        kpis,
    }
}
