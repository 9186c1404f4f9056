use crate::config::{ColumnNames, SourcePaths};
use crate::error::{DashboardError, Result};
use crate::model::{
    CatalogEntry, CatalogTable, Field, PerformanceRecord, PerformanceTable, SongId,
};
use crate::normalize::{MISSING_PLACEHOLDER, header_key, normalize_table};
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub columns: ColumnNames,
    pub delimiter: u8,
    pub missing_markers: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        let settings = crate::config::DashboardSettings::default();
        Self {
            columns: settings.columns,
            delimiter: b',',
            missing_markers: settings.missing_markers,
        }
    }
}

/// Row bookkeeping from one load cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub performance_rows_read: usize,
    pub dropped_performances: usize,
    pub catalog_rows_read: usize,
    pub catalog_rows_without_id: usize,
    /// Header the catalog identifier was actually found under.
    pub catalog_id_column: String,
}

#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub performances: PerformanceTable,
    pub catalog: CatalogTable,
    pub report: LoadReport,
}

/// Reads, validates, and normalizes both sources.
pub fn load_sources(sources: &SourcePaths, options: &LoadOptions) -> Result<LoadedTables> {
    let started = Instant::now();

    let performance_file = open_source(&sources.performances)?;
    let performances = read_performances(performance_file, &sources.performances, options)?;

    let catalog_file = open_source(&sources.catalog)?;
    let catalog = read_catalog(catalog_file, &sources.catalog, options)?;

    let report = LoadReport {
        performance_rows_read: performances.rows_read,
        dropped_performances: performances.dropped,
        catalog_rows_read: catalog.rows_read,
        catalog_rows_without_id: catalog.without_id,
        catalog_id_column: catalog.id_column,
    };

    if report.dropped_performances > 0 {
        warn!(
            dropped = report.dropped_performances,
            source = %sources.performances.display(),
            "dropped performance rows without a song id"
        );
    }
    if report.catalog_rows_without_id > 0 {
        warn!(
            rows = report.catalog_rows_without_id,
            source = %sources.catalog.display(),
            "catalog rows without a song id share one queue key"
        );
    }
    info!(
        performances = performances.table.len(),
        catalog = catalog.table.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded sources"
    );

    Ok(LoadedTables {
        performances: performances.table,
        catalog: catalog.table,
        report,
    })
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| DashboardError::data_source(path, err))
}

#[derive(Debug)]
pub struct PerformanceLoad {
    pub table: PerformanceTable,
    pub rows_read: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct CatalogLoad {
    pub table: CatalogTable,
    pub rows_read: usize,
    pub without_id: usize,
    pub id_column: String,
}

/// `origin` only labels errors; the data comes from `reader`.
pub fn read_performances<R: Read>(
    reader: R,
    origin: &Path,
    options: &LoadOptions,
) -> Result<PerformanceLoad> {
    let mut csv = csv_reader(reader, options.delimiter);
    let headers = read_headers(&mut csv, origin)?;
    let layout = ColumnLayout::resolve(&headers, &options.columns, &[], origin)?;

    let mut rows = Vec::new();
    let mut rows_read = 0;
    let mut dropped = 0;
    for record in csv.records() {
        let record = record.map_err(|err| DashboardError::data_source(origin, err))?;
        rows_read += 1;

        let Some(song_id) = layout
            .cell(&record, Some(layout.song_id), options)
            .and_then(SongId::parse)
        else {
            dropped += 1;
            continue;
        };

        rows.push(PerformanceRecord {
            song_id,
            title: layout.text(&record, Field::Title, options),
            artist: layout.text(&record, Field::Artist, options),
            genre: layout.text(&record, Field::Genre, options),
        });
    }

    let table = PerformanceTable::new(rows, layout.present_fields());
    Ok(PerformanceLoad {
        table: normalize_table(&table, &Field::ALL),
        rows_read,
        dropped,
    })
}

pub fn read_catalog<R: Read>(
    reader: R,
    origin: &Path,
    options: &LoadOptions,
) -> Result<CatalogLoad> {
    let mut csv = csv_reader(reader, options.delimiter);
    let headers = read_headers(&mut csv, origin)?;
    let layout = ColumnLayout::resolve(
        &headers,
        &options.columns,
        &options.columns.catalog_song_id_aliases,
        origin,
    )?;

    let mut rows = Vec::new();
    let mut without_id = 0;
    for record in csv.records() {
        let record = record.map_err(|err| DashboardError::data_source(origin, err))?;
        let song_id = layout
            .cell(&record, Some(layout.song_id), options)
            .and_then(SongId::parse);
        if song_id.is_none() {
            without_id += 1;
        }

        rows.push(CatalogEntry {
            song_id,
            title: layout.text(&record, Field::Title, options),
            artist: layout.text(&record, Field::Artist, options),
            genre: layout.text(&record, Field::Genre, options),
        });
    }

    let rows_read = rows.len();
    let table = CatalogTable::new(rows, layout.present_fields());
    Ok(CatalogLoad {
        table: normalize_table(&table, &Field::ALL),
        rows_read,
        without_id,
        id_column: headers
            .get(layout.song_id)
            .map(header_key)
            .unwrap_or_default(),
    })
}

fn csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader)
}

fn read_headers<R: Read>(csv: &mut csv::Reader<R>, origin: &Path) -> Result<StringRecord> {
    csv.headers()
        .cloned()
        .map_err(|err| DashboardError::data_source(origin, err))
}

/// Column positions resolved against the configured header names.
#[derive(Debug)]
struct ColumnLayout {
    song_id: usize,
    fields: BTreeMap<Field, usize>,
}

impl ColumnLayout {
    fn resolve(
        headers: &StringRecord,
        columns: &ColumnNames,
        song_id_aliases: &[String],
        origin: &Path,
    ) -> Result<Self> {
        let keys: Vec<String> = headers.iter().map(header_key).collect();
        let position = |name: &str| {
            let wanted = header_key(name);
            keys.iter().position(|key| *key == wanted)
        };

        let song_id = std::iter::once(&columns.song_id)
            .chain(song_id_aliases)
            .find_map(|name| position(name.as_str()))
            .ok_or_else(|| DashboardError::schema(origin, columns.song_id.as_str()))?;

        let mut fields = BTreeMap::new();
        for (field, name) in [
            (Field::Title, &columns.title),
            (Field::Artist, &columns.artist),
            (Field::Genre, &columns.genre),
        ] {
            match position(name.as_str()) {
                Some(index) => {
                    fields.insert(field, index);
                }
                None => warn!(
                    column = name.as_str(),
                    source = %origin.display(),
                    "column absent, {} views will be skipped",
                    field.label()
                ),
            }
        }

        Ok(Self { song_id, fields })
    }

    fn present_fields(&self) -> Vec<Field> {
        self.fields.keys().copied().collect()
    }

    /// Cell text, or `None` when the column or value is missing.
    fn cell<'r>(
        &self,
        record: &'r StringRecord,
        index: Option<usize>,
        options: &LoadOptions,
    ) -> Option<&'r str> {
        let value = record.get(index?)?;
        let trimmed = value.trim();
        let is_missing = trimmed.is_empty()
            || options
                .missing_markers
                .iter()
                .any(|marker| marker.as_str() == trimmed);
        (!is_missing).then_some(value)
    }

    fn text(&self, record: &StringRecord, field: Field, options: &LoadOptions) -> String {
        self.cell(record, self.fields.get(&field).copied(), options)
            .unwrap_or(MISSING_PLACEHOLDER)
            .to_string()
    }
}
