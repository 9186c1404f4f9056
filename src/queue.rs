use crate::model::{CatalogTable, PerformanceTable, SongId, SongKey, SongRow, Table};
use std::collections::BTreeSet;

/// Outcome of comparing the filtered log against the filtered catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueResolution {
    pub played_ids: BTreeSet<SongKey>,
    /// Includes the `None` key when some catalog row has no id.
    pub total_ids: BTreeSet<SongKey>,
    pub unplayed_ids: BTreeSet<SongKey>,
    /// Catalog rows whose key was never performed. Duplicate catalog rows for
    /// the same key are all kept.
    pub queue: CatalogTable,
}

impl QueueResolution {
    /// `|played| / |total|`, 0 for an empty catalog. Clamped to 1 since the
    /// log may reference songs the filtered catalog does not carry.
    pub fn turnover_ratio(&self) -> f64 {
        if self.total_ids.is_empty() {
            return 0.0;
        }
        (self.played_ids.len() as f64 / self.total_ids.len() as f64).min(1.0)
    }

    /// Performed ids with no catalog row under the current selection.
    pub fn orphan_ids(&self) -> impl Iterator<Item = &SongId> + '_ {
        self.played_ids.difference(&self.total_ids).flatten()
    }
}

pub fn resolve_queue(performances: &PerformanceTable, catalog: &CatalogTable) -> QueueResolution {
    let played_ids = distinct_keys(performances);
    let total_ids = distinct_keys(catalog);
    let unplayed_ids: BTreeSet<SongKey> = total_ids.difference(&played_ids).cloned().collect();

    let queue = catalog.select(|row| unplayed_ids.contains(&row.song_id().cloned()));

    QueueResolution {
        played_ids,
        total_ids,
        unplayed_ids,
        queue,
    }
}

fn distinct_keys<R: SongRow>(table: &Table<R>) -> BTreeSet<SongKey> {
    table
        .rows()
        .iter()
        .map(|row| row.song_id().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_tables;
    use crate::model::{CatalogEntry, Field, GenreSelection, PerformanceRecord};
    use proptest::prelude::*;

    fn id(raw: &str) -> SongId {
        SongId::parse(raw).expect("id")
    }

    fn key(raw: &str) -> SongKey {
        Some(id(raw))
    }

    fn catalog_of(rows: &[(&str, &str)]) -> CatalogTable {
        let rows = rows
            .iter()
            .map(|(song_id, genre)| CatalogEntry {
                song_id: SongId::parse(song_id),
                title: format!("TITLE {song_id}"),
                artist: String::from("ARTIST"),
                genre: genre.to_string(),
            })
            .collect();
        Table::new(rows, Field::ALL)
    }

    fn log_of(rows: &[(&str, &str)]) -> PerformanceTable {
        let rows = rows
            .iter()
            .map(|(song_id, genre)| PerformanceRecord {
                song_id: id(song_id),
                title: format!("TITLE {song_id}"),
                artist: String::from("ARTIST"),
                genre: genre.to_string(),
            })
            .collect();
        Table::new(rows, Field::ALL)
    }

    #[test]
    fn rock_selection_queues_only_unplayed_rock() {
        let catalog = catalog_of(&[("A", "ROCK"), ("B", "ROCK"), ("C", "POP")]);
        let log = log_of(&[("A", "ROCK")]);
        let (log, catalog) = filter_tables(&log, &catalog, &GenreSelection::new(["rock"]));

        let resolution = resolve_queue(&log, &catalog);

        assert_eq!(resolution.played_ids, BTreeSet::from([key("A")]));
        assert_eq!(resolution.total_ids, BTreeSet::from([key("A"), key("B")]));
        assert_eq!(resolution.unplayed_ids, BTreeSet::from([key("B")]));
        assert_eq!(resolution.queue.len(), 1);
        assert_eq!(resolution.queue.rows()[0].song_id, Some(id("B")));
        assert_eq!(resolution.turnover_ratio(), 0.5);
    }

    #[test]
    fn duplicate_catalog_ids_all_land_in_queue() {
        let catalog = catalog_of(&[("A", "ROCK"), ("B", "ROCK"), ("B", "ROCK")]);
        let resolution = resolve_queue(&log_of(&[]), &catalog);

        assert_eq!(resolution.unplayed_ids.len(), 2);
        assert_eq!(resolution.queue.len(), 3);
        assert_eq!(
            resolution
                .queue
                .rows()
                .iter()
                .filter(|row| row.song_id == Some(id("B")))
                .count(),
            2
        );
    }

    #[test]
    fn catalog_rows_without_id_share_one_unplayed_key() {
        let catalog = catalog_of(&[("1", "ROCK"), ("", "ROCK"), ("", "POP")]);
        let resolution = resolve_queue(&log_of(&[("1", "ROCK")]), &catalog);

        assert_eq!(resolution.total_ids, BTreeSet::from([None, key("1")]));
        assert_eq!(resolution.unplayed_ids, BTreeSet::from([None]));
        assert_eq!(resolution.queue.len(), 2);
        assert!(resolution.queue.rows().iter().all(|row| row.song_id.is_none()));
        assert_eq!(resolution.turnover_ratio(), 0.5);
    }

    #[test]
    fn empty_catalog_has_zero_turnover() {
        let resolution = resolve_queue(&log_of(&[("A", "ROCK")]), &catalog_of(&[]));
        assert_eq!(resolution.turnover_ratio(), 0.0);
        assert!(resolution.queue.is_empty());
        assert_eq!(resolution.orphan_ids().count(), 1);
    }

    #[test]
    fn fully_played_catalog_has_empty_queue() {
        let catalog = catalog_of(&[("A", "ROCK"), ("B", "POP")]);
        let log = log_of(&[("B", "POP"), ("A", "ROCK"), ("A", "ROCK")]);
        let resolution = resolve_queue(&log, &catalog);

        assert!(resolution.queue.is_empty());
        assert_eq!(resolution.turnover_ratio(), 1.0);
    }

    #[test]
    fn orphan_performances_do_not_push_turnover_past_one() {
        let catalog = catalog_of(&[("A", "ROCK")]);
        let log = log_of(&[("A", "ROCK"), ("Z", "ROCK")]);
        let resolution = resolve_queue(&log, &catalog);

        assert_eq!(resolution.turnover_ratio(), 1.0);
        assert_eq!(resolution.orphan_ids().collect::<Vec<_>>(), vec![&id("Z")]);
    }

    /// Catalog ids may be blank; performed ids never are.
    fn ids_strategy(pattern: &'static str) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(pattern, 0..12)
    }

    proptest! {
        #[test]
        fn set_difference_and_queue_containment(
            catalog_ids in ids_strategy("[A-F]?"),
            played in ids_strategy("[A-F]"),
        ) {
            let catalog_rows: Vec<(&str, &str)> =
                catalog_ids.iter().map(|id| (id.as_str(), "ROCK")).collect();
            let log_rows: Vec<(&str, &str)> =
                played.iter().map(|id| (id.as_str(), "ROCK")).collect();
            let resolution = resolve_queue(&log_of(&log_rows), &catalog_of(&catalog_rows));

            prop_assert!(resolution.unplayed_ids.is_disjoint(&resolution.played_ids));
            let union: BTreeSet<SongKey> = resolution
                .played_ids
                .union(&resolution.unplayed_ids)
                .cloned()
                .collect();
            prop_assert!(union.is_superset(&resolution.total_ids));

            for row in resolution.queue.rows() {
                prop_assert!(resolution.unplayed_ids.contains(&row.song_id));
            }
            for song_key in &resolution.unplayed_ids {
                prop_assert!(resolution
                    .queue
                    .rows()
                    .iter()
                    .any(|row| &row.song_id == song_key));
            }

            let ratio = resolution.turnover_ratio();
            prop_assert!((0.0..=1.0).contains(&ratio));
            if resolution.total_ids.is_empty() {
                prop_assert_eq!(ratio, 0.0);
            }
        }
    }
}
