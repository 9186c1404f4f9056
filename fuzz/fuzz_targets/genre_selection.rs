#![no_main]

use libfuzzer_sys::fuzz_target;
use repertoire::dashboard::{build_snapshot, distinct_genres};
use repertoire::loader::{LoadOptions, LoadReport, LoadedTables, read_catalog, read_performances};
use repertoire::model::{Field, GenreSelection, SongRow};
use std::io::Cursor;
use std::path::Path;

const HEADER: &str = "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n";

fuzz_target!(|data: &[u8]| {
    let mut parts = data.splitn(3, |byte| *byte == 0);
    let picks = parts.next().unwrap_or_default();
    let log = parts.next().unwrap_or_default();
    let catalog = parts.next().unwrap_or_default();

    let options = LoadOptions::default();
    let origin = Path::new("fuzz.csv");
    let log = [HEADER.as_bytes(), log].concat();
    let catalog = [HEADER.as_bytes(), catalog].concat();
    let Ok(performances) = read_performances(Cursor::new(log), origin, &options) else {
        return;
    };
    let Ok(catalog) = read_catalog(Cursor::new(catalog), origin, &options) else {
        return;
    };

    let tables = LoadedTables {
        performances: performances.table,
        catalog: catalog.table,
        report: LoadReport::default(),
    };
    let genres = distinct_genres(&tables.catalog);
    let selection = GenreSelection::new(
        picks
            .iter()
            .filter(|_| !genres.is_empty())
            .map(|pick| genres[*pick as usize % genres.len()].as_str()),
    );

    let snapshot = build_snapshot(&tables, &selection, 10);
    let resolution = &snapshot.resolution;
    let ratio = resolution.turnover_ratio();
    assert!((0.0..=1.0).contains(&ratio));
    assert!(resolution.unplayed_ids.is_subset(&resolution.total_ids));
    assert!(resolution.unplayed_ids.is_disjoint(&resolution.played_ids));
    assert!(snapshot.kpis.queue_size <= snapshot.kpis.catalog_size);

    for entry in snapshot.queue().rows() {
        assert!(resolution.unplayed_ids.contains(&entry.song_id().cloned()));
        if !selection.is_empty() {
            assert!(selection.contains(entry.field(Field::Genre)));
        }
    }
    if let Some(titles) = &snapshot.top_titles {
        assert!(titles.len() <= 10);
        assert!(titles.entries().windows(2).all(|pair| pair[0].count >= pair[1].count));
    }
});
