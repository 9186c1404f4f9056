use repertoire::DashboardError;
use repertoire::cache::SourceCache;
use repertoire::config::SourcePaths;
use repertoire::dashboard::{build_snapshot, default_selection, distinct_genres};
use repertoire::loader::{LoadOptions, load_sources};
use repertoire::model::{GenreSelection, SongId};
use std::fs;
use tempfile::{TempDir, tempdir};

fn write_sources(log: &str, catalog: &str) -> (TempDir, SourcePaths) {
    let dir = tempdir().expect("tempdir");
    let sources = SourcePaths {
        performances: dir.path().join("DADOS_DASHBOARD_FINAL.csv"),
        catalog: dir.path().join("ADOLESCENTES - MUSICAS.csv"),
    };
    fs::write(&sources.performances, log).expect("write log");
    fs::write(&sources.catalog, catalog).expect("write catalog");
    (dir, sources)
}

#[test]
fn accented_catalog_header_flows_through_to_the_queue() {
    let (_dir, sources) = write_sources(
        "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n\
         1,Nova,Banda A,Rock\n\
         ,Sem Id,Banda Z,Rock\n\
         1,Nova ,Banda A,rock\n",
        "ID_MÚSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n\
         1,Nova,Banda A,Rock\n\
         2,Antiga,Banda B,Rock\n\
         3,Outra,Banda C,Pop\n",
    );

    let tables = load_sources(&sources, &LoadOptions::default()).expect("load");
    assert_eq!(tables.report.dropped_performances, 1);
    assert_eq!(distinct_genres(&tables.catalog), vec!["ROCK", "POP"]);

    let snapshot = build_snapshot(&tables, &GenreSelection::new(["rock"]), 10);
    let resolution = &snapshot.resolution;
    assert_eq!(
        resolution.unplayed_ids.iter().collect::<Vec<_>>(),
        vec![&SongId::parse("2")]
    );
    assert_eq!(snapshot.queue().rows()[0].title, "ANTIGA");
    assert_eq!(snapshot.kpis.turnover_label(), "50.0%");

    let titles = snapshot.top_titles.as_ref().expect("titles");
    assert_eq!(titles.count_for("NOVA"), Some(2));
    assert_eq!(titles.count_for("SEM ID"), None);
    let artists = snapshot.top_performed_artists.as_ref().expect("artists");
    assert_eq!(artists.count_for("BANDA Z"), None);
}

#[test]
fn catalog_song_without_identifier_waits_in_the_queue() {
    let (_dir, sources) = write_sources(
        "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n",
        "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n,Never Played,y,rock\n",
    );
    let tables = load_sources(&sources, &LoadOptions::default()).expect("load");
    assert_eq!(tables.report.catalog_rows_without_id, 1);

    let snapshot = build_snapshot(&tables, &GenreSelection::default(), 10);
    assert_eq!(snapshot.kpis.queue_size, 1);
    assert_eq!(snapshot.queue().rows()[0].title, "NEVER PLAYED");
    assert_eq!(snapshot.kpis.turnover_label(), "50.0%");
}

#[test]
fn default_selection_and_empty_selection_agree() {
    let (_dir, sources) = write_sources(
        "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n",
        "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n2,b,y,pop\n3,c,y,\n",
    );
    let tables = load_sources(&sources, &LoadOptions::default()).expect("load");

    let everything = build_snapshot(&tables, &default_selection(&tables.catalog), 10);
    let unfiltered = build_snapshot(&tables, &GenreSelection::default(), 10);

    assert_eq!(everything.kpis, unfiltered.kpis);
    assert_eq!(unfiltered.kpis.queue_size, 2);
    let supply = unfiltered.top_catalog_artists.as_ref().expect("artists");
    assert_eq!(supply.entries()[0].label, "Y");
}

#[test]
fn catalog_without_identifier_column_aborts_the_load() {
    let (_dir, sources) = write_sources(
        "ID_MUSICA,MÚSICA\n1,a\n",
        "CODIGO,MÚSICA\n1,a\n",
    );

    let mut cache = SourceCache::new();
    let err = cache
        .get_or_load(&sources, &LoadOptions::default())
        .expect_err("schema error");
    assert!(matches!(err, DashboardError::Schema { ref column, .. } if column == "ID_MUSICA"));
    assert!(!cache.is_cached());
}

#[test]
fn filter_changes_reuse_the_cached_load() {
    let (_dir, sources) = write_sources(
        "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n",
        "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n2,b,y,pop\n",
    );
    let mut cache = SourceCache::new();
    let options = LoadOptions::default();

    for selection in [vec!["ROCK"], vec!["POP"], vec![]] {
        let tables = cache.get_or_load(&sources, &options).expect("load");
        let snapshot = build_snapshot(&tables, &GenreSelection::new(selection), 10);
        assert!(snapshot.kpis.queue_size <= snapshot.kpis.catalog_size);
    }
    assert_eq!(cache.loads(), 1);
}
