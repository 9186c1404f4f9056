use crate::model::{CatalogTable, Field, GenreSelection, PerformanceTable, SongRow, Table};

/// Rows whose genre is in `selection`. An empty selection, or a table without
/// a genre column, passes through unchanged: empty means "no filtering".
pub fn filter_by_genre<R: SongRow>(table: &Table<R>, selection: &GenreSelection) -> Table<R> {
    if selection.is_empty() || !table.has_field(Field::Genre) {
        return table.clone();
    }

    table.select(|row| selection.contains(row.field(Field::Genre)))
}

/// Applies the same selection to both tables independently. A catalog
/// without a genre column disables filtering for both.
pub fn filter_tables(
    performances: &PerformanceTable,
    catalog: &CatalogTable,
    selection: &GenreSelection,
) -> (PerformanceTable, CatalogTable) {
    if !catalog.has_field(Field::Genre) {
        return (performances.clone(), catalog.clone());
    }
    (
        filter_by_genre(performances, selection),
        filter_by_genre(catalog, selection),
    )
}
