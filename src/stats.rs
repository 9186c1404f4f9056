use crate::model::{Field, FrequencyEntry, FrequencyTable, SongRow, Table};
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 10;

/// Counts rows per normalized `field` value and keeps the `top_n` largest.
///
/// Ordering is by count, descending. The sort is stable over first-seen
/// order, so tied labels stay in the order they first appeared in the table.
/// Returns `None` when the table has no column for `field`.
pub fn frequency_table<R: SongRow>(
    table: &Table<R>,
    field: Field,
    top_n: usize,
) -> Option<FrequencyTable> {
    if !table.has_field(field) {
        return None;
    }

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    for row in table.rows() {
        let label = row.field(field);
        match slots.get(label) {
            Some(&slot) => entries[slot].count += 1,
            None => {
                slots.insert(label, entries.len());
                entries.push(FrequencyEntry {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(top_n);
    Some(FrequencyTable::from_entries(entries))
}

/// Every label with its count, same ordering as [`frequency_table`].
pub fn breakdown<R: SongRow>(table: &Table<R>, field: Field) -> Option<FrequencyTable> {
    frequency_table(table, field, usize::MAX)
}
