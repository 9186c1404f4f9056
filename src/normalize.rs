use crate::model::{Field, SongRow, Table};
use unicode_normalization::UnicodeNormalization;

/// Stand-in for an absent value before trimming and uppercasing. Blank,
/// whitespace-only and missing cells all end up here.
pub const MISSING_PLACEHOLDER: &str = "";

/// `uppercase(trim(value))`, composed to NFC so accented letters typed in
/// different ways compare equal. Composition runs last: uppercasing can emit
/// decomposed sequences (`ΐ` has no precomposed capital).
pub fn normalize_text(value: Option<&str>) -> String {
    let raw = value.unwrap_or(MISSING_PLACEHOLDER);
    raw.trim().to_uppercase().nfc().collect()
}

/// Rewrites every designated field the table actually has. Fields without a
/// column are skipped.
pub fn normalize_table<R: SongRow>(table: &Table<R>, fields: &[Field]) -> Table<R> {
    let present: Vec<Field> = fields
        .iter()
        .copied()
        .filter(|field| table.has_field(*field))
        .collect();

    table.map_rows(|mut row| {
        for field in &present {
            let normalized = normalize_text(Some(row.field(*field)));
            *row.field_mut(*field) = normalized;
        }
        row
    })
}

/// Header text comparison key: trimmed, BOM-stripped, NFC.
pub(crate) fn header_key(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().nfc().collect()
}
