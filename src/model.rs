use crate::normalize::normalize_text;
use std::collections::BTreeSet;
use std::fmt;

/// Song identifier shared by the performance log and the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SongId(String);

impl SongId {
    /// Returns `None` for blank input. Integral decimal renderings such as
    /// `12.0` collapse to `12` so spreadsheet float exports match.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let canonical = integral_text(trimmed).unwrap_or(trimmed);
        Some(Self(canonical.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key used by the queue's set operations. Catalog rows without an id all
/// share the `None` key.
pub type SongKey = Option<SongId>;

fn integral_text(text: &str) -> Option<&str> {
    let (whole, fraction) = text.split_once('.')?;
    let whole_is_digits = !whole.is_empty() && whole.chars().all(|ch| ch.is_ascii_digit());
    let fraction_is_zero = !fraction.is_empty() && fraction.chars().all(|ch| ch == '0');
    (whole_is_digits && fraction_is_zero).then_some(whole)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Artist,
    Genre,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Artist, Field::Genre];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Genre => "genre",
        }
    }
}

/// Accessors shared by both row types so filtering and aggregation are
/// written once.
pub trait SongRow: Clone {
    fn song_id(&self) -> Option<&SongId>;
    fn field(&self, field: Field) -> &str;
    fn field_mut(&mut self, field: Field) -> &mut String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceRecord {
    pub song_id: SongId,
    pub title: String,
    pub artist: String,
    pub genre: String,
}

/// Catalog rows keep a blank identifier as `None` rather than being dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub song_id: Option<SongId>,
    pub title: String,
    pub artist: String,
    pub genre: String,
}

impl SongRow for PerformanceRecord {
    fn song_id(&self) -> Option<&SongId> {
        Some(&self.song_id)
    }

    fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Artist => &self.artist,
            Field::Genre => &self.genre,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Artist => &mut self.artist,
            Field::Genre => &mut self.genre,
        }
    }
}

impl SongRow for CatalogEntry {
    fn song_id(&self) -> Option<&SongId> {
        self.song_id.as_ref()
    }

    fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Artist => &self.artist,
            Field::Genre => &self.genre,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Artist => &mut self.artist,
            Field::Genre => &mut self.genre,
        }
    }
}

/// Rows plus the set of text columns that were present in the source.
///
/// A table is never changed after construction: filtering and queue
/// resolution build new tables and leave the loaded ones untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<R> {
    rows: Vec<R>,
    columns: BTreeSet<Field>,
}

pub type PerformanceTable = Table<PerformanceRecord>;
pub type CatalogTable = Table<CatalogEntry>;

impl<R: SongRow> Table<R> {
    pub fn new(rows: Vec<R>, columns: impl IntoIterator<Item = Field>) -> Self {
        Self {
            rows,
            columns: columns.into_iter().collect(),
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }

    pub fn columns(&self) -> impl Iterator<Item = Field> + '_ {
        self.columns.iter().copied()
    }

    /// New table with the rows matching `keep`, same columns.
    pub fn select(&self, mut keep: impl FnMut(&R) -> bool) -> Self {
        Self {
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
            columns: self.columns.clone(),
        }
    }

    pub(crate) fn map_rows(&self, transform: impl FnMut(R) -> R) -> Self {
        Self {
            rows: self.rows.iter().cloned().map(transform).collect(),
            columns: self.columns.clone(),
        }
    }
}

/// Genre labels chosen by the caller. Labels are normalized on the way in so
/// they compare equal to normalized table values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreSelection {
    labels: BTreeSet<String>,
}

impl GenreSelection {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            labels: labels
                .into_iter()
                .map(|label| normalize_text(Some(label.as_ref())))
                .collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(String::as_str)
    }

    /// Flips membership of `label`; returns whether it is now selected.
    pub fn toggle(&mut self, label: &str) -> bool {
        let label = normalize_text(Some(label));
        if self.labels.remove(&label) {
            false
        } else {
            self.labels.insert(label);
            true
        }
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// Drops labels that are not in `known`, keeping the subset invariant
    /// after the catalog is reloaded.
    pub fn retain_known(&mut self, known: &[String]) {
        self.labels.retain(|label| known.contains(label));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
}

/// Labels ranked by count, descending, ties in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    pub(crate) fn from_entries(entries: Vec<FrequencyEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.entries.first().map_or(0, |entry| entry.count)
    }

    pub fn count_for(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.count)
    }
}
