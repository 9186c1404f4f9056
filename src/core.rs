use crate::cache::SourceCache;
use crate::config::DashboardSettings;
use crate::dashboard::{DashboardSnapshot, build_snapshot, distinct_genres};
use crate::loader::LoadedTables;
use crate::model::GenreSelection;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Performed,
    Artists,
    Queue,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [Self::Performed, Self::Artists, Self::Queue];

    pub fn label(self) -> &'static str {
        match self {
            Self::Performed => "Performed",
            Self::Artists => "Artists",
            Self::Queue => "Queue",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Performed => Self::Artists,
            Self::Artists => Self::Queue,
            Self::Queue => Self::Performed,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Performed => Self::Queue,
            Self::Artists => Self::Performed,
            Self::Queue => Self::Artists,
        }
    }
}

/// Interactive state behind the terminal dashboard.
#[derive(Debug)]
pub struct DashboardCore {
    pub settings: DashboardSettings,
    cache: SourceCache,
    tables: Option<Arc<LoadedTables>>,
    has_loaded: bool,
    pub genres: Vec<String>,
    pub selection: GenreSelection,
    pub selected_genre: usize,
    pub tab: DashboardTab,
    pub snapshot: Option<DashboardSnapshot>,
    /// Blocking load failure, rendered instead of a partial dashboard.
    pub load_error: Option<String>,
    pub queue_scroll: usize,
    pub dirty: bool,
    pub status: String,
}

impl DashboardCore {
    pub fn new(settings: DashboardSettings) -> Self {
        let mut core = Self {
            settings,
            cache: SourceCache::new(),
            tables: None,
            has_loaded: false,
            genres: Vec::new(),
            selection: GenreSelection::default(),
            selected_genre: 0,
            tab: DashboardTab::Performed,
            snapshot: None,
            load_error: None,
            queue_scroll: 0,
            dirty: true,
            status: String::from("Ready"),
        };
        core.reload(false);
        core
    }

    /// Re-reads the sources if they changed, or unconditionally with
    /// `force`. The genre selection survives, minus genres that vanished.
    pub fn reload(&mut self, force: bool) {
        if force {
            self.cache.invalidate();
        }

        let loaded = self
            .settings
            .load_options()
            .map_err(|err| format!("{err:#}"))
            .and_then(|options| {
                self.cache
                    .get_or_load(&self.settings.sources, &options)
                    .map_err(|err| format!("{:#}", anyhow::Error::from(err)))
            });

        match loaded {
            Ok(tables) => {
                let unchanged = self
                    .tables
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &tables));
                self.genres = distinct_genres(&tables.catalog);
                if self.has_loaded {
                    self.selection.retain_known(&self.genres);
                } else {
                    self.selection = GenreSelection::new(&self.genres);
                    self.has_loaded = true;
                }
                self.selected_genre = self
                    .selected_genre
                    .min(self.genres.len().saturating_sub(1));
                self.tables = Some(tables);
                self.load_error = None;
                self.recompute();
                if unchanged {
                    self.set_status("Sources unchanged");
                } else {
                    self.set_status("Sources loaded");
                }
            }
            Err(message) => {
                error!(error = %message, "load failed");
                self.tables = None;
                self.snapshot = None;
                self.load_error = Some(message);
                self.set_status("Load failed, press r to retry");
            }
        }
    }

    pub fn recompute(&mut self) {
        let Some(tables) = &self.tables else {
            return;
        };
        self.snapshot = Some(build_snapshot(tables, &self.selection, self.settings.top_n));
        self.queue_scroll = 0;
        self.dirty = true;
    }

    pub fn tables(&self) -> Option<&LoadedTables> {
        self.tables.as_deref()
    }

    pub fn select_next(&mut self) {
        if self.genres.is_empty() {
            return;
        }
        self.selected_genre = (self.selected_genre + 1).min(self.genres.len() - 1);
        self.dirty = true;
    }

    pub fn select_prev(&mut self) {
        self.selected_genre = self.selected_genre.saturating_sub(1);
        self.dirty = true;
    }

    pub fn toggle_selected_genre(&mut self) {
        let Some(genre) = self.genres.get(self.selected_genre).cloned() else {
            self.set_status("No genres to select");
            return;
        };

        let now_selected = self.selection.toggle(&genre);
        self.recompute();
        let label = genre_label(&genre);
        if now_selected {
            self.set_status(&format!("Selected {label}"));
        } else {
            self.set_status(&format!("Removed {label}"));
        }
    }

    pub fn select_all_genres(&mut self) {
        self.selection = GenreSelection::new(&self.genres);
        self.recompute();
        self.set_status("All genres selected");
    }

    /// An empty selection means no filtering, so this also shows everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.recompute();
        self.set_status("Selection cleared, showing all genres");
    }

    pub fn is_genre_selected(&self, genre: &str) -> bool {
        self.selection.contains(genre)
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
        self.dirty = true;
    }

    pub fn prev_tab(&mut self) {
        self.tab = self.tab.prev();
        self.dirty = true;
    }

    pub fn set_tab(&mut self, tab: DashboardTab) {
        self.tab = tab;
        self.dirty = true;
    }

    pub fn scroll_queue(&mut self, delta: isize) {
        let len = self
            .snapshot
            .as_ref()
            .map_or(0, |snapshot| snapshot.queue().len());
        self.queue_scroll = self
            .queue_scroll
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
        self.dirty = true;
    }

    pub fn set_status(&mut self, message: &str) {
        debug!(status = message);
        self.status = message.to_string();
        self.dirty = true;
    }
}

/// Display text for a genre; the blank label needs something visible.
pub fn genre_label(genre: &str) -> &str {
    if genre.is_empty() { "(blank)" } else { genre }
}
