use crate::config::SourcePaths;
use crate::error::{DashboardError, Result};
use crate::loader::{LoadOptions, LoadedTables, load_sources};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of a source file at the moment it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStamp {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceStamp {
    pub fn probe(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|err| DashboardError::data_source(path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

#[derive(Debug)]
struct CachedLoad {
    stamps: [SourceStamp; 2],
    options: LoadOptions,
    tables: Arc<LoadedTables>,
}

/// Memoizes the loader. An entry is reused until either source changes on
/// disk, the load options change, or [`SourceCache::invalidate`] is called.
#[derive(Debug, Default)]
pub struct SourceCache {
    entry: Option<CachedLoad>,
    loads: usize,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        sources: &SourcePaths,
        options: &LoadOptions,
    ) -> Result<Arc<LoadedTables>> {
        self.get_or_load_with(sources, options, load_sources)
    }

    pub fn get_or_load_with<F>(
        &mut self,
        sources: &SourcePaths,
        options: &LoadOptions,
        load: F,
    ) -> Result<Arc<LoadedTables>>
    where
        F: FnOnce(&SourcePaths, &LoadOptions) -> Result<LoadedTables>,
    {
        let stamps = [
            SourceStamp::probe(&sources.performances)?,
            SourceStamp::probe(&sources.catalog)?,
        ];

        if let Some(entry) = self
            .entry
            .as_ref()
            .filter(|entry| entry.stamps == stamps && entry.options == *options)
        {
            debug!("reusing cached sources");
            return Ok(Arc::clone(&entry.tables));
        }

        if self.entry.is_some() {
            info!("sources changed, reloading");
        }
        let tables = Arc::new(load(sources, options)?);
        self.loads += 1;
        self.entry = Some(CachedLoad {
            stamps,
            options: options.clone(),
            tables: Arc::clone(&tables),
        });
        Ok(tables)
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("source cache invalidated");
        }
    }

    pub fn is_cached(&self) -> bool {
        self.entry.is_some()
    }

    /// Number of loads that actually hit the sources.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const LOG: &str = "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n";
    const CATALOG: &str = "ID_MUSICA,MÚSICA,AUTOR_MUSICA,CLASSIFICACAO_MUSICA\n1,a,x,rock\n2,b,y,pop\n";

    fn fixture() -> (TempDir, SourcePaths) {
        let dir = tempdir().expect("tempdir");
        let sources = SourcePaths {
            performances: dir.path().join("log.csv"),
            catalog: dir.path().join("catalog.csv"),
        };
        fs::write(&sources.performances, LOG).expect("write log");
        fs::write(&sources.catalog, CATALOG).expect("write catalog");
        (dir, sources)
    }

    #[test]
    fn second_request_reuses_loaded_tables() {
        let (_dir, sources) = fixture();
        let mut cache = SourceCache::new();
        let options = LoadOptions::default();

        let first = cache.get_or_load(&sources, &options).expect("first");
        let second = cache.get_or_load(&sources, &options).expect("second");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 1);
        assert_eq!(first.catalog.len(), 2);
    }

    #[test]
    fn changed_source_triggers_reload() {
        let (_dir, sources) = fixture();
        let mut cache = SourceCache::new();
        let options = LoadOptions::default();

        cache.get_or_load(&sources, &options).expect("first");
        fs::write(&sources.catalog, format!("{CATALOG}3,c,z,jazz\n")).expect("rewrite");
        let reloaded = cache.get_or_load(&sources, &options).expect("second");

        assert_eq!(cache.loads(), 2);
        assert_eq!(reloaded.catalog.len(), 3);
    }

    #[test]
    fn invalidate_forces_reload() {
        let (_dir, sources) = fixture();
        let mut cache = SourceCache::new();
        let options = LoadOptions::default();

        cache.get_or_load(&sources, &options).expect("first");
        cache.invalidate();
        assert!(!cache.is_cached());
        cache.get_or_load(&sources, &options).expect("second");
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn changed_options_trigger_reload() {
        let (_dir, sources) = fixture();
        let mut cache = SourceCache::new();

        cache
            .get_or_load(&sources, &LoadOptions::default())
            .expect("first");
        let options = LoadOptions {
            missing_markers: Vec::new(),
            ..LoadOptions::default()
        };
        cache.get_or_load(&sources, &options).expect("second");
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn failed_load_leaves_previous_entry_alone() {
        let (_dir, sources) = fixture();
        let mut cache = SourceCache::new();
        let options = LoadOptions::default();

        cache.get_or_load(&sources, &options).expect("first");
        fs::write(&sources.catalog, "CODIGO\n1\n").expect("rewrite");
        let err = cache
            .get_or_load(&sources, &options)
            .expect_err("schema error");

        assert!(matches!(err, DashboardError::Schema { .. }));
        assert!(cache.is_cached());
    }

    #[test]
    fn missing_source_is_data_source_error() {
        let (_dir, mut sources) = fixture();
        sources.catalog.set_file_name("absent.csv");
        let mut cache = SourceCache::new();

        let err = cache
            .get_or_load_with(&sources, &LoadOptions::default(), |_, _| {
                unreachable!("loader must not run for a missing source")
            })
            .expect_err("missing");
        assert!(matches!(err, DashboardError::DataSource { .. }));
    }
}
