use crate::loader::LoadOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "repertoire";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "repertoire.log";
const CONFIG_DIR_ENV: &str = "REPERTOIRE_CONFIG_DIR";

/// Locations of the two delimited sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePaths {
    #[serde(default = "default_performances_path")]
    pub performances: PathBuf,
    #[serde(default = "default_catalog_path")]
    pub catalog: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            performances: default_performances_path(),
            catalog: default_catalog_path(),
        }
    }
}

/// Header names as exported by the spreadsheet the sources come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "default_song_id_column")]
    pub song_id: String,
    /// Alternate spellings accepted for the catalog identifier column.
    #[serde(default = "default_song_id_aliases")]
    pub catalog_song_id_aliases: Vec<String>,
    #[serde(default = "default_title_column")]
    pub title: String,
    #[serde(default = "default_artist_column")]
    pub artist: String,
    #[serde(default = "default_genre_column")]
    pub genre: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            song_id: default_song_id_column(),
            catalog_song_id_aliases: default_song_id_aliases(),
            title: default_title_column(),
            artist: default_artist_column(),
            genre: default_genre_column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    #[serde(default)]
    pub sources: SourcePaths,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Cell values read as missing, compared after trimming.
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            sources: SourcePaths::default(),
            columns: ColumnNames::default(),
            delimiter: default_delimiter(),
            missing_markers: default_missing_markers(),
            top_n: default_top_n(),
        }
    }
}

impl DashboardSettings {
    pub fn load_options(&self) -> Result<LoadOptions> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("delimiter {:?} is not a single ASCII byte", self.delimiter))?;
        Ok(LoadOptions {
            columns: self.columns.clone(),
            delimiter,
            missing_markers: self.missing_markers.clone(),
        })
    }
}

fn default_performances_path() -> PathBuf {
    PathBuf::from("DADOS_DASHBOARD_FINAL.csv")
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("ADOLESCENTES - MUSICAS.csv")
}

fn default_song_id_column() -> String {
    String::from("ID_MUSICA")
}

fn default_song_id_aliases() -> Vec<String> {
    vec![String::from("ID_MÚSICA")]
}

fn default_title_column() -> String {
    String::from("MÚSICA")
}

fn default_artist_column() -> String {
    String::from("AUTOR_MUSICA")
}

fn default_genre_column() -> String {
    String::from("CLASSIFICACAO_MUSICA")
}

fn default_delimiter() -> char {
    ','
}

fn default_missing_markers() -> Vec<String> {
    ["NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_top_n() -> usize {
    10
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_root()?.join(LOG_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<DashboardSettings> {
    load_settings_from_path(&settings_path()?)
}

pub fn save_settings(settings: &DashboardSettings) -> Result<()> {
    ensure_config_dir()?;
    save_settings_to_path(&settings_path()?, settings)
}

pub fn load_settings_from_path(path: &Path) -> Result<DashboardSettings> {
    if !path.exists() {
        return Ok(DashboardSettings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: DashboardSettings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings_to_path(path: &Path, settings: &DashboardSettings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
