// Dashboard settings, loaded from a JSON file.
//
// The file is looked up through `DASHBOARD_CONFIG`, then `dashboard.json` in
// the working directory. Every field is optional; missing ones keep their
// defaults, and no file at all means the defaults.
use crate::error::{DashboardError, Result};
use crate::kpi::KpiTargets;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the exported sheet files.
    pub data_dir: PathBuf,
    /// Directory receiving CSV/JSON exports.
    pub output_dir: PathBuf,
    /// Sheet name -> CSV file name inside `data_dir`.
    pub sheets: BTreeMap<String, String>,
    pub targets: KpiTargets,
    /// Logical column forward-filled on load (`"expert"`, `"section"`...),
    /// looked up through the alias table.
    pub fill_column: String,
    /// Value given to leading blank cells of `fill_column`.
    pub expert_default: String,
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            sheets: BTreeMap::from([
                ("Yields Projections".to_string(), "yields_projections.csv".to_string()),
                ("Planning".to_string(), "planning.csv".to_string()),
            ]),
            targets: KpiTargets::default(),
            fill_column: "expert".to_string(),
            expert_default: "Non assigné".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Settings from `DASHBOARD_CONFIG`, else `dashboard.json`, else defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DashboardError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let t = &self.targets;
        if [t.daily, t.weekly, t.monthly].iter().any(|v| !v.is_finite()) {
            return Err(DashboardError::Config("KPI targets must be finite numbers".into()));
        }
        if self.fill_column.trim().is_empty() {
            return Err(DashboardError::Config("fill_column must not be empty".into()));
        }
        if let Some((sheet, _)) = self.sheets.iter().find(|(_, file)| file.trim().is_empty()) {
            return Err(DashboardError::Config(format!("sheet '{}' has no file name", sheet)));
        }
        Ok(())
    }

    pub fn sheet_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}
