//! Runtime configuration and output-path layout.

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::spec::ReportError;
use crate::util::sanitize_file_stem;

/// Environment key: base output folder.
pub const C_ENV_OUTPUT_DIR: &str = "ADMINISTRARE_OUTPUT_DIR";
/// Environment key: sheet zoom percentage.
pub const C_ENV_ZOOM: &str = "ADMINISTRARE_ZOOM";
/// Environment key: default log filter.
pub const C_ENV_LOG_LEVEL: &str = "ADMINISTRARE_LOG_LEVEL";

pub const C_DIR_OUTPUT_DEFAULT: &str = "spreadsheets";
pub const N_ZOOM_DEFAULT: u16 = 85;
pub const C_LOG_LEVEL_DEFAULT: &str = "info";

pub const C_DIR_INVENTORY: &str = "inventories";
pub const C_DIR_INVENTORY_MASTER: &str = "master";
pub const C_DIR_INVENTORY_DEMAND: &str = "demand";
pub const C_DIR_INVENTORY_REQUEST: &str = "request";

/// Column cap used when auto-fitting the inventory ledger.
pub const N_WIDTH_LIMIT_MASTER: usize = 35;
pub const N_WIDTH_EXTRA_DEMAND: usize = 1;
pub const N_WIDTH_EXTRA_REQUEST: usize = 2;

/// Report generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportConfig {
    pub dir_output: PathBuf,
    pub zoom: u16,
    pub log_level: String,
}

impl Default for SpecReportConfig {
    fn default() -> Self {
        Self {
            dir_output: PathBuf::from(C_DIR_OUTPUT_DEFAULT),
            zoom: N_ZOOM_DEFAULT,
            log_level: C_LOG_LEVEL_DEFAULT.to_string(),
        }
    }
}

impl SpecReportConfig {
    /// Defaults overridden by the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ReportError> {
        if let Ok(path_env) = dotenvy::dotenv() {
            debug!(path = %path_env.display(), "loaded .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by `lookup(key)` for each known key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ReportError> {
        let mut config = Self::default();
        if let Some(val) = lookup(C_ENV_OUTPUT_DIR).filter(|val| !val.trim().is_empty()) {
            config.dir_output = PathBuf::from(val.trim());
        }
        if let Some(val) = lookup(C_ENV_ZOOM) {
            config.zoom = parse_zoom(&val)?;
        }
        if let Some(val) = lookup(C_ENV_LOG_LEVEL).filter(|val| !val.trim().is_empty()) {
            config.log_level = val.trim().to_string();
        }
        Ok(config)
    }

    pub fn dir_inventory(&self, c_dir_report: &str) -> PathBuf {
        self.dir_output.join(C_DIR_INVENTORY).join(c_dir_report)
    }

    /// `<out>/inventories/master/<stamp>.xlsx`
    pub fn derive_master_path(&self, c_stamp: &str) -> PathBuf {
        self.dir_inventory(C_DIR_INVENTORY_MASTER)
            .join(format!("{c_stamp}.xlsx"))
    }

    /// `<out>/inventories/demand/<stamp>.xlsx`
    pub fn derive_demand_path(&self, c_stamp: &str) -> PathBuf {
        self.dir_inventory(C_DIR_INVENTORY_DEMAND)
            .join(format!("{c_stamp}.xlsx"))
    }

    /// `<out>/inventories/request/raw <stamp>.xlsx`
    pub fn derive_request_path(&self, c_stamp: &str) -> PathBuf {
        self.dir_inventory(C_DIR_INVENTORY_REQUEST)
            .join(format!("raw {c_stamp}.xlsx"))
    }

    /// `<out>/inventories/request/<username> <yyyymmdd>.xlsx`
    ///
    /// The stem is sanitized so the file always lands inside the request folder.
    pub fn derive_request_user_path(
        &self,
        username: &str,
        c_date_compact: &str,
    ) -> Result<PathBuf, ReportError> {
        let c_stem = sanitize_file_stem(&format!("{username} {c_date_compact}"))?;
        Ok(self
            .dir_inventory(C_DIR_INVENTORY_REQUEST)
            .join(format!("{c_stem}.xlsx")))
    }
}

/// Zoom must fall in the range Excel accepts (10..=400).
pub fn parse_zoom(value: &str) -> Result<u16, ReportError> {
    let n_zoom = value
        .trim()
        .parse::<u16>()
        .map_err(|_| ReportError::Config(format!("{C_ENV_ZOOM} must be an integer, got {value:?}")))?;
    if !(10..=400).contains(&n_zoom) {
        return Err(ReportError::Config(format!(
            "{C_ENV_ZOOM} must be within 10..=400, got {n_zoom}"
        )));
    }
    Ok(n_zoom)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let dict_env = BTreeMap::from([
            (C_ENV_OUTPUT_DIR, "/tmp/laporan"),
            (C_ENV_ZOOM, "100"),
        ]);
        let config =
            SpecReportConfig::from_lookup(|key| dict_env.get(key).map(|val| val.to_string()))
                .unwrap();

        assert_eq!(config.dir_output, PathBuf::from("/tmp/laporan"));
        assert_eq!(config.zoom, 100);
        assert_eq!(config.log_level, C_LOG_LEVEL_DEFAULT);
    }

    #[test]
    fn test_invalid_zoom_is_rejected() {
        assert!(parse_zoom("abc").is_err());
        assert!(parse_zoom("5").is_err());
        assert_eq!(parse_zoom(" 85 ").unwrap(), 85);
    }

    #[test]
    fn test_output_paths() {
        let config = SpecReportConfig::default();
        assert_eq!(
            config.derive_master_path("2022-07-01-10-00-00"),
            PathBuf::from("spreadsheets/inventories/master/2022-07-01-10-00-00.xlsx")
        );
        assert_eq!(
            config.derive_request_path("2022-07-01-10-00-00"),
            PathBuf::from("spreadsheets/inventories/request/raw 2022-07-01-10-00-00.xlsx")
        );
        assert_eq!(
            config
                .derive_request_user_path("../budi", "20220702")
                .unwrap(),
            PathBuf::from("spreadsheets/inventories/request/_budi 20220702.xlsx")
        );
        assert_eq!(
            config.derive_demand_path("x"),
            PathBuf::from("spreadsheets/inventories/demand/x.xlsx")
        );
    }
}
