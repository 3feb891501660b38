use std::path::{Path, PathBuf};

use crate::error::AppError;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_SERIAL_PREFIX: &str = "SFactory";
const DEFAULT_FONT_PATH: &str = "backend/NanumGothic.ttf";

const CATALOGUE_FILE: &str = "스마트팩토리수준진단_input.csv";
const SERIAL_FILE: &str = "serial_number.txt";
const RESULTS_DIR: &str = "results";
const ROSTER_FILE: &str = "설문자리스트.xlsx";

/// Where the service listens and where its resources live on disk.
///
/// Every persisted path is resolved against the resource root.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the catalogue, static front-end and persisted results.
    pub resource_root: PathBuf,
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// Prefix of issued serial ids.
    pub serial_prefix: String,
    /// TrueType font used for Korean text in reports.
    pub font_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `DIAGNOSIS_RESOURCE_ROOT` (default: ".")
    /// - `DIAGNOSIS_LISTEN_ADDR` (default: "127.0.0.1:5000")
    /// - `DIAGNOSIS_SERIAL_PREFIX` (default: "SFactory")
    /// - `DIAGNOSIS_FONT_PATH` (default: "backend/NanumGothic.ttf", relative to the root)
    pub fn from_env() -> Result<Self, AppError> {
        let root = std::env::var("DIAGNOSIS_RESOURCE_ROOT").unwrap_or_else(|_| ".".to_string());
        let resource_root = PathBuf::from(root);
        if !resource_root.is_dir() {
            return Err(AppError::Config(format!(
                "resource root not found: {}",
                resource_root.display()
            )));
        }

        let mut config = Self::with_root(resource_root);
        if let Ok(addr) = std::env::var("DIAGNOSIS_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(prefix) = std::env::var("DIAGNOSIS_SERIAL_PREFIX") {
            config.serial_prefix = prefix;
        }
        if let Ok(font) = std::env::var("DIAGNOSIS_FONT_PATH") {
            config.font_path = config.resource_root.join(font);
        }
        Ok(config)
    }

    /// Defaults for everything except the resource root.
    pub fn with_root(resource_root: impl Into<PathBuf>) -> Self {
        let resource_root = resource_root.into();
        Self {
            font_path: resource_root.join(DEFAULT_FONT_PATH),
            resource_root,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            serial_prefix: DEFAULT_SERIAL_PREFIX.to_string(),
        }
    }

    pub fn static_root(&self) -> &Path {
        &self.resource_root
    }

    pub fn catalogue_path(&self) -> PathBuf {
        self.resource_root.join(CATALOGUE_FILE)
    }

    pub fn serial_path(&self) -> PathBuf {
        self.resource_root.join(SERIAL_FILE)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.resource_root.join(RESULTS_DIR)
    }

    pub fn roster_path(&self) -> PathBuf {
        self.resource_root.join(ROSTER_FILE)
    }
}
