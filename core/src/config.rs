use crate::error::{io_error, CoreResult};
use crate::tagged::TaggedError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org";

/// Options shared by the helpers, loadable from a JSON file.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UtilConfig {
    pub http: HttpConfig,
    pub archive: ArchiveConfig,
    pub csv: CsvConfig,
}

impl UtilConfig {
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
        let cfg: UtilConfig = serde_json::from_slice(&bytes)?;
        cfg.csv.delimiter_byte()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn load_or_default(path: Option<&Path>) -> CoreResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub public_ip_url: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("utilkit/", env!("CARGO_PKG_VERSION")).to_string(),
            public_ip_url: DEFAULT_PUBLIC_IP_URL.to_string(),
            use_system_proxy: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Deflate level, 0-9.
    pub compression_level: i64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: 9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: char,
}

impl CsvConfig {
    pub fn delimiter_byte(&self) -> CoreResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(TaggedError::validation(format!(
                "csv delimiter {:?} is not a single ASCII character",
                self.delimiter
            ))
            .into())
        }
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}
