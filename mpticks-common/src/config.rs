use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
    #[serde(default)]
    pub label_width: usize, // 0 = sized from the widest bucket bound
}

fn default_bar_width() -> usize {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bar_width: default_bar_width(),
            label_width: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub min: i64,
    pub max: i64,
    pub buckets: usize,
}

impl DomainConfig {
    pub fn new(min: i64, max: i64, buckets: usize) -> Self {
        Self { min, max, buckets }
    }

    pub fn validate(&self) -> crate::Result<()> {
        validate_domain(self.min, self.max, self.buckets)
    }
}

/// checks that `[min, max]` can be split into `buckets` non-empty integer ranges
pub fn validate_domain(min: i64, max: i64, buckets: usize) -> crate::Result<()> {
    if max < min {
        return Err(crate::MpticksError::InvalidArgument(format!(
            "max ({max}) is less than min ({min})"
        )));
    }
    if buckets == 0 {
        return Err(crate::MpticksError::InvalidArgument(
            "bucket count must be at least 1".into(),
        ));
    }
    let size = max as i128 - min as i128 + 1;
    if buckets as i128 > size {
        return Err(crate::MpticksError::InvalidArgument(format!(
            "{buckets} buckets do not fit in [{min}, {max}] ({size} values)"
        )));
    }
    Ok(())
}

fn default_imports() -> DomainConfig {
    DomainConfig::new(0, 100, 5)
}
fn default_routes() -> DomainConfig {
    DomainConfig::new(0, 2500, 10)
}
fn default_ticks() -> DomainConfig {
    DomainConfig::new(0, 5000, 10)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramsConfig {
    #[serde(default = "default_imports")]
    pub imports: DomainConfig,
    #[serde(default = "default_routes")]
    pub routes: DomainConfig,
    #[serde(default = "default_ticks")]
    pub ticks: DomainConfig,
}

impl Default for HistogramsConfig {
    fn default() -> Self {
        Self {
            imports: default_imports(),
            routes: default_routes(),
            ticks: default_ticks(),
        }
    }
}

impl HistogramsConfig {
    pub fn validate(&self) -> crate::Result<()> {
        for (name, domain) in [("imports", &self.imports), ("routes", &self.routes), ("ticks", &self.ticks)] {
            domain.validate().map_err(|e| match e {
                crate::MpticksError::InvalidArgument(msg) => {
                    crate::MpticksError::InvalidArgument(format!("histograms.{name}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub histograms: HistogramsConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mpticks")
            .join("config.toml")
    }

    /// path used by `load`: $MPTICKS_CONFIG if set, else `config_path()`
    pub fn resolved_path() -> PathBuf {
        match std::env::var("MPTICKS_CONFIG") {
            Ok(env_path) => PathBuf::from(env_path),
            Err(_) => Self::config_path(),
        }
    }

    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::resolved_path())
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&content)
            .map_err(|e| crate::MpticksError::Config(format!("{}: {e}", path.display())))?;
        Ok(cfg)
    }

    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::resolved_path())
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::MpticksError::Config(e.to_string()))
    }
}
