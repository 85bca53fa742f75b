//! Cover normalization service configuration

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub compression: CompressionConfig,
    pub fetch: FetchConfig,
    pub limits: LimitsConfig,
    pub images: ImagesConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Output encoding selected for artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Webp,
    Jpeg,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Aspect ratio numerator (width)
    pub target_ratio_w: u32,
    /// Aspect ratio denominator (height)
    pub target_ratio_h: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub max_size_kb: u32,
    pub initial_quality: u8,
    pub quality_step: u8,
    /// Quality must be strictly above this to be stepped down again
    pub min_quality: u8,
    /// Quality used after every dimension shrink
    pub reset_quality: u8,
    pub shrink_factor: f64,
    pub min_dimension: u32,
    pub max_iterations: u32,
    pub deadline_secs: u64,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_input_bytes: usize,
    pub max_image_dimension: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub apply_exif_orientation: bool,
    /// Key prefix for stored artifacts
    pub folder: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory backing the local object store
    pub root: PathBuf,
    pub public_base_url: String,
    /// Expose `root` over HTTP under `mount_path`
    pub serve_public: bool,
    pub mount_path: String,
    pub sqlite_path: PathBuf,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_ratio_w: 3,
            target_ratio_h: 4,
            max_width: 900,
            max_height: 1200,
            max_size_kb: 300,
            initial_quality: 85,
            quality_step: 10,
            min_quality: 10,
            reset_quality: 60,
            shrink_factor: 0.8,
            min_dimension: 500,
            max_iterations: 32,
            deadline_secs: 30,
            format: OutputFormat::Webp,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: concat!("coverfit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 20 * 1024 * 1024,
            max_image_dimension: 16384,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            apply_exif_orientation: true,
            folder: "covers".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/storage"),
            public_base_url: "http://localhost:3000/storage".to_string(),
            serve_public: true,
            mount_path: "/storage".to_string(),
            sqlite_path: PathBuf::from("data/business.db"),
        }
    }
}
