/// Cache configuration
///
/// Holds every tunable the cache reads at render time: display density,
/// corner radius, letterbox fill, scaling filter, auto-download policy and
/// where the local persistent cache lives. Serialized to JSON so a host
/// application can keep it next to its other settings.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Scaling filter used when a derived variant needs resizing
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ScaleFilter {
    pub fn filter_type(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            ScaleFilter::Nearest => FilterType::Nearest,
            ScaleFilter::Triangle => FilterType::Triangle,
            ScaleFilter::CatmullRom => FilterType::CatmullRom,
            ScaleFilter::Gaussian => FilterType::Gaussian,
            ScaleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Which chats may download photos from the cloud without asking
///
/// Both flags are "deny" switches, matching how the settings screen stores them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoDownload {
    /// Never fetch from the cloud automatically in private chats
    pub no_private: bool,
    /// Never fetch from the cloud automatically in groups and channels
    pub no_groups: bool,
}

/// All configuration for an image context
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Integer display density multiplier (1 on regular, 2 on high-density displays)
    pub device_pixel_ratio: u32,

    /// Corner radius in logical pixels for rounded variants
    pub corner_radius: u32,

    /// RGBA color painted around letterboxed images
    pub letterbox_fill: [u8; 4],

    pub scale_filter: ScaleFilter,

    pub auto_download: AutoDownload,

    /// SQLite file backing the local persistent cache; `None` disables persistence
    pub storage_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1,
            corner_radius: 4,
            letterbox_fill: [0, 0, 0, 255],
            scale_filter: ScaleFilter::default(),
            auto_download: AutoDownload::default(),
            storage_path: default_storage_path(),
        }
    }
}

impl CacheConfig {
    /// Configuration with persistence disabled, used by tests and tools
    pub fn in_memory() -> Self {
        Self {
            storage_path: None,
            ..Self::default()
        }
    }

    /// Density factor, never below 1
    pub fn dpr(&self) -> u32 {
        self.device_pixel_ratio.max(1)
    }

    /// Convert to JSON string for the settings file
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON settings file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Get the default location of the local image database
/// Returns ~/.cache/pixcache/images.db on Linux
pub fn default_storage_path() -> Option<PathBuf> {
    let mut path = dirs::cache_dir().or_else(dirs::home_dir)?;

    path.push("pixcache");
    path.push("images.db");
    Some(path)
}
