// Configuration management
//
// Handles simulation settings and their persistence as TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineConfig;

/// Default configuration file path
pub const CONFIG_FILE: &str = "fbpipe.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Framebuffer pipeline settings
    pub pipeline: PipelineConfig,

    /// Clocks, raster and startup data
    pub sim: SimConfig,
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Compute domain clock
    pub compute_hz: u64,

    /// Display domain clock
    pub display_hz: u64,

    /// Blanking ticks per display line
    pub h_blank: usize,

    /// Blanking lines per display frame
    pub v_blank: usize,

    /// Initial framebuffer contents (hex); all zeros when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,

    /// Palette contents (hex); a greyscale ramp when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<PathBuf>,

    /// Where captured frames are written
    pub capture_directory: PathBuf,

    /// Include timestamp in capture filenames
    pub include_timestamp: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        // 640x480 active in an 800x525 raster, like VGA
        SimConfig {
            compute_hz: 50_000_000,
            display_hz: 25_000_000,
            h_blank: 160,
            v_blank: 45,
            image: None,
            palette: None,
            capture_directory: PathBuf::from("captures"),
            include_timestamp: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file or create default
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// and saves it to the file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fbpipe::sim::AppConfig;
    ///
    /// let config = AppConfig::load_or_default();
    /// ```
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save();
            config
        })
    }

    /// Load configuration from the default file
    pub fn load() -> Result<Self, io::Error> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from `path`
    ///
    /// # Returns
    ///
    /// Result containing the configuration or an error
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<(), io::Error> {
        self.save_to(CONFIG_FILE)
    }

    /// Save configuration to `path`
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }
}
