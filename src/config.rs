use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub ui: UiConfig,
}

/// Startup values for the application flags. These are read once at
/// launch; runtime toggles are never written back.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub show_video: bool,
    pub show_all_keypoints: bool,
    pub tracked_index: usize,
    pub mirror: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub window_width: usize,
    pub window_height: usize,
    /// Half-side of the cursor sprite; the sprite is drawn at twice this.
    pub cursor_size: u32,
    pub keypoint_radius: f32,
    pub marker_color_hex: String,
    pub font_family: String,
    pub font_size_pt: u32,
    /// Scale of the bitmap fallback font when no TTF is found.
    pub text_scale: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            show_video: true,
            show_all_keypoints: true,
            tracked_index: 1, // nose tip
            mirror: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            cursor_size: 60,
            keypoint_radius: 3.0,
            marker_color_hex: "#00FF00".to_string(),
            font_family: "Monospace".to_string(),
            font_size_pt: 16,
            text_scale: 2,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            ui: UiConfig::default(),
        }
    }
}

impl AppConfig {
    const PATH: &'static str = "config.json";

    pub fn load() -> Result<Self> {
        let config = if Path::new(Self::PATH).exists() {
            let content = fs::read_to_string(Self::PATH)?;
            // Missing fields fall back to Default via #[serde(default)]
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    log::info!("Loaded configuration from {}", Self::PATH);
                    c
                }
                Err(e) => {
                    log::warn!("Error parsing config: {}. Loading defaults.", e);
                    Self::default()
                }
            }
        } else {
            log::info!("Configuration file not found. Creating default at {}", Self::PATH);
            Self::default()
        };

        // Save back so new fields show up in the file
        config.save()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::PATH, content)?;
        Ok(())
    }
}
