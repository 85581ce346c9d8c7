//! Board and pointer settings
//!
//! Read from a JSON file next to the layout; anything missing falls back to
//! the defaults of the reference 800x600 window.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::HitRegions;
use crate::view::BoardGeometry;

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the grid sits on screen
    pub geometry: BoardGeometry,
    /// Rotor click targets
    pub hit: HitRegions,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }
}
