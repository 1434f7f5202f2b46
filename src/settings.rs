//! Session configuration supplied by the host
//!
//! Practice modes, per-crate enable toggles, and the tutorial flag. The
//! host owns persistence; this module only defines the shapes and a lenient
//! JSON boundary - malformed or missing configuration falls back to
//! defaults (all crates enabled, rule alternation on) instead of failing
//! the session.

use serde::{Deserialize, Serialize};

use crate::sim::state::PowerUpType;

/// Practice session restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PracticeMode {
    #[default]
    None,
    /// Only the selected crate type spawns
    SingleCrate,
    /// 4-lane track on every level
    FourLanes,
    /// Rule pinned to COLOR, no crates
    ColorOnly,
    /// Rule pinned to WORD, no crates
    WordOnly,
}

/// Practice/tutorial configuration, immutable for a session's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PracticeConfig {
    pub active: bool,
    pub mode: PracticeMode,
    /// Present only for SINGLE_CRATE
    pub selected_crate: Option<PowerUpType>,
}

impl PracticeConfig {
    pub fn single_crate(kind: PowerUpType) -> Self {
        Self {
            active: true,
            mode: PracticeMode::SingleCrate,
            selected_crate: Some(kind),
        }
    }

    pub fn four_lanes() -> Self {
        Self {
            active: true,
            mode: PracticeMode::FourLanes,
            selected_crate: None,
        }
    }

    pub fn color_only() -> Self {
        Self {
            active: true,
            mode: PracticeMode::ColorOnly,
            selected_crate: None,
        }
    }

    pub fn word_only() -> Self {
        Self {
            active: true,
            mode: PracticeMode::WordOnly,
            selected_crate: None,
        }
    }
}

/// Per-crate enable toggles consulted by crate spawn sampling.
/// Everything is enabled unless the host disables it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CrateToggles {
    disabled: Vec<PowerUpType>,
}

impl CrateToggles {
    pub fn all_enabled() -> Self {
        Self::default()
    }

    pub fn enabled(&self, kind: PowerUpType) -> bool {
        !self.disabled.contains(&kind)
    }

    pub fn set_enabled(&mut self, kind: PowerUpType, enabled: bool) {
        if enabled {
            self.disabled.retain(|&k| k != kind);
        } else if !self.disabled.contains(&kind) {
            self.disabled.push(kind);
        }
    }
}

/// Complete session configuration handed to `GameState::new`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub practice: PracticeConfig,
    pub crate_toggles: CrateToggles,
    /// Tutorial runs get guidance highlighting and skip discovery callbacks
    pub tutorial: bool,
    /// Effect types the host has already recorded as discovered
    pub already_discovered: Vec<PowerUpType>,
}

impl SessionConfig {
    /// Decode host-supplied JSON, falling back to defaults when it is
    /// missing or malformed
    pub fn from_json(json: Option<&str>) -> Self {
        match json {
            Some(raw) => match serde_json::from_str(raw) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("invalid session config, using defaults: {err}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
