//! Color Conflict - a Stroop-effect lane racing game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track generation, rule state machine,
//!   power-up effects, judgment-line collision)
//! - `settings`: Host-facing session configuration (practice modes, crate
//!   toggles)
//!
//! The crate is a pure in-process simulation: the host layer owns rendering,
//! menus, audio, and persistence, and talks to the core through
//! [`sim::GameState`], `sim::tick`, and [`sim::render_rows`].

pub mod settings;
pub mod sim;

pub use settings::{CrateToggles, PracticeConfig, PracticeMode, SessionConfig};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Track progress scale: rows spawn at 0 and advance toward the player.
    /// A row is judged when it reaches this line.
    pub const JUDGMENT_Y: f32 = 85.0;
    /// Rows past this point are retired
    pub const RETIRE_Y: f32 = 110.0;

    /// Base scroll speed in track units per second
    pub const BASE_SCROLL_SPEED: f32 = 30.0;
    /// Per-level scroll speed increase (fraction of base)
    pub const SPEED_SCALE_PER_LEVEL: f32 = 0.06;
    /// Cap on the level speed ramp
    pub const MAX_SPEED_SCALE: f32 = 2.0;
    /// Scroll multiplier while the SPEED effect is active
    pub const SPEED_BOOST_MULT: f32 = 1.5;

    /// Inter-row spacing at level 1
    pub const BASE_ROW_SPACING: f32 = 34.0;
    /// Spacing reduction per level
    pub const SPACING_STEP: f32 = 2.0;
    /// Spacing floor - keeps the track solvable at any speed multiplier
    pub const MIN_ROW_SPACING: f32 = 18.0;
    /// Rendered gap inserted when the lane count changes between rows
    pub const TRANSITION_ZONE_HEIGHT: f32 = 8.0;

    /// Level length in ticks (20 seconds at 60 Hz)
    pub const LEVEL_DURATION_TICKS: u64 = 20 * 60;
    /// The rule alternates every this many levels
    pub const RULE_SWITCH_LEVELS: u32 = 2;

    /// Score for a correct checkpoint hit, before the effect bonus
    pub const CHECKPOINT_SCORE: u64 = 10;

    /// Crate row spawn chance at level 1
    pub const CRATE_CHANCE_BASE: f64 = 0.12;
    /// Crate chance growth per level
    pub const CRATE_CHANCE_PER_LEVEL: f64 = 0.01;
    /// Crate chance cap
    pub const CRATE_CHANCE_MAX: f64 = 0.25;

    /// Number of concurrent sub-effects sampled by WILD
    pub const WILD_SUB_COUNT: usize = 3;
    /// Bound on distractor resampling before the safe fallback kicks in
    pub const MAX_LANE_ATTEMPTS: u32 = 16;
}
