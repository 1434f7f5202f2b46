//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only; presentation randomness is keyed on row/lane identity
//! - Decoration is idempotent and recomputable every frame
//! - No rendering or platform dependencies

pub mod collision;
pub mod effects;
pub mod glitch;
pub mod rules;
pub mod state;
pub mod tick;
pub mod track;

pub use effects::{
    DecoratedLane, DecoratedRow, WarpMode, decorate, render_rows, steering_drift, visibility,
    warp_mode,
};
pub use state::{
    ColorType, EffectState, GameEvent, GamePhase, GameState, LaneItem, ObstacleRow, ObstacleType,
    PowerUpType, Rule, RuleState,
};
pub use tick::{TickInput, tick};
