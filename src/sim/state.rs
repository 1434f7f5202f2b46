//! Game state and core simulation types
//!
//! All state that must be persisted for replay/determinism lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rules;
use crate::consts::SIM_DT;
use crate::settings::SessionConfig;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended on a wrong checkpoint choice
    GameOver,
}

/// The active judgment criterion: match the rendered color, or the written word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    Color,
    Word,
}

/// Target palette. Every color doubles as a word label, which is what makes
/// the Stroop conflict possible in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorType {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    White,
    Black,
}

impl ColorType {
    pub const ALL: [ColorType; 8] = [
        ColorType::Red,
        ColorType::Blue,
        ColorType::Green,
        ColorType::Yellow,
        ColorType::Purple,
        ColorType::Orange,
        ColorType::White,
        ColorType::Black,
    ];

    /// Canonical word label
    pub fn word(self) -> &'static str {
        match self {
            ColorType::Red => "RED",
            ColorType::Blue => "BLUE",
            ColorType::Green => "GREEN",
            ColorType::Yellow => "YELLOW",
            ColorType::Purple => "PURPLE",
            ColorType::Orange => "ORANGE",
            ColorType::White => "WHITE",
            ColorType::Black => "BLACK",
        }
    }

    /// Renamed label used while the ALIAS effect is active
    pub fn alias(self) -> &'static str {
        match self {
            ColorType::Red => "CRIMSON",
            ColorType::Blue => "AZURE",
            ColorType::Green => "JADE",
            ColorType::Yellow => "GOLD",
            ColorType::Purple => "VIOLET",
            ColorType::Orange => "AMBER",
            ColorType::White => "IVORY",
            ColorType::Black => "ONYX",
        }
    }

    /// Light backgrounds need dark text
    pub fn is_light(self) -> bool {
        matches!(self, ColorType::White | ColorType::Yellow)
    }
}

/// Power-up effects granted by crates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerUpType {
    #[default]
    None,
    /// Scroll speed boost
    Speed,
    /// Steering drift
    Drunk,
    /// Reduced visibility radius
    Fog,
    /// Letter transposition in displayed words
    Dyslexia,
    /// Guidance marker on the correct lane
    Gps,
    /// One lane per row visually obstructed
    Blocker,
    /// Composite: several other effects at once
    Wild,
    /// Corrupted word text
    Glitch,
    /// Color desaturation overlay
    Bleach,
    /// Renamed color labels
    Alias,
    /// Ghost targets; correct lane revealed only under guidance
    Warp,
}

impl PowerUpType {
    /// The eleven real effects, i.e. everything a crate can grant
    pub const EFFECTS: [PowerUpType; 11] = [
        PowerUpType::Speed,
        PowerUpType::Drunk,
        PowerUpType::Fog,
        PowerUpType::Dyslexia,
        PowerUpType::Gps,
        PowerUpType::Blocker,
        PowerUpType::Wild,
        PowerUpType::Glitch,
        PowerUpType::Bleach,
        PowerUpType::Alias,
        PowerUpType::Warp,
    ];

    /// Crate face label
    pub fn label(self) -> &'static str {
        match self {
            PowerUpType::None => "NONE",
            PowerUpType::Speed => "SPEED",
            PowerUpType::Drunk => "DRUNK",
            PowerUpType::Fog => "STORM",
            PowerUpType::Dyslexia => "SWAP",
            PowerUpType::Gps => "GPS",
            PowerUpType::Blocker => "BLOCK",
            PowerUpType::Wild => "WILD",
            PowerUpType::Glitch => "GLITCH",
            PowerUpType::Bleach => "BLEACH",
            PowerUpType::Alias => "ALIAS",
            PowerUpType::Warp => "WARP",
        }
    }

    /// Fixed effect lifetime in ticks
    pub fn duration_ticks(self) -> u32 {
        match self {
            PowerUpType::None => 0,
            PowerUpType::Speed => 6 * 60,
            PowerUpType::Wild => 8 * 60,
            _ => 5 * 60,
        }
    }

    /// Fixed score awarded for picking up this crate, independent of hit
    /// correctness. Harder effects pay more.
    pub fn pickup_bonus(self) -> u64 {
        match self {
            PowerUpType::None => 0,
            PowerUpType::Gps => 100,
            PowerUpType::Speed | PowerUpType::Bleach => 150,
            PowerUpType::Blocker | PowerUpType::Alias => 200,
            PowerUpType::Drunk | PowerUpType::Fog => 250,
            PowerUpType::Glitch | PowerUpType::Dyslexia => 300,
            PowerUpType::Warp => 400,
            PowerUpType::Wild => 500,
        }
    }
}

/// Row kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleType {
    /// Poses a judgment: one lane is correct, the rest crash
    Checkpoint,
    /// Grants a power-up on pickup; never crashes the player
    Crate,
}

/// One lane slot of a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneItem {
    /// Rendered circle color
    pub display_color: ColorType,
    /// The color word written on the target
    pub word: ColorType,
    /// Ground truth, assigned at generation time for the rule then in force.
    /// Decorations never touch this.
    pub is_correct: bool,
    /// Power-up type, present only on crate rows
    pub effect: Option<PowerUpType>,
    /// Set once the player's action has resolved this lane
    pub is_hit: bool,
}

impl LaneItem {
    /// Word label string
    pub fn word_text(&self) -> &'static str {
        self.word.word()
    }
}

/// One spawn unit of lanes advancing along the track, judged once at the line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRow {
    /// Monotonic, never reused; doubles as the corruption/blocker seed
    pub id: u64,
    /// Track progress: 0 at spawn, grows toward the player
    pub y: f32,
    pub kind: ObstacleType,
    /// Length 2 or 4; `None` marks an empty lane (crate rows)
    pub items: Vec<Option<LaneItem>>,
    /// Positive when the lane count changed versus the previous row
    pub transition_zone_height: f32,
    /// Eligible for practice-mode highlighting
    pub is_guided: bool,
}

impl ObstacleRow {
    pub fn lane_count(&self) -> usize {
        self.items.len()
    }

    /// Index of the unique correct lane (checkpoint rows)
    pub fn correct_lane(&self) -> Option<usize> {
        self.items
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|item| item.is_correct))
    }

    /// Index of the crate lane (crate rows)
    pub fn crate_lane(&self) -> Option<usize> {
        self.items
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|item| item.effect.is_some()))
    }

    /// Effect carried by this row's crate, if any
    pub fn crate_effect(&self) -> Option<PowerUpType> {
        self.items
            .iter()
            .flatten()
            .find_map(|item| item.effect)
    }
}

/// Active power-up effect (or none)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectState {
    pub active: PowerUpType,
    /// Sub-effects running concurrently; non-empty only while `active == Wild`
    pub wild_effects: Vec<PowerUpType>,
    pub remaining_ticks: u32,
}

/// Rule state machine snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleState {
    pub current: Rule,
    /// 1-based; drives rule cadence, lane-count alternation, and difficulty
    pub level_index: u32,
}

/// Events emitted by a tick for the host layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreAwarded { points: u64 },
    CratePickedUp { effect: PowerUpType },
    /// First-ever encounter of an effect type (non-practice, non-tutorial)
    EffectDiscovered { effect: PowerUpType },
    EffectExpired { effect: PowerUpType },
    LevelUp { level: u32 },
    RuleSwitched { rule: Rule },
    Crashed,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Per-row generator: stable for a given row id, decorrelated across rows
    pub fn row_rng(&self, row_id: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ row_id.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Per-tick generator for one-shot rolls (WILD subset sampling)
    pub fn event_rng(&self, tick: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ tick.wrapping_mul(0xD134_2543_DE82_EF95))
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state
    pub rng_state: RngState,
    /// Active rule and level
    pub rule: RuleState,
    /// Monotonic non-decreasing score
    pub score: u64,
    /// Checkpoint rows cleared
    pub rows_cleared: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Lane the player currently occupies
    pub player_lane: usize,
    /// Live rows; older rows sit at larger y, closer to the judgment line
    pub rows: Vec<ObstacleRow>,
    /// Active power-up effect, owned exclusively by the effect engine
    pub effect: EffectState,
    /// Immutable session configuration
    pub config: SessionConfig,
    /// Effect types already encountered (host history plus this session)
    pub discovered: Vec<PowerUpType>,
    /// Track distance until the next row spawns
    pub next_spawn_in: f32,
    /// Lane count of the most recently spawned row
    pub last_lane_count: usize,
    /// Next row ID
    next_row_id: u64,
}

impl GameState {
    /// Create a fresh session. Restart and quit both discard the old state
    /// and call this again.
    pub fn new(seed: u64, config: SessionConfig) -> Self {
        let level_index = 1;
        let rule = rules::current_rule(level_index, &config.practice);
        let lanes = rules::lanes_for_level(level_index, &config.practice);
        let discovered = config.already_discovered.clone();

        log::info!(
            "new session: seed={seed} practice={:?} tutorial={}",
            config.practice.mode,
            config.tutorial
        );

        Self {
            seed,
            rng_state: RngState::new(seed),
            rule: RuleState {
                current: rule,
                level_index,
            },
            score: 0,
            rows_cleared: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            player_lane: 0,
            rows: Vec::new(),
            effect: EffectState::default(),
            config,
            discovered,
            next_spawn_in: 0.0,
            last_lane_count: lanes,
            next_row_id: 1,
        }
    }

    /// Allocate a new row ID
    pub(crate) fn alloc_row_id(&mut self) -> u64 {
        let id = self.next_row_id;
        self.next_row_id += 1;
        id
    }

    /// Wall-clock progress of the run
    pub fn elapsed_ms(&self) -> u64 {
        (self.time_ticks as f64 * SIM_DT as f64 * 1000.0) as u64
    }

    pub fn is_discovered(&self, kind: PowerUpType) -> bool {
        self.discovered.contains(&kind)
    }
}
