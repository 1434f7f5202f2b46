//! Obstacle row generation
//!
//! Produces the stream of checkpoint and crate rows: difficulty-scaled
//! spacing, the 2/4-lane track alternation, crate interleaving gated by the
//! host's toggles, and the practice-mode constraints. Every row is built
//! from a generator seeded by the run seed and the row id, so a given
//! session replays identically.

use rand::Rng;
use rand_pcg::Pcg32;

use super::rules;
use super::state::{ColorType, GameState, LaneItem, ObstacleRow, ObstacleType, PowerUpType, Rule};
use crate::consts::{
    BASE_ROW_SPACING, CRATE_CHANCE_BASE, CRATE_CHANCE_MAX, CRATE_CHANCE_PER_LEVEL,
    MAX_LANE_ATTEMPTS, MIN_ROW_SPACING, SPACING_STEP, TRANSITION_ZONE_HEIGHT,
};
use crate::settings::{PracticeConfig, PracticeMode};

/// Inter-row spacing for a level, floored so the track stays solvable at
/// any speed multiplier
pub fn row_spacing(level_index: u32) -> f32 {
    (BASE_ROW_SPACING - SPACING_STEP * level_index.saturating_sub(1) as f32).max(MIN_ROW_SPACING)
}

/// Crate row probability for a level. Rule-pinned practice runs never
/// spawn crates.
pub fn crate_chance(level_index: u32, practice: &PracticeConfig) -> f64 {
    if practice.active
        && matches!(practice.mode, PracticeMode::ColorOnly | PracticeMode::WordOnly)
    {
        return 0.0;
    }
    (CRATE_CHANCE_BASE + CRATE_CHANCE_PER_LEVEL * f64::from(level_index)).min(CRATE_CHANCE_MAX)
}

/// Spawn rows as the track scrolls by `dist` units
pub fn advance_spawner(state: &mut GameState, dist: f32) {
    state.next_spawn_in -= dist;
    while state.next_spawn_in <= 0.0 {
        let row = next_row(state);
        state.next_spawn_in += row_spacing(state.rule.level_index) + row.transition_zone_height;
        state.rows.push(row);
    }
}

/// Generate the next row for the current level, rule, and session config
pub fn next_row(state: &mut GameState) -> ObstacleRow {
    let practice = state.config.practice;
    let level = state.rule.level_index;
    let rule = state.rule.current;
    let lanes = rules::lanes_for_level(level, &practice);
    let id = state.alloc_row_id();
    let mut rng = state.rng_state.row_rng(id);

    let crate_effect = if rng.random_bool(crate_chance(level, &practice)) {
        pick_crate_effect(state, &mut rng)
    } else {
        None
    };

    let (kind, items) = match crate_effect {
        Some(effect) => (
            ObstacleType::Crate,
            build_crate_items(lanes, effect, &mut rng),
        ),
        // Empty crate pool degrades to a checkpoint instead of failing
        None => (
            ObstacleType::Checkpoint,
            build_checkpoint_items(lanes, rule, &mut rng),
        ),
    };

    let transition_zone_height = if lanes != state.last_lane_count {
        TRANSITION_ZONE_HEIGHT
    } else {
        0.0
    };
    state.last_lane_count = lanes;

    let is_guided = kind == ObstacleType::Checkpoint
        && (practice.active || state.config.tutorial);

    log::debug!("spawned row {id}: {kind:?} lanes={lanes} rule={rule:?}");

    ObstacleRow {
        id,
        y: 0.0,
        kind,
        items,
        transition_zone_height,
        is_guided,
    }
}

/// Crate type for a new crate row: the selected type under SINGLE_CRATE
/// practice, otherwise a uniform draw from the enabled pool
fn pick_crate_effect(state: &GameState, rng: &mut Pcg32) -> Option<PowerUpType> {
    let practice = state.config.practice;
    if practice.active && practice.mode == PracticeMode::SingleCrate {
        return practice
            .selected_crate
            .filter(|&kind| kind != PowerUpType::None);
    }

    let pool: Vec<PowerUpType> = PowerUpType::EFFECTS
        .iter()
        .copied()
        .filter(|&kind| state.config.crate_toggles.enabled(kind))
        .collect();
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.random_range(0..pool.len())])
}

/// One crate slot in a seeded lane, the rest empty
fn build_crate_items(lanes: usize, effect: PowerUpType, rng: &mut Pcg32) -> Vec<Option<LaneItem>> {
    let crate_lane = rng.random_range(0..lanes);
    (0..lanes)
        .map(|lane| {
            (lane == crate_lane).then(|| LaneItem {
                display_color: ColorType::White,
                word: ColorType::White,
                is_correct: false,
                effect: Some(effect),
                is_hit: false,
            })
        })
        .collect()
}

/// Fill a checkpoint row: one designated target lane, distractors whose
/// governed dimension is guaranteed to diverge from the target
fn build_checkpoint_items(lanes: usize, rule: Rule, rng: &mut Pcg32) -> Vec<Option<LaneItem>> {
    let target_lane = rng.random_range(0..lanes);
    let target = random_color(rng);

    (0..lanes)
        .map(|lane| {
            let item = if lane == target_lane {
                // The non-governed dimension stays free so the usual Stroop
                // conflict (word != ink) can appear on the target too
                match rule {
                    Rule::Color => LaneItem {
                        display_color: target,
                        word: random_color(rng),
                        is_correct: true,
                        effect: None,
                        is_hit: false,
                    },
                    Rule::Word => LaneItem {
                        display_color: random_color(rng),
                        word: target,
                        is_correct: true,
                        effect: None,
                        is_hit: false,
                    },
                }
            } else {
                let diverged = diverging_color(target, rng);
                match rule {
                    Rule::Color => LaneItem {
                        display_color: diverged,
                        word: random_color(rng),
                        is_correct: false,
                        effect: None,
                        is_hit: false,
                    },
                    Rule::Word => LaneItem {
                        display_color: random_color(rng),
                        word: diverged,
                        is_correct: false,
                        effect: None,
                        is_hit: false,
                    },
                }
            };
            Some(item)
        })
        .collect()
}

fn random_color(rng: &mut Pcg32) -> ColorType {
    ColorType::ALL[rng.random_range(0..ColorType::ALL.len())]
}

/// Sample a color different from `target`. If sampling keeps colliding the
/// fallback walks the palette, which always diverges - a row can never end
/// up with a second correct lane.
fn diverging_color(target: ColorType, rng: &mut Pcg32) -> ColorType {
    for _ in 0..MAX_LANE_ATTEMPTS {
        let candidate = random_color(rng);
        if candidate != target {
            return candidate;
        }
    }
    log::warn!("distractor resampling exhausted, forcing divergence");
    let idx = ColorType::ALL
        .iter()
        .position(|&c| c == target)
        .unwrap_or(0);
    ColorType::ALL[(idx + 1) % ColorType::ALL.len()]
}
