//! Power-up effect engine
//!
//! Owns the active effect lifecycle and turns raw rows into decorated,
//! render/evaluation-ready rows. Decorations operate on presentation fields
//! only: `is_correct` is copied verbatim from the generated row, never
//! recomputed. Decoration is pure and idempotent, so hosts can recompute it
//! every frame instead of caching.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::glitch;
use super::state::{ColorType, EffectState, GameState, ObstacleRow, ObstacleType, PowerUpType};
use crate::consts::{SIM_DT, SPEED_BOOST_MULT, WILD_SUB_COUNT};

impl EffectState {
    /// Whether `kind` is currently in force, either directly or through WILD
    pub fn is_active(&self, kind: PowerUpType) -> bool {
        self.active == kind
            || (self.active == PowerUpType::Wild && self.wild_effects.contains(&kind))
    }

    /// Replace the active effect with a fresh crate pickup. WILD additionally
    /// samples a subset of the other ten effects to run concurrently for the
    /// same duration.
    pub fn apply_crate(&mut self, kind: PowerUpType, rng: &mut Pcg32) {
        self.active = kind;
        self.remaining_ticks = kind.duration_ticks();
        self.wild_effects.clear();

        if kind == PowerUpType::Wild {
            let mut pool: Vec<PowerUpType> = PowerUpType::EFFECTS
                .iter()
                .copied()
                .filter(|&e| e != PowerUpType::Wild)
                .collect();
            for _ in 0..WILD_SUB_COUNT.min(pool.len()) {
                let idx = rng.random_range(0..pool.len());
                self.wild_effects.push(pool.swap_remove(idx));
            }
            log::info!("wild rolled {:?}", self.wild_effects);
        }

        log::info!(
            "effect applied: {} for {} ticks",
            kind.label(),
            self.remaining_ticks
        );
    }

    /// Advance the effect clock by one tick, reporting the effect that just
    /// expired (if any)
    pub fn tick(&mut self) -> Option<PowerUpType> {
        if self.active == PowerUpType::None {
            return None;
        }
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            let expired = self.active;
            self.active = PowerUpType::None;
            self.wild_effects.clear();
            return Some(expired);
        }
        None
    }

    /// Scroll multiplier; SPEED boosts the track
    pub fn speed_multiplier(&self) -> f32 {
        if self.is_active(PowerUpType::Speed) {
            SPEED_BOOST_MULT
        } else {
            1.0
        }
    }

    /// Score multiplier for checkpoint hits while this effect runs. WILD pays
    /// out the best of its sampled set.
    pub fn hit_bonus(&self) -> u64 {
        match self.active {
            PowerUpType::Wild => self
                .wild_effects
                .iter()
                .copied()
                .map(effect_hit_bonus)
                .max()
                .unwrap_or(1),
            other => effect_hit_bonus(other),
        }
    }
}

/// Per-effect hit score multiplier: harder distortions pay more
fn effect_hit_bonus(kind: PowerUpType) -> u64 {
    match kind {
        PowerUpType::None | PowerUpType::Gps => 1,
        PowerUpType::Speed | PowerUpType::Bleach => 2,
        PowerUpType::Drunk | PowerUpType::Fog | PowerUpType::Blocker | PowerUpType::Alias => 3,
        PowerUpType::Glitch | PowerUpType::Dyslexia => 4,
        PowerUpType::Warp | PowerUpType::Wild => 5,
    }
}

/// WARP sub-variants. Obscured is the challenge form: ghosts stay uniform
/// and the correct lane is never revealed. Guided reveals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarpMode {
    Guided,
    Obscured,
}

/// WARP sub-mode for the session: learning contexts get guidance
pub fn warp_mode(state: &GameState) -> WarpMode {
    if state.config.tutorial || state.config.practice.active {
        WarpMode::Guided
    } else {
        WarpMode::Obscured
    }
}

/// A render/evaluation-ready lane. Everything except `is_correct`,
/// `is_hit`, and `effect` is presentation state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedLane {
    /// Word label, after any active text distortion
    pub text: String,
    pub color: ColorType,
    /// Name of the display color; the ALIAS effect renames it
    pub color_label: &'static str,
    pub is_correct: bool,
    pub effect: Option<PowerUpType>,
    pub is_hit: bool,
    /// BLOCKER occlusion; the lane stays selectable
    pub blocked: bool,
    /// GPS marker on the correct lane
    pub gps_marker: bool,
    /// Practice/tutorial highlight
    pub guided: bool,
    /// BLEACH desaturation overlay
    pub bleached: bool,
    /// WARP ghost rendering
    pub ghost: bool,
    /// Ghost revealed as the correct target (guided WARP only)
    pub revealed: bool,
}

/// A decorated row, safe to hand straight to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedRow {
    pub id: u64,
    pub y: f32,
    pub kind: ObstacleType,
    pub transition_zone_height: f32,
    pub lanes: Vec<Option<DecoratedLane>>,
}

/// Decorate one row for the current effect state.
///
/// Pure: consumers query the active effect *set*, so composing WILD
/// sub-effects is order-independent by construction - text, color labels,
/// occlusion, and markers are disjoint fields.
pub fn decorate(
    row: &ObstacleRow,
    fx: &EffectState,
    warp: WarpMode,
    highlight_guided: bool,
) -> DecoratedRow {
    let item_count = row.lane_count() as u64;
    let warp_active = fx.is_active(PowerUpType::Warp) && row.kind == ObstacleType::Checkpoint;
    // The obscured warp challenge suppresses standard guidance highlights
    let guided_allowed = highlight_guided && !(warp_active && warp == WarpMode::Obscured);

    let lanes = row
        .items
        .iter()
        .enumerate()
        .map(|(lane, slot)| {
            slot.as_ref().map(|item| {
                let seed = glitch::lane_seed(row.id, lane);
                let mut text = item.word_text().to_string();
                if fx.is_active(PowerUpType::Dyslexia) {
                    text = glitch::transpose(&text, seed);
                }
                if fx.is_active(PowerUpType::Glitch) {
                    text = glitch::corrupt(&text, seed);
                }

                let color_label = if fx.is_active(PowerUpType::Alias) {
                    item.display_color.alias()
                } else {
                    item.display_color.word()
                };

                let blocked = row.kind == ObstacleType::Checkpoint
                    && fx.is_active(PowerUpType::Blocker)
                    && (row.id + lane as u64) % item_count == 0;

                DecoratedLane {
                    text,
                    color: item.display_color,
                    color_label,
                    is_correct: item.is_correct,
                    effect: item.effect,
                    is_hit: item.is_hit,
                    blocked,
                    gps_marker: fx.is_active(PowerUpType::Gps) && item.is_correct,
                    guided: guided_allowed && row.is_guided && item.is_correct,
                    bleached: fx.is_active(PowerUpType::Bleach),
                    ghost: warp_active,
                    revealed: warp_active && warp == WarpMode::Guided && item.is_correct,
                }
            })
        })
        .collect();

    DecoratedRow {
        id: row.id,
        y: row.y,
        kind: row.kind,
        transition_zone_height: row.transition_zone_height,
        lanes,
    }
}

/// Decorated view of every live row. Recomputable each frame.
pub fn render_rows(state: &GameState) -> Vec<DecoratedRow> {
    let warp = warp_mode(state);
    let highlight = state.config.practice.active || state.config.tutorial;
    state
        .rows
        .iter()
        .map(|row| decorate(row, &state.effect, warp, highlight))
        .collect()
}

/// Bounded sinusoidal steering drift while DRUNK is active, in lane widths.
/// Input/display distortion only - judgment uses the raw player lane.
pub fn steering_drift(fx: &EffectState, time_ticks: u64) -> f32 {
    if !fx.is_active(PowerUpType::Drunk) {
        return 0.0;
    }
    let t = time_ticks as f32 * SIM_DT;
    (t * 2.1).sin() * 0.35 + (t * 3.7).sin() * 0.15
}

/// Fraction of the track visible ahead of the player; FOG shrinks it
pub fn visibility(fx: &EffectState) -> f32 {
    if fx.is_active(PowerUpType::Fog) { 0.45 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::LaneItem;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn checkpoint_row(id: u64, lanes: usize, correct: usize) -> ObstacleRow {
        let items = (0..lanes)
            .map(|lane| {
                Some(LaneItem {
                    display_color: ColorType::ALL[lane % ColorType::ALL.len()],
                    word: ColorType::ALL[(lane + 3) % ColorType::ALL.len()],
                    is_correct: lane == correct,
                    effect: None,
                    is_hit: false,
                })
            })
            .collect();
        ObstacleRow {
            id,
            y: 10.0,
            kind: ObstacleType::Checkpoint,
            items,
            transition_zone_height: 0.0,
            is_guided: false,
        }
    }

    fn fx_with(active: PowerUpType) -> EffectState {
        EffectState {
            active,
            wild_effects: Vec::new(),
            remaining_ticks: active.duration_ticks(),
        }
    }

    fn correctness_of(row: &DecoratedRow) -> Vec<bool> {
        row.lanes
            .iter()
            .map(|lane| lane.as_ref().is_some_and(|l| l.is_correct))
            .collect()
    }

    #[test]
    fn test_apply_and_expire() {
        let mut fx = EffectState::default();
        let mut rng = Pcg32::seed_from_u64(1);
        fx.apply_crate(PowerUpType::Fog, &mut rng);
        assert_eq!(fx.active, PowerUpType::Fog);
        assert_eq!(fx.remaining_ticks, PowerUpType::Fog.duration_ticks());

        for _ in 0..PowerUpType::Fog.duration_ticks() - 1 {
            assert_eq!(fx.tick(), None);
        }
        assert_eq!(fx.tick(), Some(PowerUpType::Fog));
        assert_eq!(fx.active, PowerUpType::None);
        assert_eq!(fx.tick(), None);
    }

    #[test]
    fn test_pickup_replaces_active_effect() {
        let mut fx = EffectState::default();
        let mut rng = Pcg32::seed_from_u64(2);
        fx.apply_crate(PowerUpType::Glitch, &mut rng);
        fx.apply_crate(PowerUpType::Speed, &mut rng);
        assert_eq!(fx.active, PowerUpType::Speed);
        assert_eq!(fx.remaining_ticks, PowerUpType::Speed.duration_ticks());
        assert!(!fx.is_active(PowerUpType::Glitch));
    }

    #[test]
    fn test_wild_samples_distinct_sub_effects() {
        for seed in 0..32 {
            let mut fx = EffectState::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            fx.apply_crate(PowerUpType::Wild, &mut rng);
            assert_eq!(fx.wild_effects.len(), WILD_SUB_COUNT);
            assert!(!fx.wild_effects.contains(&PowerUpType::Wild));
            assert!(!fx.wild_effects.contains(&PowerUpType::None));
            let mut sorted = fx.wild_effects.clone();
            sorted.sort_by_key(|e| *e as u8);
            sorted.dedup();
            assert_eq!(sorted.len(), WILD_SUB_COUNT, "duplicates in {:?}", fx.wild_effects);
            for sub in &fx.wild_effects {
                assert!(fx.is_active(*sub));
            }
        }
    }

    #[test]
    fn test_speed_multiplier_through_wild() {
        let fx = EffectState {
            active: PowerUpType::Wild,
            wild_effects: vec![PowerUpType::Speed, PowerUpType::Fog, PowerUpType::Gps],
            remaining_ticks: 100,
        };
        assert_eq!(fx.speed_multiplier(), SPEED_BOOST_MULT);
        assert_eq!(fx.hit_bonus(), 3); // best of the set (fog)
    }

    #[test]
    fn test_blocker_marks_exactly_one_lane() {
        for id in 0..20u64 {
            for lanes in [2usize, 4] {
                let row = checkpoint_row(id, lanes, 0);
                let decorated =
                    decorate(&row, &fx_with(PowerUpType::Blocker), WarpMode::Obscured, false);
                let blocked: Vec<usize> = decorated
                    .lanes
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| l.as_ref().is_some_and(|l| l.blocked))
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(blocked.len(), 1, "row {id} lanes {lanes}");
                assert_eq!((id + blocked[0] as u64) % lanes as u64, 0);
            }
        }
    }

    #[test]
    fn test_glitch_text_stable_and_distinct_from_ground_truth() {
        let row = checkpoint_row(11, 4, 2);
        let fx = fx_with(PowerUpType::Glitch);
        let a = decorate(&row, &fx, WarpMode::Obscured, false);
        let b = decorate(&row, &fx, WarpMode::Obscured, false);
        assert_eq!(a, b);
        // Underlying word is untouched
        for (slot, lane) in row.items.iter().zip(a.lanes.iter()) {
            let (item, lane) = (slot.as_ref().unwrap(), lane.as_ref().unwrap());
            assert_eq!(lane.is_correct, item.is_correct);
        }
    }

    #[test]
    fn test_gps_flags_only_correct_lane() {
        let row = checkpoint_row(5, 4, 1);
        let decorated = decorate(&row, &fx_with(PowerUpType::Gps), WarpMode::Obscured, false);
        for (i, lane) in decorated.lanes.iter().enumerate() {
            assert_eq!(lane.as_ref().unwrap().gps_marker, i == 1);
        }
    }

    #[test]
    fn test_alias_renames_color_labels_only() {
        let row = checkpoint_row(5, 2, 0);
        let plain = decorate(&row, &EffectState::default(), WarpMode::Obscured, false);
        let aliased = decorate(&row, &fx_with(PowerUpType::Alias), WarpMode::Obscured, false);
        for (p, a) in plain.lanes.iter().zip(aliased.lanes.iter()) {
            let (p, a) = (p.as_ref().unwrap(), a.as_ref().unwrap());
            assert_ne!(p.color_label, a.color_label);
            assert_eq!(p.text, a.text);
            assert_eq!(p.is_correct, a.is_correct);
        }
    }

    #[test]
    fn test_warp_reveal_gated_on_guidance() {
        let row = checkpoint_row(8, 2, 1);
        let fx = fx_with(PowerUpType::Warp);

        let obscured = decorate(&row, &fx, WarpMode::Obscured, true);
        assert!(obscured.lanes.iter().flatten().all(|l| l.ghost));
        assert!(obscured.lanes.iter().flatten().all(|l| !l.revealed));
        // Practice highlight is suppressed during the obscured challenge
        assert!(obscured.lanes.iter().flatten().all(|l| !l.guided));

        let guided = decorate(&row, &fx, WarpMode::Guided, true);
        let revealed: Vec<bool> = guided
            .lanes
            .iter()
            .map(|l| l.as_ref().unwrap().revealed)
            .collect();
        assert_eq!(revealed, vec![false, true]);
    }

    #[test]
    fn test_wild_composition_commutes() {
        let row = checkpoint_row(13, 4, 3);
        let perm_a = vec![PowerUpType::Glitch, PowerUpType::Blocker, PowerUpType::Bleach];
        let perm_b = vec![PowerUpType::Bleach, PowerUpType::Glitch, PowerUpType::Blocker];
        let fx_a = EffectState {
            active: PowerUpType::Wild,
            wild_effects: perm_a,
            remaining_ticks: 100,
        };
        let fx_b = EffectState {
            active: PowerUpType::Wild,
            wild_effects: perm_b,
            remaining_ticks: 100,
        };
        assert_eq!(
            decorate(&row, &fx_a, WarpMode::Obscured, false),
            decorate(&row, &fx_b, WarpMode::Obscured, false)
        );
    }

    #[test]
    fn test_drift_and_visibility_queries() {
        let none = EffectState::default();
        assert_eq!(steering_drift(&none, 123), 0.0);
        assert_eq!(visibility(&none), 1.0);

        let drunk = fx_with(PowerUpType::Drunk);
        assert!(steering_drift(&drunk, 123).abs() <= 0.5);
        assert!(visibility(&fx_with(PowerUpType::Fog)) < 1.0);
    }

    proptest! {
        /// No decoration, including arbitrary WILD subsets, may change any
        /// lane's correctness versus the undecorated row.
        #[test]
        fn prop_decoration_preserves_correctness(
            id in 0..500u64,
            correct in 0..4usize,
            effect_idx in 0..PowerUpType::EFFECTS.len(),
            wild_mask in 0u16..1024,
        ) {
            let row = checkpoint_row(id, 4, correct);
            let base = correctness_of(&decorate(
                &row,
                &EffectState::default(),
                WarpMode::Obscured,
                false,
            ));

            let active = PowerUpType::EFFECTS[effect_idx];
            let wild_effects = if active == PowerUpType::Wild {
                PowerUpType::EFFECTS
                    .iter()
                    .copied()
                    .filter(|&e| e != PowerUpType::Wild)
                    .enumerate()
                    .filter(|(i, _)| (wild_mask >> i) & 1 == 1)
                    .map(|(_, e)| e)
                    .collect()
            } else {
                Vec::new()
            };
            let fx = EffectState { active, wild_effects, remaining_ticks: 100 };

            for warp in [WarpMode::Guided, WarpMode::Obscured] {
                for highlight in [false, true] {
                    let decorated = correctness_of(&decorate(&row, &fx, warp, highlight));
                    prop_assert_eq!(&decorated, &base);
                }
            }
        }
    }
}
