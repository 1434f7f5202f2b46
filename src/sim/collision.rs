//! Judgment-line evaluation
//!
//! Advances rows along the track, resolves the player's lane choice the
//! tick a row crosses the judgment line, and retires spent rows. The tricky
//! part of Color Conflict is not geometry but fairness: correctness comes
//! straight from the generated row, so no active effect can turn a correct
//! choice into a crash.

use super::state::{GameEvent, GamePhase, GameState, ObstacleType, PowerUpType};
use crate::consts::{CHECKPOINT_SCORE, JUDGMENT_Y, RETIRE_Y};

/// Advance all live rows by `dist` track units
pub fn advance_rows(state: &mut GameState, dist: f32) {
    for row in &mut state.rows {
        row.y += dist;
    }
}

/// Resolve every row that crossed the judgment line during a `dist`-unit
/// advance. At most one row crosses per tick at sane spacings, but the loop
/// stays general.
pub fn judge_rows(state: &mut GameState, dist: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let player_lane = state.player_lane;
    let hit_bonus = state.effect.hit_bonus();

    let mut score_delta: u64 = 0;
    let mut cleared: u32 = 0;
    let mut pickup: Option<PowerUpType> = None;
    let mut crashed = false;

    for row in &mut state.rows {
        let crossed = row.y >= JUDGMENT_Y && row.y - dist < JUDGMENT_Y;
        if !crossed {
            continue;
        }

        // The host reports lanes in the current track's space; clamp to
        // this row's width for ticks spanning a transition zone
        let lane = player_lane.min(row.lane_count().saturating_sub(1));

        match row.kind {
            ObstacleType::Checkpoint => match row.items[lane].as_mut() {
                // is_hit prevents re-evaluation
                Some(item) if item.is_hit => {}
                Some(item) if item.is_correct => {
                    item.is_hit = true;
                    score_delta += CHECKPOINT_SCORE * hit_bonus;
                    cleared += 1;
                }
                _ => crashed = true,
            },
            ObstacleType::Crate => {
                // Crate rows never crash; missing the crate lane just lets
                // the row retire unjudged
                if let Some(item) = row.items[lane].as_mut() {
                    if !item.is_hit {
                        if let Some(effect) = item.effect {
                            item.is_hit = true;
                            pickup = Some(effect);
                        }
                    }
                }
            }
        }
    }

    if score_delta > 0 {
        state.score += score_delta;
        state.rows_cleared += cleared;
        events.push(GameEvent::ScoreAwarded {
            points: score_delta,
        });
    }

    if let Some(effect) = pickup {
        let bonus = effect.pickup_bonus();
        state.score += bonus;
        events.push(GameEvent::ScoreAwarded { points: bonus });

        let mut rng = state.rng_state.event_rng(state.time_ticks);
        state.effect.apply_crate(effect, &mut rng);
        events.push(GameEvent::CratePickedUp { effect });
        log::info!("picked up {} (+{bonus})", effect.label());

        let tracks_progress = !state.config.practice.active && !state.config.tutorial;
        if tracks_progress && !state.is_discovered(effect) {
            state.discovered.push(effect);
            events.push(GameEvent::EffectDiscovered { effect });
        }
    }

    if crashed {
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::Crashed);
        log::info!(
            "crashed at {} ms with score {}",
            state.elapsed_ms(),
            state.score
        );
    }

    events
}

/// Drop rows that are past the retirement line
pub fn retire_rows(state: &mut GameState) {
    state.rows.retain(|row| row.y < RETIRE_Y);
}
