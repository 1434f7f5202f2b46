//! Rule state machine
//!
//! Which objective is in force (COLOR or WORD), how many lanes the track
//! has, and what "correct" means for a lane. Pure functions of the level
//! index and the practice configuration.

use super::state::{ColorType, LaneItem, Rule};
use crate::consts::{LEVEL_DURATION_TICKS, RULE_SWITCH_LEVELS};
use crate::settings::{PracticeConfig, PracticeMode};

/// Levels are time-driven
pub fn level_for_tick(time_ticks: u64) -> u32 {
    1 + (time_ticks / LEVEL_DURATION_TICKS) as u32
}

/// Active rule for a level. Alternates every [`RULE_SWITCH_LEVELS`] levels
/// starting from COLOR; pinned under COLOR_ONLY/WORD_ONLY practice.
pub fn current_rule(level_index: u32, practice: &PracticeConfig) -> Rule {
    if practice.active {
        match practice.mode {
            PracticeMode::ColorOnly => return Rule::Color,
            PracticeMode::WordOnly => return Rule::Word,
            _ => {}
        }
    }
    if (level_index.saturating_sub(1) / RULE_SWITCH_LEVELS) % 2 == 0 {
        Rule::Color
    } else {
        Rule::Word
    }
}

/// Lane count for a level: every third level (3, 6, 9, ...) runs the 4-lane
/// track, all others run 2 lanes. FOUR_LANES practice pins 4.
pub fn lanes_for_level(level_index: u32, practice: &PracticeConfig) -> usize {
    if practice.active && practice.mode == PracticeMode::FourLanes {
        return 4;
    }
    if level_index % 3 == 0 { 4 } else { 2 }
}

/// Ground-truth correctness of a lane item for the designated target
pub fn compute_correctness(item: &LaneItem, rule: Rule, target: ColorType) -> bool {
    match rule {
        Rule::Color => item.display_color == target,
        Rule::Word => item.word == target,
    }
}
