//! Adaptive mutation-rate control.
//!
//! Exploration/exploitation hysteresis: stagnation pushes the rate up in
//! fixed steps towards the ceiling, progress pulls it back down (typically
//! in smaller steps) towards the base rate.

use crate::schema::{FitnessHistory, MutationSchedule};

/// The next mutation rate given the mean-fitness improvement over the
/// trailing stagnation window.
pub fn adapted_rate(current: f32, improvement: f32, schedule: &MutationSchedule) -> f32 {
    if improvement <= schedule.epsilon {
        (current + schedule.increase_step).min(schedule.max_rate)
    } else {
        (current - schedule.decrease_step).max(schedule.base_rate)
    }
}

/// Adjust the rate from the recorded history, or keep it unchanged while
/// fewer than `stagnation_window + 1` generations have been recorded.
pub fn update_rate(current: f32, history: &FitnessHistory, schedule: &MutationSchedule) -> f32 {
    let (Some(latest), Some(earlier)) = (
        history.latest_mean(),
        history.mean_before(schedule.stagnation_window),
    ) else {
        return current;
    };
    adapted_rate(current, latest - earlier, schedule)
}
