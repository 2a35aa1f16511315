//! Loop gain - how much of an action shows up in what the agent perceives next
//!
//! Pure functions over two percepts and the action taken between them. No
//! substrate state is read, so callers holding old percepts can score them
//! after the fact.

use crate::action::Action;
use crate::percept::Percept;

/// Added to the magnitude so a zero-size action never divides by zero.
pub const LOOP_GAIN_EPSILON: f64 = 1e-9;

/// Nominal size of an action: `|amount|`, else `|delta|`, else 1.
pub fn action_magnitude(action: &Action) -> f64 {
    action
        .amount()
        .or_else(|| action.delta())
        .map(f64::abs)
        .unwrap_or(1.0)
}

/// Normalized [0, 1] loop gain between `prev` and `next`.
///
/// 0 when either percept is missing or the field did not move. Grows
/// monotonically with the field change for a fixed action magnitude and
/// saturates toward 1.
pub fn measure_loop_gain(prev: Option<&Percept>, action: &Action, next: Option<&Percept>) -> f64 {
    let (Some(prev), Some(next)) = (prev, next) else {
        return 0.0;
    };

    let raw_effect = (field_or_zero(next.field) - field_or_zero(prev.field)).abs();
    let ratio = raw_effect / (action_magnitude(action) + LOOP_GAIN_EPSILON);
    let gain = ratio.tanh();
    if gain.is_nan() {
        return 0.0;
    }
    gain.clamp(0.0, 1.0)
}

#[inline]
fn field_or_zero(field: f64) -> f64 {
    if field.is_nan() {
        0.0
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(field: f64) -> Percept {
        Percept {
            agent_id: Some("a0".into()),
            t: 0,
            field,
            last_signal: None,
            last_signal_from: None,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_magnitude_rules() {
        assert_eq!(action_magnitude(&Action::nudge(-2.0)), 2.0);
        assert_eq!(action_magnitude(&Action::emit_with_delta(1, -0.25)), 0.25);
        assert_eq!(action_magnitude(&Action::emit(7)), 1.0);
        assert_eq!(action_magnitude(&Action::Nudge { amount: None }), 1.0);
        assert_eq!(action_magnitude(&Action::Noop), 1.0);
    }

    #[test]
    fn test_missing_percepts() {
        let p = at(1.0);
        let action = Action::nudge(1.0);
        assert_eq!(measure_loop_gain(None, &action, Some(&p)), 0.0);
        assert_eq!(measure_loop_gain(Some(&p), &action, None), 0.0);
        assert_eq!(measure_loop_gain(None, &action, None), 0.0);
    }

    #[test]
    fn test_no_effect_is_zero() {
        let p = at(3.5);
        assert_eq!(measure_loop_gain(Some(&p), &Action::nudge(1.0), Some(&p)), 0.0);
        assert_eq!(measure_loop_gain(Some(&p), &Action::Noop, Some(&at(3.5))), 0.0);
    }

    #[test]
    fn test_exact_value() {
        // |1.0 - 0.0| / (1.0 + eps) ~= 1, tanh(1) ~= 0.7616
        let g = measure_loop_gain(Some(&at(0.0)), &Action::nudge(1.0), Some(&at(1.0)));
        assert!((g - 1.0f64.tanh()).abs() < 1e-8);

        // Direction of the change does not matter
        let down = measure_loop_gain(Some(&at(1.0)), &Action::nudge(1.0), Some(&at(0.0)));
        assert_eq!(g, down);
    }

    #[test]
    fn test_bounds_and_saturation() {
        let action = Action::nudge(1e-12);
        let g = measure_loop_gain(Some(&at(0.0)), &action, Some(&at(1e6)));
        assert!(g <= 1.0);
        assert!(g > 0.999);

        let g = measure_loop_gain(Some(&at(0.0)), &Action::nudge(0.0), Some(&at(f64::INFINITY)));
        assert_eq!(g, 1.0);
    }

    #[test]
    fn test_monotonic_in_effect() {
        let action = Action::nudge(2.0);
        let prev = at(0.0);
        let mut last = 0.0;
        for step in 0..50 {
            let next = at(step as f64 * 0.1);
            let g = measure_loop_gain(Some(&prev), &action, Some(&next));
            assert!((0.0..=1.0).contains(&g));
            assert!(g >= last);
            last = g;
        }
    }

    #[test]
    fn test_nan_field_treated_as_zero() {
        let g = measure_loop_gain(Some(&at(f64::NAN)), &Action::nudge(1.0), Some(&at(0.0)));
        assert_eq!(g, 0.0);

        let g = measure_loop_gain(Some(&at(f64::NAN)), &Action::nudge(1.0), Some(&at(1.0)));
        assert!(g > 0.0);
    }
}
