//! Agent actions and the coercion boundary for untyped input
//!
//! Every action an agent can submit is one of three kinds. Anything else that
//! arrives from outside (wrong shape, unknown kind, not an object) is treated
//! as [`Action::Noop`]. That policy lives in [`Action::from_value`] and nowhere
//! else.

use serde_json::{json, Value};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque communicated value: a number, a structured object, or null.
pub type Signal = Value;

/// Why raw input could not be parsed as an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action is not an object")]
    NotAnObject,

    #[error("action has no string `type` field")]
    MissingKind,

    #[error("unknown action type `{0}`")]
    UnknownKind(String),
}

/// An action submitted to the substrate.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Action {
    /// Communicate a signal. The field moves by `delta` if given, otherwise
    /// by whatever the substrate derives from the signal.
    Emit {
        #[cfg_attr(feature = "serde", serde(default))]
        signal: Signal,
        #[cfg_attr(feature = "serde", serde(default))]
        delta: Option<f64>,
    },
    /// Push the field directly. A missing amount moves it by 0.
    Nudge {
        #[cfg_attr(feature = "serde", serde(default))]
        amount: Option<f64>,
    },
    /// Do nothing.
    #[default]
    Noop,
}

impl Action {
    /// Emit a signal with no explicit delta.
    pub fn emit(signal: impl Into<Signal>) -> Self {
        Action::Emit {
            signal: signal.into(),
            delta: None,
        }
    }

    /// Emit a signal with an explicit field delta.
    pub fn emit_with_delta(signal: impl Into<Signal>, delta: f64) -> Self {
        Action::Emit {
            signal: signal.into(),
            delta: Some(delta),
        }
    }

    pub fn nudge(amount: f64) -> Self {
        Action::Nudge {
            amount: Some(amount),
        }
    }

    /// Strict parse of the external shape
    /// `{"type": "emit"|"nudge"|"noop", "signal": .., "delta": n, "amount": n}`.
    ///
    /// Non-numeric `delta`/`amount` are treated as absent, not as errors.
    pub fn try_from_value(value: &Value) -> Result<Self, ActionError> {
        let obj = value.as_object().ok_or(ActionError::NotAnObject)?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ActionError::MissingKind)?;

        match kind {
            "emit" => Ok(Action::Emit {
                signal: obj.get("signal").cloned().unwrap_or(Value::Null),
                delta: obj.get("delta").and_then(Value::as_f64),
            }),
            "nudge" => Ok(Action::Nudge {
                amount: obj.get("amount").and_then(Value::as_f64),
            }),
            "noop" => Ok(Action::Noop),
            other => Err(ActionError::UnknownKind(other.to_string())),
        }
    }

    /// Lenient parse: malformed input becomes [`Action::Noop`].
    pub fn from_value(value: &Value) -> Self {
        Self::try_from_value(value).unwrap_or(Action::Noop)
    }

    /// Kind name as it appears in the external shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Emit { .. } => "emit",
            Action::Nudge { .. } => "nudge",
            Action::Noop => "noop",
        }
    }

    /// Declared nudge amount, if any.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Action::Nudge { amount } => *amount,
            _ => None,
        }
    }

    /// Declared emit delta, if any.
    pub fn delta(&self) -> Option<f64> {
        match self {
            Action::Emit { delta, .. } => *delta,
            _ => None,
        }
    }
}

impl From<&Value> for Action {
    fn from(value: &Value) -> Self {
        Action::from_value(value)
    }
}

/// History marker recorded for a nudge.
pub(crate) fn nudge_marker(amount: f64) -> Signal {
    json!({ "nudge": amount })
}

/// History marker recorded for a noop.
pub(crate) fn noop_marker() -> Signal {
    json!({ "noop": true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            Action::from_value(&json!({"type": "nudge", "amount": 0.5})),
            Action::nudge(0.5)
        );
        assert_eq!(
            Action::from_value(&json!({"type": "emit", "signal": 3})),
            Action::emit(3)
        );
        assert_eq!(
            Action::from_value(&json!({"type": "emit", "signal": "hi", "delta": -1.0})),
            Action::emit_with_delta("hi", -1.0)
        );
        assert_eq!(Action::from_value(&json!({"type": "noop"})), Action::Noop);
    }

    #[test]
    fn test_missing_fields_default() {
        assert_eq!(
            Action::from_value(&json!({"type": "emit"})),
            Action::Emit {
                signal: Value::Null,
                delta: None
            }
        );
        assert_eq!(
            Action::from_value(&json!({"type": "nudge", "amount": "lots"})),
            Action::Nudge { amount: None }
        );
        assert_eq!(
            Action::from_value(&json!({"type": "emit", "signal": 1, "delta": "x"})).delta(),
            None
        );
    }

    #[test]
    fn test_malformed_becomes_noop() {
        for raw in [
            Value::Null,
            json!(5),
            json!("nudge"),
            json!([1, 2]),
            json!({}),
            json!({"type": 3}),
            json!({"type": "teleport", "amount": 9}),
        ] {
            assert_eq!(Action::from_value(&raw), Action::Noop, "input {raw}");
        }
    }

    #[test]
    fn test_strict_errors() {
        assert_eq!(
            Action::try_from_value(&json!(1)),
            Err(ActionError::NotAnObject)
        );
        assert_eq!(
            Action::try_from_value(&json!({"amount": 1})),
            Err(ActionError::MissingKind)
        );
        assert_eq!(
            Action::try_from_value(&json!({"type": "jump"})),
            Err(ActionError::UnknownKind("jump".into()))
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Action::nudge(-2.0).amount(), Some(-2.0));
        assert_eq!(Action::nudge(-2.0).delta(), None);
        assert_eq!(Action::emit_with_delta(1, 0.25).delta(), Some(0.25));
        assert_eq!(Action::Noop.kind(), "noop");
        assert_eq!(Action::default(), Action::Noop);
    }

    #[test]
    fn test_markers() {
        assert_eq!(nudge_marker(0.5), json!({"nudge": 0.5}));
        assert_eq!(noop_marker(), json!({"noop": true}));
    }
}
