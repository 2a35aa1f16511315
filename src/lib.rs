//! Loop Substrate - deterministic feedback environment for closed-loop agents
//!
//! Agents act. The field moves. Agents perceive. How much did they cause?
//!
//! # Core Types
//!
//! - **Substrate**: Scalar field with drift, seeded noise and bounded history
//! - **Action**: What an agent submits (emit / nudge / noop)
//! - **Percept**: Owned snapshot an agent receives back
//! - **measure_loop_gain**: [0, 1] score of how much of an action showed up
//!
//! # Architecture: Substrate / Agents / Driver
//!
//! 1. **Substrate** - The environment: one scalar, one clock, one generator
//! 2. **Agents** - Anything that turns percepts into actions (external)
//! 3. **Driver** - The single owner that serializes `apply` and `tick` calls
//!
//! Observers can subscribe for applied / ticked / reset events and for
//! diagnostics when untyped input had to be degraded to a noop.
//!
//! # Core Concepts
//!
//! - **Determinism**: Mulberry32 stream, bit-identical for a given seed
//! - **Ring buffer**: Fixed history capacity, oldest entries auto-evicted
//! - **Graceful degradation**: Malformed actions become noops, never errors
//! - **Loop gain**: `tanh(|Δfield| / magnitude)`, pure and standalone
//!
//! # Example: Measuring Controllability
//!
//! ```rust
//! use loop_substrate::{measure_loop_gain, Action, Substrate, SubstrateConfig};
//!
//! // 1. Create the substrate
//! let config = SubstrateConfig::new(42).with_max_history(4);
//! let mut substrate = Substrate::new(config);
//!
//! // 2. Agent perceives, acts, time advances
//! let before = substrate.perceive(Some("a0"));
//! let action = Action::nudge(0.5);
//! substrate.apply(action.clone(), Some("a0"));
//! substrate.tick();
//! let after = substrate.perceive(Some("a0"));
//!
//! assert_eq!(after.t, 1);
//! assert_eq!(after.field, 0.5);
//!
//! // 3. Score the loop - usable without the substrate
//! let gain = measure_loop_gain(Some(&before), &action, Some(&after));
//! assert!(gain > 0.0 && gain <= 1.0);
//!
//! // 4. Untyped input degrades to a noop
//! substrate.apply_value(&serde_json::json!("jump!"), Some("a1"));
//! assert_eq!(substrate.field(), 0.5);
//! ```
//!
//! # Key Insight
//!
//! The substrate doesn't know what a signal means. It only knows how far the
//! field moved. Controllability is read off the loop, not declared.

mod action;
mod config;
mod gain;
mod history;
mod observer;
mod percept;
mod prng;
mod substrate;

pub use action::{Action, ActionError, Signal};
pub use config::{ConfigError, SignalToDelta, SubstrateConfig, DEFAULT_MAX_HISTORY};
pub use gain::{action_magnitude, measure_loop_gain, LOOP_GAIN_EPSILON};
pub use history::{History, HistoryEntry};
#[cfg(feature = "serde")]
pub use history::HistoryError;
pub use observer::{ChannelObserver, FnObserver, SubstrateEvent, SubstrateObserver};
pub use percept::Percept;
pub use prng::{Mulberry32, MULBERRY_INCREMENT};
pub use substrate::Substrate;
