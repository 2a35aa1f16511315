//! Substrate - the feedback environment state machine

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::action::{noop_marker, nudge_marker, Action, Signal};
use crate::config::{ConfigError, SubstrateConfig};
use crate::gain;
use crate::history::{History, HistoryEntry};
use crate::observer::{SubstrateEvent, SubstrateObserver};
use crate::percept::Percept;
use crate::prng::Mulberry32;

/// The feedback substrate.
///
/// A single scalar field that agents push on through actions and that drifts
/// and jitters on every tick. Everything stochastic comes from one seeded
/// generator, so identical call sequences give bit-identical trajectories.
///
/// Single owner: mutating operations take `&mut self` and run to completion.
#[derive(Clone)]
pub struct Substrate {
    /// Configuration.
    config: SubstrateConfig,

    /// Total ticks elapsed.
    t: u64,

    /// The observable scalar.
    field: f64,

    /// Most recent applied actions, bounded by `max_history`.
    history: History,

    /// Last action per agent. Grows with the number of distinct agents, not
    /// with time.
    last_action_by_agent: HashMap<Option<String>, Action>,

    rng: Mulberry32,

    /// Subscribed observers.
    observers: Vec<Arc<dyn SubstrateObserver>>,
}

impl Substrate {
    /// Create a new substrate with the given configuration.
    pub fn new(config: SubstrateConfig) -> Self {
        Self {
            t: 0,
            field: config.field_init,
            history: History::new(config.max_history),
            last_action_by_agent: HashMap::new(),
            rng: Mulberry32::new(config.seed_u32()),
            observers: Vec::new(),
            config,
        }
    }

    /// Create a substrate after validating the configuration.
    pub fn try_new(config: SubstrateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // =========================================================================
    // PERCEPTION
    // =========================================================================

    /// Snapshot current state for `agent_id`.
    ///
    /// Pure read: no PRNG draw, no mutation.
    pub fn perceive(&self, agent_id: Option<&str>) -> Percept {
        let last = self.history.latest();
        Percept {
            agent_id: agent_id.map(str::to_owned),
            t: self.t,
            field: self.field,
            last_signal: last.map(|e| e.signal.clone()).filter(|s| !s.is_null()),
            last_signal_from: last.and_then(|e| e.agent_id.clone()),
            history: self.history.signals(),
        }
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Apply an action on behalf of `agent_id`.
    ///
    /// The history entry is tagged with the current (not yet incremented)
    /// tick. Does not draw from the PRNG.
    pub fn apply(&mut self, action: Action, agent_id: Option<&str>) {
        let agent = agent_id.map(str::to_owned);
        let kind = action.kind();
        let (signal, delta) = self.resolve(&action);

        self.last_action_by_agent.insert(agent.clone(), action);
        self.field += delta;

        let t = self.t;
        let evicted = self
            .history
            .push(HistoryEntry {
                agent_id: agent.clone(),
                signal,
                delta,
                t,
            })
            .is_some();

        debug!(agent = ?agent, kind, delta, t, field = self.field, evicted, "applied action");
        self.notify(SubstrateEvent::Applied {
            agent_id: agent,
            t,
            delta,
            evicted,
        });
    }

    /// Apply untyped input, degrading anything malformed to a noop.
    ///
    /// Malformed input is reported through `warn!` and an
    /// [`SubstrateEvent::ActionCoerced`] event; the state change is exactly
    /// that of a noop.
    pub fn apply_value(&mut self, raw: &Value, agent_id: Option<&str>) {
        let action = match Action::try_from_value(raw) {
            Ok(action) => action,
            Err(err) => {
                warn!(agent = ?agent_id, error = %err, "malformed action treated as noop");
                self.notify(SubstrateEvent::ActionCoerced {
                    agent_id: agent_id.map(str::to_owned),
                    reason: err.to_string(),
                });
                Action::Noop
            }
        };
        self.apply(action, agent_id);
    }

    /// Recorded signal and field delta for an action.
    fn resolve(&self, action: &Action) -> (Signal, f64) {
        match action {
            Action::Emit { signal, delta } => {
                let delta = match (delta, &self.config.signal_to_delta) {
                    (Some(delta), _) => *delta,
                    (None, Some(hook)) => hook.call(signal),
                    (None, None) => signal.as_f64().unwrap_or(0.0),
                };
                (signal.clone(), delta)
            }
            Action::Nudge { amount } => {
                let amount = amount.unwrap_or(0.0);
                (nudge_marker(amount), amount)
            }
            Action::Noop => (noop_marker(), 0.0),
        }
    }

    // =========================================================================
    // TIME ADVANCEMENT
    // =========================================================================

    /// Advance time by one tick: drift plus one draw of noise, then `t += 1`.
    pub fn tick(&mut self) {
        let drift = self.config.drift_per_tick;
        let noise = self.rng.next_signed() * self.config.noise_level;
        self.field += drift + noise;
        self.t += 1;

        trace!(t = self.t, drift, noise, field = self.field, "tick");
        self.notify(SubstrateEvent::Ticked {
            t: self.t,
            drift,
            noise,
            field: self.field,
        });
    }

    /// Advance multiple ticks.
    pub fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    // =========================================================================
    // MEASUREMENT
    // =========================================================================

    /// Loop gain between two percepts around `action`.
    ///
    /// Reads no substrate state; see [`gain::measure_loop_gain`].
    pub fn measure_loop_gain(
        &self,
        prev: Option<&Percept>,
        action: &Action,
        next: Option<&Percept>,
    ) -> f64 {
        gain::measure_loop_gain(prev, action, next)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Return to construction state and reseed the generator.
    ///
    /// Observers stay subscribed.
    pub fn reset(&mut self) {
        self.t = 0;
        self.field = self.config.field_init;
        self.history.clear();
        self.last_action_by_agent.clear();
        self.rng = Mulberry32::new(self.config.seed_u32());

        debug!(seed = self.config.seed, field = self.field, "substrate reset");
        self.notify(SubstrateEvent::Reset);
    }

    /// Subscribe an observer to substrate events.
    pub fn subscribe(&mut self, observer: Arc<dyn SubstrateObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, event: SubstrateEvent) {
        if let Some((last, rest)) = self.observers.split_last() {
            for observer in rest {
                observer.on_event(event.clone());
            }
            last.on_event(event);
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Get configuration.
    pub fn config(&self) -> &SubstrateConfig {
        &self.config
    }

    /// Get current tick.
    pub fn t(&self) -> u64 {
        self.t
    }

    /// Get current field value.
    pub fn field(&self) -> f64 {
        self.field
    }

    /// Retained history entries.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Most recent action submitted by `agent_id`.
    pub fn last_action(&self, agent_id: Option<&str>) -> Option<&Action> {
        self.last_action_by_agent.get(&agent_id.map(str::to_owned))
    }

    /// Number of distinct agents that have acted since construction or reset.
    pub fn agent_count(&self) -> usize {
        self.last_action_by_agent.len()
    }
}

impl fmt::Debug for Substrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substrate")
            .field("config", &self.config)
            .field("t", &self.t)
            .field("field", &self.field)
            .field("history", &self.history)
            .field("agents", &self.last_action_by_agent.len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
