//! Observer pattern for substrates - pub/sub of state transitions
//!
//! Observers are notified synchronously, in subscription order, after each
//! state change has been committed. They see the substrate; they never steer
//! it, so subscribing has no effect on trajectories.
//!
//! `ActionCoerced` is the diagnostics channel: it fires when untyped input
//! handed to `Substrate::apply_value` was malformed and degraded to a noop.

/// Event emitted when substrate state changes.
#[derive(Clone, Debug, PartialEq)]
pub enum SubstrateEvent {
    /// An action was applied to the field.
    Applied {
        agent_id: Option<String>,
        /// Tick the action was recorded under
        t: u64,
        delta: f64,
        /// Whether the oldest history entry was dropped to make room
        evicted: bool,
    },
    /// Time advanced by one step.
    Ticked {
        /// Tick after the increment
        t: u64,
        drift: f64,
        noise: f64,
        /// Field after drift and noise
        field: f64,
    },
    /// Raw input could not be parsed and was treated as a noop.
    ActionCoerced {
        agent_id: Option<String>,
        reason: String,
    },
    /// State returned to construction defaults.
    Reset,
}

/// Observer that receives substrate events
pub trait SubstrateObserver: Send + Sync {
    /// Called when a substrate event occurs
    fn on_event(&self, event: SubstrateEvent);
}

/// Function-based observer for simple cases
pub struct FnObserver<F: Fn(SubstrateEvent) + Send + Sync>(pub F);

impl<F: Fn(SubstrateEvent) + Send + Sync> SubstrateObserver for FnObserver<F> {
    fn on_event(&self, event: SubstrateEvent) {
        (self.0)(event);
    }
}

/// Channel-based observer - sends events to a channel
pub struct ChannelObserver {
    sender: std::sync::mpsc::Sender<SubstrateEvent>,
}

impl ChannelObserver {
    pub fn new(sender: std::sync::mpsc::Sender<SubstrateEvent>) -> Self {
        Self { sender }
    }
}

impl SubstrateObserver for ChannelObserver {
    fn on_event(&self, event: SubstrateEvent) {
        // Receiver gone means nobody is listening any more
        let _ = self.sender.send(event);
    }
}
