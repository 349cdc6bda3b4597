//! Caller request tracking.

/// Tag pairing an inbound event with its response.
///
/// The runner picks a fresh `CallId` for every event it hands to
/// `StateMachine::handle`, and the node echoes it in the single
/// `Action::Respond` that comes back in the returned actions. Not to be
/// confused with the broker's request identifiers: a `CallId` names one
/// invocation, whatever it is.
///
/// # Example
///
/// ```ignore
/// self.next_call += 1;
/// let call = CallId(self.next_call);
///
/// for action in node.handle(Event::QueryFee { call }) {
///     if let Action::Respond { call: answered, response } = action {
///         assert_eq!(answered, call);
///         // deliver `response` to whoever issued the call
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u64);

impl CallId {
    /// Create a new call ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call-{}", self.0)
    }
}
