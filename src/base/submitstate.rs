/// The current state of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    /// The draft is being edited; nothing is in flight.
    #[default]
    Idle,

    /// Submit was requested with a hostname target; DNS-over-HTTPS
    /// lookups are running and no answer has arrived yet.
    Resolving,

    /// At least one resolved candidate is available. The user may pick
    /// one, or wait for the IPv6-over-IPv4 auto-override to settle.
    ResolvedPending,

    /// The finalized query has been handed to the execution collaborator.
    Submitting,
}

impl SubmitState {
    /// True while lookups may still override the target.
    pub fn is_resolving(self) -> bool {
        matches!(self, SubmitState::Resolving | SubmitState::ResolvedPending)
    }
}
