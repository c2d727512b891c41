//! The per-session observable state cell.
//!
//! One [`SessionStore`] exists per active session and is passed by `Arc`
//! to every component; there are no ambient singletons. The store is a
//! single-writer, multiple-reader cell: only the controller (and the
//! resolver deliveries it routes) mutate it, rendering collaborators read
//! snapshots or subscribe for synchronous change notifications.

use crate::base::{FamilySet, SubmitState};
use crate::device::Vrf;
use crate::dns::AnswerSet;
use crate::form::{FinalizedQuery, QueryDraft};
use std::sync::{Arc, Mutex};

type Subscriber = Arc<dyn Fn(&QueryState) + Send + Sync>;

/// Everything a renderer needs to draw the form, snapshotted atomically
/// per event.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    /// The in-progress draft.
    pub draft: QueryDraft,
    /// VRFs common to every selected location.
    pub available_vrfs: Vec<Vrf>,
    /// Families derived from the VRF intersection.
    pub families: FamilySet,
    /// Where the current submission attempt stands.
    pub submit_state: SubmitState,
    /// True from handoff until the executor completes or the user
    /// cancels.
    pub submitting: bool,
    /// Whether the resolved-target candidate panel is shown.
    pub resolved_open: bool,
    /// Whether the session's greeting has been acknowledged.
    pub greeting_ack: bool,
    /// The hostname being resolved, captured at submit time.
    pub fqdn_target: Option<String>,
    /// Latest known state of the per-family lookups.
    pub answers: AnswerSet,
    /// Resolution attempt counter; deliveries from a superseded attempt
    /// are dropped by comparing against this.
    pub generation: u64,
    /// The last query handed to the executor, kept for requery.
    pub last_query: Option<FinalizedQuery>,
}

/// Session-scoped shared state with synchronous change notification.
pub struct SessionStore {
    inner: Mutex<Inner>,
}

struct Inner {
    state: QueryState,
    subscribers: Vec<Subscriber>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: QueryState::default(),
                subscribers: Vec::new(),
            }),
        }
    }

    /// A point-in-time copy of the state.
    pub fn snapshot(&self) -> QueryState {
        self.lock().state.clone()
    }

    /// Register a reader notified synchronously after every mutation.
    ///
    /// Subscribers live for the session. They receive the post-mutation
    /// state by reference and may call [`SessionStore::snapshot`], but
    /// must not mutate the store.
    pub fn subscribe(&self, subscriber: impl Fn(&QueryState) + Send + Sync + 'static) {
        self.lock().subscribers.push(Arc::new(subscriber));
    }

    /// Acknowledge the session greeting, lifting the submission gate.
    pub fn acknowledge_greeting(&self) {
        self.update(|state| state.greeting_ack = true);
    }

    /// Apply one mutation and notify subscribers before returning.
    ///
    /// All writes go through here so every event produces exactly one
    /// atomic state transition followed by one notification pass. Calls
    /// must not nest.
    pub(crate) fn update<R>(&self, mutate: impl FnOnce(&mut QueryState) -> R) -> R {
        let (result, state, subscribers) = {
            let mut inner = self.lock();
            let result = mutate(&mut inner.state);
            (result, inner.state.clone(), inner.subscribers.clone())
        };
        // Notify outside the lock so subscribers can read the store.
        for subscriber in subscribers {
            subscriber(&state);
        }
        result
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("session store lock poisoned")
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
