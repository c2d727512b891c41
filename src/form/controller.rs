//! The form state machine.

use super::draft::{FinalizedQuery, QueryDraft, QueryType};
use super::fieldchange::{FieldChange, RawFieldChange};
use super::ExecuteQuery;
use crate::base::{Afi, SubmitState};
use crate::config::FormConfig;
use crate::device::{resolve_locations, DeviceDirectory};
use crate::dns::{AnswerSet, DnsAnswer, TargetResolver};
use crate::store::{QueryState, SessionStore};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Hostname shape: alphanumeric/hyphen labels separated by dots, ending
/// in a 2-6 character alphabetic label. IP literals and anything
/// scheme-prefixed fall outside the character classes.
static FQDN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z-]{2,6}$")
        .expect("hostname pattern compiles")
});

/// Whether `target` looks like a hostname rather than an address.
pub fn is_fqdn(target: &str) -> bool {
    FQDN_RE.is_match(target)
}

/// What a submission request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The query was finalized and handed to the executor.
    Submitted,
    /// The target is a hostname; resolution started and submission is
    /// gated on it.
    ResolutionStarted,
    /// Refused: the session greeting has not been acknowledged.
    GreetingRequired,
    /// Refused: a required field is missing, or there is nothing to
    /// requery.
    Incomplete,
    /// Refused: no resolved candidate is available to select.
    NoCandidate,
    /// Refused: a submission attempt is already in flight.
    InFlight,
}

/// Owns the query draft and drives a submission attempt through
/// `Idle -> Resolving -> ResolvedPending -> Submitting -> Idle`.
///
/// All shared state lives in the session store; the controller is the
/// store's single writer. Lookup completions are routed back through the
/// store under a per-attempt generation, so answers from an abandoned
/// attempt can never overwrite a newer target.
pub struct FormStateController {
    store: Arc<SessionStore>,
    directory: Arc<DeviceDirectory>,
    resolver: TargetResolver,
    executor: Arc<dyn ExecuteQuery>,
    config: FormConfig,
}

impl FormStateController {
    pub fn new(
        store: Arc<SessionStore>,
        directory: Arc<DeviceDirectory>,
        resolver: TargetResolver,
        executor: Arc<dyn ExecuteQuery>,
        config: FormConfig,
    ) -> Self {
        Self {
            store,
            directory,
            resolver,
            executor,
            config,
        }
    }

    /// Apply a raw UI event. Events that fail conversion are logged and
    /// ignored; the draft is not touched.
    pub fn apply_raw(&self, raw: RawFieldChange) {
        match FieldChange::try_from(raw) {
            Ok(change) => self.apply(change),
            Err(err) => tracing::debug!(error = %err, "ignoring invalid field-change event"),
        }
    }

    /// Apply one validated field change.
    ///
    /// Each case updates exactly one draft attribute; a location change
    /// additionally re-resolves the VRF intersection and family set in
    /// the same store transition. Editing while a resolution is
    /// outstanding abandons the attempt.
    pub fn apply(&self, change: FieldChange) {
        self.store.update(|state| {
            if state.submit_state.is_resolving() {
                tracing::debug!("draft edited during resolution, abandoning attempt");
                Self::abandon_resolution(state);
            }

            match &change {
                FieldChange::Locations(locations) => {
                    state.draft.query_location = locations.clone();
                    let resolution =
                        resolve_locations(locations, &self.directory, &state.draft.query_vrf);
                    tracing::debug!(
                        locations = ?locations,
                        vrfs = resolution.vrfs.len(),
                        families = %resolution.families,
                        "location selection resolved"
                    );
                    state.available_vrfs = resolution.vrfs;
                    state.draft.query_vrf = resolution.query_vrf;
                    state.families = resolution.families;
                }
                FieldChange::Type(query_type) => state.draft.query_type = Some(*query_type),
                FieldChange::Vrf(vrf) => state.draft.query_vrf = vrf.clone(),
                FieldChange::Target(target) => state.draft.query_target = target.clone(),
            }
        });
    }

    /// Request submission of the current draft.
    ///
    /// A hostname target on an address query enters the resolution path;
    /// anything else is finalized and handed off immediately.
    pub fn submit(&self) -> SubmitOutcome {
        let snapshot = self.store.snapshot();

        if snapshot.submit_state != SubmitState::Idle {
            return SubmitOutcome::InFlight;
        }
        if self.config.greeting_required && !snapshot.greeting_ack {
            tracing::debug!("submission refused until the greeting is acknowledged");
            return SubmitOutcome::GreetingRequired;
        }
        let Some(query_type) = snapshot.draft.query_type else {
            return SubmitOutcome::Incomplete;
        };
        if snapshot.draft.query_location.is_empty() || snapshot.draft.query_target.trim().is_empty()
        {
            return SubmitOutcome::Incomplete;
        }

        let target = snapshot.draft.query_target.clone();
        if !(query_type.requires_resolution() && is_fqdn(&target)) {
            return self.finalize(query_type, &snapshot.draft, target);
        }

        let families = snapshot.families;
        if families.is_empty() {
            tracing::debug!(target = %target, "no usable families, resolution will yield no candidates");
        }
        let generation = self.store.update(|state| {
            state.generation += 1;
            state.fqdn_target = Some(target.clone());
            state.answers = AnswerSet::request(families);
            state.resolved_open = true;
            state.submit_state = SubmitState::Resolving;
            state.generation
        });
        tracing::debug!(
            target = %target,
            families = %families,
            "hostname target, resolving before submission"
        );

        let mut deliveries = self.resolver.resolve(&target, families);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            while let Some(answer) = deliveries.recv().await {
                Self::deliver_answer(&store, generation, answer);
            }
        });

        SubmitOutcome::ResolutionStarted
    }

    /// Submit with the candidate resolved for `family`.
    pub fn select_candidate(&self, family: Afi) -> SubmitOutcome {
        let snapshot = self.store.snapshot();
        if !snapshot.submit_state.is_resolving() {
            return SubmitOutcome::NoCandidate;
        }
        let Some(address) = snapshot.answers.candidate(family).map(str::to_owned) else {
            return SubmitOutcome::NoCandidate;
        };
        let Some(query_type) = snapshot.draft.query_type else {
            return SubmitOutcome::Incomplete;
        };
        self.finalize(query_type, &snapshot.draft, address)
    }

    /// Accept the current auto-selected override and submit.
    ///
    /// Also usable once every lookup has settled without an answer: no
    /// override happened, so the typed hostname goes through as-is and
    /// the executor gets to fail the query itself.
    pub fn confirm(&self) -> SubmitOutcome {
        let snapshot = self.store.snapshot();
        let can_submit = match snapshot.submit_state {
            SubmitState::ResolvedPending => true,
            SubmitState::Resolving => snapshot.answers.settled(),
            _ => false,
        };
        if !can_submit {
            return SubmitOutcome::NoCandidate;
        }
        let Some(query_type) = snapshot.draft.query_type else {
            return SubmitOutcome::Incomplete;
        };
        let target = snapshot.draft.query_target.clone();
        self.finalize(query_type, &snapshot.draft, target)
    }

    /// Re-submit the last finalized query with a fresh timestamp.
    pub fn requery(&self) -> SubmitOutcome {
        let snapshot = self.store.snapshot();
        if snapshot.submit_state != SubmitState::Idle {
            return SubmitOutcome::InFlight;
        }
        let Some(last) = snapshot.last_query else {
            return SubmitOutcome::Incomplete;
        };

        let query = last.restamped();
        tracing::info!(digest = %query.digest(), "requerying last submitted query");
        self.store.update(|state| {
            state.submitting = true;
            state.submit_state = SubmitState::Submitting;
            state.last_query = Some(query.clone());
        });
        tokio::spawn(self.executor.execute(query));
        SubmitOutcome::Submitted
    }

    /// The executor finished or the user cancelled; back to editing.
    pub fn complete(&self) {
        self.store.update(|state| {
            state.submitting = false;
            state.submit_state = SubmitState::Idle;
        });
    }

    fn finalize(&self, query_type: QueryType, draft: &QueryDraft, target: String) -> SubmitOutcome {
        let query = FinalizedQuery::new(
            draft.query_location.clone(),
            query_type,
            draft.query_vrf.clone(),
            &target,
        );
        tracing::info!(
            digest = %query.digest(),
            query_type = %query.query_type,
            target = %query.query_target,
            "query handed to executor"
        );

        self.store.update(|state| {
            state.draft.query_target = query.query_target.clone();
            state.submitting = true;
            state.submit_state = SubmitState::Submitting;
            state.resolved_open = false;
            state.fqdn_target = None;
            state.answers = AnswerSet::default();
            // Anything still in flight for the old attempt is now stale.
            state.generation += 1;
            state.last_query = Some(query.clone());
        });

        tokio::spawn(self.executor.execute(query));
        SubmitOutcome::Submitted
    }

    /// One lookup completed; re-evaluate precedence against the latest
    /// state of both answers. Deliveries from a superseded attempt are
    /// dropped.
    fn deliver_answer(store: &SessionStore, generation: u64, answer: DnsAnswer) {
        store.update(|state| {
            if state.generation != generation {
                tracing::debug!(family = %answer.family, "dropping answer from superseded resolution");
                return;
            }
            state.answers.record(&answer);
            if state.submit_state.is_resolving() {
                if let Some(address) = state.answers.preferred().map(str::to_owned) {
                    tracing::debug!(family = %answer.family, address = %address, "resolved target override");
                    state.draft.query_target = address;
                    state.submit_state = SubmitState::ResolvedPending;
                }
            }
        });
    }

    fn abandon_resolution(state: &mut QueryState) {
        state.generation += 1;
        state.answers = AnswerSet::default();
        state.fqdn_target = None;
        state.resolved_open = false;
        state.submit_state = SubmitState::Idle;
    }
}
