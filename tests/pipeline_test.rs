//! End-to-end pipeline tests.
//!
//! Covers:
//! - Submission gating on hostname targets
//! - The two-family resolution race and IPv6 precedence
//! - Location changes rewriting the VRF/family state
//! - Stale-answer protection when the draft is edited mid-resolution

use glassform::base::{Afi, FamilySet, SubmitState};
use glassform::config::FormConfig;
use glassform::device::{Device, DeviceDirectory, Vrf};
use glassform::dns::{Looking, LookupTarget, TargetResolver};
use glassform::form::{
    ExecuteQuery, Executing, FieldChange, FinalizedQuery, FormStateController, QueryType,
    RawFieldChange, RawFieldValue, SubmitOutcome,
};
use glassform::store::{QueryState, SessionStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const V4_ANSWER: &str = "192.0.2.1";
const V6_ANSWER: &str = "2001:db8::1";

/// Scripted per-family lookup behavior.
#[derive(Clone)]
enum MockAnswer {
    Answer(&'static str),
    Delayed(&'static str, Duration),
    NoAnswer,
    /// Never completes; only the resolver's timeout ends it.
    Stall,
}

struct MockLookup {
    v4: MockAnswer,
    v6: MockAnswer,
}

impl LookupTarget for MockLookup {
    fn lookup(&self, _name: &str, family: Afi) -> Looking {
        let behavior = match family {
            Afi::Ipv4 => self.v4.clone(),
            Afi::Ipv6 => self.v6.clone(),
        };
        Box::pin(async move {
            match behavior {
                MockAnswer::Answer(address) => Ok(Some(address.to_owned())),
                MockAnswer::Delayed(address, delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(Some(address.to_owned()))
                }
                MockAnswer::NoAnswer => Ok(None),
                MockAnswer::Stall => std::future::pending().await,
            }
        })
    }
}

/// Records every handed-off query at the moment of handoff.
#[derive(Default)]
struct RecordingExecutor {
    queries: Mutex<Vec<FinalizedQuery>>,
}

impl RecordingExecutor {
    fn received(&self) -> Vec<FinalizedQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl ExecuteQuery for RecordingExecutor {
    fn execute(&self, query: FinalizedQuery) -> Executing {
        self.queries.lock().unwrap().push(query);
        Box::pin(std::future::ready(()))
    }
}

fn directory() -> DeviceDirectory {
    let device = |id: &str, vrfs: Vec<Vrf>| Device {
        id: id.into(),
        name: id.to_uppercase(),
        vrfs,
    };
    DeviceDirectory::new([
        // a and b intersect to {default}, IPv4-only.
        device(
            "a",
            vec![
                Vrf::new("default", true, false),
                Vrf::new("blue", true, true),
            ],
        ),
        device(
            "b",
            vec![Vrf::new("default", true, false), Vrf::new("red", false, true)],
        ),
        device(
            "c",
            vec![
                Vrf::new("default", true, false),
                Vrf::new("blue", true, true),
            ],
        ),
        // Dual-stack device for {4,6} scenarios.
        device("d", vec![Vrf::new("default", true, true)]),
    ])
}

struct Pipeline {
    store: Arc<SessionStore>,
    controller: FormStateController,
    executor: Arc<RecordingExecutor>,
}

fn pipeline(lookup: MockLookup, config: FormConfig) -> Pipeline {
    let store = Arc::new(SessionStore::new());
    let executor = Arc::new(RecordingExecutor::default());
    let controller = FormStateController::new(
        Arc::clone(&store),
        Arc::new(directory()),
        TargetResolver::new(Arc::new(lookup), Duration::from_millis(1000)),
        executor.clone(),
        config,
    );
    Pipeline {
        store,
        controller,
        executor,
    }
}

fn both_answer() -> MockLookup {
    MockLookup {
        v4: MockAnswer::Answer(V4_ANSWER),
        v6: MockAnswer::Answer(V6_ANSWER),
    }
}

/// Fill in a valid draft: dual-stack location, address query, hostname
/// target.
fn edit_hostname_draft(controller: &FormStateController) {
    controller.apply(FieldChange::Locations(vec!["d".into()]));
    controller.apply(FieldChange::Type(QueryType::BgpRoute));
    controller.apply(FieldChange::Target("example.com".into()));
}

async fn wait_until(store: &SessionStore, predicate: impl Fn(&QueryState) -> bool) {
    for _ in 0..500 {
        if predicate(&store.snapshot()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("state condition not reached");
}

#[tokio::test]
async fn test_literal_target_submits_directly() {
    let p = pipeline(both_answer(), FormConfig::default());
    p.controller.apply(FieldChange::Locations(vec!["d".into()]));
    p.controller.apply(FieldChange::Type(QueryType::BgpRoute));
    p.controller.apply(FieldChange::Target(V4_ANSWER.into()));

    assert_eq!(p.controller.submit(), SubmitOutcome::Submitted);

    let received = p.executor.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].query_target, V4_ANSWER);
    assert_eq!(received[0].query_type, QueryType::BgpRoute);

    let state = p.store.snapshot();
    assert!(state.submitting);
    assert_eq!(state.submit_state, SubmitState::Submitting);
    assert!(!state.resolved_open);
}

#[tokio::test]
async fn test_non_address_query_type_skips_resolution() {
    // A community query never pre-resolves, hostname-shaped or not.
    let p = pipeline(both_answer(), FormConfig::default());
    p.controller.apply(FieldChange::Locations(vec!["d".into()]));
    p.controller
        .apply(FieldChange::Type(QueryType::BgpCommunity));
    p.controller.apply(FieldChange::Target("example.com".into()));

    assert_eq!(p.controller.submit(), SubmitOutcome::Submitted);
    assert_eq!(p.executor.received()[0].query_target, "example.com");
}

#[tokio::test(start_paused = true)]
async fn test_hostname_target_gates_on_resolution() {
    let p = pipeline(both_answer(), FormConfig::default());
    edit_hostname_draft(&p.controller);

    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);

    let state = p.store.snapshot();
    assert_eq!(state.submit_state, SubmitState::Resolving);
    assert!(state.resolved_open);
    assert_eq!(state.fqdn_target.as_deref(), Some("example.com"));
    // Nothing reaches the executor while resolution is outstanding.
    assert!(p.executor.received().is_empty());

    wait_until(&p.store, |state| {
        state.submit_state == SubmitState::ResolvedPending
    })
    .await;

    assert_eq!(p.controller.confirm(), SubmitOutcome::Submitted);
    let received = p.executor.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].query_target, V6_ANSWER);
}

#[tokio::test(start_paused = true)]
async fn test_ipv6_supersedes_earlier_ipv4_answer() {
    let p = pipeline(
        MockLookup {
            v4: MockAnswer::Answer(V4_ANSWER),
            v6: MockAnswer::Delayed(V6_ANSWER, Duration::from_millis(200)),
        },
        FormConfig::default(),
    );
    edit_hostname_draft(&p.controller);
    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);

    // The IPv4 answer lands first and is auto-selected...
    wait_until(&p.store, |state| state.draft.query_target == V4_ANSWER).await;
    assert_eq!(
        p.store.snapshot().submit_state,
        SubmitState::ResolvedPending
    );

    // ...until the IPv6 answer retroactively supersedes it.
    wait_until(&p.store, |state| state.draft.query_target == V6_ANSWER).await;

    assert_eq!(p.controller.confirm(), SubmitOutcome::Submitted);
    assert_eq!(p.executor.received()[0].query_target, V6_ANSWER);
}

#[tokio::test(start_paused = true)]
async fn test_ipv4_only_family_set_never_queries_ipv6() {
    // Locations a+b: intersection {default}, families {4}. The IPv6
    // answer exists but its family is never requested.
    let p = pipeline(both_answer(), FormConfig::default());
    p.controller
        .apply(FieldChange::Locations(vec!["a".into(), "b".into()]));
    p.controller.apply(FieldChange::Type(QueryType::BgpRoute));
    p.controller.apply(FieldChange::Target("example.com".into()));

    let state = p.store.snapshot();
    assert_eq!(state.families, FamilySet::IPV4);
    let vrf_ids: Vec<&str> = state
        .available_vrfs
        .iter()
        .map(|vrf| vrf.id.as_str())
        .collect();
    assert_eq!(vrf_ids, vec!["default"]);

    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);
    wait_until(&p.store, |state| {
        state.submit_state == SubmitState::ResolvedPending
    })
    .await;

    assert_eq!(p.controller.confirm(), SubmitOutcome::Submitted);
    assert_eq!(p.executor.received()[0].query_target, V4_ANSWER);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_lookup_times_out_without_blocking_the_other() {
    let p = pipeline(
        MockLookup {
            v4: MockAnswer::Answer(V4_ANSWER),
            v6: MockAnswer::Stall,
        },
        FormConfig::default(),
    );
    edit_hostname_draft(&p.controller);
    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);

    // Both lookups settle: IPv4 with an answer, IPv6 via its timeout.
    wait_until(&p.store, |state| state.answers.settled()).await;

    let state = p.store.snapshot();
    assert!(state.answers.available(Afi::Ipv4));
    assert!(!state.answers.available(Afi::Ipv6));
    assert_eq!(state.draft.query_target, V4_ANSWER);

    assert_eq!(p.controller.confirm(), SubmitOutcome::Submitted);
    assert_eq!(p.executor.received()[0].query_target, V4_ANSWER);
}

#[tokio::test(start_paused = true)]
async fn test_no_answers_leaves_typed_hostname_in_place() {
    let p = pipeline(
        MockLookup {
            v4: MockAnswer::NoAnswer,
            v6: MockAnswer::NoAnswer,
        },
        FormConfig::default(),
    );
    edit_hostname_draft(&p.controller);
    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);

    wait_until(&p.store, |state| state.answers.settled()).await;

    // No override happened; the literal hostname remains the target.
    let state = p.store.snapshot();
    assert_eq!(state.submit_state, SubmitState::Resolving);
    assert_eq!(state.draft.query_target, "example.com");

    // The user may still push the typed hostname through; the executor
    // owns the failure from here.
    assert_eq!(p.controller.confirm(), SubmitOutcome::Submitted);
    assert_eq!(p.executor.received()[0].query_target, "example.com");
}

#[tokio::test(start_paused = true)]
async fn test_late_answer_cannot_override_edited_target() {
    let p = pipeline(
        MockLookup {
            v4: MockAnswer::NoAnswer,
            v6: MockAnswer::Delayed(V6_ANSWER, Duration::from_millis(500)),
        },
        FormConfig::default(),
    );
    edit_hostname_draft(&p.controller);
    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);

    // The user edits the target while the AAAA lookup is in flight.
    p.controller.apply(FieldChange::Target("10.0.0.1".into()));
    let state = p.store.snapshot();
    assert_eq!(state.submit_state, SubmitState::Idle);
    assert!(!state.resolved_open);

    // Let the superseded lookup land; it must be dropped.
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(p.store.snapshot().draft.query_target, "10.0.0.1");
    assert!(p.executor.received().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_manual_candidate_pick_beats_pending_ipv6() {
    let p = pipeline(
        MockLookup {
            v4: MockAnswer::Answer(V4_ANSWER),
            v6: MockAnswer::Delayed(V6_ANSWER, Duration::from_millis(800)),
        },
        FormConfig::default(),
    );
    edit_hostname_draft(&p.controller);
    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);

    wait_until(&p.store, |state| state.answers.available(Afi::Ipv4)).await;
    assert_eq!(p.controller.select_candidate(Afi::Ipv4), SubmitOutcome::Submitted);
    assert_eq!(p.executor.received()[0].query_target, V4_ANSWER);

    // The IPv6 answer arriving after submission is stale and changes
    // nothing.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(p.executor.received().len(), 1);
    assert_eq!(p.store.snapshot().draft.query_target, V4_ANSWER);
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_while_resolving_is_refused() {
    let p = pipeline(both_answer(), FormConfig::default());
    edit_hostname_draft(&p.controller);
    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);
    assert_eq!(p.controller.submit(), SubmitOutcome::InFlight);
}

#[tokio::test]
async fn test_greeting_gate() {
    let p = pipeline(
        both_answer(),
        FormConfig {
            greeting_required: true,
        },
    );
    p.controller.apply(FieldChange::Locations(vec!["d".into()]));
    p.controller.apply(FieldChange::Type(QueryType::Ping));
    p.controller.apply(FieldChange::Target(V4_ANSWER.into()));

    assert_eq!(p.controller.submit(), SubmitOutcome::GreetingRequired);
    assert!(p.executor.received().is_empty());

    p.store.acknowledge_greeting();
    assert_eq!(p.controller.submit(), SubmitOutcome::Submitted);
    assert_eq!(p.executor.received().len(), 1);
}

#[tokio::test]
async fn test_incomplete_draft_is_refused() {
    let p = pipeline(both_answer(), FormConfig::default());
    assert_eq!(p.controller.submit(), SubmitOutcome::Incomplete);

    p.controller.apply(FieldChange::Locations(vec!["d".into()]));
    assert_eq!(p.controller.submit(), SubmitOutcome::Incomplete);

    p.controller.apply(FieldChange::Type(QueryType::Ping));
    p.controller.apply(FieldChange::Target("   ".into()));
    assert_eq!(p.controller.submit(), SubmitOutcome::Incomplete);

    assert!(p.executor.received().is_empty());
}

#[tokio::test]
async fn test_requery_resubmits_the_same_query() {
    let p = pipeline(both_answer(), FormConfig::default());
    p.controller.apply(FieldChange::Locations(vec!["d".into()]));
    p.controller.apply(FieldChange::Type(QueryType::Traceroute));
    p.controller.apply(FieldChange::Target(V4_ANSWER.into()));

    assert_eq!(p.controller.submit(), SubmitOutcome::Submitted);
    // Requery is only available once the previous attempt finished.
    assert_eq!(p.controller.requery(), SubmitOutcome::InFlight);

    p.controller.complete();
    assert!(!p.store.snapshot().submitting);
    assert_eq!(p.controller.requery(), SubmitOutcome::Submitted);

    let received = p.executor.received();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].digest(), received[1].digest());
}

#[tokio::test]
async fn test_requery_with_no_history_is_refused() {
    let p = pipeline(both_answer(), FormConfig::default());
    assert_eq!(p.controller.requery(), SubmitOutcome::Incomplete);
}

#[tokio::test]
async fn test_vrf_selection_resets_on_location_change() {
    let p = pipeline(both_answer(), FormConfig::default());
    // a+c share "blue"; selecting it is valid.
    p.controller
        .apply(FieldChange::Locations(vec!["a".into(), "c".into()]));
    p.controller.apply(FieldChange::Vrf("blue".into()));
    assert_eq!(p.store.snapshot().draft.query_vrf, "blue");

    // a+b do not share "blue"; the selection falls back to default.
    p.controller
        .apply(FieldChange::Locations(vec!["a".into(), "b".into()]));
    assert_eq!(p.store.snapshot().draft.query_vrf, "default");
}

#[tokio::test]
async fn test_invalid_raw_events_are_ignored() {
    let p = pipeline(both_answer(), FormConfig::default());
    let before = p.store.snapshot();

    p.controller.apply_raw(RawFieldChange {
        field: "query_color".into(),
        value: RawFieldValue::Text("red".into()),
    });
    p.controller.apply_raw(RawFieldChange {
        field: "query_target".into(),
        value: RawFieldValue::List(vec!["192.0.2.1".into()]),
    });
    p.controller.apply_raw(RawFieldChange {
        field: "query_type".into(),
        value: RawFieldValue::Text("bgp_flowspec".into()),
    });

    let after = p.store.snapshot();
    assert_eq!(before.draft, after.draft);

    // A well-formed raw event still applies.
    p.controller.apply_raw(RawFieldChange {
        field: "query_target".into(),
        value: RawFieldValue::Text("example.com".into()),
    });
    assert_eq!(p.store.snapshot().draft.query_target, "example.com");
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_mixed_capability_locations() {
    // Locations a (default[v4], blue[v4,v6]) and b (default[v4],
    // red[v6]): intersection {default}, families {4}; a hostname
    // bgp_route query resolves over IPv4 only and submits the A answer.
    let p = pipeline(
        MockLookup {
            v4: MockAnswer::Delayed(V4_ANSWER, Duration::from_millis(50)),
            v6: MockAnswer::Answer(V6_ANSWER),
        },
        FormConfig::default(),
    );
    p.controller
        .apply(FieldChange::Locations(vec!["a".into(), "b".into()]));
    p.controller.apply(FieldChange::Type(QueryType::BgpRoute));
    p.controller.apply(FieldChange::Target("example.com".into()));

    assert_eq!(p.controller.submit(), SubmitOutcome::ResolutionStarted);
    wait_until(&p.store, |state| {
        state.submit_state == SubmitState::ResolvedPending
    })
    .await;

    assert_eq!(p.controller.confirm(), SubmitOutcome::Submitted);

    let received = p.executor.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].query_target, V4_ANSWER);
    assert_eq!(received[0].query_location, vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(received[0].query_vrf, "default");
}
