//! Walk a query-configuration session end to end.
//!
//! Builds the pipeline against a small device directory and the default
//! DNS-over-HTTPS provider, submits a hostname target, and prints the
//! state transitions as answers arrive.

use glassform::config::{FormConfig, ResolverConfig};
use glassform::device::{Device, DeviceDirectory, Vrf};
use glassform::dns::TargetResolver;
use glassform::form::{ExecuteQuery, Executing, FieldChange, FinalizedQuery, FormStateController, QueryType};
use glassform::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;

struct PrintingExecutor;

impl ExecuteQuery for PrintingExecutor {
    fn execute(&self, query: FinalizedQuery) -> Executing {
        Box::pin(async move {
            println!(
                "executor received: {} {} via vrf {} on {:?} (digest {})",
                query.query_type,
                query.query_target,
                query.query_vrf,
                query.query_location,
                &query.digest()[..12],
            );
        })
    }
}

#[tokio::main]
async fn main() {
    // Initialize components
    let store = Arc::new(SessionStore::new());
    let directory = Arc::new(DeviceDirectory::new([
        Device {
            id: "edge1".into(),
            name: "Edge Router 1".into(),
            vrfs: vec![Vrf::new("default", true, true)],
        },
        Device {
            id: "edge2".into(),
            name: "Edge Router 2".into(),
            vrfs: vec![Vrf::new("default", true, true)],
        },
    ]));
    let resolver = TargetResolver::from_config(&ResolverConfig::default());
    let controller = FormStateController::new(
        Arc::clone(&store),
        directory,
        resolver,
        Arc::new(PrintingExecutor),
        FormConfig::default(),
    );

    store.subscribe(|state| {
        println!(
            "state: {:?} target={:?} families={}",
            state.submit_state, state.draft.query_target, state.families
        );
    });

    // Fill in the draft
    controller.apply(FieldChange::Locations(vec!["edge1".into(), "edge2".into()]));
    controller.apply(FieldChange::Type(QueryType::BgpRoute));
    controller.apply(FieldChange::Target("one.one.one.one".into()));

    // A hostname target gates submission on DNS-over-HTTPS resolution
    println!("submitting: {:?}", controller.submit());

    // Give both lookups time to settle (each is bounded at 1s)
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // Accept the auto-selected candidate
    println!("confirming: {:?}", controller.confirm());

    tokio::time::sleep(Duration::from_millis(100)).await;
}
