//! The query form: draft, field-change events, and the controller.
//!
//! # Architecture
//!
//! [`FormStateController`] owns the submission state machine. UI events
//! arrive as [`RawFieldChange`] values and convert into the closed
//! [`FieldChange`] union; invalid events fail conversion and are ignored.
//! The controller writes all shared state through the session store and
//! hands finalized queries to the [`ExecuteQuery`] collaborator.

mod controller;
mod draft;
mod fieldchange;

pub use controller::{is_fqdn, FormStateController, SubmitOutcome};
pub use draft::{FinalizedQuery, QueryDraft, QueryType};
pub use fieldchange::{FieldChange, RawFieldChange, RawFieldValue};

use std::{future::Future, pin::Pin, sync::Arc};

/// Alias for the `Future` type returned by the execution collaborator.
pub type Executing = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The backend execution collaborator.
///
/// Receives the finalized query at submission; outcome reporting is its
/// responsibility, the pipeline has no further involvement.
pub trait ExecuteQuery: Send + Sync {
    fn execute(&self, query: FinalizedQuery) -> Executing;
}

/// Blanket implementation for Arc-wrapped executors.
impl<E: ExecuteQuery + ?Sized> ExecuteQuery for Arc<E> {
    fn execute(&self, query: FinalizedQuery) -> Executing {
        (**self).execute(query)
    }
}
