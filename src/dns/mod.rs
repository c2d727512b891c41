//! DNS-over-HTTPS target resolution.
//!
//! Provides hostname pre-resolution for query targets:
//! - dns-json wire types and answer extraction
//! - The [`LookupTarget`] trait, the seam the controller resolves through
//! - [`DohResolver`]: reqwest-backed lookup against a configured endpoint
//! - [`TargetResolver`]: races one timeout-bounded lookup per address
//!   family and delivers each completion independently
//!
//! # Architecture
//!
//! The two family lookups are fully independent: separate requests,
//! separate timeouts, no shared cancellation. Completion order is
//! unspecified; the precedence rule (IPv6 wins when it has an answer) is
//! re-applied on every delivery, so a late AAAA answer retroactively
//! supersedes an earlier A answer.

mod doh;
mod target;
mod wire;

pub use doh::DohResolver;
pub use target::{AnswerSet, DnsAnswer, TargetResolver};
pub use wire::{find_answer, DohQuestion, DohRecord, DohResponse, RecordType};

use crate::base::{Afi, FormError};
use std::{future::Future, pin::Pin, sync::Arc};

/// Alias for the `Future` type returned by a target lookup.
///
/// `Ok(None)` means the lookup completed without a usable answer; errors
/// are absorbed by the caller into the same no-answer outcome.
pub type Looking = Pin<Box<dyn Future<Output = Result<Option<String>, FormError>> + Send>>;

/// Trait for resolving a hostname target within one address family.
///
/// This is the seam between the resolution race and the actual
/// DNS-over-HTTPS transport; tests substitute a mock implementation.
pub trait LookupTarget: Send + Sync {
    /// Look up `name` for `family`, yielding the first matching record's
    /// data if the endpoint answered.
    fn lookup(&self, name: &str, family: Afi) -> Looking;
}

/// Blanket implementation for Arc-wrapped lookups.
impl<L: LookupTarget + ?Sized> LookupTarget for Arc<L> {
    fn lookup(&self, name: &str, family: Afi) -> Looking {
        (**self).lookup(name, family)
    }
}
