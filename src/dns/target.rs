//! The two-family resolution race.

use super::LookupTarget;
use crate::base::{Afi, FamilySet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// The outcome of one family's lookup.
///
/// Transient: produced per resolution attempt and discarded once the
/// draft is finalized. `address: None` covers empty answers, timeouts,
/// and transport failures alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub family: Afi,
    pub address: Option<String>,
}

/// Latest known state of both family lookups for one resolution attempt.
///
/// Updated on each delivery; [`AnswerSet::preferred`] re-applies the
/// precedence rule against the whole set, so the result is the same
/// whichever order the lookups complete in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    v4: Slot,
    v6: Slot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Slot {
    requested: bool,
    settled: bool,
    address: Option<String>,
}

impl AnswerSet {
    /// Start a resolution attempt over `families`.
    pub fn request(families: FamilySet) -> Self {
        let mut set = Self::default();
        set.v4.requested = families.contains(Afi::Ipv4);
        set.v6.requested = families.contains(Afi::Ipv6);
        set
    }

    fn slot(&self, family: Afi) -> &Slot {
        match family {
            Afi::Ipv4 => &self.v4,
            Afi::Ipv6 => &self.v6,
        }
    }

    /// Record one lookup's completion. Idempotent per family.
    pub fn record(&mut self, answer: &DnsAnswer) {
        let slot = match answer.family {
            Afi::Ipv4 => &mut self.v4,
            Afi::Ipv6 => &mut self.v6,
        };
        slot.settled = true;
        slot.address = answer.address.clone();
    }

    /// The best-known resolved address under the precedence rule: a
    /// requested IPv6 answer wins, else a requested IPv4 answer, else
    /// nothing. Re-evaluated from scratch on every call.
    pub fn preferred(&self) -> Option<&str> {
        if self.v6.requested {
            if let Some(address) = self.v6.address.as_deref() {
                return Some(address);
            }
        }
        if self.v4.requested {
            if let Some(address) = self.v4.address.as_deref() {
                return Some(address);
            }
        }
        None
    }

    /// The candidate address for one family, if its lookup answered.
    pub fn candidate(&self, family: Afi) -> Option<&str> {
        self.slot(family).address.as_deref()
    }

    /// Whether `family`'s lookup has settled with an answer. Drives the
    /// per-family candidate buttons.
    pub fn available(&self, family: Afi) -> bool {
        let slot = self.slot(family);
        slot.settled && slot.address.is_some()
    }

    /// Whether every requested lookup has settled, with or without an
    /// answer.
    pub fn settled(&self) -> bool {
        (!self.v4.requested || self.v4.settled) && (!self.v6.requested || self.v6.settled)
    }
}

/// Races one lookup per address family.
///
/// Each lookup runs as its own task with its own timeout; aborting one
/// never aborts the other. Completions are delivered on the returned
/// channel in whatever order they arrive.
pub struct TargetResolver {
    lookup: Arc<dyn LookupTarget>,
    timeout: Duration,
}

impl TargetResolver {
    pub fn new(lookup: Arc<dyn LookupTarget>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Build a resolver from config with the default DoH transport.
    pub fn from_config(config: &crate::config::ResolverConfig) -> Self {
        Self::new(
            Arc::new(super::DohResolver::new(config)),
            config.timeout(),
        )
    }

    /// Issue one lookup per family in `families` for `name`.
    ///
    /// Every requested family eventually yields exactly one [`DnsAnswer`]
    /// on the returned channel; failures and timeouts arrive as
    /// `address: None`. An empty family set closes the channel
    /// immediately.
    pub fn resolve(&self, name: &str, families: FamilySet) -> mpsc::UnboundedReceiver<DnsAnswer> {
        let (tx, rx) = mpsc::unbounded_channel();

        for family in families.iter() {
            let lookup = Arc::clone(&self.lookup);
            let tx = tx.clone();
            let name = name.to_owned();
            let bound = self.timeout;

            tokio::spawn(async move {
                let address = match tokio::time::timeout(bound, lookup.lookup(&name, family)).await
                {
                    Ok(Ok(answer)) => answer,
                    Ok(Err(err)) => {
                        tracing::debug!(name = %name, family = %family, error = %err, "lookup failed, treating as no answer");
                        None
                    }
                    Err(_) => {
                        let err = crate::base::FormError::LookupTimedOut {
                            name: name.clone(),
                            timeout_ms: bound.as_millis() as u64,
                        };
                        tracing::debug!(family = %family, error = %err, "treating as no answer");
                        None
                    }
                };
                // The receiver may be gone if the attempt was abandoned.
                let _ = tx.send(DnsAnswer { family, address });
            });
        }

        rx
    }
}
