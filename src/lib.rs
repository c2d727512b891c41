//! # glassform
//!
//! The client-side query-configuration pipeline of a network looking-glass.
//!
//! `glassform` takes raw user selections for a diagnostic query (BGP route
//! lookup, ping, traceroute) against one or more network locations and
//! resolves them into a submittable query:
//!
//! - **VRF intersection**: computes the routing contexts valid across all
//!   selected locations and the address families they support
//! - **Target pre-resolution**: detects hostname-shaped targets and resolves
//!   them over DNS-over-HTTPS before submission, racing independent A and
//!   AAAA lookups with deterministic IPv6-over-IPv4 precedence
//! - **Submission gating**: a small state machine that never hands a query
//!   to the executor while a required resolution is outstanding
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use glassform::config::{FormConfig, ResolverConfig};
//! use glassform::device::DeviceDirectory;
//! use glassform::dns::{DohResolver, TargetResolver};
//! use glassform::form::{FieldChange, FormStateController};
//! use glassform::store::SessionStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(SessionStore::new());
//! let directory = Arc::new(DeviceDirectory::from_json(DEVICES_JSON)?);
//! let resolver = TargetResolver::from_config(&ResolverConfig::default());
//! let controller = FormStateController::new(
//!     store.clone(), directory, resolver, executor, FormConfig::default(),
//! );
//!
//! controller.apply(FieldChange::Locations(vec!["router01".into()]));
//! controller.apply(FieldChange::Target("example.com".into()));
//! let outcome = controller.submit();
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types: errors, address families, submission states
//! - [`config`] - Resolver endpoint and pipeline settings
//! - [`device`] - Device/VRF records and the location intersection algorithm
//! - [`dns`] - DNS-over-HTTPS lookup and the two-family resolution race
//! - [`store`] - The per-session observable state cell
//! - [`form`] - Query draft, field-change events, and the form controller
//!
//! ## Collaborators
//!
//! Rendering, content loading, and backend query execution are external.
//! They meet this crate only at its seams: the [`store::SessionStore`]
//! snapshots and subscriptions (read side), [`form::RawFieldChange`]
//! events (input side), and the [`form::ExecuteQuery`] trait (output
//! side).

pub mod base;
pub mod config;
pub mod device;
pub mod dns;
pub mod form;
pub mod store;
