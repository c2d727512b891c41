//! Base types shared across the pipeline.
//!
//! - [`FormError`]: error taxonomy for the whole crate
//! - [`Afi`] / [`FamilySet`]: IP address families and derived family sets
//! - [`SubmitState`]: states of a submission attempt

pub mod error;
pub mod family;
pub mod submitstate;

pub use error::FormError;
pub use family::{Afi, FamilySet};
pub use submitstate::SubmitState;
