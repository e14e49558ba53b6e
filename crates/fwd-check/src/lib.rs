//! fwd-check
//!
//! Idempotent check reconciliation.
//!
//! Architectural decisions:
//! - A desired check is matched against existing checks by canonical
//!   definition, not by name: presentation metadata never decides identity.
//! - Only `Existential` checks are candidates for equivalence.
//! - Present/absent operations collapse "already in the desired state"
//!   with "moved into the desired state" — both are success.
//! - Pure comparison logic; all IO goes through the `ForwardApi` trait.

mod canonical;
mod reconcile;
mod spec;

pub use canonical::{canonical_definition, definitions_equivalent, is_existential};
pub use reconcile::{
    ensure_absent, ensure_present, fetch_check, find_equivalent, AbsentOutcome, CheckError,
    PresentOutcome,
};
pub use spec::{CheckSpec, SourceSelector, SpecError};
