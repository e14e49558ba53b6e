//! Present/absent reconciliation against a target snapshot.

use crate::canonical::{canonical_definition, is_existential};
use crate::spec::CheckSpec;
use fwd_api::{ApiError, CheckRecord, ForwardApi};
use std::fmt;

/// Errors from a reconciliation operation.
#[derive(Debug)]
pub enum CheckError {
    /// The remote call itself failed.
    Api(ApiError),
    /// Create reported success but allocated no check id — an invalid
    /// success state the caller must treat as a failure.
    CreateAmbiguous,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Api(e) => write!(f, "{e}"),
            CheckError::CreateAmbiguous => {
                write!(f, "check create returned neither an error nor a check id")
            }
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Api(e) => Some(e),
            CheckError::CreateAmbiguous => None,
        }
    }
}

impl From<ApiError> for CheckError {
    fn from(e: ApiError) -> Self {
        CheckError::Api(e)
    }
}

/// Result of [`ensure_present`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentOutcome {
    /// `false` when an equivalent check already existed.
    pub changed: bool,
    /// The matched or newly created record.
    pub check: CheckRecord,
}

/// Result of [`ensure_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentOutcome {
    /// The check is gone after the delete (removed, or was never there —
    /// both collapse to the same idempotent success).
    Removed,
    /// The check survived the delete; a failed removal, surfaced as a
    /// structured result rather than a fault.
    StillPresent,
}

/// Make sure a check equivalent to `spec` exists on `snapshot_id`.
///
/// Existing checks are only considered when their kind is `Existential`;
/// comparison is canonical (metadata-excluded, order-independent). The
/// first match wins and nothing is created.
pub fn ensure_present(
    api: &dyn ForwardApi,
    snapshot_id: i64,
    spec: &CheckSpec,
) -> Result<PresentOutcome, CheckError> {
    if let Some(existing) = find_equivalent(api, snapshot_id, spec)? {
        return Ok(PresentOutcome {
            changed: false,
            check: existing,
        });
    }

    let created = api.create_check(snapshot_id, &spec.to_definition())?;
    if created.id.is_none() {
        return Err(CheckError::CreateAmbiguous);
    }
    Ok(PresentOutcome {
        changed: true,
        check: created,
    })
}

/// Find an existing check equivalent to `spec` on `snapshot_id`, without
/// creating anything. This is the read-only presence probe behind both
/// ensure-present matching and the test operation.
pub fn find_equivalent(
    api: &dyn ForwardApi,
    snapshot_id: i64,
    spec: &CheckSpec,
) -> Result<Option<CheckRecord>, CheckError> {
    let desired_canon = canonical_definition(&spec.to_definition());

    for existing in api.list_checks(snapshot_id)? {
        if !is_existential(&existing.definition) {
            continue;
        }
        if canonical_definition(&existing.definition) == desired_canon {
            return Ok(Some(existing));
        }
    }
    Ok(None)
}

/// Make sure `check_id` is absent from `snapshot_id`.
///
/// Deletes, then re-lists to verify: the server's word on the delete call
/// alone is not trusted.
pub fn ensure_absent(
    api: &dyn ForwardApi,
    snapshot_id: i64,
    check_id: i64,
) -> Result<AbsentOutcome, CheckError> {
    api.delete_check(snapshot_id, check_id)?;

    let still_there = api
        .list_checks(snapshot_id)?
        .iter()
        .any(|c| c.id == Some(check_id));

    if still_there {
        Ok(AbsentOutcome::StillPresent)
    } else {
        Ok(AbsentOutcome::Removed)
    }
}

/// Fetch a check by id; a missing check is an explicit absent result,
/// never an error.
pub fn fetch_check(
    api: &dyn ForwardApi,
    snapshot_id: i64,
    check_id: i64,
) -> Result<Option<CheckRecord>, CheckError> {
    // Records without an id are the remote's "no such check" shape.
    Ok(api
        .get_check(snapshot_id, check_id)?
        .filter(|c| c.id.is_some()))
}
