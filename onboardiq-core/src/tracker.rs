//! Progress tracker: turns a matched stage into at most one durable completion.

use crate::catalog::Stage;
use crate::db::CompletionStore;
use crate::error::Result;
use crate::session::SessionState;
use crate::types::Outcome;

/// Record `stage` for the session's user unless it is already completed.
///
/// The store append happens before the in-memory set is updated, so a failed
/// write leaves the session unchanged and the error reaches the caller.
pub fn record_if_new<S: CompletionStore>(
    session: &mut SessionState,
    stage: &Stage,
    store: &S,
) -> Result<Outcome> {
    if session.is_completed(&stage.name) {
        tracing::debug!(user = session.user(), stage = %stage.name, "Stage already completed");
        return Ok(Outcome::AlreadyCompleted);
    }

    store.append_completion(session.user(), &stage.name)?;
    session.mark_completed(&stage.name);

    tracing::info!(
        user = session.user(),
        stage = %stage.name,
        completed = session.completed().len(),
        "Stage completed"
    );
    Ok(Outcome::NewlyCompleted)
}
