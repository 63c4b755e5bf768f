//! Then steps for request lifecycle scenarios.

use super::world::{LifecycleWorld, run_async};
use rstest_bdd_macros::then;
use towline::client::{BackendError, ClaimOutcome, ClientError};
use towline::request::domain::{RequestDomainError, RequestStatus};

#[then(r#"the request status is "{status}""#)]
fn request_status_is(world: &LifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = RequestStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let request_id = world.created()?.request_id;
    let view = run_async(world.cast()?.customer_backend.get_request(request_id))?;

    if view.request.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            view.request.status()
        ));
    }
    Ok(())
}

#[then("the request has {count:usize} audit events")]
fn request_has_events(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let request_id = world.created()?.request_id;
    let events = run_async(world.cast()?.customer_backend.get_request_events(request_id))?;

    if events.len() != count {
        return Err(eyre::eyre!("expected {count} events, found {}", events.len()));
    }
    Ok(())
}

#[then(r#"operator "{name}" is told the request is no longer available"#)]
fn claim_was_lost(world: &LifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let outcome = world
        .claims
        .get(&name)
        .ok_or_else(|| eyre::eyre!("operator {name} never tried to claim"))?;

    match outcome {
        Ok(ClaimOutcome::NoLongerAvailable { refreshed }) if refreshed.is_empty() => Ok(()),
        other => Err(eyre::eyre!(
            "expected a lost claim with nothing left, got {other:?}"
        )),
    }
}

#[then("the cancellation is refused for a missing reason")]
fn cancellation_refused(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(ClientError::Invalid(RequestDomainError::EmptyCancellationReason)) => Ok(()),
        other => Err(eyre::eyre!("expected a missing reason error, got {other:?}")),
    }
}

#[then("PIN verification is locked")]
fn verification_locked(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_verification
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no PIN was entered"))?;

    match result {
        Err(ClientError::Backend(err @ BackendError::Rejected { .. }))
            if err.code() == Some("pin_locked") =>
        {
            Ok(())
        }
        other => Err(eyre::eyre!("expected a PIN lockout, got {other:?}")),
    }
}

#[then("the customer is sent back to the open request")]
fn sent_back_to_open_request(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let request_id = world.created()?.request_id;
    match &world.last_error {
        Some(ClientError::ActiveRequestExists(open)) if *open == request_id => Ok(()),
        other => Err(eyre::eyre!("expected the open request, got {other:?}")),
    }
}
