#![forbid(unsafe_code)]

//! End-to-end tests for the async submission lifecycle.
//!
//! These tests drive a sign-in style [`Form`] through `handle_submit` with a
//! handler that can be held in flight on a oneshot channel, covering:
//!
//! - Rejection by validation (handler never called)
//! - The full success path and its transition sequence
//! - Handler failure surfaced as a value and stored as `last_error`
//! - Re-entrant submits and edits while submitting
//! - Unmount while a submission is pending
//!
//! # Invariants
//!
//! 1. **Validation gate**: invalid values never reach the handler.
//! 2. **Single flight**: at most one handler call per accepted submit; requests
//!    while busy are dropped, not queued.
//! 3. **Return to idle**: every settled submission ends in `Idle`.
//! 4. **Trace consistency**: `SubmissionTrace::verify_invariants` is empty
//!    after every scenario.
//!
//! # Failure Modes
//!
//! | Scenario | Expected Behavior |
//! |----------|-------------------|
//! | Handler returns `Err` | `SubmitOutcome::Failed`, `last_error` set, state `Idle` |
//! | Submit while submitting | `SubmitOutcome::Ignored(Busy)` immediately |
//! | Unmount while submitting | Settle is a no-op, `SubmitOutcome::Abandoned` |
//! | Renderer unmounts on success | No panic; later snapshots are not delivered |
//!
//! Run: `cargo test -p fform-engine --test submission_lifecycle_e2e`

use std::cell::RefCell;
use std::rc::Rc;

use fform_engine::{
    Form, FormConfig, FormSnapshot, IgnoreReason, SubmissionError, SubmissionState,
    SubmitOutcome,
};
use fform_validate::{
    ConstraintSet, ERROR_CODE_REQUIRED, ERROR_CODE_TOO_SHORT, FieldValues, ValidateOptions,
};
use futures::channel::oneshot;
use futures::executor::block_on;

use fform_engine::SubmissionState::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Gate = oneshot::Sender<Result<(), SubmissionError>>;

/// Records every handler call and hands back a sender that settles it.
#[derive(Default)]
struct Backend {
    calls: RefCell<Vec<FieldValues>>,
    gates: RefCell<Vec<Gate>>,
}

impl Backend {
    fn calls(&self) -> Vec<FieldValues> {
        self.calls.borrow().clone()
    }

    fn release(&self, result: Result<(), SubmissionError>) {
        let gate = self.gates.borrow_mut().remove(0);
        gate.send(result).unwrap();
    }
}

fn sign_in_rules() -> ConstraintSet {
    ConstraintSet::new()
        .required("phone")
        .required("password")
        .length("password", 6, 100)
}

fn sign_in_form(phone: &str, password: &str) -> (Form, Rc<Backend>) {
    let backend = Rc::new(Backend::default());
    let handler_backend = Rc::clone(&backend);
    let config = FormConfig::new(
        FieldValues::new()
            .with("phone", phone)
            .with("password", password)
            .with("withRefresh", true),
    )
    .constraints(sign_in_rules(), ValidateOptions::new())
    .trace(true)
    .on_submit(move |values: FieldValues| {
        let (tx, rx) = oneshot::channel();
        handler_backend.calls.borrow_mut().push(values);
        handler_backend.gates.borrow_mut().push(tx);
        async move {
            rx.await
                .unwrap_or_else(|_| Err(SubmissionError::new("backend dropped")))
        }
    });
    (Form::new(config), backend)
}

fn record_states(form: &Form) -> Rc<RefCell<Vec<SubmissionState>>> {
    let states = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&states);
    form.subscribe(move |snap: &FormSnapshot| {
        let mut states = sink.borrow_mut();
        if states.last() != Some(&snap.state) {
            states.push(snap.state);
        }
    });
    states
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn invalid_values_never_reach_handler() {
    let (form, backend) = sign_in_form("", "abc");

    let outcome = block_on(form.handle_submit());

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected Invalid, got {outcome:?}");
    };
    assert_eq!(errors.get("phone").unwrap()[0].code, ERROR_CODE_REQUIRED);
    assert_eq!(errors.get("password").unwrap()[0].code, ERROR_CODE_TOO_SHORT);
    assert!(backend.calls().is_empty());
    assert_eq!(form.state(), Idle);
    assert_eq!(form.field_errors(), errors);
    assert!(form.trace().unwrap().verify_invariants().is_empty());
}

#[test]
fn valid_values_walk_full_lifecycle() {
    let (form, backend) = sign_in_form("5551234", "secret1");
    let states = record_states(&form);

    let pending = form.handle_submit();
    assert_eq!(form.state(), Submitting);
    assert!(form.is_submitting());
    backend.release(Ok(()));

    assert_eq!(block_on(pending), SubmitOutcome::Succeeded);
    assert_eq!(
        *states.borrow(),
        [Idle, Validating, Submitting, Succeeded, Idle]
    );
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text("phone"), Some("5551234"));
    assert_eq!(calls[0].text("password"), Some("secret1"));
    assert!(form.field_errors().is_empty());
    assert!(form.trace().unwrap().verify_invariants().is_empty());
}

#[test]
fn second_submit_while_submitting_is_ignored() {
    let (form, backend) = sign_in_form("5551234", "secret1");

    let first = form.handle_submit();
    let second = block_on(form.handle_submit());
    assert_eq!(second, SubmitOutcome::Ignored(IgnoreReason::Busy));

    backend.release(Ok(()));
    assert_eq!(block_on(first), SubmitOutcome::Succeeded);
    assert_eq!(backend.calls().len(), 1);
    assert_eq!(form.snapshot().submit_count, 1);
}

#[test]
fn edits_dropped_while_submitting() {
    let (form, backend) = sign_in_form("5551234", "secret1");

    let pending = form.handle_submit();
    assert!(!form.set_value("phone", "000"));
    backend.release(Ok(()));
    block_on(pending);

    assert_eq!(form.text("phone").as_deref(), Some("5551234"));
    assert!(form.set_value("phone", "000"));
}

#[test]
fn handler_failure_is_a_value() {
    let (form, backend) = sign_in_form("5551234", "secret1");
    let states = record_states(&form);

    let pending = form.handle_submit();
    backend.release(Err(SubmissionError::new("invalid credentials")));

    let outcome = block_on(pending);
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(SubmissionError::new("invalid credentials"))
    );
    assert_eq!(form.state(), Idle);
    assert_eq!(
        form.last_error().map(|e| e.message().to_string()).as_deref(),
        Some("invalid credentials")
    );
    assert_eq!(*states.borrow(), [Idle, Validating, Submitting, Failed, Idle]);

    // The user can retry.
    let retry = form.handle_submit();
    backend.release(Ok(()));
    assert_eq!(block_on(retry), SubmitOutcome::Succeeded);
    assert_eq!(form.last_error(), None);
    assert!(form.trace().unwrap().verify_invariants().is_empty());
}

#[test]
fn unmount_while_submitting_abandons_settle() {
    let (form, backend) = sign_in_form("5551234", "secret1");
    let pending = form.handle_submit();

    form.unmount();
    backend.release(Err(SubmissionError::new("too late")));

    assert_eq!(block_on(pending), SubmitOutcome::Abandoned);
    assert_eq!(form.last_error(), None);
    assert_eq!(
        block_on(form.handle_submit()),
        SubmitOutcome::Ignored(IgnoreReason::Unmounted)
    );
    assert_eq!(backend.calls().len(), 1);
}

#[test]
fn fixing_values_after_rejection_submits() {
    let (form, backend) = sign_in_form("", "abc");
    assert!(matches!(
        block_on(form.handle_submit()),
        SubmitOutcome::Invalid(_)
    ));

    form.set_value("phone", "5551234");
    form.set_value("password", "secret1");
    let pending = form.handle_submit();
    backend.release(Ok(()));

    assert_eq!(block_on(pending), SubmitOutcome::Succeeded);
    assert_eq!(form.snapshot().submit_count, 2);
    assert_eq!(backend.calls().len(), 1);
}

#[test]
fn identical_runs_have_identical_traces() {
    let run = || {
        let (form, backend) = sign_in_form("5551234", "secret1");
        let first = form.handle_submit();
        let _ = block_on(form.handle_submit());
        backend.release(Err(SubmissionError::new("offline")));
        block_on(first);
        let second = form.handle_submit();
        backend.release(Ok(()));
        block_on(second);
        form.trace().unwrap()
    };
    let (a, b) = (run(), run());
    assert_eq!(a.checksum(), b.checksum());
    assert_eq!(a.count("started"), 2);
    assert_eq!(a.count("dropped"), 1);
    assert!(a.verify_invariants().is_empty());
}

#[test]
fn renderer_navigating_away_on_success_unmounts_cleanly() {
    let (form, backend) = sign_in_form("5551234", "secret1");
    let states = record_states(&form);
    let screen = form.clone();
    form.subscribe(move |snap: &FormSnapshot| {
        if snap.state == Succeeded {
            screen.unmount();
        }
    });

    let pending = form.handle_submit();
    assert!(form.is_submitting());
    backend.release(Ok(()));

    assert_eq!(block_on(pending), SubmitOutcome::Succeeded);
    assert!(!form.is_mounted());
    assert_eq!(*states.borrow(), [Idle, Validating, Submitting, Succeeded]);
    assert_eq!(
        block_on(form.handle_submit()),
        SubmitOutcome::Ignored(IgnoreReason::Unmounted)
    );
    assert!(form.trace().unwrap().verify_invariants().is_empty());
}
