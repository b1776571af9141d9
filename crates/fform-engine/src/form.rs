#![forbid(unsafe_code)]

//! Async form handle.
//!
//! [`Form`] wraps a [`FormEngine`] in `Rc<RefCell<_>>` and runs the submit
//! handler between [`FormEngine::begin_submit`] and [`FormEngine::settle`].
//! It is `!Send`; drive it on a single-threaded executor.
//!
//! Renderers run after the engine borrow is released, so a renderer may read
//! the form, edit it, submit it or unmount it. Snapshots produced by such a
//! call are delivered after the batch being rendered.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use fform_validate::{FieldValue, FieldValues, ValidationErrors};
use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::config::{FormConfig, SubmitFuture, SubmitHandler};
use crate::engine::{FormEngine, FormRenderer, FormSnapshot, SubmitOutcome, SubmitRequest};
use crate::error::SubmissionError;
use crate::state::SubmissionState;
use crate::trace::{IgnoreReason, SubmissionToken, SubmissionTrace};

/// Engine plus the delivery flag shared by every clone of a [`Form`].
struct Shared {
    engine: RefCell<FormEngine>,
    delivering: Cell<bool>,
}

impl Shared {
    /// Run `f` on the engine, then deliver the snapshots it queued.
    ///
    /// `None` if the engine is already borrowed, which only happens when the
    /// validate callback calls back into the form.
    fn update<R>(&self, f: impl FnOnce(&mut FormEngine) -> R) -> Option<R> {
        let result = {
            let mut engine = self.engine.try_borrow_mut().ok()?;
            f(&mut *engine)
        };
        self.deliver();
        Some(result)
    }

    /// Render queued snapshots with no engine borrow held.
    ///
    /// A nested call (from inside a renderer) returns at once; the outer
    /// loop picks up whatever the nested call queued.
    fn deliver(&self) {
        if self.delivering.replace(true) {
            return;
        }
        loop {
            let Ok(mut engine) = self.engine.try_borrow_mut() else {
                break;
            };
            let snapshots = engine.take_pending();
            if snapshots.is_empty() {
                break;
            }
            let mut renderers = engine.take_renderers();
            drop(engine);

            for snapshot in &snapshots {
                if !self.is_mounted() {
                    break;
                }
                for renderer in &mut renderers {
                    renderer.render(snapshot);
                }
            }

            match self.engine.try_borrow_mut() {
                Ok(mut engine) => engine.restore_renderers(renderers),
                Err(_) => tracing::warn!("form busy after render; renderers dropped"),
            }
        }
        self.delivering.set(false);
    }

    fn is_mounted(&self) -> bool {
        self.engine.try_borrow().is_ok_and(|engine| engine.is_mounted())
    }
}

/// Shared handle to a mounted form.
///
/// Clones share the same engine. Renderers receive a full [`FormSnapshot`]
/// and may call back into the form.
///
/// # Example
///
/// ```rust
/// use fform_engine::{Form, FormConfig, SubmitOutcome};
/// use fform_validate::{ConstraintSet, FieldValues, ValidateOptions};
/// use futures::executor::block_on;
///
/// let form = Form::new(
///     FormConfig::new(FieldValues::new().with("phone", ""))
///         .constraints(ConstraintSet::new().required("phone"), ValidateOptions::new()),
/// );
///
/// assert!(matches!(block_on(form.handle_submit()), SubmitOutcome::Invalid(_)));
/// form.set_value("phone", "5551234");
/// assert_eq!(block_on(form.handle_submit()), SubmitOutcome::Succeeded);
/// ```
#[derive(Clone)]
pub struct Form {
    shared: Rc<Shared>,
    handler: Rc<dyn SubmitHandler>,
}

impl Form {
    /// Mount a form from its configuration.
    #[must_use]
    pub fn new(config: FormConfig) -> Self {
        let FormConfig {
            initial_values,
            validate,
            on_submit,
            trace,
        } = config;
        let mut engine = FormEngine::new(initial_values, validate);
        if trace {
            engine = engine.with_trace();
        }
        engine.defer_rendering();
        Self {
            shared: Rc::new(Shared {
                engine: RefCell::new(engine),
                delivering: Cell::new(false),
            }),
            handler: on_submit,
        }
    }

    /// The submit action.
    ///
    /// Validation runs and the handler is called before this returns; the
    /// returned future resolves once the handler's future does. Dropping it
    /// early settles the submission as cancelled.
    pub fn handle_submit(&self) -> LocalBoxFuture<'static, SubmitOutcome> {
        let request = self.shared.update(FormEngine::begin_submit).unwrap_or_else(|| {
            tracing::debug!("submit re-entered during validation; ignoring");
            SubmitRequest::Ignored(IgnoreReason::Busy)
        });

        let (pending, guard) = match request {
            SubmitRequest::Started(pending) => {
                let guard = SettleGuard::new(Rc::downgrade(&self.shared), pending.token);
                (pending, guard)
            }
            SubmitRequest::Rejected(errors) => {
                return futures::future::ready(SubmitOutcome::Invalid(errors)).boxed_local();
            }
            SubmitRequest::Ignored(reason) => {
                return futures::future::ready(SubmitOutcome::Ignored(reason)).boxed_local();
            }
        };

        let submission: SubmitFuture = self.handler.submit(pending.values);
        async move {
            let result = submission.await;
            guard.settle(result)
        }
        .boxed_local()
    }

    /// Set a field value. Returns `false` if the edit was ignored.
    pub fn set_value(&self, field: impl Into<String>, value: impl Into<FieldValue>) -> bool {
        self.shared
            .update(|engine| engine.set_value(field, value))
            .unwrap_or_else(|| {
                tracing::debug!("field edit re-entered during validation; ignoring");
                false
            })
    }

    /// Current values.
    #[must_use]
    pub fn values(&self) -> FieldValues {
        self.shared.engine.borrow().values().clone()
    }

    /// Current text value of a field.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        self.shared.engine.borrow().values().text(field).map(str::to_owned)
    }

    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        self.shared.engine.borrow().snapshot()
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.shared.engine.borrow().state()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.shared.engine.borrow().is_submitting()
    }

    #[must_use]
    pub fn field_errors(&self) -> ValidationErrors {
        self.shared.engine.borrow().field_errors().clone()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<SubmissionError> {
        self.shared.engine.borrow().last_error().cloned()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.engine.borrow().is_dirty()
    }

    /// Register a renderer; it is rendered once immediately.
    pub fn subscribe(&self, mut renderer: impl FormRenderer + 'static) {
        let Ok(snapshot) = self.shared.engine.try_borrow().map(|engine| engine.snapshot()) else {
            tracing::debug!("subscribe re-entered during validation; ignoring");
            return;
        };
        renderer.render(&snapshot);
        if self
            .shared
            .update(|engine| engine.add_renderer(Box::new(renderer)))
            .is_none()
        {
            tracing::debug!("subscribe re-entered during validation; ignoring");
        }
    }

    /// Run validation and expose the errors without submitting.
    pub fn revalidate(&self) -> ValidationErrors {
        self.shared
            .update(|engine| engine.revalidate().clone())
            .unwrap_or_default()
    }

    /// Restore initial values. Only while idle.
    pub fn reset(&self) -> bool {
        self.shared.update(FormEngine::reset).unwrap_or(false)
    }

    /// Detach the form; a pending submission settles as a no-op.
    pub fn unmount(&self) {
        if self.shared.update(FormEngine::unmount).is_none() {
            tracing::debug!("unmount re-entered during validation; ignoring");
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.shared.is_mounted()
    }

    /// Copy of the lifecycle trace, if enabled with [`FormConfig::trace`].
    #[must_use]
    pub fn trace(&self) -> Option<SubmissionTrace> {
        self.shared.engine.borrow().trace().cloned()
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("engine", &self.shared.engine)
            .finish_non_exhaustive()
    }
}

/// Settles a submission exactly once, as cancelled if dropped unsettled.
///
/// Holds only a weak reference so a pending submit never keeps the form alive.
struct SettleGuard {
    shared: Weak<Shared>,
    token: SubmissionToken,
    armed: bool,
}

impl SettleGuard {
    fn new(shared: Weak<Shared>, token: SubmissionToken) -> Self {
        Self {
            shared,
            token,
            armed: true,
        }
    }

    fn settle(mut self, result: Result<(), SubmissionError>) -> SubmitOutcome {
        self.armed = false;
        self.apply(result)
    }

    fn apply(&self, result: Result<(), SubmissionError>) -> SubmitOutcome {
        let Some(shared) = self.shared.upgrade() else {
            tracing::trace!(token = %self.token, "form dropped before settle");
            return SubmitOutcome::Abandoned;
        };
        let token = self.token;
        shared
            .update(|engine| engine.settle(token, result))
            .unwrap_or_else(|| {
                tracing::warn!(%token, "form busy at settle; submission abandoned");
                SubmitOutcome::Abandoned
            })
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            let _ = self.apply(Err(SubmissionError::cancelled()));
        }
    }
}
