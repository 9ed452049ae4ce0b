//! Operation receivers
//!
//! Operations can be invoked on a view directly, on a wrapper standing for a
//! view from another context, or on something that is not a view at all.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::TypedView;
use crate::error::{ViewError, ViewResult};

/// A view reached through another context. Revoking the wrapper cuts access.
#[derive(Debug, Clone)]
pub struct WrappedView {
    target: TypedView,
    revoked: Arc<AtomicBool>,
}

impl WrappedView {
    pub fn new(target: TypedView) -> Self {
        Self {
            target,
            revoked: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }

    /// The wrapped view, unless revoked.
    pub fn target(&self) -> Option<&TypedView> {
        if self.is_revoked() {
            None
        } else {
            Some(&self.target)
        }
    }
}

/// The `this` of a view operation.
#[derive(Debug, Clone)]
pub enum Receiver {
    View(TypedView),
    Wrapped(WrappedView),
    /// Anything else, described for diagnostics
    Other(String),
}

impl Receiver {
    /// The underlying view, without checking liveness.
    pub fn unwrap_view(&self, op: &'static str) -> ViewResult<TypedView> {
        match self {
            Receiver::View(view) => Ok(view.clone()),
            Receiver::Wrapped(wrapped) => wrapped
                .target()
                .cloned()
                .ok_or(ViewError::WrongReceiver { op }),
            Receiver::Other(_) => Err(ViewError::WrongReceiver { op }),
        }
    }

    /// The underlying view, which must be attached and in bounds.
    pub fn validate(&self, op: &'static str) -> ViewResult<TypedView> {
        let view = self.unwrap_view(op)?;
        view.live().check(op)?;
        Ok(view)
    }

    /// Run `f` against the underlying view. `f` does its own liveness checks.
    pub fn invoke<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&TypedView) -> ViewResult<R>,
    ) -> ViewResult<R> {
        let view = self.unwrap_view(op)?;
        f(&view)
    }
}

impl From<TypedView> for Receiver {
    fn from(view: TypedView) -> Self {
        Receiver::View(view)
    }
}

impl From<WrappedView> for Receiver {
    fn from(wrapped: WrappedView) -> Self {
        Receiver::Wrapped(wrapped)
    }
}
