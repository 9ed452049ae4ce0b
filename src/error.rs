//! Error types for typed view operations
//!
//! Every failure names the operation that raised it so the failing call can
//! be reproduced. `ViewError::tag` maps each variant onto the taxonomy used
//! by callers that only care about the error class.

use thiserror::Error;

/// Error raised by buffer, view, species and sort operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    /// The buffer was detached before or during the operation.
    #[error("{op}: typed view's buffer is detached")]
    DetachedBuffer { op: &'static str },

    /// The view no longer fits inside its (resized) buffer.
    #[error("{op}: typed view is out of bounds of its buffer")]
    OutOfBounds { op: &'static str },

    /// A species or constructor slot does not hold a usable constructor.
    #[error("{op}: {what} is not a constructor")]
    NotConstructor { op: &'static str, what: String },

    /// A constructor produced a view or buffer shorter than requested.
    #[error("{op}: constructed result has length {actual}, expected at least {requested}")]
    ShortResult {
        op: &'static str,
        requested: usize,
        actual: usize,
    },

    /// A buffer constructor handed back the buffer being sliced.
    #[error("{op}: constructor returned the source buffer")]
    SameBuffer { op: &'static str },

    /// A buffer constructor produced the wrong kind of buffer.
    #[error("{op}: constructor returned {found}, expected {expected}")]
    BufferVariant {
        op: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A callback argument is not callable.
    #[error("{op}: argument {arg_index} is not a function")]
    NotCallable { op: &'static str, arg_index: usize },

    /// Reduce of a view with no elements and no initial value.
    #[error("{op}: reduce of empty view with no initial value")]
    EmptyReduction { op: &'static str },

    /// The receiver is neither a view nor a usable wrapped view.
    #[error("{op}: receiver is not a typed view")]
    WrongReceiver { op: &'static str },

    /// A big integer met a number element kind, or the other way around.
    #[error("{op}: cannot convert {from} to {to}")]
    ContentType {
        op: &'static str,
        from: &'static str,
        to: &'static str,
    },

    /// Invalid length, offset or allocation size.
    #[error("{op}: {message}")]
    Range { op: &'static str, message: String },

    /// Shared buffers cannot be detached.
    #[error("{op}: shared buffers cannot be detached")]
    NotDetachable { op: &'static str },

    /// A user callback raised an error.
    #[error("callback raised: {0}")]
    Thrown(String),
}

impl ViewError {
    /// Taxonomy tag of this error.
    pub fn tag(&self) -> &'static str {
        match self {
            ViewError::DetachedBuffer { .. } => "DetachedBufferError",
            ViewError::OutOfBounds { .. } => "OutOfBoundsError",
            ViewError::NotConstructor { .. } => "NotConstructorError",
            ViewError::ShortResult { .. } => "ShortResultError",
            ViewError::SameBuffer { .. } => "SameBufferError",
            ViewError::BufferVariant { .. } => "BufferVariantError",
            ViewError::NotCallable { .. } => "NotCallableError",
            ViewError::EmptyReduction { .. } => "EmptyReductionError",
            ViewError::WrongReceiver { .. } => "WrongReceiverError",
            ViewError::ContentType { .. } => "ContentTypeError",
            ViewError::Range { .. } => "RangeError",
            ViewError::NotDetachable { .. } => "NotDetachableError",
            ViewError::Thrown(_) => "ThrownError",
        }
    }

    /// Operation that raised the error, if known.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            ViewError::DetachedBuffer { op }
            | ViewError::OutOfBounds { op }
            | ViewError::NotConstructor { op, .. }
            | ViewError::ShortResult { op, .. }
            | ViewError::SameBuffer { op }
            | ViewError::BufferVariant { op, .. }
            | ViewError::NotCallable { op, .. }
            | ViewError::EmptyReduction { op }
            | ViewError::WrongReceiver { op }
            | ViewError::ContentType { op, .. }
            | ViewError::Range { op, .. }
            | ViewError::NotDetachable { op } => Some(op),
            ViewError::Thrown(_) => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, ViewError::DetachedBuffer { .. })
    }

    pub(crate) fn range(op: &'static str, message: impl Into<String>) -> Self {
        ViewError::Range {
            op,
            message: message.into(),
        }
    }
}

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
