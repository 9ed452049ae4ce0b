//! Species resolution
//!
//! Operations that produce a new view (`slice`, `map`, `filter`,
//! `subarray`) ask the source view which constructor to use. The answer
//! comes from the view's constructor property and that constructor's
//! species slot, falling back to the intrinsic constructor of the view's
//! element kind. Whatever a constructor returns is validated before use.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::buffer::Buffer;
use crate::error::{ViewError, ViewResult};
use crate::kind::ElementKind;
use crate::view::{Receiver, TypedView};

/// Something that can construct views.
pub trait ViewFactory: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Construct a view of at least `length` elements.
    fn construct_with_length(&self, length: usize) -> ViewResult<Receiver>;

    /// Construct a view over `length` elements of `buffer` at `byte_offset`.
    fn construct_with_buffer(
        &self,
        buffer: Buffer,
        byte_offset: usize,
        length: usize,
    ) -> ViewResult<Receiver>;

    /// Element kind when this is an intrinsic constructor. Lets `from`
    /// take its bulk paths.
    fn intrinsic_kind(&self) -> Option<ElementKind> {
        None
    }
}

/// Shared handle to a constructor.
pub type Constructor = Arc<dyn ViewFactory>;

impl fmt::Debug for dyn ViewFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewFactory({})", self.name())
    }
}

/// The built-in constructor of one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntrinsicConstructor(pub ElementKind);

impl ViewFactory for IntrinsicConstructor {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn construct_with_length(&self, length: usize) -> ViewResult<Receiver> {
        TypedView::new(self.0, length).map(Receiver::View)
    }

    fn construct_with_buffer(
        &self,
        buffer: Buffer,
        byte_offset: usize,
        length: usize,
    ) -> ViewResult<Receiver> {
        TypedView::with_buffer(self.0, buffer, byte_offset, Some(length)).map(Receiver::View)
    }

    fn intrinsic_kind(&self) -> Option<ElementKind> {
        Some(self.0)
    }
}

/// Intrinsic constructor for `kind`.
pub fn default_constructor(kind: ElementKind) -> Constructor {
    Arc::new(IntrinsicConstructor(kind))
}

/// Value of a constructor's species slot.
#[derive(Clone)]
pub enum Species {
    Undefined,
    Null,
    Constructor(Constructor),
    /// Any value that cannot construct, described for diagnostics
    NotConstructor(String),
}

/// What a view reports as its constructor.
#[derive(Clone, Default)]
pub enum ConstructorProperty {
    /// The intrinsic constructor of the view's kind
    #[default]
    Intrinsic,
    Undefined,
    /// A primitive, described for diagnostics
    NonObject(String),
    /// An object whose species slot holds the given value
    Object(Species),
}

impl fmt::Debug for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Undefined => f.write_str("Undefined"),
            Species::Null => f.write_str("Null"),
            Species::Constructor(ctor) => write!(f, "Constructor({})", ctor.name()),
            Species::NotConstructor(what) => write!(f, "NotConstructor({})", what),
        }
    }
}

impl fmt::Debug for ConstructorProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorProperty::Intrinsic => f.write_str("Intrinsic"),
            ConstructorProperty::Undefined => f.write_str("Undefined"),
            ConstructorProperty::NonObject(what) => write!(f, "NonObject({})", what),
            ConstructorProperty::Object(species) => write!(f, "Object({:?})", species),
        }
    }
}

/// Pick the constructor for results derived from `view`.
pub fn resolve_constructor(view: &TypedView, op: &'static str) -> ViewResult<Constructor> {
    let kind = view.kind();
    let ctor = match view.constructor_property() {
        ConstructorProperty::Intrinsic | ConstructorProperty::Undefined => default_constructor(kind),
        ConstructorProperty::NonObject(what) => {
            return Err(ViewError::NotConstructor { op, what });
        }
        ConstructorProperty::Object(species) => match species {
            Species::Undefined | Species::Null => default_constructor(kind),
            Species::Constructor(ctor) => ctor,
            Species::NotConstructor(what) => {
                return Err(ViewError::NotConstructor { op, what });
            }
        },
    };
    debug!(op, kind = %kind, constructor = ctor.name(), "resolved species constructor");
    Ok(ctor)
}

/// Construct with a length and validate the result.
pub fn create_with_length(
    ctor: &dyn ViewFactory,
    length: usize,
    op: &'static str,
) -> ViewResult<TypedView> {
    let view = ctor.construct_with_length(length)?.validate(op)?;
    let actual = view.length();
    if actual < length {
        return Err(ViewError::ShortResult {
            op,
            requested: length,
            actual,
        });
    }
    Ok(view)
}

/// Construct over a buffer window. The result need not be attached.
pub fn create_with_buffer(
    ctor: &dyn ViewFactory,
    buffer: Buffer,
    byte_offset: usize,
    length: usize,
    op: &'static str,
) -> ViewResult<TypedView> {
    ctor.construct_with_buffer(buffer, byte_offset, length)?
        .unwrap_view(op)
}

/// [`create_with_length`] through `exemplar`'s species, requiring the same
/// content type.
pub fn species_create_with_length(
    exemplar: &TypedView,
    length: usize,
    op: &'static str,
) -> ViewResult<TypedView> {
    let ctor = resolve_constructor(exemplar, op)?;
    let result = create_with_length(ctor.as_ref(), length, op)?;
    check_content_type(exemplar, &result, op)?;
    Ok(result)
}

/// [`create_with_buffer`] through `exemplar`'s species, requiring the same
/// content type.
pub fn species_create_with_buffer(
    exemplar: &TypedView,
    buffer: Buffer,
    byte_offset: usize,
    length: usize,
    op: &'static str,
) -> ViewResult<TypedView> {
    let ctor = resolve_constructor(exemplar, op)?;
    let result = create_with_buffer(ctor.as_ref(), buffer, byte_offset, length, op)?;
    check_content_type(exemplar, &result, op)?;
    Ok(result)
}

fn check_content_type(exemplar: &TypedView, result: &TypedView, op: &'static str) -> ViewResult<()> {
    let from = exemplar.kind().content_type();
    let to = result.kind().content_type();
    if from != to {
        return Err(ViewError::ContentType {
            op,
            from: from.name(),
            to: to.name(),
        });
    }
    Ok(())
}
