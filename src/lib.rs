//! typed-view - Detachable Typed Memory Views
//!
//! Typed views over raw byte buffers, with the full set of array-like
//! operations and a specialized sort engine. The central difficulty is that
//! user code runs in the middle of operations (callbacks, comparators,
//! value coercion, species constructors) and that code may detach or resize
//! the very buffer being operated on. Every operation is written to notice.
//!
//! # Features
//!
//! - **Eleven element kinds**: 8/16/32-bit integers, clamped bytes, 32/64-bit
//!   floats and 64-bit big integers, stored in native byte order
//! - **Detachable storage**: exclusive array buffers (optionally resizable)
//!   and never-detachable shared buffers safe to use from several threads
//! - **Species-aware results**: `slice`, `map`, `filter` and `subarray`
//!   build their result through the source view's constructor
//! - **Sort engine**: counting, radix, quick and stable merge sort, chosen
//!   by element kind and comparator
//!
//! # Example
//!
//! ```rust
//! use typed_view::{ElementKind, TypedView, Value};
//!
//! let view = TypedView::from_numbers(ElementKind::Int16, &[3.0, -1.0, 2.0]).unwrap();
//! view.sort(&Value::Undefined).unwrap();
//! assert_eq!(view.to_f64_vec().unwrap(), vec![-1.0, 2.0, 3.0]);
//!
//! let tail = view.subarray(&Value::from(1), &Value::Undefined).unwrap();
//! tail.fill(&Value::from(0), &Value::Undefined, &Value::Undefined).unwrap();
//! assert_eq!(view.to_f64_vec().unwrap(), vec![-1.0, 0.0, 0.0]);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  ops / sort  │──▶│   species    │──▶│ ViewFactory  │  user constructors
//! └──────┬───────┘   └──────────────┘   └──────────────┘
//!        │ live()
//!        ▼
//! ┌──────────────┐   ┌──────────────┐
//! │  TypedView   │──▶│    Buffer    │  ArrayBuffer | SharedArrayBuffer
//! └──────────────┘   └──────────────┘
//! ```

pub mod bounds;
pub mod buffer;
pub mod config;
pub mod error;
pub mod format;
pub mod iter;
pub mod kind;
pub mod ops;
pub mod sort;
pub mod species;
pub mod value;
pub mod view;

pub use bounds::Bounds;
pub use buffer::{
    ArrayBuffer, Buffer, BufferConstructor, BufferFactory, BufferStore, IntrinsicBufferConstructor,
    SharedArrayBuffer,
};
pub use config::{ConfigError, EngineConfig};
pub use error::{ViewError, ViewResult};
pub use format::{LocaleFormatter, PlainFormatter};
pub use iter::{ArrayIteratorFactory, IterationMode, IteratorFactory, SequenceItem, ViewSequence};
pub use kind::{ContentType, ElementKind};
pub use ops::{ArrayLike, Source};
pub use sort::SortStrategy;
pub use species::{
    default_constructor, resolve_constructor, Constructor, ConstructorProperty,
    IntrinsicConstructor, Species, ViewFactory,
};
pub use value::{Numeric, ScriptFunction, ScriptObject, Value};
pub use view::{LiveView, Receiver, TypedView, ViewLength, WrappedView};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
