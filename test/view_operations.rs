//! View Operation Integration Tests
//!
//! Exercises the public view API end to end: construction over buffers,
//! window operations, callbacks, searches, text conversion, iteration and
//! the static constructors.

use std::sync::Arc;

use typed_view::{
    ArrayBuffer, Buffer, BufferFactory, BufferStore, ElementKind, IntrinsicBufferConstructor,
    IntrinsicConstructor, Numeric, SequenceItem, SharedArrayBuffer, Source, TypedView, Value,
    ViewError, ViewResult,
};

fn int32(values: &[f64]) -> TypedView {
    TypedView::from_numbers(ElementKind::Int32, values).unwrap()
}

fn numbers(view: &TypedView) -> Vec<f64> {
    view.to_f64_vec().unwrap()
}

fn undefined() -> Value {
    Value::Undefined
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_small_views_start_inline() {
    let view = TypedView::new(ElementKind::Float64, 4).unwrap();
    assert!(view.has_inline_storage());
    assert_eq!(view.byte_length(), 32);

    let buffer = view.buffer();
    assert!(!view.has_inline_storage());
    assert_eq!(buffer.byte_length(), 32);
    assert!(view.buffer().ptr_eq(&buffer));
}

#[test]
fn test_large_views_allocate_a_buffer() {
    let view = TypedView::new(ElementKind::Uint8, 4096).unwrap();
    assert!(!view.has_inline_storage());
    assert_eq!(view.length(), 4096);
}

#[test]
fn test_inline_contents_survive_materialization() {
    let view = int32(&[1.0, 2.0, 3.0]);
    let buffer = view.buffer();
    let other = TypedView::with_buffer(ElementKind::Int32, buffer, 4, Some(2)).unwrap();
    assert_eq!(numbers(&other), vec![2.0, 3.0]);

    other.set(0, &Value::from(20)).unwrap();
    assert_eq!(numbers(&view), vec![1.0, 20.0, 3.0]);
}

#[test]
fn test_with_buffer_validation() {
    let buffer = Buffer::from(ArrayBuffer::new(10).unwrap());

    let misaligned = TypedView::with_buffer(ElementKind::Int32, buffer.clone(), 2, None).unwrap_err();
    assert_eq!(misaligned.tag(), "RangeError");

    // 10 bytes is not a whole number of Int32 elements.
    let ragged = TypedView::with_buffer(ElementKind::Int32, buffer.clone(), 0, None).unwrap_err();
    assert_eq!(ragged.tag(), "RangeError");

    let too_long = TypedView::with_buffer(ElementKind::Int16, buffer.clone(), 4, Some(4)).unwrap_err();
    assert_eq!(too_long.tag(), "RangeError");

    let fits = TypedView::with_buffer(ElementKind::Int16, buffer, 4, Some(3)).unwrap();
    assert_eq!(fits.length(), 3);
    assert_eq!(fits.byte_offset(), 4);
}

#[test]
fn test_views_share_one_buffer() {
    let buffer = Buffer::from(ArrayBuffer::new(8).unwrap());
    let bytes = TypedView::with_buffer(ElementKind::Uint8, buffer.clone(), 0, None).unwrap();
    let words = TypedView::with_buffer(ElementKind::Uint32, buffer, 0, None).unwrap();

    words.set(1, &Value::from(u32::MAX as f64)).unwrap();
    assert_eq!(numbers(&bytes), vec![0.0, 0.0, 0.0, 0.0, 255.0, 255.0, 255.0, 255.0]);
}

#[test]
fn test_set_out_of_range_is_ignored() {
    let view = int32(&[1.0, 2.0]);
    assert!(!view.set(2, &Value::from(9)).unwrap());
    assert!(view.set(1, &Value::from(9)).unwrap());
    assert_eq!(numbers(&view), vec![1.0, 9.0]);
    assert_eq!(view.get(5), None);
}

#[test]
fn test_element_conversions() {
    let clamped = TypedView::new(ElementKind::Uint8Clamped, 5).unwrap();
    for (k, v) in [300.0, -5.0, 2.5, 3.5, f64::NAN].iter().enumerate() {
        clamped.set(k, &Value::from(*v)).unwrap();
    }
    assert_eq!(numbers(&clamped), vec![255.0, 0.0, 2.0, 4.0, 0.0]);

    let int8 = TypedView::new(ElementKind::Int8, 3).unwrap();
    int8.set(0, &Value::from(200)).unwrap();
    int8.set(1, &Value::from(-129.9)).unwrap();
    int8.set(2, &Value::from(f64::INFINITY)).unwrap();
    assert_eq!(numbers(&int8), vec![-56.0, 127.0, 0.0]);

    let f32s = TypedView::new(ElementKind::Float32, 1).unwrap();
    f32s.set(0, &Value::from(0.1)).unwrap();
    assert_eq!(f32s.get(0), Some(Numeric::Number(0.1f32 as f64)));

    let big = TypedView::new(ElementKind::BigUint64, 1).unwrap();
    big.set(0, &Value::BigInt(-1)).unwrap();
    assert_eq!(big.get(0), Some(Numeric::BigInt(u64::MAX as i128)));
}

#[test]
fn test_content_type_mismatch() {
    let big = TypedView::new(ElementKind::BigInt64, 1).unwrap();
    assert_eq!(big.set(0, &Value::from(1)).unwrap_err().tag(), "ContentTypeError");

    let view = int32(&[0.0]);
    assert_eq!(view.set(0, &Value::BigInt(1)).unwrap_err().tag(), "ContentTypeError");
}

// ============================================================================
// Window operations
// ============================================================================

#[test]
fn test_fill_relative_bounds() {
    let view = int32(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    view.fill(&Value::from(0), &Value::from(-3), &Value::from(-1)).unwrap();
    assert_eq!(numbers(&view), vec![1.0, 2.0, 0.0, 0.0, 5.0]);

    view.fill(&Value::from(7), &Value::from(f64::NEG_INFINITY), &undefined()).unwrap();
    assert_eq!(numbers(&view), vec![7.0; 5]);

    // Inverted window writes nothing.
    view.fill(&Value::from(1), &Value::from(4), &Value::from(2)).unwrap();
    assert_eq!(numbers(&view), vec![7.0; 5]);
}

#[test]
fn test_copy_within_overlapping() {
    let view = int32(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    view.copy_within(&Value::from(1), &Value::from(0), &Value::from(3)).unwrap();
    assert_eq!(numbers(&view), vec![1.0, 1.0, 2.0, 3.0, 5.0]);

    let view = int32(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    view.copy_within(&Value::from(0), &Value::from(3), &undefined()).unwrap();
    assert_eq!(numbers(&view), vec![4.0, 5.0, 3.0, 4.0, 5.0]);

    let view = int32(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    view.copy_within(&Value::from(-2), &Value::from(0), &undefined()).unwrap();
    assert_eq!(numbers(&view), vec![1.0, 2.0, 3.0, 1.0, 2.0]);
}

#[test]
fn test_reverse() {
    let view = TypedView::from_big_ints(ElementKind::BigInt64, &[1, 2, 3]).unwrap();
    view.reverse().unwrap();
    assert_eq!(
        view.to_vec().unwrap(),
        vec![Numeric::BigInt(3), Numeric::BigInt(2), Numeric::BigInt(1)]
    );
}

#[test]
fn test_slice_copies() {
    let view = int32(&[1.0, 2.0, 3.0, 4.0]);
    let sliced = view.slice(&Value::from(1), &Value::from(-1)).unwrap();
    assert_eq!(numbers(&sliced), vec![2.0, 3.0]);

    sliced.set(0, &Value::from(99)).unwrap();
    assert_eq!(numbers(&view), vec![1.0, 2.0, 3.0, 4.0]);

    let empty = view.slice(&Value::from(3), &Value::from(1)).unwrap();
    assert_eq!(empty.length(), 0);
    assert_eq!(empty.kind(), ElementKind::Int32);
}

#[test]
fn test_subarray_aliases() {
    let view = int32(&[1.0, 2.0, 3.0, 4.0]);
    let sub = view.subarray(&Value::from(1), &Value::from(3)).unwrap();
    assert_eq!(sub.length(), 2);
    assert_eq!(sub.byte_offset(), 4);
    assert!(sub.buffer().ptr_eq(&view.buffer()));

    sub.fill(&Value::from(9), &undefined(), &undefined()).unwrap();
    assert_eq!(numbers(&view), vec![1.0, 9.0, 9.0, 4.0]);

    let nested = sub.subarray(&Value::from(-1), &undefined()).unwrap();
    assert_eq!(nested.byte_offset(), 8);
    assert_eq!(numbers(&nested), vec![9.0]);
}

#[test]
fn test_at() {
    let view = int32(&[10.0, 20.0, 30.0]);
    assert_eq!(view.at(&Value::from(0)).unwrap(), Some(Numeric::Number(10.0)));
    assert_eq!(view.at(&Value::from(-1)).unwrap(), Some(Numeric::Number(30.0)));
    assert_eq!(view.at(&Value::from(3)).unwrap(), None);
    assert_eq!(view.at(&Value::from(-4)).unwrap(), None);
    assert_eq!(view.at(&Value::from(1.9)).unwrap(), Some(Numeric::Number(20.0)));
}

// ============================================================================
// Callbacks
// ============================================================================

fn arg(args: &[Value], i: usize) -> f64 {
    args.get(i).and_then(Value::as_number).unwrap_or(f64::NAN)
}

#[test]
fn test_every_and_some() {
    let view = int32(&[2.0, 4.0, 6.0]);
    let even = Value::function(|_, args| Ok(Value::from(arg(args, 0) % 2.0 == 0.0)));
    let big = Value::function(|_, args| Ok(Value::from(arg(args, 0) > 5.0)));
    assert!(view.every(&even, &undefined()).unwrap());
    assert!(!view.every(&big, &undefined()).unwrap());
    assert!(view.some(&big, &undefined()).unwrap());

    let empty = TypedView::new(ElementKind::Int32, 0).unwrap();
    assert!(empty.every(&big, &undefined()).unwrap());
    assert!(!empty.some(&even, &undefined()).unwrap());
}

#[test]
fn test_find_family() {
    let view = int32(&[5.0, 12.0, 8.0, 130.0, 44.0]);
    let over_10 = Value::function(|_, args| Ok(Value::from(arg(args, 0) > 10.0)));
    let none = Value::function(|_, _| Ok(Value::from(false)));

    assert_eq!(view.find(&over_10, &undefined()).unwrap(), Some(Numeric::Number(12.0)));
    assert_eq!(view.find_index(&over_10, &undefined()).unwrap(), Some(1));
    assert_eq!(view.find_last(&over_10, &undefined()).unwrap(), Some(Numeric::Number(44.0)));
    assert_eq!(view.find_last_index(&over_10, &undefined()).unwrap(), Some(4));
    assert_eq!(view.find(&none, &undefined()).unwrap(), None);
    assert_eq!(view.find_last_index(&none, &undefined()).unwrap(), None);
}

#[test]
fn test_callback_arguments_and_this() {
    let view = int32(&[7.0, 8.0]);
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let callback = Value::function(move |this, args| {
        let same_view = matches!(args.get(2), Some(Value::View(_)));
        log.lock().push((arg(args, 0), arg(args, 1), same_view, this.as_number()));
        Ok(Value::Undefined)
    });
    view.for_each(&callback, &Value::from(42)).unwrap();
    assert_eq!(
        *seen.lock(),
        vec![(7.0, 0.0, true, Some(42.0)), (8.0, 1.0, true, Some(42.0))]
    );
}

#[test]
fn test_not_callable() {
    let view = int32(&[1.0]);
    let err = view.map(&Value::from(3), &undefined()).unwrap_err();
    assert_eq!(err, ViewError::NotCallable { op: "map", arg_index: 0 });
    assert_eq!(view.for_each(&Value::Null, &undefined()).unwrap_err().tag(), "NotCallableError");
}

#[test]
fn test_map_and_filter() {
    let view = TypedView::from_numbers(ElementKind::Uint8, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    let square = Value::function(|_, args| Ok(Value::from(arg(args, 0) * arg(args, 0) * 20.0)));
    let mapped = view.map(&square, &undefined()).unwrap();
    assert_eq!(mapped.kind(), ElementKind::Uint8);
    // 320 wraps to 64.
    assert_eq!(numbers(&mapped), vec![20.0, 80.0, 180.0, 64.0]);

    let odd = Value::function(|_, args| Ok(Value::from(arg(args, 0) % 2.0 == 1.0)));
    let filtered = view.filter(&odd, &undefined()).unwrap();
    assert_eq!(numbers(&filtered), vec![1.0, 3.0]);
    assert!(!filtered.buffer().ptr_eq(&view.buffer()));
}

#[test]
fn test_callback_errors_propagate() {
    let view = int32(&[1.0, 2.0, 3.0]);
    let calls = Arc::new(parking_lot::Mutex::new(0));
    let counter = Arc::clone(&calls);
    let boom = Value::function(move |_, args| {
        *counter.lock() += 1;
        if arg(args, 1) == 1.0 {
            return Err(ViewError::Thrown("boom".into()));
        }
        Ok(Value::from(true))
    });
    let err = view.every(&boom, &undefined()).unwrap_err();
    assert_eq!(err, ViewError::Thrown("boom".into()));
    assert_eq!(*calls.lock(), 2);
}

#[test]
fn test_reduce() {
    let view = int32(&[1.0, 2.0, 3.0, 4.0]);
    let concat = Value::function(|_, args| {
        let acc = match &args[0] {
            Value::String(s) => s.to_string(),
            other => format!("{}", other.as_number().unwrap_or(f64::NAN)),
        };
        Ok(Value::string(&format!("{}{}", acc, arg(args, 1))))
    });
    let left = view.reduce(&concat, None).unwrap();
    let right = view.reduce_right(&concat, None).unwrap();
    assert!(matches!(left, Value::String(s) if &*s == "1234"));
    assert!(matches!(right, Value::String(s) if &*s == "4321"));

    let sum = Value::function(|_, args| Ok(Value::from(arg(args, 0) + arg(args, 1))));
    let total = view.reduce(&sum, Some(&Value::from(10))).unwrap();
    assert_eq!(total.as_number(), Some(20.0));
}

#[test]
fn test_reduce_edge_cases() {
    let never = Value::function(|_, _| Err(ViewError::Thrown("called".into())));

    let single = int32(&[5.0]);
    assert_eq!(single.reduce(&never, None).unwrap().as_number(), Some(5.0));
    assert_eq!(single.reduce_right(&never, None).unwrap().as_number(), Some(5.0));

    let empty = TypedView::new(ElementKind::Int32, 0).unwrap();
    assert_eq!(
        empty.reduce(&never, None).unwrap_err(),
        ViewError::EmptyReduction { op: "reduce" }
    );
    assert_eq!(
        empty.reduce_right(&never, None).unwrap_err().tag(),
        "EmptyReductionError"
    );
    let seed = empty.reduce(&never, Some(&Value::from(1))).unwrap();
    assert_eq!(seed.as_number(), Some(1.0));
}

// ============================================================================
// Searches
// ============================================================================

#[test]
fn test_index_of_family() {
    let view = TypedView::from_numbers(ElementKind::Float64, &[1.0, f64::NAN, -0.0, 1.0]).unwrap();

    assert_eq!(view.index_of(&Value::from(1), &undefined()).unwrap(), Some(0));
    assert_eq!(view.index_of(&Value::from(1), &Value::from(1)).unwrap(), Some(3));
    assert_eq!(view.index_of(&Value::from(1), &Value::from(-1)).unwrap(), Some(3));
    assert_eq!(view.index_of(&Value::from(0), &undefined()).unwrap(), Some(2));
    assert_eq!(view.index_of(&Value::from(f64::NAN), &undefined()).unwrap(), None);
    assert_eq!(view.index_of(&Value::string("1"), &undefined()).unwrap(), None);

    assert_eq!(view.last_index_of(&Value::from(1), None).unwrap(), Some(3));
    assert_eq!(view.last_index_of(&Value::from(1), Some(&Value::from(2))).unwrap(), Some(0));
    assert_eq!(view.last_index_of(&Value::from(1), Some(&Value::from(-5))).unwrap(), None);
    // A present-but-undefined from-index coerces to 0.
    assert_eq!(view.last_index_of(&Value::from(1), Some(&undefined())).unwrap(), Some(0));

    assert!(view.includes(&Value::from(f64::NAN), &undefined()).unwrap());
    assert!(view.includes(&Value::from(0), &undefined()).unwrap());
    assert!(!view.includes(&Value::from(1), &Value::from(4)).unwrap());
}

// ============================================================================
// Text and iteration
// ============================================================================

#[test]
fn test_join_and_locale_string() {
    let view = TypedView::from_numbers(ElementKind::Float64, &[1.5, -0.0, 1e21, f64::INFINITY]).unwrap();
    assert_eq!(view.join(None).unwrap(), "1.5,0,1e+21,Infinity");
    assert_eq!(view.join(Some("-")).unwrap(), "1.5-0-1e+21-Infinity");

    let fancy = |n: Numeric, locale: Option<&str>, _: Option<&serde_json::Value>| -> ViewResult<String> {
        Ok(format!("{}@{}", n, locale.unwrap_or("?")))
    };
    let small = int32(&[1.0, 2.0]);
    assert_eq!(small.to_locale_string(&fancy, Some("fr"), None).unwrap(), "1@fr,2@fr");
}

#[test]
fn test_iteration_modes() {
    let view = int32(&[4.0, 5.0]);
    let keys: Vec<_> = view.keys().unwrap().collect::<ViewResult<_>>().unwrap();
    assert_eq!(keys, vec![SequenceItem::Key(0), SequenceItem::Key(1)]);

    let entries: Vec<_> = view.entries().unwrap().collect::<ViewResult<_>>().unwrap();
    assert_eq!(
        entries,
        vec![
            SequenceItem::Entry(0, Numeric::Number(4.0)),
            SequenceItem::Entry(1, Numeric::Number(5.0)),
        ]
    );

    let mut values = view.values().unwrap();
    assert_eq!(values.next().map(|r| r.map(|i| i.value().as_number())), Some(Ok(Some(4.0))));
    view.set(1, &Value::from(50)).unwrap();
    assert_eq!(values.next().map(|r| r.map(|i| i.value().as_number())), Some(Ok(Some(50.0))));
    assert!(values.next().is_none());
    assert!(values.next().is_none());
}

// ============================================================================
// Static constructors
// ============================================================================

#[test]
fn test_from_sources() {
    let ctor = IntrinsicConstructor(ElementKind::Int16);

    let dense = TypedView::from_source(
        &ctor,
        Source::Dense(vec![Value::from(1), Value::from(70000), Value::string("3")]),
        &undefined(),
        &undefined(),
    )
    .unwrap();
    assert_eq!(numbers(&dense), vec![1.0, 4464.0, 3.0]);

    let copy = TypedView::from_source(&ctor, Source::View(dense.clone()), &undefined(), &undefined()).unwrap();
    assert_eq!(numbers(&copy), numbers(&dense));
    assert!(!copy.buffer().ptr_eq(&dense.buffer()));

    let iterable = Source::Iterable(Box::new(
        vec![Ok::<_, ViewError>(Value::from(9)), Ok(Value::from(8))].into_iter(),
    ));
    let from_iter = TypedView::from_source(&ctor, iterable, &undefined(), &undefined()).unwrap();
    assert_eq!(numbers(&from_iter), vec![9.0, 8.0]);

    let array_like = Source::ArrayLike(Arc::new(vec![Value::from(2.9), Value::Undefined]));
    let from_like = TypedView::from_source(&ctor, array_like, &undefined(), &undefined()).unwrap();
    assert_eq!(numbers(&from_like), vec![2.0, 0.0]);
}

#[test]
fn test_from_with_mapper() {
    let ctor = IntrinsicConstructor(ElementKind::Float64);
    let double_plus_index = Value::function(|_, args| Ok(Value::from(arg(args, 0) * 2.0 + arg(args, 1))));
    let view = TypedView::from_source(
        &ctor,
        Source::Dense(vec![Value::from(1), Value::from(2), Value::from(3)]),
        &double_plus_index,
        &undefined(),
    )
    .unwrap();
    assert_eq!(numbers(&view), vec![2.0, 5.0, 8.0]);

    let err = TypedView::from_source(&ctor, Source::Dense(vec![]), &Value::from(1), &undefined()).unwrap_err();
    assert_eq!(err, ViewError::NotCallable { op: "from", arg_index: 1 });
}

#[test]
fn test_of() {
    let view = TypedView::of(
        &IntrinsicConstructor(ElementKind::BigInt64),
        &[Value::BigInt(1), Value::BigInt(-2)],
    )
    .unwrap();
    assert_eq!(view.to_vec().unwrap(), vec![Numeric::BigInt(1), Numeric::BigInt(-2)]);

    let err = TypedView::of(&IntrinsicConstructor(ElementKind::BigInt64), &[Value::from(1)]).unwrap_err();
    assert_eq!(err.tag(), "ContentTypeError");
}

// ============================================================================
// Shared buffers
// ============================================================================

#[test]
fn test_views_over_shared_buffer() {
    let shared = SharedArrayBuffer::new(16).unwrap();
    let view = TypedView::with_buffer(ElementKind::Int32, Buffer::from(shared.clone()), 0, None).unwrap();
    view.fill(&Value::from(-1), &Value::from(2), &undefined()).unwrap();
    assert_eq!(numbers(&view), vec![0.0, 0.0, -1.0, -1.0]);
    assert_eq!(&shared.to_vec()[8..], &[255u8; 8]);

    let sliced = view.buffer().slice(&Value::from(8), &undefined()).unwrap();
    assert!(sliced.is_shared());
    assert_eq!(sliced.byte_length(), 8);
}

#[test]
fn test_buffer_slice() {
    let view = TypedView::from_numbers(ElementKind::Uint8, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    let buffer = view.buffer();
    let sliced = buffer.slice(&Value::from(1), &Value::from(-1)).unwrap();
    assert!(!sliced.is_shared());
    assert_eq!(sliced.to_vec().unwrap(), vec![2, 3]);
    assert!(!sliced.ptr_eq(&buffer));
}

// ============================================================================
// Buffer constructors
// ============================================================================

struct BufferCtor<F>(F);

impl<F> BufferFactory for BufferCtor<F>
where
    F: Fn(usize) -> ViewResult<Buffer> + Send + Sync,
{
    fn name(&self) -> &str {
        "BufferCtor"
    }

    fn construct(&self, byte_length: usize) -> ViewResult<Buffer> {
        (self.0)(byte_length)
    }
}

fn buffer_ctor<F>(f: F) -> BufferCtor<F>
where
    F: Fn(usize) -> ViewResult<Buffer> + Send + Sync,
{
    BufferCtor(f)
}

fn source_bytes() -> Buffer {
    ArrayBuffer::from_bytes(vec![1, 2, 3, 4, 5, 6]).into()
}

#[test]
fn test_buffer_slice_through_constructor() {
    let source = source_bytes();
    let longer = buffer_ctor(|n| ArrayBuffer::new(n + 2).map(Buffer::from));
    let sliced = source.slice_with(&longer, &Value::from(2), &Value::from(5)).unwrap();
    assert_eq!(sliced.to_vec().unwrap(), vec![3, 4, 5, 0, 0]);

    let intrinsic = source
        .slice_with(&IntrinsicBufferConstructor::Array, &Value::from(-2), &undefined())
        .unwrap();
    assert_eq!(intrinsic.to_vec().unwrap(), vec![5, 6]);
}

#[test]
fn test_buffer_slice_rejects_source() {
    let source = source_bytes();
    let same = {
        let source = source.clone();
        buffer_ctor(move |_| Ok(source.clone()))
    };
    assert_eq!(
        source.slice_with(&same, &undefined(), &undefined()).unwrap_err(),
        ViewError::SameBuffer { op: "slice" }
    );

    let shared: Buffer = SharedArrayBuffer::from_bytes(&[1, 2, 3]).into();
    let same_shared = {
        let shared = shared.clone();
        buffer_ctor(move |_| Ok(shared.clone()))
    };
    assert_eq!(
        shared.slice_with(&same_shared, &undefined(), &undefined()).unwrap_err().tag(),
        "SameBufferError"
    );
}

#[test]
fn test_buffer_slice_rejects_short_result() {
    let short = buffer_ctor(|n| ArrayBuffer::new(n - 1).map(Buffer::from));
    assert_eq!(
        source_bytes().slice_with(&short, &Value::from(1), &Value::from(4)).unwrap_err(),
        ViewError::ShortResult {
            op: "slice",
            requested: 3,
            actual: 2,
        }
    );
}

#[test]
fn test_buffer_slice_rejects_detached_result() {
    let detached = buffer_ctor(|n| {
        let buffer = ArrayBuffer::new(n)?;
        buffer.detach();
        Ok(Buffer::from(buffer))
    });
    let err = source_bytes().slice_with(&detached, &undefined(), &undefined()).unwrap_err();
    assert_eq!(err, ViewError::DetachedBuffer { op: "slice" });
}

#[test]
fn test_buffer_slice_rejects_other_variant() {
    let err = source_bytes()
        .slice_with(&IntrinsicBufferConstructor::Shared, &undefined(), &undefined())
        .unwrap_err();
    assert_eq!(
        err,
        ViewError::BufferVariant {
            op: "slice",
            expected: "ArrayBuffer",
            found: "SharedArrayBuffer",
        }
    );

    let shared: Buffer = SharedArrayBuffer::from_bytes(&[1, 2]).into();
    let err = shared
        .slice_with(&IntrinsicBufferConstructor::Array, &undefined(), &undefined())
        .unwrap_err();
    assert_eq!(err.tag(), "BufferVariantError");
}

#[test]
fn test_buffer_constructor_detaching_source() {
    let source = source_bytes();
    let detaching = {
        let source = source.clone();
        buffer_ctor(move |n| {
            source.detach()?;
            ArrayBuffer::new(n).map(Buffer::from)
        })
    };
    let err = source.slice_with(&detaching, &undefined(), &undefined()).unwrap_err();
    assert!(err.is_detached());
}

#[test]
fn test_buffer_constructor_error_propagates() {
    let failing = buffer_ctor(|_| Err(ViewError::Thrown("no buffers today".into())));
    assert_eq!(
        source_bytes().slice_with(&failing, &undefined(), &undefined()).unwrap_err(),
        ViewError::Thrown("no buffers today".into())
    );
}
