//! Script values seen by view operations
//!
//! A deliberately small value model: enough to pass elements, indices and
//! views to user callbacks and to coerce whatever those callbacks return.
//! Calling a [`ScriptFunction`] or coercing a [`ScriptObject`] runs user code
//! and is therefore a suspension point for the operation doing it.

use std::fmt;
use std::sync::Arc;

use crate::error::{ViewError, ViewResult};
use crate::kind::ContentType;
use crate::view::TypedView;

/// Largest integer that `to_length` produces (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

type NativeFn = dyn Fn(&Value, &[Value]) -> ViewResult<Value> + Send + Sync;

/// A callable supplied by the embedder or by user code.
#[derive(Clone)]
pub struct ScriptFunction {
    name: Arc<str>,
    call: Arc<NativeFn>,
}

impl ScriptFunction {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> ViewResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            call: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function with the given receiver and arguments.
    pub fn call(&self, this: &Value, args: &[Value]) -> ViewResult<Value> {
        (self.call)(this, args)
    }

    pub fn ptr_eq(&self, other: &ScriptFunction) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}()", self.name)
    }
}

struct ObjectInner {
    value_of: Option<ScriptFunction>,
}

/// An opaque object whose only observable behavior is its `valueOf` hook.
#[derive(Clone)]
pub struct ScriptObject {
    inner: Arc<ObjectInner>,
}

impl ScriptObject {
    /// An object without a `valueOf` hook (coerces to NaN).
    pub fn plain() -> Self {
        Self {
            inner: Arc::new(ObjectInner { value_of: None }),
        }
    }

    /// An object whose numeric coercion calls `value_of`.
    pub fn with_value_of(value_of: ScriptFunction) -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                value_of: Some(value_of),
            }),
        }
    }

    pub fn ptr_eq(&self, other: &ScriptObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn to_primitive(&self) -> ViewResult<Value> {
        if let Some(value_of) = &self.inner.value_of {
            let result = value_of.call(&Value::Object(self.clone()), &[])?;
            if result.is_primitive() {
                return Ok(result);
            }
        }
        Ok(Value::string("[object Object]"))
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptObject")
            .field("value_of", &self.inner.value_of)
            .finish()
    }
}

/// A value passed into or returned from user code.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(Arc<str>),
    Function(ScriptFunction),
    Object(ScriptObject),
    View(TypedView),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    /// Wrap a closure as a callable value.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> ViewResult<Value> + Send + Sync + 'static,
    {
        Value::Function(ScriptFunction::new("anonymous", f))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Function(_) | Value::Object(_) | Value::View(_))
    }

    pub fn as_function(&self) -> Option<&ScriptFunction> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_big_int(&self) -> Option<i128> {
        match self {
            Value::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Name of the value's type, as used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Object(_) | Value::View(_) => "object",
        }
    }

    /// Numeric coercion. Objects run their `valueOf` hook.
    pub fn to_number(&self, op: &'static str) -> ViewResult<f64> {
        match self {
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Ok(*n),
            Value::BigInt(_) => Err(ViewError::ContentType {
                op,
                from: "bigint",
                to: "number",
            }),
            Value::String(s) => Ok(string_to_number(s)),
            Value::Function(_) | Value::View(_) => Ok(f64::NAN),
            Value::Object(obj) => obj.to_primitive()?.to_number(op),
        }
    }

    /// Big integer coercion. Numbers are rejected rather than truncated.
    pub fn to_big_int(&self, op: &'static str) -> ViewResult<i128> {
        match self {
            Value::BigInt(n) => Ok(*n),
            Value::Bool(b) => Ok(i128::from(*b)),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(0);
                }
                trimmed.parse::<i128>().map_err(|_| ViewError::ContentType {
                    op,
                    from: "string",
                    to: "bigint",
                })
            }
            Value::Object(obj) => obj.to_primitive()?.to_big_int(op),
            other => Err(ViewError::ContentType {
                op,
                from: other.type_name(),
                to: "bigint",
            }),
        }
    }

    /// Coerce according to the content type of an element kind.
    pub fn to_numeric(&self, content: ContentType, op: &'static str) -> ViewResult<Numeric> {
        match content {
            ContentType::Number => self.to_number(op).map(Numeric::Number),
            ContentType::BigInt => self.to_big_int(op).map(Numeric::BigInt),
        }
    }

    /// Truncating integer coercion: NaN becomes 0, -0 becomes +0, infinities stay.
    pub fn to_integer_or_infinity(&self, op: &'static str) -> ViewResult<f64> {
        let n = self.to_number(op)?;
        if n.is_nan() || n == 0.0 {
            return Ok(0.0);
        }
        Ok(n.trunc())
    }

    /// Length coercion clamped to `[0, 2^53 - 1]`.
    pub fn to_length(&self, op: &'static str) -> ViewResult<usize> {
        let n = self.to_integer_or_infinity(op)?;
        if n <= 0.0 {
            return Ok(0);
        }
        Ok(n.min(MAX_SAFE_INTEGER) as usize)
    }

    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(n.is_nan() || *n == 0.0),
            Value::BigInt(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            Value::Function(_) | Value::Object(_) | Value::View(_) => true,
        }
    }

    /// `===`: NaN is never equal, +0 equals -0.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            _ => self.identity_equals(other),
        }
    }

    /// SameValueZero: like `===` except NaN equals NaN.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self.identity_equals(other),
        }
    }

    fn identity_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::View(a), Value::View(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        match n {
            Numeric::Number(n) => Value::Number(n),
            Numeric::BigInt(n) => Value::BigInt(n),
        }
    }
}

impl From<TypedView> for Value {
    fn from(view: TypedView) -> Self {
        Value::View(view)
    }
}

impl From<ScriptFunction> for Value {
    fn from(f: ScriptFunction) -> Self {
        Value::Function(f)
    }
}

/// An element value after coercion: a number or a big integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Number(f64),
    BigInt(i128),
}

impl Numeric {
    pub fn content_type(&self) -> ContentType {
        match self {
            Numeric::Number(_) => ContentType::Number,
            Numeric::BigInt(_) => ContentType::BigInt,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Number(n) => *n,
            Numeric::BigInt(n) => *n as f64,
        }
    }

    /// `===` between element values.
    pub fn strict_equals(&self, other: &Numeric) -> bool {
        match (self, other) {
            (Numeric::Number(a), Numeric::Number(b)) => a == b,
            (Numeric::BigInt(a), Numeric::BigInt(b)) => a == b,
            _ => false,
        }
    }

    /// SameValueZero between element values.
    pub fn same_value_zero(&self, other: &Numeric) -> bool {
        match (self, other) {
            (Numeric::Number(a), Numeric::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Numeric::BigInt(a), Numeric::BigInt(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Number(n) => f.write_str(&number_to_string(*n)),
            Numeric::BigInt(n) => write!(f, "{}", n),
        }
    }
}

/// Parse a string the way numeric coercion does: whitespace-trimmed decimal,
/// `0x`/`0o`/`0b` integers, signed `Infinity`; anything else is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix_prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in radix_prefixed {
        if let Some(digits) = t.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    let decimal_chars = t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if decimal_chars {
        t.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Shortest round-trip rendering of a number; exponent form outside
/// `1e-7 < |x| < 1e21`.
pub fn number_to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let sci = format!("{:e}", x.abs());
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return format!("{}{}", sign, sci),
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let e = n - 1;
        let exp_sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, exp_sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, exp_sign, e.abs())
        }
    };
    format!("{}{}", sign, body)
}
