//! Element kinds
//!
//! The eleven element kinds a view can hold, their layout, and the
//! conversion from a coerced value to the stored bytes. All element bytes
//! use native byte order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};
use crate::value::{Numeric, Value};

/// Whether a kind stores numbers or big integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Number,
    BigInt,
}

impl ContentType {
    pub fn name(self) -> &'static str {
        match self {
            ContentType::Number => "number",
            ContentType::BigInt => "bigint",
        }
    }
}

/// Element kind of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

struct KindInfo {
    name: &'static str,
    cli_name: &'static str,
    shift: u32,
    signed: bool,
    float: bool,
    content: ContentType,
}

// Indexed by `ElementKind as usize`.
const KIND_TABLE: [KindInfo; 11] = [
    KindInfo { name: "Int8Array", cli_name: "int8", shift: 0, signed: true, float: false, content: ContentType::Number },
    KindInfo { name: "Uint8Array", cli_name: "uint8", shift: 0, signed: false, float: false, content: ContentType::Number },
    KindInfo { name: "Uint8ClampedArray", cli_name: "uint8-clamped", shift: 0, signed: false, float: false, content: ContentType::Number },
    KindInfo { name: "Int16Array", cli_name: "int16", shift: 1, signed: true, float: false, content: ContentType::Number },
    KindInfo { name: "Uint16Array", cli_name: "uint16", shift: 1, signed: false, float: false, content: ContentType::Number },
    KindInfo { name: "Int32Array", cli_name: "int32", shift: 2, signed: true, float: false, content: ContentType::Number },
    KindInfo { name: "Uint32Array", cli_name: "uint32", shift: 2, signed: false, float: false, content: ContentType::Number },
    KindInfo { name: "Float32Array", cli_name: "float32", shift: 2, signed: true, float: true, content: ContentType::Number },
    KindInfo { name: "Float64Array", cli_name: "float64", shift: 3, signed: true, float: true, content: ContentType::Number },
    KindInfo { name: "BigInt64Array", cli_name: "big-int64", shift: 3, signed: true, float: false, content: ContentType::BigInt },
    KindInfo { name: "BigUint64Array", cli_name: "big-uint64", shift: 3, signed: false, float: false, content: ContentType::BigInt },
];

impl ElementKind {
    pub const ALL: [ElementKind; 11] = [
        ElementKind::Int8,
        ElementKind::Uint8,
        ElementKind::Uint8Clamped,
        ElementKind::Int16,
        ElementKind::Uint16,
        ElementKind::Int32,
        ElementKind::Uint32,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::BigInt64,
        ElementKind::BigUint64,
    ];

    fn info(self) -> &'static KindInfo {
        &KIND_TABLE[self as usize]
    }

    /// Constructor name, e.g. `Float32Array`.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Short lowercase name used on the command line.
    pub fn cli_name(self) -> &'static str {
        self.info().cli_name
    }

    pub fn byte_width(self) -> usize {
        1 << self.info().shift
    }

    /// log2 of the byte width.
    pub fn shift(self) -> u32 {
        self.info().shift
    }

    pub fn is_signed(self) -> bool {
        self.info().signed
    }

    pub fn is_float(self) -> bool {
        self.info().float
    }

    pub fn is_clamped(self) -> bool {
        self == ElementKind::Uint8Clamped
    }

    pub fn content_type(self) -> ContentType {
        self.info().content
    }

    /// Coerce a value to this kind's content type. May run user code.
    pub fn coerce(self, value: &Value, op: &'static str) -> ViewResult<Numeric> {
        value.to_numeric(self.content_type(), op)
    }

    /// Encode a coerced value into `out` (exactly `byte_width` bytes).
    pub fn encode(self, value: Numeric, out: &mut [u8], op: &'static str) -> ViewResult<()> {
        match (self.content_type(), value) {
            (ContentType::Number, Numeric::Number(n)) => {
                self.encode_number(n, out);
                Ok(())
            }
            (ContentType::BigInt, Numeric::BigInt(n)) => {
                match self {
                    ElementKind::BigInt64 => out.copy_from_slice(&(n as i64).to_ne_bytes()),
                    _ => out.copy_from_slice(&(n as u64).to_ne_bytes()),
                }
                Ok(())
            }
            (to, from) => Err(ViewError::ContentType {
                op,
                from: from.content_type().name(),
                to: to.name(),
            }),
        }
    }

    fn encode_number(self, n: f64, out: &mut [u8]) {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 => out[0] = wrap_to_u32(n) as u8,
            ElementKind::Uint8Clamped => out[0] = clamp_to_u8(n),
            ElementKind::Int16 | ElementKind::Uint16 => {
                out.copy_from_slice(&(wrap_to_u32(n) as u16).to_ne_bytes())
            }
            ElementKind::Int32 | ElementKind::Uint32 => {
                out.copy_from_slice(&wrap_to_u32(n).to_ne_bytes())
            }
            ElementKind::Float32 => out.copy_from_slice(&(n as f32).to_ne_bytes()),
            ElementKind::Float64 => out.copy_from_slice(&n.to_ne_bytes()),
            ElementKind::BigInt64 | ElementKind::BigUint64 => {
                out.copy_from_slice(&(n as i64).to_ne_bytes())
            }
        }
    }

    /// Decode one element from `bytes` (at least `byte_width` bytes).
    pub fn decode(self, bytes: &[u8]) -> Numeric {
        match self {
            ElementKind::Int8 => Numeric::Number(f64::from(bytes[0] as i8)),
            ElementKind::Uint8 | ElementKind::Uint8Clamped => Numeric::Number(f64::from(bytes[0])),
            ElementKind::Int16 => Numeric::Number(f64::from(i16::from_ne_bytes(array(bytes)))),
            ElementKind::Uint16 => Numeric::Number(f64::from(u16::from_ne_bytes(array(bytes)))),
            ElementKind::Int32 => Numeric::Number(f64::from(i32::from_ne_bytes(array(bytes)))),
            ElementKind::Uint32 => Numeric::Number(f64::from(u32::from_ne_bytes(array(bytes)))),
            ElementKind::Float32 => Numeric::Number(f64::from(f32::from_ne_bytes(array(bytes)))),
            ElementKind::Float64 => Numeric::Number(f64::from_ne_bytes(array(bytes))),
            ElementKind::BigInt64 => Numeric::BigInt(i128::from(i64::from_ne_bytes(array(bytes)))),
            ElementKind::BigUint64 => Numeric::BigInt(i128::from(u64::from_ne_bytes(array(bytes)))),
        }
    }

    /// Encode a whole slice of values back to back.
    pub(crate) fn encode_all(self, values: &[Numeric], op: &'static str) -> ViewResult<Vec<u8>> {
        let width = self.byte_width();
        let mut out = vec![0u8; values.len() * width];
        for (value, chunk) in values.iter().zip(out.chunks_exact_mut(width)) {
            self.encode(*value, chunk, op)?;
        }
        Ok(out)
    }

    pub(crate) fn decode_all(self, bytes: &[u8]) -> Vec<Numeric> {
        bytes
            .chunks_exact(self.byte_width())
            .map(|chunk| self.decode(chunk))
            .collect()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    /// Accepts the short name (`uint8-clamped`) or the constructor name
    /// (`Uint8ClampedArray`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.cli_name().eq_ignore_ascii_case(s) || kind.name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| format!("unknown element kind '{}'", s))
    }
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Truncate and wrap modulo 2^32; non-finite values become 0.
pub(crate) fn wrap_to_u32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Clamp to [0, 255] rounding half to even; NaN becomes 0.
pub(crate) fn clamp_to_u8(n: f64) -> u8 {
    if n.is_nan() || n <= 0.0 {
        return 0;
    }
    if n >= 255.0 {
        return 255;
    }
    let floor = n.floor();
    let diff = n - floor;
    let rounded = if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if floor % 2.0 == 0.0 {
        floor
    } else {
        floor + 1.0
    };
    rounded as u8
}
