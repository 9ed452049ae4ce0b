//! LSD radix sort for 16- and 32-bit kinds
//!
//! Elements are mapped to unsigned keys whose natural order is the element
//! order: the sign bit is flipped for signed integers; for floats negative
//! values have every bit flipped and the rest only the sign bit. NaNs are
//! canonicalized first so they all land after `+Infinity`.

use crate::kind::ElementKind;

const SIGN_32: u32 = 0x8000_0000;
const CANONICAL_NAN_32: u32 = 0x7fc0_0000;

/// Sort 16/32-bit elements of `kind` held in native byte order.
pub fn radix_sort(bytes: &mut [u8], kind: ElementKind) {
    let width = kind.byte_width();
    let mut keys: Vec<u32> = bytes
        .chunks_exact(width)
        .map(|chunk| to_key(read_word(chunk), kind))
        .collect();

    let n = keys.len();
    let mut scratch = vec![0u32; n];
    for pass in 0..width {
        let shift = pass * 8;
        let mut counts = [0usize; 257];
        for key in &keys {
            counts[digit(*key, shift) + 1] += 1;
        }
        // Every key has the same digit: the pass would not move anything.
        if counts[1..].iter().any(|c| *c == n) {
            continue;
        }
        for i in 0..256 {
            counts[i + 1] += counts[i];
        }
        for key in &keys {
            let d = digit(*key, shift);
            scratch[counts[d]] = *key;
            counts[d] += 1;
        }
        std::mem::swap(&mut keys, &mut scratch);
    }

    for (key, chunk) in keys.iter().zip(bytes.chunks_exact_mut(width)) {
        write_word(from_key(*key, kind), chunk);
    }
}

fn digit(key: u32, shift: usize) -> usize {
    ((key >> shift) & 0xff) as usize
}

fn read_word(chunk: &[u8]) -> u32 {
    match chunk.len() {
        2 => u32::from(u16::from_ne_bytes([chunk[0], chunk[1]])),
        _ => u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
    }
}

fn write_word(word: u32, chunk: &mut [u8]) {
    match chunk.len() {
        2 => chunk.copy_from_slice(&(word as u16).to_ne_bytes()),
        _ => chunk.copy_from_slice(&word.to_ne_bytes()),
    }
}

fn to_key(word: u32, kind: ElementKind) -> u32 {
    match kind {
        ElementKind::Int16 => word ^ 0x8000,
        ElementKind::Int32 => word ^ SIGN_32,
        ElementKind::Float32 => {
            let word = if (word & !SIGN_32) > 0x7f80_0000 {
                CANONICAL_NAN_32
            } else {
                word
            };
            if word & SIGN_32 != 0 {
                !word
            } else {
                word | SIGN_32
            }
        }
        _ => word,
    }
}

fn from_key(key: u32, kind: ElementKind) -> u32 {
    match kind {
        ElementKind::Int16 => key ^ 0x8000,
        ElementKind::Int32 => key ^ SIGN_32,
        ElementKind::Float32 => {
            if key & SIGN_32 != 0 {
                key ^ SIGN_32
            } else {
                !key
            }
        }
        _ => key,
    }
}
