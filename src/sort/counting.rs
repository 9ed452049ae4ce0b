//! Counting sort for 8-bit kinds: 256 buckets, signed values offset by 128.

/// Sort 8-bit elements in place.
pub fn counting_sort(bytes: &mut [u8], signed: bool) {
    let mut counts = [0usize; 256];
    for byte in bytes.iter() {
        counts[bucket(*byte, signed)] += 1;
    }

    let mut pos = 0;
    for (bucket, count) in counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let byte = if signed {
            (bucket as i16 - 128) as i8 as u8
        } else {
            bucket as u8
        };
        bytes[pos..pos + count].fill(byte);
        pos += count;
    }
}

fn bucket(byte: u8, signed: bool) -> usize {
    if signed {
        (i16::from(byte as i8) + 128) as usize
    } else {
        usize::from(byte)
    }
}
