// Fixed-stride packing of big unsigned integers.
// Keys and signatures are stored as several curve values glued together. Every
// value after the first is left-padded to the stride so the blob can be split
// back into equal slices; the first value keeps its natural width.

use crate::error::{LedgerError, Result};
use num_bigint::BigUint;

/// Minimal big-endian bytes of a value. Zero has no bytes at all.
pub fn natural_bytes(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        return Vec::new();
    }
    value.to_bytes_be()
}

/// A run of `length` copies of `byte_value`
pub fn pad_bytes(length: usize, byte_value: u8) -> Vec<u8> {
    vec![byte_value; length]
}

/// Left-pad `bytes` with zeros up to `width`. Longer input is returned as is.
pub fn left_pad(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut padded = pad_bytes(width.saturating_sub(bytes.len()), 0);
    padded.extend_from_slice(bytes);
    padded
}

/// Concatenate `values`, padding all but the first to `stride` bytes
pub fn encode_big_uints(stride: usize, values: &[BigUint]) -> Vec<u8> {
    let mut result = Vec::with_capacity(stride * values.len());
    for (i, value) in values.iter().enumerate() {
        let bytes = natural_bytes(value);
        if i == 0 {
            result.extend(bytes);
        } else {
            result.extend(left_pad(&bytes, stride));
        }
    }
    result
}

/// Split `blob` into `parts` equal slices and read each as a big-endian integer.
///
/// An odd-length blob is assumed to have lost one leading zero byte in transit
/// and gets it back before splitting.
pub fn decode_big_uints(blob: &[u8], parts: usize) -> Result<Vec<BigUint>> {
    let mut bytes = Vec::with_capacity(blob.len() + 1);
    if blob.len() % 2 != 0 {
        bytes.push(0);
    }
    bytes.extend_from_slice(blob);

    if parts == 0 || bytes.len() % parts != 0 {
        return Err(LedgerError::MalformedInput {
            length: bytes.len(),
            parts,
        });
    }

    let width = bytes.len() / parts;
    if width == 0 {
        return Ok(vec![BigUint::default(); parts]);
    }
    Ok(bytes.chunks(width).map(BigUint::from_bytes_be).collect())
}
