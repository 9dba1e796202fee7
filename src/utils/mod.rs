//! Utility functions and helpers
//!
//! Big-integer packing, the text-safe encoding, hashing/ECDSA wrappers and
//! the bincode helpers used by the block model.

pub mod codec;
pub mod crypto;
pub mod encoding;
pub mod serialization;

pub use codec::{decode_big_uints, encode_big_uints, left_pad, natural_bytes, pad_bytes};
pub use crypto::{
    current_timestamp, ecdsa_sign, ecdsa_verify, new_key_material, sha256_digest,
    uncompressed_point, RawKeyMaterial,
};
pub use encoding::{base58_decode, base58_encode};
pub use serialization::{deserialize, serialize};
