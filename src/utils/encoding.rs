// Text-safe wrapping for key and signature blobs.
// Base58 (Bitcoin alphabet) is the only alphabet used anywhere in the wire format.

use crate::error::Result;

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    Ok(bs58::decode(data).into_vec()?)
}
