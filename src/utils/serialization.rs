// Bincode helpers shared by the block model. Header hashes are computed over
// these bytes, so the configuration must stay fixed.
use crate::error::{LedgerError, Result};

/// Serialize data using bincode 2.0 with standard configuration
pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| LedgerError::Serialization(format!("Serialization failed: {e}")))
}

// Upper bound on bytes a single decode may claim, so a forged length prefix
// fails instead of allocating
const DECODE_LIMIT: usize = 16 * 1024 * 1024;

/// Deserialize data using bincode 2.0 with standard configuration and a size limit
pub fn deserialize<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T> {
    let config = bincode::config::standard().with_limit::<DECODE_LIMIT>();
    let (data, _) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| LedgerError::Serialization(format!("Deserialization failed: {e}")))?;
    Ok(data)
}
