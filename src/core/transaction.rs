// Transactions carry an opaque payload. The header commits to it through the
// payload hash and length, and the transaction hash commits to the header.

use crate::error::{LedgerError, Result};
use crate::utils::{current_timestamp, serialize, sha256_digest};
use crate::wallet::{verify_signature, Curve, Keypair};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct TransactionHeader {
    pub from: Vec<u8>,
    pub to: Vec<u8>,
    pub timestamp: u32,
    pub payload_hash: Vec<u8>,
    pub payload_length: u32,
    pub nonce: u32,
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    pub header: TransactionHeader,
    pub signature: Vec<u8>,
    pub payload: Vec<u8>,
}

impl Transaction {
    /// Build an unsigned transaction, committing the header to `payload`
    pub fn new(
        from: &[u8],
        to: &[u8],
        payload: Vec<u8>,
        timestamp: u32,
        nonce: u32,
    ) -> Result<Self> {
        let payload_length = u32::try_from(payload.len()).map_err(|_| {
            LedgerError::InvalidTransaction(format!(
                "Payload of {} bytes exceeds the u32 length field",
                payload.len()
            ))
        })?;

        Ok(Transaction {
            header: TransactionHeader {
                from: from.to_vec(),
                to: to.to_vec(),
                timestamp,
                payload_hash: sha256_digest(&payload),
                payload_length,
                nonce,
            },
            signature: vec![],
            payload,
        })
    }

    /// Same as [`Transaction::new`], stamped with the current time
    pub fn new_now(from: &[u8], to: &[u8], payload: Vec<u8>, nonce: u32) -> Result<Self> {
        Transaction::new(from, to, payload, current_timestamp()?, nonce)
    }

    /// SHA-256 over the serialized header. This is the Merkle leaf and the signed digest.
    pub fn hash(&self) -> Result<Vec<u8>> {
        Ok(sha256_digest(&serialize(&self.header)?))
    }

    pub fn get_timestamp(&self) -> u32 {
        self.header.timestamp
    }

    /// Sign the transaction hash and store the encoded signature
    pub fn sign(&mut self, keypair: &Keypair) -> Result<()> {
        let hash = self.hash()?;
        self.signature = keypair.sign(&hash)?.into_bytes();
        Ok(())
    }

    /// Check the header still describes the payload
    pub fn verify_payload(&self) -> bool {
        self.header.payload_length as usize == self.payload.len()
            && self.header.payload_hash == sha256_digest(&self.payload)
    }

    /// Check the stored signature against `public`. Unsigned transactions never verify.
    pub fn verify_signature(&self, curve: Curve, public: &str) -> Result<bool> {
        if self.signature.is_empty() {
            return Ok(false);
        }
        let signature = std::str::from_utf8(&self.signature)
            .map_err(|e| LedgerError::Decode(format!("Signature is not text: {e}")))?;
        verify_signature(curve, public, &self.hash()?, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: u32) -> Transaction {
        Transaction::new(b"alice", b"bob", b"vote: yes".to_vec(), timestamp, 1).unwrap()
    }

    #[test]
    fn test_new_commits_to_payload() {
        let tx = sample(10);
        assert_eq!(tx.header.payload_length, 9);
        assert_eq!(tx.header.payload_hash, sha256_digest(b"vote: yes"));
        assert!(tx.signature.is_empty());
        assert!(tx.verify_payload());
    }

    #[test]
    fn test_verify_payload_detects_tampering() {
        let mut tx = sample(10);
        tx.payload = b"vote: no!".to_vec();
        assert!(!tx.verify_payload());

        let mut tx = sample(10);
        tx.header.payload_length = 3;
        assert!(!tx.verify_payload());
    }

    #[test]
    fn test_hash_depends_on_header_only() {
        let a = sample(10);
        let mut b = a.clone();
        b.signature = b"sig".to_vec();
        assert_eq!(a.hash().unwrap(), b.hash().unwrap());

        b.header.nonce += 1;
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
        assert_eq!(a.hash().unwrap().len(), 32);
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::generate(Curve::P256).unwrap();
        let other = Keypair::generate(Curve::P256).unwrap();
        let mut tx = sample(10);

        assert!(!tx.verify_signature(Curve::P256, keypair.public_key()).unwrap());
        tx.sign(&keypair).unwrap();
        assert!(tx.verify_signature(Curve::P256, keypair.public_key()).unwrap());
        assert!(!tx.verify_signature(Curve::P256, other.public_key()).unwrap());

        tx.header.timestamp = 11;
        assert!(!tx.verify_signature(Curve::P256, keypair.public_key()).unwrap());
    }

    #[test]
    fn test_new_now_uses_current_time() {
        let before = current_timestamp().unwrap();
        let tx = Transaction::new_now(b"alice", b"bob", b"x".to_vec(), 3).unwrap();
        let after = current_timestamp().unwrap();
        assert!(tx.get_timestamp() >= before && tx.get_timestamp() <= after);
        assert_eq!(tx.header.nonce, 3);
        assert!(tx.verify_payload());
    }

    #[test]
    fn test_empty_payload() {
        let tx = Transaction::new(b"a", b"b", vec![], 0, 0).unwrap();
        assert_eq!(tx.header.payload_length, 0);
        assert!(tx.verify_payload());
    }
}
