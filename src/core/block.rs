use crate::core::{MerkleProof, MerkleTree, Transaction};
use crate::error::{LedgerError, Result};
use crate::utils::{deserialize, serialize, sha256_digest};
use crate::wallet::{verify_signature, Curve, Keypair};
use data_encoding::HEXLOWER;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Previous-block hash carried by the genesis block
pub const GENESIS_PREVIOUS_BLOCK: [u8; 32] = [0u8; 32];

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct BlockHeader {
    pub origin: Vec<u8>,
    pub previous_block: Vec<u8>,
    pub merkle_root: Vec<u8>,
    pub timestamp: u32,
    pub nonce: u32,
}

/// A block of transactions kept in ascending timestamp order.
///
/// The stored `merkle_root` is only refreshed by [`Block::update_merkle_root`]
/// and [`Block::seal`]; validation always recomputes it. Once signed the block
/// rejects further changes.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Block {
    header: BlockHeader,
    signature: Vec<u8>,
    transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(previous_block: &[u8]) -> Block {
        Block {
            header: BlockHeader {
                previous_block: previous_block.to_vec(),
                ..Default::default()
            },
            signature: vec![],
            transactions: vec![],
        }
    }

    pub fn genesis() -> Block {
        Block::new(&GENESIS_PREVIOUS_BLOCK)
    }

    /// Decode a block, rejecting a transaction sequence out of timestamp order
    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        let block = deserialize::<Block>(bytes)?;
        if !block.transactions_in_order() {
            return Err(LedgerError::InvalidBlock(
                "Transactions are not in ascending timestamp order".to_string(),
            ));
        }
        Ok(block)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    /// Insert a copy of `transaction`, keeping timestamps non-decreasing.
    ///
    /// Equal timestamps keep insertion order.
    pub fn add_transaction(&mut self, transaction: &Transaction) -> Result<()> {
        self.ensure_unsealed()?;
        let timestamp = transaction.get_timestamp();
        let position = self
            .transactions
            .partition_point(|tx| tx.get_timestamp() <= timestamp);
        self.transactions.insert(position, transaction.clone());
        debug!(
            "Inserted transaction with timestamp {timestamp} at position {position} of {}",
            self.transactions.len()
        );
        Ok(())
    }

    pub fn get_header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_signature(&self) -> &[u8] {
        self.signature.as_slice()
    }

    pub fn get_origin(&self) -> &[u8] {
        self.header.origin.as_slice()
    }

    pub fn get_previous_block(&self) -> &[u8] {
        self.header.previous_block.as_slice()
    }

    pub fn get_merkle_root(&self) -> &[u8] {
        self.header.merkle_root.as_slice()
    }

    pub fn get_timestamp(&self) -> u32 {
        self.header.timestamp
    }

    pub fn get_nonce(&self) -> u32 {
        self.header.nonce
    }

    pub fn set_origin(&mut self, origin: &[u8]) -> Result<()> {
        self.ensure_unsealed()?;
        self.header.origin = origin.to_vec();
        Ok(())
    }

    pub fn set_timestamp(&mut self, timestamp: u32) -> Result<()> {
        self.ensure_unsealed()?;
        self.header.timestamp = timestamp;
        Ok(())
    }

    pub fn set_nonce(&mut self, nonce: u32) -> Result<()> {
        self.ensure_unsealed()?;
        self.header.nonce = nonce;
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// SHA-256 over the serialized header; the next block links to this
    pub fn hash(&self) -> Result<Vec<u8>> {
        Ok(sha256_digest(&serialize(&self.header)?))
    }

    pub fn hash_hex(&self) -> Result<String> {
        Ok(HEXLOWER.encode(&self.hash()?))
    }

    pub fn transaction_hashes(&self) -> Result<Vec<Vec<u8>>> {
        self.transactions.iter().map(Transaction::hash).collect()
    }

    /// Merkle root over the transactions in stored order; empty for no transactions
    pub fn compute_merkle_root(&self) -> Result<Vec<u8>> {
        let hashes = self.transaction_hashes()?;
        Ok(MerkleTree::compute(&hashes).unwrap_or_default())
    }

    pub fn update_merkle_root(&mut self) -> Result<()> {
        self.ensure_unsealed()?;
        self.header.merkle_root = self.compute_merkle_root()?;
        debug!(
            "Merkle root over {} transactions is now {}",
            self.transactions.len(),
            HEXLOWER.encode(&self.header.merkle_root)
        );
        Ok(())
    }

    /// Verify that the block's Merkle root matches its transactions
    pub fn verify_merkle_root(&self) -> Result<bool> {
        Ok(self.compute_merkle_root()? == self.header.merkle_root)
    }

    /// Refresh the Merkle root, then sign the header hash with `keypair`
    pub fn seal(&mut self, keypair: &Keypair) -> Result<()> {
        self.update_merkle_root()?;
        let hash = self.hash()?;
        self.signature = keypair.sign(&hash)?.into_bytes();
        info!(
            "Sealed block {} with {} transactions",
            HEXLOWER.encode(&hash),
            self.transactions.len()
        );
        Ok(())
    }

    /// Full validity check: sealed, transactions ordered and matching their
    /// payloads, Merkle root current, signature matches `public`
    pub fn verify(&self, curve: Curve, public: &str) -> Result<bool> {
        if !self.is_sealed() || !self.transactions_in_order() {
            return Ok(false);
        }
        if !self.transactions.iter().all(Transaction::verify_payload) {
            return Ok(false);
        }
        if !self.verify_merkle_root()? {
            return Ok(false);
        }
        let signature = std::str::from_utf8(&self.signature)
            .map_err(|e| LedgerError::Decode(format!("Signature is not text: {e}")))?;
        verify_signature(curve, public, &self.hash()?, signature)
    }

    /// Generate a Merkle proof for a transaction in this block
    pub fn generate_merkle_proof(&self, transaction_index: usize) -> Result<MerkleProof> {
        if transaction_index >= self.transactions.len() {
            return Err(LedgerError::InvalidBlock(format!(
                "Transaction index {} out of bounds for {} transactions",
                transaction_index,
                self.transactions.len()
            )));
        }

        let tree = MerkleTree::from_hashes(&self.transaction_hashes()?);
        tree.generate_proof(transaction_index).ok_or_else(|| {
            LedgerError::InvalidBlock("Merkle tree produced no proof".to_string())
        })
    }

    /// Verify a Merkle proof against this block's Merkle root
    pub fn verify_merkle_proof(&self, proof: &MerkleProof) -> bool {
        proof.merkle_root == self.header.merkle_root && MerkleTree::verify_proof(proof)
    }

    fn transactions_in_order(&self) -> bool {
        self.transactions
            .windows(2)
            .all(|w| w[0].get_timestamp() <= w[1].get_timestamp())
    }

    fn ensure_unsealed(&self) -> Result<()> {
        if self.is_sealed() {
            return Err(LedgerError::InvalidBlock(
                "Block is sealed and can no longer be modified".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn tx(timestamp: u32, nonce: u32) -> Transaction {
        Transaction::new(b"alice", b"bob", vec![nonce as u8], timestamp, nonce).unwrap()
    }

    fn timestamps(block: &Block) -> Vec<u32> {
        block
            .get_transactions()
            .iter()
            .map(Transaction::get_timestamp)
            .collect()
    }

    #[test]
    fn test_new_block_is_empty() {
        let block = Block::new(b"previous");
        assert_eq!(block.get_previous_block(), b"previous");
        assert!(block.get_origin().is_empty());
        assert!(block.get_merkle_root().is_empty());
        assert_eq!(block.get_timestamp(), 0);
        assert_eq!(block.get_nonce(), 0);
        assert!(block.get_transactions().is_empty());
        assert!(!block.is_sealed());
    }

    #[test]
    fn test_genesis_uses_sentinel() {
        assert_eq!(Block::genesis().get_previous_block(), &GENESIS_PREVIOUS_BLOCK);
    }

    #[test]
    fn test_add_transaction_keeps_timestamp_order() {
        let mut block = Block::genesis();
        for t in [30, 10, 20, 10, 40, 0] {
            block.add_transaction(&tx(t, t)).unwrap();
        }
        assert_eq!(timestamps(&block), vec![0, 10, 10, 20, 30, 40]);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let mut block = Block::genesis();
        block.add_transaction(&tx(5, 1)).unwrap();
        block.add_transaction(&tx(5, 2)).unwrap();
        block.add_transaction(&tx(1, 3)).unwrap();
        block.add_transaction(&tx(5, 4)).unwrap();

        let nonces: Vec<u32> = block
            .get_transactions()
            .iter()
            .map(|t| t.header.nonce)
            .collect();
        assert_eq!(nonces, vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_random_insertions_stay_sorted() {
        let mut rng = rand::thread_rng();
        let mut block = Block::genesis();
        for i in 0..200 {
            block.add_transaction(&tx(rng.gen_range(0..50), i)).unwrap();
        }
        let stamps = timestamps(&block);
        assert_eq!(stamps.len(), 200);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_block_owns_a_copy() {
        let mut block = Block::genesis();
        let mut original = tx(1, 1);
        block.add_transaction(&original).unwrap();
        original.payload = b"changed".to_vec();
        assert_eq!(block.get_transactions()[0].payload, vec![1u8]);
    }

    #[test]
    fn test_merkle_root_is_recomputed_on_demand() {
        let mut block = Block::genesis();
        assert!(block.verify_merkle_root().unwrap());

        block.add_transaction(&tx(2, 2)).unwrap();
        block.add_transaction(&tx(1, 1)).unwrap();
        assert!(!block.verify_merkle_root().unwrap());

        block.update_merkle_root().unwrap();
        assert!(block.verify_merkle_root().unwrap());

        let hashes = vec![tx(1, 1).hash().unwrap(), tx(2, 2).hash().unwrap()];
        assert_eq!(
            block.get_merkle_root(),
            MerkleTree::compute(&hashes).unwrap().as_slice()
        );

        block.add_transaction(&tx(3, 3)).unwrap();
        assert!(!block.verify_merkle_root().unwrap());
    }

    #[test]
    fn test_hash_changes_with_header() {
        let mut block = Block::new(b"prev");
        let before = block.hash().unwrap();
        block.set_nonce(1).unwrap();
        assert_ne!(before, block.hash().unwrap());
        assert_eq!(block.hash_hex().unwrap().len(), 64);
    }

    #[test]
    fn test_chain_linkage() {
        let genesis = Block::genesis();
        let next = Block::new(&genesis.hash().unwrap());
        assert_eq!(next.get_previous_block(), genesis.hash().unwrap().as_slice());
    }

    #[test]
    fn test_seal_and_verify() {
        let keypair = Keypair::generate(Curve::P256).unwrap();
        let mut block = Block::genesis();
        block.set_origin(b"node-1").unwrap();
        block.set_timestamp(1_700_000_000).unwrap();
        block.add_transaction(&tx(1, 1)).unwrap();
        block.add_transaction(&tx(2, 2)).unwrap();
        assert!(!block.verify(Curve::P256, keypair.public_key()).unwrap());

        block.seal(&keypair).unwrap();
        assert!(block.is_sealed());
        assert!(block.verify(Curve::P256, keypair.public_key()).unwrap());

        let other = Keypair::generate(Curve::P256).unwrap();
        assert!(!block.verify(Curve::P256, other.public_key()).unwrap());
    }

    #[test]
    fn test_sealed_block_rejects_changes() {
        let keypair = Keypair::generate(Curve::P256).unwrap();
        let mut block = Block::genesis();
        block.seal(&keypair).unwrap();

        assert!(matches!(
            block.add_transaction(&tx(1, 1)),
            Err(LedgerError::InvalidBlock(_))
        ));
        assert!(block.set_nonce(9).is_err());
        assert!(block.set_origin(b"x").is_err());
        assert!(block.update_merkle_root().is_err());
    }

    #[test]
    fn test_merkle_proofs() {
        let mut block = Block::genesis();
        for t in 0..5 {
            block.add_transaction(&tx(t, t)).unwrap();
        }
        block.update_merkle_root().unwrap();

        for i in 0..5 {
            let proof = block.generate_merkle_proof(i).unwrap();
            assert_eq!(proof.leaf_hash, block.get_transactions()[i].hash().unwrap());
            assert!(block.verify_merkle_proof(&proof));
        }
        assert!(block.generate_merkle_proof(5).is_err());
    }

    #[test]
    fn test_verify_rejects_payload_mismatch() {
        let keypair = Keypair::generate(Curve::P256).unwrap();
        let mut block = Block::genesis();
        block.add_transaction(&tx(1, 1)).unwrap();
        block.add_transaction(&tx(2, 2)).unwrap();
        block.seal(&keypair).unwrap();
        assert!(block.verify(Curve::P256, keypair.public_key()).unwrap());

        let mut tampered = block.clone();
        tampered.transactions[1].payload = vec![0xEE];
        assert!(tampered.verify_merkle_root().unwrap());
        assert!(!tampered.verify(Curve::P256, keypair.public_key()).unwrap());
    }

    #[test]
    fn test_unordered_transactions_are_rejected() {
        let keypair = Keypair::generate(Curve::P256).unwrap();
        let mut block = Block::genesis();
        block.add_transaction(&tx(1, 1)).unwrap();
        block.add_transaction(&tx(2, 2)).unwrap();
        block.transactions.swap(0, 1);

        let bytes = block.serialize().unwrap();
        assert!(matches!(
            Block::deserialize(&bytes),
            Err(LedgerError::InvalidBlock(_))
        ));

        block.seal(&keypair).unwrap();
        assert!(!block.verify(Curve::P256, keypair.public_key()).unwrap());
    }

    #[test]
    fn test_deserialize_oversized_length_prefix() {
        // varint marker for a u64 length, then 2^40
        let mut bytes = vec![0xFD];
        bytes.extend((1u64 << 40).to_le_bytes());
        assert!(matches!(
            Block::deserialize(&bytes),
            Err(LedgerError::Serialization(_))
        ));
    }

    #[test]
    fn test_serialize_round_trip() {
        let keypair = Keypair::generate(Curve::P256).unwrap();
        let mut block = Block::genesis();
        block.add_transaction(&tx(7, 7)).unwrap();
        block.seal(&keypair).unwrap();

        let bytes = block.serialize().unwrap();
        let restored = Block::deserialize(&bytes).unwrap();
        assert_eq!(restored, block);
        assert!(restored.verify(Curve::P256, keypair.public_key()).unwrap());
    }
}
