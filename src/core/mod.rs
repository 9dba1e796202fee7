//! Core ledger data model
//!
//! Blocks, transactions and the Merkle tree that anchors a block's
//! transaction set.

pub mod block;
pub mod merkle;
pub mod transaction;

pub use block::{Block, BlockHeader, GENESIS_PREVIOUS_BLOCK};
pub use merkle::{MerkleProof, MerkleTree, ProofElement};
pub use transaction::{Transaction, TransactionHeader};
