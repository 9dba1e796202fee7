//! # Ledger Primitives - Keys, Blocks and Merkle Roots
//!
//! The data model and cryptographic building blocks for a minimal ledger.
//! Transport, consensus and storage live elsewhere; this crate only owns the
//! pieces whose encodings have to be exactly right.
//!
//! ## What's Here
//! - **Key pairs**: ECDSA on P-256 or P-384, stored as base58 text over a
//!   fixed-stride big-integer packing
//! - **Signatures**: `(r, s)` packed with the same stride and text encoding
//! - **Merkle roots**: SHA-256 pairwise reduction where an odd last leaf is
//!   promoted instead of duplicated
//! - **Blocks and transactions**: transactions kept in timestamp order, with
//!   the block header committing to them through the Merkle root
//!
//! ## How the Code Is Organized
//! - `core/`: blocks, transactions, Merkle tree
//! - `wallet/`: curve selection, key generation, signing and verification
//! - `utils/`: big-integer codec, base58, hashing/ECDSA wrappers, bincode helpers
//! - `config/`: curve configuration from TOML or the environment
//! - `error/`: the crate-wide error type
//!
//! ## Wire Format
//! Every key and signature is `base58(encode(stride, values))` where the
//! stride is the curve's field size (32 bytes for P-256, 48 for P-384). The
//! first value is written at its natural width, every later value is
//! left-padded to the stride.

pub mod config;
pub mod core;
pub mod error;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use config::Config;
pub use crate::core::{
    Block, BlockHeader, MerkleProof, MerkleTree, ProofElement, Transaction, TransactionHeader,
    GENESIS_PREVIOUS_BLOCK,
};
pub use error::{LedgerError, Result};
pub use utils::{
    base58_decode, base58_encode, current_timestamp, decode_big_uints, encode_big_uints,
    sha256_digest,
};
pub use wallet::{verify_signature, Curve, Keypair};
