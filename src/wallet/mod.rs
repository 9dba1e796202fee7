//! Key management
//!
//! Curve selection, key pair generation and signing, and the curve-standard
//! verification helper for signatures produced here.

pub mod curve;
pub mod keypair;

pub use curve::Curve;
pub use keypair::{verify_signature, Keypair};
