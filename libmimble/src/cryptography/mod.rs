//! Cryptographic building blocks
//!
//! Secret key types, the validity checks shared by every curve, and the operation-scoped contexts of the
//! secp256k1-zkp library. Nothing in here knows about accounts, addresses or payment proofs.

pub(crate) mod context;
pub mod keys;

pub use keys::{
    is_valid_ed25519_public_key, is_valid_secp256k1_private_key, is_valid_secp256k1_public_key,
    uncompress_secp256k1_public_key,
};
