//! Hierarchical deterministic key derivation.
//!
//! Keys follow BIP32, but the master node is keyed with a currency-family specific label instead of `"Bitcoin seed"`
//! and every account lives under the fixed path `m/44'/coin_type'/account'/0/0`. Further derivation below the account
//! root uses the usual BIP32 child key function on secp256k1.

use crate::config::CurrencyInfo;
use crate::cryptography::keys::{
    scalar_to_bytes, ChainCode, ExtendedPrivateKey, PrivateKey, COMPRESSED_PUBLIC_KEY_SIZE, SECP256K1_PRIVATE_KEY_SIZE,
};
use crate::error::CryptoError;
use hmac::{Hmac, Mac};
use log::{debug, error};
use sha2::Sha512;
use std::fmt::Debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

pub const HARDENED_PATH_MASK: u32 = 0x8000_0000;
pub const MAXIMUM_ACCOUNT: u32 = HARDENED_PATH_MASK - 1;
pub const SEED_SIZE: usize = 64;
pub const NODE_SIZE: usize = 64;
pub const IDENTIFIER_MAXIMUM_DEPTH: usize = 4;
pub const IDENTIFIER_SIZE: usize = 1 + IDENTIFIER_MAXIMUM_DEPTH * 4;

/// HMAC key for the master node.
const SEED_KEY: &[u8] = b"IamVoldemort";
const BIP44_PURPOSE: u32 = 44;

/// The root secret every key is derived from.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_SIZE]);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_SIZE]) -> Self {
        Self(bytes)
    }

    /// The BIP32 master node: `HMAC-SHA512(SEED_KEY, seed)`.
    fn master_key(&self) -> Result<ExtendedPrivateKey, CryptoError> {
        let node = hmac_sha512(SEED_KEY, &[&self.0[..]])?;
        ExtendedPrivateKey::from_node(&node)
    }
}

impl Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(***)")
    }
}

/// Computes HMAC-SHA512 over the concatenation of `parts`. The result is wiped when dropped.
pub(crate) fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; NODE_SIZE]>, CryptoError> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|_| CryptoError::InternalError("HMAC-SHA512 key rejected"))?;
    for part in parts {
        mac.update(part);
    }
    let mut output = mac.finalize().into_bytes();
    let mut node = Zeroizing::new([0u8; NODE_SIZE]);
    node.copy_from_slice(&output);
    output.as_mut_slice().zeroize();
    Ok(node)
}

/// Walks `path` from `key`, replacing its private key and chain code at every step.
///
/// Hardened steps hash `0x00 ‖ private key ‖ index`, normal steps hash `compressed public key ‖ index`, both keyed by
/// the current chain code. A candidate or summed scalar outside `1..n` is an internal error; it is never retried with
/// a different index because the caller does not control the path.
pub fn derive_child_key(key: &mut ExtendedPrivateKey, path: &[u32]) -> Result<(), CryptoError> {
    for &index in path {
        let mut data = Zeroizing::new([0u8; COMPRESSED_PUBLIC_KEY_SIZE + 4]);
        if index & HARDENED_PATH_MASK != 0 {
            data[1..1 + SECP256K1_PRIVATE_KEY_SIZE].copy_from_slice(key.private_key.as_bytes());
        } else {
            data[..COMPRESSED_PUBLIC_KEY_SIZE].copy_from_slice(&key.private_key.public_key()?);
        }
        data[COMPRESSED_PUBLIC_KEY_SIZE..].copy_from_slice(&index.to_be_bytes());

        let node = hmac_sha512(key.chain_code.as_bytes(), &[&data[..]])?;
        let candidate = PrivateKey::from_derived(&node[..SECP256K1_PRIVATE_KEY_SIZE])?;
        let sum = Zeroizing::new(candidate.as_scalar()? + key.private_key.as_scalar()?);
        let sum_bytes = Zeroizing::new(scalar_to_bytes(&sum));
        key.private_key = PrivateKey::from_derived(&sum_bytes[..])?;
        key.chain_code = ChainCode::from_slice(&node[SECP256K1_PRIVATE_KEY_SIZE..]);
    }
    Ok(())
}

/// A Grin keychain identifier: a depth byte followed by four big-endian path elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    depth: u8,
    path: [u32; IDENTIFIER_MAXIMUM_DEPTH],
}

impl Identifier {
    pub fn from_bytes(bytes: &[u8; IDENTIFIER_SIZE]) -> Result<Self, CryptoError> {
        let depth = bytes[0];
        if depth as usize > IDENTIFIER_MAXIMUM_DEPTH {
            return Err(CryptoError::InvalidParameters("identifier depth exceeds the maximum depth"));
        }
        let mut path = [0u32; IDENTIFIER_MAXIMUM_DEPTH];
        for (i, element) in path.iter_mut().enumerate() {
            let start = 1 + i * 4;
            *element = u32::from_be_bytes([bytes[start], bytes[start + 1], bytes[start + 2], bytes[start + 3]]);
        }
        Ok(Self { depth, path })
    }

    pub fn to_bytes(&self) -> [u8; IDENTIFIER_SIZE] {
        let mut result = [0u8; IDENTIFIER_SIZE];
        result[0] = self.depth;
        for (i, element) in self.path.iter().enumerate() {
            result[1 + i * 4..5 + i * 4].copy_from_slice(&element.to_be_bytes());
        }
        result
    }

    /// The derivation path this identifier names, below the account root.
    pub fn path(&self) -> &[u32] {
        &self.path[..self.depth as usize]
    }
}

/// Owns the seed and the currency configuration, and derives per-account key material on demand.
///
/// A keychain holds no derived state: every method derives what it needs and wipes it before returning.
#[derive(Debug)]
pub struct Keychain {
    seed: Seed,
    currency: CurrencyInfo,
}

impl Keychain {
    pub fn new(seed: Seed, currency: CurrencyInfo) -> Self {
        Self { seed, currency }
    }

    pub fn currency(&self) -> &CurrencyInfo {
        &self.currency
    }

    /// The account root key at `m/44'/coin_type'/account'/0/0`.
    pub fn private_key_and_chain_code(&self, account: u32) -> Result<ExtendedPrivateKey, CryptoError> {
        if account > MAXIMUM_ACCOUNT {
            return Err(CryptoError::InvalidParameters("account collides with the hardened path mask"));
        }
        let path = [
            BIP44_PURPOSE | HARDENED_PATH_MASK,
            self.currency.bip44_coin_type | HARDENED_PATH_MASK,
            account | HARDENED_PATH_MASK,
            0,
            0,
        ];
        let mut key = self.seed.master_key()?;
        derive_child_key(&mut key, &path).inspect_err(|e| error!("Account root derivation failed: {e}"))?;
        Ok(key)
    }

    /// The key at `path` below the account root.
    pub fn derive_child_key(&self, account: u32, path: &[u32]) -> Result<ExtendedPrivateKey, CryptoError> {
        debug!("Deriving child key for account {account} at depth {}", path.len());
        let mut key = self.private_key_and_chain_code(account)?;
        derive_child_key(&mut key, path)?;
        Ok(key)
    }

    /// The compressed secp256k1 public key of the account root.
    pub fn account_public_key(&self, account: u32) -> Result<[u8; COMPRESSED_PUBLIC_KEY_SIZE], CryptoError> {
        self.private_key_and_chain_code(account)?.private_key().public_key()
    }
}
