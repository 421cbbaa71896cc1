//! Version 3 onion addresses: `base32(public key ‖ checksum ‖ version)`, lowercase and without the `.onion` suffix.

use crate::cryptography::keys::{is_valid_ed25519_public_key, ED25519_PUBLIC_KEY_SIZE};
use crate::error::CryptoError;
use data_encoding::BASE32_NOPAD;
use log::warn;
use sha3::{Digest, Sha3_256};

pub const TOR_ADDRESS_SIZE: usize = 56;
const TOR_ADDRESS_CHECKSUM_SIZE: usize = 2;
const TOR_ADDRESS_VERSION: u8 = 3;
const TOR_ADDRESS_CHECKSUM_SEED: &[u8] = b".onion checksum";
const DECODED_TOR_ADDRESS_SIZE: usize = ED25519_PUBLIC_KEY_SIZE + TOR_ADDRESS_CHECKSUM_SIZE + 1;

fn checksum(public_key: &[u8; ED25519_PUBLIC_KEY_SIZE]) -> [u8; TOR_ADDRESS_CHECKSUM_SIZE] {
    let mut hasher = Sha3_256::new();
    hasher.update(TOR_ADDRESS_CHECKSUM_SEED);
    hasher.update(public_key);
    hasher.update([TOR_ADDRESS_VERSION]);
    let hash = hasher.finalize();
    [hash[0], hash[1]]
}

pub fn tor_address_from_public_key(public_key: &[u8; ED25519_PUBLIC_KEY_SIZE]) -> [u8; TOR_ADDRESS_SIZE] {
    let mut decoded = [0u8; DECODED_TOR_ADDRESS_SIZE];
    decoded[..ED25519_PUBLIC_KEY_SIZE].copy_from_slice(public_key);
    decoded[ED25519_PUBLIC_KEY_SIZE..ED25519_PUBLIC_KEY_SIZE + TOR_ADDRESS_CHECKSUM_SIZE]
        .copy_from_slice(&checksum(public_key));
    decoded[DECODED_TOR_ADDRESS_SIZE - 1] = TOR_ADDRESS_VERSION;

    let mut address = [0u8; TOR_ADDRESS_SIZE];
    BASE32_NOPAD.encode_mut(&decoded, &mut address);
    address.make_ascii_lowercase();
    address
}

/// Decodes `address` and returns its embedded public key after checking the length, alphabet, version, checksum and
/// that the key is a point on Ed25519.
pub fn public_key_from_tor_address(address: &[u8]) -> Result<[u8; ED25519_PUBLIC_KEY_SIZE], CryptoError> {
    if address.len() != TOR_ADDRESS_SIZE {
        return Err(CryptoError::InvalidParameters("Tor address has the wrong length"));
    }
    if !address.iter().all(|c| c.is_ascii_lowercase() || (b'2'..=b'7').contains(c)) {
        return Err(CryptoError::InvalidParameters("Tor address is not lowercase base32"));
    }
    let mut upper = [0u8; TOR_ADDRESS_SIZE];
    upper.copy_from_slice(address);
    upper.make_ascii_uppercase();

    let mut decoded = [0u8; DECODED_TOR_ADDRESS_SIZE];
    let length = BASE32_NOPAD
        .decode_mut(&upper, &mut decoded)
        .map_err(|_| CryptoError::InvalidParameters("Tor address is not valid base32"))?;
    if length != DECODED_TOR_ADDRESS_SIZE {
        return Err(CryptoError::InvalidParameters("Tor address decodes to the wrong length"));
    }
    if decoded[DECODED_TOR_ADDRESS_SIZE - 1] != TOR_ADDRESS_VERSION {
        return Err(CryptoError::InvalidParameters("unsupported Tor address version"));
    }
    let mut public_key = [0u8; ED25519_PUBLIC_KEY_SIZE];
    public_key.copy_from_slice(&decoded[..ED25519_PUBLIC_KEY_SIZE]);
    if decoded[ED25519_PUBLIC_KEY_SIZE..ED25519_PUBLIC_KEY_SIZE + TOR_ADDRESS_CHECKSUM_SIZE] != checksum(&public_key) {
        return Err(CryptoError::InvalidParameters("Tor address checksum mismatch"));
    }
    if !is_valid_ed25519_public_key(&public_key) {
        return Err(CryptoError::InvalidParameters("Tor address does not contain a valid Ed25519 public key"));
    }
    Ok(public_key)
}

pub fn is_valid_tor_address(address: &[u8]) -> bool {
    match public_key_from_tor_address(address) {
        Ok(_) => true,
        Err(e) => {
            warn!("Rejected Tor address: {e}");
            false
        }
    }
}
