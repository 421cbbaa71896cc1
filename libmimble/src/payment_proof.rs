//! Payment proofs.
//!
//! A payment proof is the receiver's signature over a message naming the amount, the output commitment and the
//! sender's address. The message layout and the signature scheme both follow from the kind of address involved, and
//! the address kind is recognised by its length alone:
//!
//! | Address | Length | Message | Signature |
//! |---|---|---|---|
//! | MQS | 52 | `hex(commitment) ‖ sender address ‖ decimal(value)` | DER ECDSA over SHA-256 |
//! | Tor | 56 | `hex(commitment) ‖ sender address ‖ decimal(value)` | Ed25519 |
//! | Ed25519 | 32 | `big-endian(value) ‖ commitment ‖ sender address` | Ed25519 |
//!
//! A currency only accepts the schemes its [`CurrencyInfo`] allows.

use crate::address::{AddressCurve, DEFAULT_ADDRESS_INDEX};
use crate::commitment::{Commitment, COMMITMENT_SIZE};
use crate::config::CurrencyInfo;
use crate::cryptography::keys::{is_valid_ed25519_public_key, ED25519_PUBLIC_KEY_SIZE};
use crate::derivation::Keychain;
use crate::error::CryptoError;
use crate::mqs::{public_key_from_mqs_address, MQS_ADDRESS_SIZE};
use crate::tor::{public_key_from_tor_address, TOR_ADDRESS_SIZE};
use k256::ecdsa::signature::{Signer as _, Verifier as _};
use log::{debug, warn};

pub const MAXIMUM_DER_SIGNATURE_SIZE: usize = 72;
pub const ED25519_SIGNATURE_SIZE: usize = 64;
const VALUE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScheme {
    Mqs,
    Tor,
    Ed25519,
}

impl AddressScheme {
    /// Recognises the scheme of an address from its length.
    pub fn from_address(address: &[u8]) -> Result<Self, CryptoError> {
        Self::from_address_length(address.len())
    }

    fn from_address_length(length: usize) -> Result<Self, CryptoError> {
        match length {
            MQS_ADDRESS_SIZE => Ok(AddressScheme::Mqs),
            TOR_ADDRESS_SIZE => Ok(AddressScheme::Tor),
            ED25519_PUBLIC_KEY_SIZE => Ok(AddressScheme::Ed25519),
            _ => Err(CryptoError::InvalidParameters("address length matches no address scheme")),
        }
    }

    pub fn is_allowed(self, currency: &CurrencyInfo) -> bool {
        match self {
            AddressScheme::Mqs => currency.mqs_address_payment_proof_allowed,
            AddressScheme::Tor => currency.tor_address_payment_proof_allowed,
            AddressScheme::Ed25519 => currency.ed25519_address_payment_proof_allowed,
        }
    }

    fn check_allowed(self, currency: &CurrencyInfo) -> Result<Self, CryptoError> {
        if !self.is_allowed(currency) {
            warn!("{self:?} payment proofs are not allowed for {}", currency.name);
            return Err(CryptoError::InvalidParameters("address scheme not allowed for this currency"));
        }
        Ok(self)
    }
}

fn decimal_length(mut value: u64) -> usize {
    let mut length = 1;
    while value >= 10 {
        value /= 10;
        length += 1;
    }
    length
}

/// Writes `value` in decimal ASCII into `buffer`, which must be exactly `decimal_length(value)` bytes.
fn write_decimal(buffer: &mut [u8], mut value: u64) {
    for digit in buffer.iter_mut().rev() {
        *digit = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

/// The length of the payment proof message for `value` and a sender address of `sender_address_length` bytes.
pub fn payment_proof_message_length(
    currency: &CurrencyInfo,
    value: u64,
    sender_address_length: usize,
) -> Result<usize, CryptoError> {
    let scheme = AddressScheme::from_address_length(sender_address_length)?.check_allowed(currency)?;
    Ok(match scheme {
        AddressScheme::Mqs | AddressScheme::Tor => COMMITMENT_SIZE * 2 + sender_address_length + decimal_length(value),
        AddressScheme::Ed25519 => VALUE_SIZE + COMMITMENT_SIZE + sender_address_length,
    })
}

/// Writes the payment proof message into the front of `buffer` and returns its length.
pub fn write_payment_proof_message(
    currency: &CurrencyInfo,
    buffer: &mut [u8],
    value: u64,
    commitment: &Commitment,
    sender_address: &[u8],
) -> Result<usize, CryptoError> {
    let scheme = AddressScheme::from_address(sender_address)?.check_allowed(currency)?;
    let length = payment_proof_message_length(currency, value, sender_address.len())?;
    if buffer.len() < length {
        return Err(CryptoError::InvalidParameters("payment proof message buffer is too small"));
    }
    match scheme {
        AddressScheme::Mqs => {
            public_key_from_mqs_address(currency, sender_address)?;
        }
        AddressScheme::Tor => {
            public_key_from_tor_address(sender_address)?;
        }
        AddressScheme::Ed25519 => {
            if !is_valid_ed25519_public_key(sender_address) {
                return Err(CryptoError::InvalidParameters("sender address is not a valid Ed25519 public key"));
            }
        }
    }

    debug!("Building {scheme:?} payment proof message of {length} bytes");
    match scheme {
        AddressScheme::Mqs | AddressScheme::Tor => {
            let hex_end = COMMITMENT_SIZE * 2;
            let address_end = hex_end + sender_address.len();
            hex::encode_to_slice(commitment.as_bytes(), &mut buffer[..hex_end])
                .map_err(|_| CryptoError::InternalError("commitment hex encoding failed"))?;
            buffer[hex_end..address_end].copy_from_slice(sender_address);
            write_decimal(&mut buffer[address_end..length], value);
        }
        AddressScheme::Ed25519 => {
            buffer[..VALUE_SIZE].copy_from_slice(&value.to_be_bytes());
            buffer[VALUE_SIZE..VALUE_SIZE + COMMITMENT_SIZE].copy_from_slice(commitment.as_bytes());
            buffer[VALUE_SIZE + COMMITMENT_SIZE..length].copy_from_slice(sender_address);
        }
    }
    Ok(length)
}

/// Builds the payment proof message in a new buffer.
pub fn payment_proof_message(
    currency: &CurrencyInfo,
    value: u64,
    commitment: &Commitment,
    sender_address: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut message = vec![0u8; payment_proof_message_length(currency, value, sender_address.len())?];
    write_payment_proof_message(currency, &mut message, value, commitment, sender_address)?;
    Ok(message)
}

/// Checks the receiver's `signature` over `message`.
///
/// Returns `Ok(false)` when everything is well formed but the signature does not match. A disallowed scheme, an
/// address that does not decode or a signature of the wrong size is an error.
pub fn verify_payment_proof_message(
    currency: &CurrencyInfo,
    message: &[u8],
    receiver_address: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    let scheme = AddressScheme::from_address(receiver_address)?.check_allowed(currency)?;
    debug!("Verifying {scheme:?} payment proof over {} bytes", message.len());
    let verified = match scheme {
        AddressScheme::Mqs => {
            if signature.len() > MAXIMUM_DER_SIGNATURE_SIZE {
                return Err(CryptoError::InvalidParameters("DER signature is too long"));
            }
            let public_key = public_key_from_mqs_address(currency, receiver_address)?;
            verify_ecdsa(&public_key, message, signature)?
        }
        AddressScheme::Tor => {
            let signature = ed25519_signature(signature)?;
            let public_key = public_key_from_tor_address(receiver_address)?;
            verify_ed25519(&public_key, message, &signature)?
        }
        AddressScheme::Ed25519 => {
            let signature = ed25519_signature(signature)?;
            let mut public_key = [0u8; ED25519_PUBLIC_KEY_SIZE];
            public_key.copy_from_slice(receiver_address);
            if !is_valid_ed25519_public_key(&public_key) {
                return Err(CryptoError::InvalidParameters("receiver address is not a valid Ed25519 public key"));
            }
            verify_ed25519(&public_key, message, &signature)?
        }
    };
    if !verified {
        warn!("{scheme:?} payment proof signature does not match");
    }
    Ok(verified)
}

fn ed25519_signature(signature: &[u8]) -> Result<ed25519_dalek::Signature, CryptoError> {
    let bytes = <&[u8; ED25519_SIGNATURE_SIZE]>::try_from(signature)
        .map_err(|_| CryptoError::InvalidParameters("Ed25519 signature must be 64 bytes"))?;
    Ok(ed25519_dalek::Signature::from_bytes(bytes))
}

fn verify_ed25519(
    public_key: &[u8; ED25519_PUBLIC_KEY_SIZE],
    message: &[u8],
    signature: &ed25519_dalek::Signature,
) -> Result<bool, CryptoError> {
    let key = ed25519_dalek::VerifyingKey::from_bytes(public_key)
        .map_err(|_| CryptoError::InvalidParameters("not a valid Ed25519 public key"))?;
    Ok(key.verify(message, signature).is_ok())
}

/// A DER signature that does not parse is a mismatch rather than a malformed request, since its length was fine.
fn verify_ecdsa(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
    let key = k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
        .map_err(|_| CryptoError::InvalidParameters("not a valid secp256k1 public key"))?;
    let Ok(signature) = k256::ecdsa::Signature::from_der(signature) else {
        return Ok(false);
    };
    let signature = signature.normalize_s().unwrap_or(signature);
    Ok(key.verify(message, &signature).is_ok())
}

impl Keychain {
    /// Signs a payment proof `message` as the receiver, with the account's address key for `scheme`.
    ///
    /// MQS proofs get a DER encoded ECDSA signature. Tor and Ed25519 proofs get a 64-byte Ed25519 signature.
    pub fn sign_payment_proof_message(
        &self,
        account: u32,
        message: &[u8],
        scheme: AddressScheme,
    ) -> Result<Vec<u8>, CryptoError> {
        scheme.check_allowed(self.currency())?;
        debug!("Signing {scheme:?} payment proof for account {account}");
        match scheme {
            AddressScheme::Mqs => {
                let key = self.address_private_key(account, DEFAULT_ADDRESS_INDEX, AddressCurve::Secp256k1)?;
                let signing_key = k256::ecdsa::SigningKey::from_slice(key.as_bytes())
                    .map_err(|_| CryptoError::InternalError("address key rejected by ECDSA"))?;
                let signature: k256::ecdsa::Signature = signing_key.sign(message);
                Ok(signature.to_der().as_bytes().to_vec())
            }
            AddressScheme::Tor | AddressScheme::Ed25519 => {
                let key = self.address_private_key(account, DEFAULT_ADDRESS_INDEX, AddressCurve::Ed25519)?;
                let signing_key = key.ed25519_signing_key()?;
                Ok(signing_key.sign(message).to_bytes().to_vec())
            }
        }
    }
}
