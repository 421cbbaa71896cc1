//! Blinding factors for Pedersen commitments.
//!
//! A blinding factor is either the raw scalar derived at a path, or that scalar passed through the switch-commitment
//! transform, which binds it to the committed value and a third generator `J`. Blinding factors are summed while a
//! transaction is assembled, and since inputs and outputs must balance the running sum may end at exactly zero.

use crate::cryptography::context::{secret_key_bytes, ZkpContext};
use crate::cryptography::keys::{is_valid_secp256k1_private_key, scalar_from_bytes, scalar_to_bytes};
use crate::derivation::Keychain;
use crate::error::CryptoError;
use log::{debug, error};
use std::fmt::Debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const BLINDING_FACTOR_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchType {
    /// Use the derived scalar as is.
    None,
    /// Apply the switch-commitment transform.
    Regular,
}

impl TryFrom<u8> for SwitchType {
    type Error = CryptoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SwitchType::None),
            1 => Ok(SwitchType::Regular),
            _ => Err(CryptoError::InvalidParameters("unknown switch type")),
        }
    }
}

/// A 32-byte blinding factor: a valid secp256k1 scalar, or the all-zero vector.
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BlindingFactor([u8; BLINDING_FACTOR_SIZE]);

impl BlindingFactor {
    pub fn zero() -> Self {
        Self([0u8; BLINDING_FACTOR_SIZE])
    }

    pub fn from_bytes(bytes: &[u8; BLINDING_FACTOR_SIZE]) -> Result<Self, CryptoError> {
        if !is_zero(bytes) && !is_valid_secp256k1_private_key(bytes) {
            return Err(CryptoError::InvalidParameters("not a valid blinding factor"));
        }
        Ok(Self(*bytes))
    }

    fn from_derived(bytes: &[u8; BLINDING_FACTOR_SIZE]) -> Result<Self, CryptoError> {
        Self::from_bytes(bytes).map_err(|_| CryptoError::InternalError("derived blinding factor is out of range"))
    }

    pub fn as_bytes(&self) -> &[u8; BLINDING_FACTOR_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        is_zero(&self.0)
    }
}

impl Debug for BlindingFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BlindingFactor(***)")
    }
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

impl Keychain {
    /// Derives the blinding factor for an output of `value` at `path` below the account root.
    pub fn derive_blinding_factor(
        &self,
        account: u32,
        value: u64,
        path: &[u32],
        switch_type: SwitchType,
    ) -> Result<BlindingFactor, CryptoError> {
        debug!("Deriving {switch_type:?} blinding factor for account {account}");
        let child = self.derive_child_key(account, path)?;
        match switch_type {
            SwitchType::None => BlindingFactor::from_derived(child.private_key().as_bytes()),
            SwitchType::Regular => {
                let ctx = ZkpContext::commit();
                let blind = ctx.secret_key(child.private_key().as_bytes()).map_err(|_| {
                    CryptoError::InternalError("derived key rejected by the commitment library")
                })?;
                let switched = ctx.blind_switch(value, blind).map_err(|e| {
                    error!("Switch commitment transform failed: {e:?}");
                    CryptoError::InternalError("switch commitment transform failed")
                })?;
                let bytes = Zeroizing::new(secret_key_bytes(&switched));
                BlindingFactor::from_derived(&bytes)
            }
        }
    }
}

/// Adds `factor` into `sum` (or subtracts it when `is_positive` is false), modulo the group order.
///
/// The updated sum must be all-zero or a valid scalar. Anything else means the caller's transaction does not balance
/// and is reported as invalid parameters.
pub fn update_blinding_factor_sum(
    sum: &mut BlindingFactor,
    factor: &BlindingFactor,
    is_positive: bool,
) -> Result<(), CryptoError> {
    let current = Zeroizing::new(
        scalar_from_bytes(sum.as_bytes()).ok_or(CryptoError::InternalError("blinding factor sum is out of range"))?,
    );
    let term = Zeroizing::new(
        scalar_from_bytes(factor.as_bytes()).ok_or(CryptoError::InternalError("blinding factor is out of range"))?,
    );
    let updated = Zeroizing::new(if is_positive { *current + *term } else { *current - *term });
    let bytes = Zeroizing::new(scalar_to_bytes(&updated));
    *sum = BlindingFactor::from_bytes(&bytes)
        .map_err(|_| CryptoError::InvalidParameters("blinding factor sum is not a valid scalar"))?;
    Ok(())
}
