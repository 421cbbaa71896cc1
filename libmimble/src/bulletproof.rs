//! The device's share of a split bulletproof.
//!
//! The host assembles the range proof. The device only contributes the two values that need its secrets: first the
//! polynomial commitments `T1` and `T2`, and later the blinding scalar `τx`. Both steps drive the zkp library's
//! multi-party prover for a single 64-bit value, with the rewind nonce as the proof nonce and the private nonce as
//! this signer's own randomness.

use crate::blinding::BlindingFactor;
use crate::commitment::Nonce;
use crate::cryptography::context::{secret_key_bytes, ZkpContext};
use crate::cryptography::keys::COMPRESSED_PUBLIC_KEY_SIZE;
use crate::error::CryptoError;
use log::{debug, error};
use secp256k1zkp::key::{PublicKey, SecretKey, ZERO_KEY};
use secp256k1zkp::pedersen::ProofMessage;
use zeroize::Zeroizing;

pub const PROOF_MESSAGE_SIZE: usize = 20;
pub const TAU_X_SIZE: usize = 32;

/// Prover step that fills in `T1` and `T2`.
const STEP_T_ONE_AND_T_TWO: u8 = 1;
/// Prover step that fills in `τx` given the summed `T1` and `T2`.
const STEP_TAU_X: u8 = 2;

/// The inputs shared by both prover steps, converted into library key types.
struct ProverInputs {
    ctx: ZkpContext,
    value: u64,
    blind: SecretKey,
    rewind_nonce: SecretKey,
    private_nonce: SecretKey,
}

impl ProverInputs {
    fn new(
        value: u64,
        blinding_factor: &BlindingFactor,
        rewind_nonce: &Nonce,
        private_nonce: &Nonce,
    ) -> Result<Self, CryptoError> {
        let ctx = ZkpContext::commit();
        let blind = ctx.secret_key(blinding_factor.as_bytes())?;
        let rewind_nonce = ctx.secret_key(rewind_nonce.as_bytes())?;
        let private_nonce = ctx.secret_key(private_nonce.as_bytes())?;
        Ok(Self { ctx, value, blind, rewind_nonce, private_nonce })
    }

    fn commitment(&self) -> Result<secp256k1zkp::pedersen::Commitment, CryptoError> {
        self.ctx.commit(self.value, self.blind.clone()).map_err(|e| {
            error!("Pedersen commitment for range proof failed: {e:?}");
            CryptoError::InternalError("Pedersen commitment failed")
        })
    }

    /// Runs the first prover step. The library reports the outcome of intermediate steps through the output
    /// arguments, so success is judged by whether both points were filled in.
    fn t_one_and_t_two(&self) -> Result<(PublicKey, PublicKey), CryptoError> {
        let commit = self.commitment()?;
        let mut t_one = PublicKey::new();
        let mut t_two = PublicKey::new();
        let _ = self.ctx.bullet_proof_multisig(
            self.value,
            self.blind.clone(),
            self.rewind_nonce.clone(),
            None,
            None,
            None,
            Some(&mut t_one),
            Some(&mut t_two),
            vec![commit],
            Some(&self.private_nonce),
            STEP_T_ONE_AND_T_TWO.into(),
        );
        if !t_one.is_valid() || !t_two.is_valid() {
            error!("Bulletproof T1/T2 step produced no output");
            return Err(CryptoError::InternalError("bulletproof T1/T2 step failed"));
        }
        Ok((t_one, t_two))
    }

    fn tau_x(
        &self,
        t_one: &mut PublicKey,
        t_two: &mut PublicKey,
        message: ProofMessage,
    ) -> Result<Zeroizing<[u8; TAU_X_SIZE]>, CryptoError> {
        let commit = self.commitment()?;
        let mut tau_x = ZERO_KEY;
        let _ = self.ctx.bullet_proof_multisig(
            self.value,
            self.blind.clone(),
            self.rewind_nonce.clone(),
            None,
            Some(message),
            Some(&mut tau_x),
            Some(t_one),
            Some(t_two),
            vec![commit],
            Some(&self.private_nonce),
            STEP_TAU_X.into(),
        );
        let result = Zeroizing::new(secret_key_bytes(&tau_x));
        if result.iter().all(|b| *b == 0) {
            error!("Bulletproof tau_x step produced no output");
            return Err(CryptoError::InternalError("bulletproof tau_x step failed"));
        }
        Ok(result)
    }
}

/// Computes this device's `τx` for a single-value 64-bit range proof on `value`.
///
/// `proof_message` is embedded in the proof and is recovered by whoever rewinds it with the rewind nonce.
pub fn bulletproof_tau_x(
    value: u64,
    blinding_factor: &BlindingFactor,
    rewind_nonce: &Nonce,
    private_nonce: &Nonce,
    proof_message: &[u8; PROOF_MESSAGE_SIZE],
) -> Result<[u8; TAU_X_SIZE], CryptoError> {
    debug!("Calculating bulletproof tau_x");
    let inputs = ProverInputs::new(value, blinding_factor, rewind_nonce, private_nonce)?;
    let (mut t_one, mut t_two) = inputs.t_one_and_t_two()?;
    let tau_x = inputs.tau_x(&mut t_one, &mut t_two, ProofMessage::from_bytes(proof_message))?;
    Ok(*tau_x)
}

/// Computes this device's compressed `T1` and `T2` for a single-value 64-bit range proof on `value`.
pub fn bulletproof_t_one_and_t_two(
    value: u64,
    blinding_factor: &BlindingFactor,
    rewind_nonce: &Nonce,
    private_nonce: &Nonce,
) -> Result<([u8; COMPRESSED_PUBLIC_KEY_SIZE], [u8; COMPRESSED_PUBLIC_KEY_SIZE]), CryptoError> {
    debug!("Calculating bulletproof T1 and T2");
    let inputs = ProverInputs::new(value, blinding_factor, rewind_nonce, private_nonce)?;
    let (t_one, t_two) = inputs.t_one_and_t_two()?;
    Ok((inputs.ctx.serialize_public_key(&t_one)?, inputs.ctx.serialize_public_key(&t_two)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blinding::SwitchType;
    use crate::commitment::commit_value;
    use crate::cryptography::keys::is_valid_secp256k1_public_key;
    use crate::tests::test_keychain;

    struct Fixture {
        value: u64,
        blind: BlindingFactor,
        rewind: Nonce,
        private: Nonce,
    }

    fn fixture(value: u64) -> Fixture {
        let keychain = test_keychain();
        let blind = keychain.derive_blinding_factor(0, value, &[3], SwitchType::Regular).unwrap();
        let commitment = commit_value(value, &blind).unwrap();
        let rewind = keychain.rewind_nonce(0, &commitment).unwrap();
        let private = keychain.private_nonce(0, &commitment).unwrap();
        Fixture { value, blind, rewind, private }
    }

    #[test]
    fn t_one_and_t_two_are_valid_points() {
        let f = fixture(1_000_000);
        let (t_one, t_two) = bulletproof_t_one_and_t_two(f.value, &f.blind, &f.rewind, &f.private).unwrap();
        assert!(is_valid_secp256k1_public_key(&t_one));
        assert!(is_valid_secp256k1_public_key(&t_two));
        assert_ne!(t_one, t_two);
        let again = bulletproof_t_one_and_t_two(f.value, &f.blind, &f.rewind, &f.private).unwrap();
        assert_eq!(again, (t_one, t_two));
    }

    #[test]
    fn tau_x_is_deterministic() {
        let f = fixture(1_000_000);
        let message = [0x11u8; PROOF_MESSAGE_SIZE];
        let a = bulletproof_tau_x(f.value, &f.blind, &f.rewind, &f.private, &message).unwrap();
        let b = bulletproof_tau_x(f.value, &f.blind, &f.rewind, &f.private, &message).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, [0u8; TAU_X_SIZE]);
    }

    #[test]
    fn tau_x_depends_on_the_blinding_factor() {
        let f = fixture(7);
        let g = fixture(8);
        let message = [0u8; PROOF_MESSAGE_SIZE];
        let a = bulletproof_tau_x(f.value, &f.blind, &f.rewind, &f.private, &message).unwrap();
        let b = bulletproof_tau_x(g.value, &g.blind, &g.rewind, &g.private, &message).unwrap();
        assert_ne!(a, b);
    }
}
