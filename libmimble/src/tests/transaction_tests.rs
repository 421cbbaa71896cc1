//! A receiver building its side of a transaction.
//!
//! These tests cover:
//! - Blinding factor sums that balance a transaction against the commitment library's own commitment sum
//! - The output flow: blinding factor, commitment, nonces, `T1`/`T2`, then `τx`
//! - Finishing the device's shares into a range proof that verifies and rewinds to the value and proof message
//! - The kernel excess signature over the balanced blinding factor sum

use crate::aggsig::create_single_signer_signature;
use crate::blinding::{update_blinding_factor_sum, BlindingFactor, SwitchType};
use crate::bulletproof::{bulletproof_t_one_and_t_two, bulletproof_tau_x, PROOF_MESSAGE_SIZE};
use crate::commitment::{commit_value, Commitment};
use crate::cryptography::context::ZkpContext;
use crate::cryptography::keys::{is_valid_secp256k1_public_key, PrivateKey};
use crate::derivation::Keychain;
use crate::tests::test_keychain;
use secp256k1zkp::pedersen::ProofMessage;
use secp256k1zkp::{aggsig, Message, Signature};

const INPUTS: [(u64, u32); 2] = [(30, 1), (20, 2)];
const OUTPUTS: [(u64, u32); 2] = [(45, 3), (5, 4)];

// ============================================================================
// Shared test helpers
// ============================================================================

fn blind(keychain: &Keychain, value: u64, index: u32) -> BlindingFactor {
    keychain
        .derive_blinding_factor(0, value, &[0, 0, index], SwitchType::Regular)
        .expect("blinding factor should derive")
}

fn commitments(keychain: &Keychain, entries: &[(u64, u32)]) -> Vec<Commitment> {
    entries
        .iter()
        .map(|&(value, index)| commit_value(value, &blind(keychain, value, index)).expect("commitment should succeed"))
        .collect()
}

/// `Σ output blinds − Σ input blinds`
fn excess(keychain: &Keychain) -> BlindingFactor {
    let mut sum = BlindingFactor::zero();
    for (value, index) in OUTPUTS {
        update_blinding_factor_sum(&mut sum, &blind(keychain, value, index), true).expect("sum should update");
    }
    for (value, index) in INPUTS {
        update_blinding_factor_sum(&mut sum, &blind(keychain, value, index), false).expect("sum should update");
    }
    sum
}

// ============================================================================
// Balancing
// ============================================================================

#[test]
fn excess_commits_to_the_commitment_sum() {
    env_logger::try_init().ok();
    let keychain = test_keychain();
    let excess = excess(&keychain);
    assert!(!excess.is_zero());

    let ctx = ZkpContext::commit();
    let outputs = commitments(&keychain, &OUTPUTS).into_iter().map(Commitment::to_library).collect();
    let inputs = commitments(&keychain, &INPUTS).into_iter().map(Commitment::to_library).collect();
    let sum = ctx.commit_sum(outputs, inputs).expect("commitment sum should succeed");

    let expected = commit_value(0, &excess).expect("zero-value commitment should succeed");
    assert_eq!(&sum.0, expected.as_bytes());
}

#[test]
fn spending_an_output_back_cancels_out() {
    env_logger::try_init().ok();
    let keychain = test_keychain();
    let factor = blind(&keychain, 30, 1);
    let mut sum = BlindingFactor::zero();
    update_blinding_factor_sum(&mut sum, &factor, true).unwrap();
    assert_eq!(sum.as_bytes(), factor.as_bytes());
    update_blinding_factor_sum(&mut sum, &factor, false).unwrap();
    assert!(sum.is_zero());
}

// ============================================================================
// Output and kernel
// ============================================================================

#[test]
fn output_range_proof_shares() {
    env_logger::try_init().ok();
    let keychain = test_keychain();
    let (value, index) = OUTPUTS[0];
    let blind = blind(&keychain, value, index);
    let commitment = commit_value(value, &blind).unwrap();
    let rewind = keychain.rewind_nonce(0, &commitment).unwrap();
    let private = keychain.private_nonce(0, &commitment).unwrap();
    assert_ne!(rewind.as_bytes(), private.as_bytes());

    let (t_one, t_two) = bulletproof_t_one_and_t_two(value, &blind, &rewind, &private).unwrap();
    assert!(is_valid_secp256k1_public_key(&t_one));
    assert!(is_valid_secp256k1_public_key(&t_two));

    let mut message = [0u8; PROOF_MESSAGE_SIZE];
    message[..4].copy_from_slice(&index.to_be_bytes());
    let tau_x = bulletproof_tau_x(value, &blind, &rewind, &private, &message).unwrap();
    assert!(PrivateKey::from_bytes(&tau_x).is_ok(), "tau_x should be a valid scalar");

    // A second device holding the same seed produces the same shares
    let other = test_keychain();
    let rewind_again = other.rewind_nonce(0, &commitment).unwrap();
    let private_again = other.private_nonce(0, &commitment).unwrap();
    assert_eq!(bulletproof_tau_x(value, &blind, &rewind_again, &private_again, &message).unwrap(), tau_x);
}

#[test]
fn device_shares_finish_into_a_rewindable_range_proof() {
    env_logger::try_init().ok();
    let keychain = test_keychain();
    let (value, index) = OUTPUTS[0];
    let blind = blind(&keychain, value, index);
    let commitment = commit_value(value, &blind).unwrap();
    let rewind = keychain.rewind_nonce(0, &commitment).unwrap();
    let private = keychain.private_nonce(0, &commitment).unwrap();
    let message = [7u8; PROOF_MESSAGE_SIZE];

    let (t_one, t_two) = bulletproof_t_one_and_t_two(value, &blind, &rewind, &private).unwrap();
    let tau_x = bulletproof_tau_x(value, &blind, &rewind, &private, &message).unwrap();

    // A single signer's shares are already the sums the host would finish the proof with
    let ctx = ZkpContext::commit();
    let commit = commitment.to_library();
    let mut tau_x = ctx.secret_key(&tau_x).unwrap();
    let mut t_one = ctx.public_key(&t_one).unwrap();
    let mut t_two = ctx.public_key(&t_two).unwrap();
    let private_nonce = ctx.secret_key(private.as_bytes()).unwrap();
    let proof = ctx
        .bullet_proof_multisig(
            value,
            ctx.secret_key(blind.as_bytes()).unwrap(),
            ctx.secret_key(rewind.as_bytes()).unwrap(),
            None,
            Some(ProofMessage::from_bytes(&message)),
            Some(&mut tau_x),
            Some(&mut t_one),
            Some(&mut t_two),
            vec![commit],
            Some(&private_nonce),
            0,
        )
        .expect("final prover step should produce a proof");
    assert!(ctx.verify_bullet_proof(commit, proof, None).is_ok());

    let info = ctx
        .rewind_bullet_proof(commit, ctx.secret_key(rewind.as_bytes()).unwrap(), None, proof)
        .expect("proof should rewind with the rewind nonce");
    assert_eq!(info.value, value);
    assert_eq!(&info.message.as_bytes()[..PROOF_MESSAGE_SIZE], &message[..]);

    let wrong = ctx.rewind_bullet_proof(commit, ctx.secret_key(private.as_bytes()).unwrap(), None, proof);
    assert!(wrong.map_or(true, |info| info.value != value), "only the rewind nonce should recover the value");
}

#[test]
fn kernel_excess_signature_verifies() {
    env_logger::try_init().ok();
    let keychain = test_keychain();
    let excess = PrivateKey::from_bytes(excess(&keychain).as_bytes()).unwrap();
    let nonce = keychain.derive_child_key(0, &[9]).unwrap().into_private_key();
    let public_excess = excess.public_key().unwrap();
    let public_nonce = nonce.public_key().unwrap();
    let kernel_message = [0x4bu8; 32];

    let signature =
        create_single_signer_signature(&kernel_message, &excess, &nonce, Some(&public_nonce), &public_excess)
            .unwrap();

    let ctx = ZkpContext::signing();
    let signature = Signature::from_compact(&ctx, &signature).unwrap();
    let message = Message::from_slice(&kernel_message).unwrap();
    let public_nonce = ctx.public_key(&public_nonce).unwrap();
    let public_excess = ctx.public_key(&public_excess).unwrap();
    assert!(aggsig::verify_single(
        &ctx,
        &signature,
        &message,
        Some(&public_nonce),
        &public_excess,
        Some(&public_excess),
        None,
        true
    ));
}
