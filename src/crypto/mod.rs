/// Cryptographic primitives consumed by the covenant verifiers
///
/// Hashing, ECDSA verification and P2PKH derivation are black-box services
/// here: `sha2` for commitments and script hashes, the secp256k1 context
/// shipped with the `bitcoin` crate for signatures.
use bitcoin::secp256k1::{ecdsa::Signature, Message, Secp256k1, VerifyOnly};
use bitcoin::{PublicKey, ScriptBuf};
use lazy_static::lazy_static;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref SECP: Secp256k1<VerifyOnly> = Secp256k1::verification_only();
}

/// Single SHA256 of `data`
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// P2PKH locking script (25 bytes) for a public key
pub fn p2pkh_script(pubkey: &PublicKey) -> ScriptBuf {
    ScriptBuf::new_p2pkh(&pubkey.pubkey_hash())
}

/// Verify an ECDSA signature over a 32-byte transaction digest
///
/// Returns `false` for any signature that does not validate; callers map
/// that onto their own rejection message.
pub fn verify_signature(sighash: &[u8; 32], signature: &Signature, pubkey: &PublicKey) -> bool {
    let message = Message::from_digest(*sighash);
    SECP.verify_ecdsa(&message, signature, &pubkey.inner).is_ok()
}
