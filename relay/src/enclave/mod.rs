//! Key-issuance boundary (`spec.md` §4.7, C2). Contract-level only — no
//! hardware requirement in the reference implementation. A real deployment
//! replaces the wrapping key shipped inside the blob with a recipient-supplied
//! public key; see DESIGN.md for the open question this leaves unresolved.

pub mod errors;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ethers::types::Address;
use rand::RngCore;
use secp256k1::{Secp256k1, SecretKey};

pub use errors::EnclaveError;

const WRAPPING_KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const AUTH_TAG_LEN: usize = 16;
const PRIVATE_KEY_LEN: usize = 32;

/// Internal handle permitting future in-process signing by the freshly
/// generated key. Never serialized, never returned to a caller.
pub struct KeyRef(SecretKey);

impl std::fmt::Debug for KeyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRef").finish_non_exhaustive()
    }
}

/// Output of a single `generate()` call: the fresh address, the wrapped
/// private key, an opaque attestation record, and an internal key reference.
pub struct KeyMaterial {
    pub new_address: Address,
    pub encrypted_key_for_user: String,
    pub attestation_report: String,
    pub key_ref: KeyRef,
}

/// Generate a fresh secp256k1 keypair, derive its address, and wrap the raw
/// private-key bytes under AES-256-GCM with a per-call wrapping key and
/// nonce, per the blob layout fixed in `spec.md` §6.
pub fn generate() -> Result<KeyMaterial, EnclaveError> {
    let secp = Secp256k1::signing_only();
    let secret_key = SecretKey::new(&mut rand::thread_rng());
    let public_key = secret_key.public_key(&secp);
    let new_address = address_from_public_key(&public_key);

    let encrypted_key_for_user = wrap_private_key(&secret_key)?;
    let attestation_report = build_attestation_report(new_address);

    Ok(KeyMaterial {
        new_address,
        encrypted_key_for_user,
        attestation_report,
        key_ref: KeyRef(secret_key),
    })
}

fn address_from_public_key(public_key: &secp256k1::PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    // Strip the leading 0x04 prefix byte before hashing, per the standard
    // Ethereum address derivation (keccak256(pubkey)[12..]).
    #[allow(clippy::indexing_slicing)]
    let hash = ethers::utils::keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

fn build_attestation_report(new_address: Address) -> String {
    serde_json::json!({
        "enclave": "reference-local",
        "address": format!("{new_address:#x}"),
        "generatedAt": chrono::Utc::now().to_rfc3339(),
    })
    .to_string()
}

fn wrap_private_key(secret_key: &SecretKey) -> Result<String, EnclaveError> {
    let mut wrapping_key_bytes = [0u8; WRAPPING_KEY_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut wrapping_key_bytes);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&wrapping_key_bytes));
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext_and_tag = cipher
        .encrypt(nonce, secret_key.secret_bytes().as_slice())
        .map_err(|e| EnclaveError::Wrap(e.to_string()))?;

    if ciphertext_and_tag.len() != PRIVATE_KEY_LEN + AUTH_TAG_LEN {
        return Err(EnclaveError::Wrap(
            "unexpected ciphertext length".to_string(),
        ));
    }
    #[allow(clippy::indexing_slicing)]
    let (ciphertext, auth_tag) = ciphertext_and_tag.split_at(PRIVATE_KEY_LEN);

    let mut blob = Vec::with_capacity(WRAPPING_KEY_LEN + NONCE_LEN + AUTH_TAG_LEN + PRIVATE_KEY_LEN);
    blob.extend_from_slice(&wrapping_key_bytes);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(auth_tag);
    blob.extend_from_slice(ciphertext);

    Ok(STANDARD.encode(blob))
}

/// Decode and AEAD-unwrap an `encryptedKeyForUser` blob, recovering the raw
/// private key. Exposed for tests exercising the round-trip property in
/// `spec.md` §8; not reachable from any HTTP endpoint.
pub fn unwrap_private_key(blob_b64: &str) -> Result<SecretKey, EnclaveError> {
    let blob = STANDARD
        .decode(blob_b64)
        .map_err(|e| EnclaveError::Unwrap(e.to_string()))?;
    if blob.len() != WRAPPING_KEY_LEN + NONCE_LEN + AUTH_TAG_LEN + PRIVATE_KEY_LEN {
        return Err(EnclaveError::Unwrap("unexpected blob length".to_string()));
    }

    #[allow(clippy::indexing_slicing)]
    let wrapping_key_bytes = &blob[0..WRAPPING_KEY_LEN];
    #[allow(clippy::indexing_slicing)]
    let nonce_bytes = &blob[WRAPPING_KEY_LEN..WRAPPING_KEY_LEN + NONCE_LEN];
    #[allow(clippy::indexing_slicing)]
    let auth_tag = &blob[WRAPPING_KEY_LEN + NONCE_LEN..WRAPPING_KEY_LEN + NONCE_LEN + AUTH_TAG_LEN];
    #[allow(clippy::indexing_slicing)]
    let ciphertext = &blob[WRAPPING_KEY_LEN + NONCE_LEN + AUTH_TAG_LEN..];

    let mut ciphertext_and_tag = Vec::with_capacity(PRIVATE_KEY_LEN + AUTH_TAG_LEN);
    ciphertext_and_tag.extend_from_slice(ciphertext);
    ciphertext_and_tag.extend_from_slice(auth_tag);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(wrapping_key_bytes));
    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext_and_tag.as_slice())
        .map_err(|e| EnclaveError::Unwrap(e.to_string()))?;

    SecretKey::from_slice(&plaintext).map_err(|e| EnclaveError::Unwrap(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_key_round_trips_to_the_same_address() {
        let material = generate().expect("generate");
        let recovered = unwrap_private_key(&material.encrypted_key_for_user).expect("unwrap");
        let secp = Secp256k1::signing_only();
        let recovered_address = address_from_public_key(&recovered.public_key(&secp));
        assert_eq!(recovered_address, material.new_address);
    }

    #[test]
    fn two_calls_produce_different_addresses_and_blobs() {
        let a = generate().expect("generate");
        let b = generate().expect("generate");
        assert_ne!(a.new_address, b.new_address);
        assert_ne!(a.encrypted_key_for_user, b.encrypted_key_for_user);
    }
}
