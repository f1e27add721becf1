//! Signed model manifest: binds artifact files to an Ed25519 signature.
//!
//! `manifest.json` lists the SHA-256 digest of every bound file and
//! `model.sig` holds a 64-byte Ed25519 signature over the manifest bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ModelError;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const SIGNATURE_FILE_NAME: &str = "model.sig";

/// Only supported manifest layout.
pub const MANIFEST_VERSION: u32 = 1;

/// Clock skew allowed for `created_at`, in seconds.
const MAX_FUTURE_SKEW_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    /// Unix timestamp (seconds) when the manifest was signed
    pub created_at: i64,
    /// Random 16-byte nonce, base64
    pub nonce_b64: String,
    /// File name (relative to the model directory) to SHA-256 hex
    pub files: BTreeMap<String, String>,
}

impl ModelManifest {
    /// Check that `name` is bound by this manifest and that `bytes` hash to
    /// the recorded digest.
    ///
    /// # Errors
    /// Returns `ModelError::Signature` if the file is unbound or differs.
    pub fn check_file(&self, name: &str, bytes: &[u8]) -> Result<(), ModelError> {
        let expected = self
            .files
            .get(name)
            .ok_or_else(|| ModelError::Signature(format!("manifest.json does not bind {name}")))?;
        if !constant_time_eq_str(&sha256_hex(bytes), expected) {
            return Err(ModelError::Signature(format!("File hash mismatch for {name}")));
        }
        Ok(())
    }

    /// Build a manifest binding `files` (name → contents).
    #[must_use]
    pub fn new<'a>(
        files: impl IntoIterator<Item = (&'a str, &'a [u8])>,
        created_at: i64,
        nonce: [u8; 16],
    ) -> Self {
        Self {
            version: MANIFEST_VERSION,
            created_at,
            nonce_b64: base64::engine::general_purpose::STANDARD.encode(nonce),
            files: files
                .into_iter()
                .map(|(name, bytes)| (name.to_string(), sha256_hex(bytes)))
                .collect(),
        }
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// Constant-time compare for SHA-256 hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Decode a base64 Ed25519 verifying key.
///
/// # Errors
/// Returns `ModelError::Signature` for bad base64, wrong length, or an
/// invalid curve point.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ModelError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ModelError::Signature("Invalid public key base64".into()))?;
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ModelError::Signature("Invalid public key length (expected 32 bytes)".into()))?;
    VerifyingKey::from_bytes(&key)
        .map_err(|_| ModelError::Signature("Invalid verifying key".into()))
}

/// Read a base64 verifying key from a file.
///
/// # Errors
/// Returns `ModelError` if the file cannot be read or decoded.
pub fn read_verifying_key(path: &Path) -> Result<VerifyingKey, ModelError> {
    let b64 = fs::read_to_string(path)
        .map_err(|e| ModelError::Signature(format!("Failed reading pubkey file {path:?}: {e}")))?;
    verifying_key_from_b64(&b64)
}

/// Which signing artifacts a model directory carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureState {
    /// Neither `manifest.json` nor `model.sig`
    Unsigned,
    /// Exactly one of the two
    Partial,
    /// Both present
    Signed,
}

#[must_use]
pub fn signature_state(dir: &Path) -> SignatureState {
    match (
        dir.join(MANIFEST_FILE_NAME).exists(),
        dir.join(SIGNATURE_FILE_NAME).exists(),
    ) {
        (true, true) => SignatureState::Signed,
        (false, false) => SignatureState::Unsigned,
        _ => SignatureState::Partial,
    }
}

/// Verify the manifest in `dir` against `key` and check every bound file.
///
/// # Errors
/// Returns `ModelError::Signature` on any signature, format, or hash failure.
pub fn verify_manifest(dir: &Path, key: &VerifyingKey) -> Result<ModelManifest, ModelError> {
    let sig_bytes = fs::read(dir.join(SIGNATURE_FILE_NAME))
        .map_err(|e| ModelError::Signature(format!("Failed to read signature: {e}")))?;
    let sig_bytes: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| ModelError::Signature("Invalid signature length (expected 64 bytes)".into()))?;
    let signature = Signature::from_bytes(&sig_bytes);

    let manifest_content = fs::read(dir.join(MANIFEST_FILE_NAME))
        .map_err(|e| ModelError::Signature(format!("Failed to read manifest: {e}")))?;

    key.verify(&manifest_content, &signature)
        .map_err(|_| ModelError::Signature("Invalid model signature".into()))?;

    let manifest: ModelManifest = serde_json::from_slice(&manifest_content)
        .map_err(|e| ModelError::Signature(format!("Invalid manifest.json format: {e}")))?;

    if manifest.version != MANIFEST_VERSION {
        return Err(ModelError::Signature(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }

    if manifest.created_at > unix_now() + MAX_FUTURE_SKEW_SECS {
        return Err(ModelError::Signature(
            "manifest created_at is in the future".into(),
        ));
    }

    let nonce = base64::engine::general_purpose::STANDARD
        .decode(manifest.nonce_b64.trim())
        .map_err(|e| ModelError::Signature(format!("Invalid nonce base64: {e}")))?;
    if nonce.len() != 16 {
        return Err(ModelError::Signature(
            "nonce must decode to exactly 16 bytes".into(),
        ));
    }

    if manifest.files.is_empty() {
        return Err(ModelError::Signature("manifest.json contains no files".into()));
    }

    for (rel, expected_hex) in &manifest.files {
        let path = dir.join(rel);
        let bytes = fs::read(&path).map_err(|e| {
            ModelError::Signature(format!(
                "Manifest references missing/unreadable file {path:?}: {e}"
            ))
        })?;
        if !constant_time_eq_str(&sha256_hex(&bytes), expected_hex) {
            return Err(ModelError::Signature(format!(
                "File hash mismatch for {rel}"
            )));
        }
    }

    tracing::info!("Model signature and hashes verified successfully");
    Ok(manifest)
}

/// Serialize `manifest` into `dir` and sign it.
///
/// The signature covers the exact manifest bytes written to disk.
pub fn write_signed_manifest(
    dir: &Path,
    key: &SigningKey,
    manifest: &ModelManifest,
) -> Result<(), ModelError> {
    let bytes = serde_json::to_vec_pretty(manifest)
        .map_err(|e| ModelError::Invalid(format!("Failed to serialize manifest: {e}")))?;

    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    fs::write(&manifest_path, &bytes).map_err(|source| ModelError::Io {
        path: manifest_path.clone(),
        source,
    })?;

    let signature: Signature = key.sign(&bytes);
    let sig_path = dir.join(SIGNATURE_FILE_NAME);
    fs::write(&sig_path, signature.to_bytes()).map_err(|source| ModelError::Io {
        path: sig_path.clone(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use tempfile::tempdir;

    fn signing_key() -> SigningKey {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        SigningKey::from_bytes(&seed)
    }

    fn sign_dir(dir: &Path, key: &SigningKey, manifest: &ModelManifest) {
        write_signed_manifest(dir, key, manifest).expect("sign manifest");
    }

    #[test]
    fn test_verify_valid_manifest() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join("model.json"), b"{}").expect("write");

        let key = signing_key();
        let manifest = ModelManifest::new([("model.json", &b"{}"[..])], unix_now(), [7u8; 16]);
        sign_dir(dir, &key, &manifest);

        assert_eq!(signature_state(dir), SignatureState::Signed);
        let verified = verify_manifest(dir, &key.verifying_key()).expect("verify");
        assert_eq!(verified, manifest);
    }

    #[test]
    fn test_rejects_tampered_file() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        let key = signing_key();
        let manifest = ModelManifest::new([("model.json", &b"{}"[..])], unix_now(), [0u8; 16]);
        sign_dir(dir, &key, &manifest);
        fs::write(dir.join("model.json"), b"{\"x\":1}").expect("write");

        let err = verify_manifest(dir, &key.verifying_key()).unwrap_err();
        assert!(err.to_string().contains("hash mismatch"));
    }

    #[test]
    fn test_rejects_wrong_key() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join("model.json"), b"{}").expect("write");
        let manifest = ModelManifest::new([("model.json", &b"{}"[..])], unix_now(), [0u8; 16]);
        sign_dir(dir, &signing_key(), &manifest);

        let err = verify_manifest(dir, &signing_key().verifying_key()).unwrap_err();
        assert!(err.to_string().contains("Invalid model signature"));
    }

    #[test]
    fn test_rejects_future_manifest() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join("model.json"), b"{}").expect("write");
        let key = signing_key();
        let manifest =
            ModelManifest::new([("model.json", &b"{}"[..])], unix_now() + 3600, [0u8; 16]);
        sign_dir(dir, &key, &manifest);

        assert!(verify_manifest(dir, &key.verifying_key()).is_err());
    }

    #[test]
    fn test_verifying_key_from_b64() {
        let key = signing_key();
        let b64 = base64::engine::general_purpose::STANDARD.encode(key.verifying_key().to_bytes());
        let decoded = verifying_key_from_b64(&format!("{b64}\n")).expect("decode");
        assert_eq!(decoded, key.verifying_key());

        assert!(verifying_key_from_b64("not base64!").is_err());
        assert!(verifying_key_from_b64("AAAA").is_err());
    }

    #[test]
    fn test_signature_state() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        assert_eq!(signature_state(dir), SignatureState::Unsigned);

        fs::write(dir.join(MANIFEST_FILE_NAME), b"{}").expect("write");
        assert_eq!(signature_state(dir), SignatureState::Partial);

        fs::remove_file(dir.join(MANIFEST_FILE_NAME)).expect("remove");
        fs::write(dir.join(SIGNATURE_FILE_NAME), [0u8; 64]).expect("write");
        assert_eq!(signature_state(dir), SignatureState::Partial);
    }

    #[test]
    fn test_check_file_compares_given_bytes() {
        let manifest = ModelManifest::new([("model.json", &b"{}"[..])], unix_now(), [0u8; 16]);
        manifest.check_file("model.json", b"{}").expect("bound");

        let err = manifest.check_file("model.json", b"{\"x\":1}").unwrap_err();
        assert!(err.to_string().contains("hash mismatch"));

        let err = manifest.check_file("other.json", b"{}").unwrap_err();
        assert!(err.to_string().contains("does not bind"));
    }
}
