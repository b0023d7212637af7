// secp256r1 key pairs with canonical low-s ECDSA
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Length of a compressed SEC1 public key (`0x02`/`0x03` prefix + X).
pub const PUBLIC_KEY_COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed SEC1 public key (`0x04` + X + Y).
pub const PUBLIC_KEY_UNCOMPRESSED_LEN: usize = 65;

/// Length of a raw `r ‖ s` signature.
pub const SIGNATURE_LEN: usize = 64;

/// A secp256r1 private key paired with its public point.
///
/// The private scalar lives inside `SigningKey`, which zeroizes itself on
/// drop; byte exports are wrapped in [`Zeroizing`].
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a fresh key pair from OS entropy.
    ///
    /// The backend rejects the zero scalar and values at or above the group
    /// order, so the result is always a valid key.
    pub fn generate() -> Result<Self, CryptoError> {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Import a 32-byte private key.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let verifying_key = *signing_key.verifying_key();
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// The 32-byte private key. The returned buffer zeroizes on drop.
    pub fn private_key(&self) -> Zeroizing<[u8; 32]> {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.signing_key.to_bytes());
        Zeroizing::new(out)
    }

    /// The compressed (33-byte) public key encoding. This is the default
    /// encoding everywhere in the SDK.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_COMPRESSED_LEN] {
        let point = self.verifying_key.to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// The uncompressed (65-byte) public key encoding.
    pub fn public_key_uncompressed(&self) -> [u8; PUBLIC_KEY_UNCOMPRESSED_LEN] {
        let point = self.verifying_key.to_encoded_point(false);
        let mut out = [0u8; PUBLIC_KEY_UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Sign a 32-byte digest, returning the raw `r ‖ s` form with the `s`
    /// half normalized to the lower range (canonical form).
    pub fn sign(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN], CryptoError> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| CryptoError::Backend(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&signature.to_bytes());
        Ok(out)
    }

    /// Verify a raw `r ‖ s` signature over a 32-byte digest with this pair's
    /// public key.
    pub fn verify(&self, digest: &[u8; 32], signature: &[u8]) -> Result<bool, CryptoError> {
        verify_with_public_key(&self.public_key(), digest, signature)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the private scalar
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

/// Verify a raw `r ‖ s` signature over a 32-byte digest against an encoded
/// public key (compressed or uncompressed).
pub fn verify_with_public_key(
    public_key: &[u8],
    digest: &[u8; 32],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    if signature.len() != SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignature);
    }
    let signature = Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;
    Ok(verifying_key.verify_prehash(digest, &signature).is_ok())
}

/// Validate that `bytes` is a parseable SEC1 public key and return its
/// compressed encoding.
pub fn compress_public_key(bytes: &[u8]) -> Result<[u8; PUBLIC_KEY_COMPRESSED_LEN], CryptoError> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
    let point = verifying_key.to_encoded_point(true);
    let mut out = [0u8; PUBLIC_KEY_COMPRESSED_LEN];
    out.copy_from_slice(point.as_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_generate_and_roundtrip_private_key() {
        let pair = KeyPair::generate().unwrap();
        let restored = KeyPair::from_private_key(&*pair.private_key()).unwrap();
        assert_eq!(pair.public_key(), restored.public_key());
    }

    #[test]
    fn test_zero_private_key_rejected() {
        assert!(KeyPair::from_private_key(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_wrong_length_private_key_rejected() {
        assert!(KeyPair::from_private_key(&[1u8; 31]).is_err());
    }

    #[test]
    fn test_public_key_prefixes() {
        let pair = KeyPair::generate().unwrap();
        let compressed = pair.public_key();
        assert!(compressed[0] == 0x02 || compressed[0] == 0x03);
        let uncompressed = pair.public_key_uncompressed();
        assert_eq!(uncompressed[0], 0x04);
    }

    #[test]
    fn test_sign_verify() {
        let pair = KeyPair::generate().unwrap();
        let digest = sha256(b"message");
        let signature = pair.sign(&digest).unwrap();
        assert!(pair.verify(&digest, &signature).unwrap());

        let other = sha256(b"other message");
        assert!(!pair.verify(&other, &signature).unwrap());
    }

    #[test]
    fn test_sign_is_deterministic() {
        // RFC 6979 nonces + low-s normalization: same key and digest must
        // always produce the same bytes
        let pair = KeyPair::generate().unwrap();
        let digest = sha256(b"deterministic");
        assert_eq!(pair.sign(&digest).unwrap(), pair.sign(&digest).unwrap());
    }

    #[test]
    fn test_low_s_form() {
        // canonical s stays in the lower half of the order
        let pair = KeyPair::generate().unwrap();
        let digest = sha256(b"low-s check");
        let raw = pair.sign(&digest).unwrap();
        let signature = Signature::from_slice(&raw).unwrap();
        assert!(signature.normalize_s().is_none());
    }

    #[test]
    fn test_verify_with_uncompressed_key() {
        let pair = KeyPair::generate().unwrap();
        let digest = sha256(b"either encoding verifies");
        let signature = pair.sign(&digest).unwrap();
        assert!(
            verify_with_public_key(&pair.public_key_uncompressed(), &digest, &signature).unwrap()
        );
    }

    #[test]
    fn test_compress_public_key() {
        let pair = KeyPair::generate().unwrap();
        let compressed = compress_public_key(&pair.public_key_uncompressed()).unwrap();
        assert_eq!(compressed, pair.public_key());
    }
}
