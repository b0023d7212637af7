// Lattice Cryptography - key material and digest primitives
//
// This crate provides the cryptographic building blocks for the Lattice SDK:
// - SHA-256 / RIPEMD-160 digest combinators used by the wire formats
// - secp256r1 (P-256) key pairs with canonical low-s ECDSA signatures
// - WIF and passphrase-encrypted private-key containers
// - Base58-Check address encoding

pub mod address;
pub mod encrypted;
pub mod error;
pub mod hash;
pub mod keypair;
pub mod wif;

pub use error::CryptoError;
pub use keypair::{KeyPair, PUBLIC_KEY_COMPRESSED_LEN, PUBLIC_KEY_UNCOMPRESSED_LEN, SIGNATURE_LEN};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_available() {
        // OS entropy must be reachable for the rest of the crate to be useful
        assert!(KeyPair::generate().is_ok());
    }
}
