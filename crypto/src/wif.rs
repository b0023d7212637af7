// Wallet Import Format for private keys
//
// WIF = Base58-Check(0x80 ‖ private_key ‖ 0x01). The trailing byte marks
// the key as paired with a compressed public key.

use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keypair::KeyPair;

const WIF_VERSION: u8 = 0x80;
const COMPRESSED_MARKER: u8 = 0x01;

/// Export a key pair's private key as a WIF string.
pub fn export_wif(pair: &KeyPair) -> String {
    let mut payload = Zeroizing::new([0u8; 34]);
    payload[0] = WIF_VERSION;
    payload[1..33].copy_from_slice(&*pair.private_key());
    payload[33] = COMPRESSED_MARKER;
    bs58::encode(&payload[..]).with_check().into_string()
}

/// Import a WIF string back into a key pair.
pub fn import_wif(wif: &str) -> Result<KeyPair, CryptoError> {
    let payload = Zeroizing::new(
        bs58::decode(wif)
            .with_check(None)
            .into_vec()
            .map_err(|_| CryptoError::InvalidWif)?,
    );
    if payload.len() != 34 || payload[0] != WIF_VERSION || payload[33] != COMPRESSED_MARKER {
        return Err(CryptoError::InvalidWif);
    }
    KeyPair::from_private_key(&payload[1..33])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wif_roundtrip() {
        let pair = KeyPair::generate().unwrap();
        let wif = export_wif(&pair);
        let restored = import_wif(&wif).unwrap();
        assert_eq!(pair.public_key(), restored.public_key());
    }

    #[test]
    fn test_known_wif_vector() {
        // privkey 0x01..01 under 0x80 ‖ key ‖ 0x01
        let pair = KeyPair::from_private_key(&[0x01u8; 32]).unwrap();
        let wif = export_wif(&pair);
        assert!(wif.starts_with('K') || wif.starts_with('L'));
        assert_eq!(
            *import_wif(&wif).unwrap().private_key(),
            *pair.private_key()
        );
    }

    #[test]
    fn test_tampered_wif_rejected() {
        let pair = KeyPair::generate().unwrap();
        let wif = export_wif(&pair);
        let mut chars: Vec<char> = wif.chars().collect();
        let i = chars.len() / 2;
        chars[i] = if chars[i] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();
        assert!(import_wif(&tampered).is_err());
    }

    #[test]
    fn test_not_base58_rejected() {
        assert!(import_wif("not-a-wif-0OIl").is_err());
    }
}
