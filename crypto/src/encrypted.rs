// Passphrase-encrypted private-key container
//
// Layout before Base58-Check: 0x01 0x42 0xE0 ‖ salt(4) ‖ xored_key(32).
// The salt is the first 4 bytes of sha256d(address), which lets decryption
// verify the passphrase without storing the address itself: a wrong
// passphrase yields a key whose address no longer matches the salt.

use scrypt::{scrypt, Params};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash::checksum4;
use crate::keypair::KeyPair;

const PREFIX: [u8; 3] = [0x01, 0x42, 0xE0];
const PAYLOAD_LEN: usize = 39;

// scrypt cost parameters: N = 2^14, r = 8, p = 8
const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 8;

fn derive_stream(passphrase: &str, salt: &[u8; 4]) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let params =
        Params::new(LOG_N, R, P, 32).map_err(|e| CryptoError::Backend(e.to_string()))?;
    let mut stream = Zeroizing::new([0u8; 32]);
    scrypt(passphrase.as_bytes(), salt, &params, &mut *stream)
        .map_err(|e| CryptoError::Backend(e.to_string()))?;
    Ok(stream)
}

/// Encrypt a private key under a passphrase.
///
/// `address_of` derives the account address for the key; the caller supplies
/// it because address derivation depends on the verification-script template
/// and version byte, which live above this crate.
pub fn encrypt_key<F>(
    pair: &KeyPair,
    passphrase: &str,
    address_of: F,
) -> Result<String, CryptoError>
where
    F: Fn(&KeyPair) -> String,
{
    let address = address_of(pair);
    let salt = checksum4(address.as_bytes());
    let stream = derive_stream(passphrase, &salt)?;

    let mut payload = Zeroizing::new([0u8; PAYLOAD_LEN]);
    payload[..3].copy_from_slice(&PREFIX);
    payload[3..7].copy_from_slice(&salt);
    let private_key = pair.private_key();
    for i in 0..32 {
        payload[7 + i] = private_key[i] ^ stream[i];
    }
    Ok(bs58::encode(&payload[..]).with_check().into_string())
}

/// Decrypt a passphrase-encrypted key container.
///
/// Fails with [`CryptoError::InvalidPassphraseOrCorrupt`] when the decrypted
/// key's address does not reproduce the embedded salt.
pub fn decrypt_key<F>(
    encrypted: &str,
    passphrase: &str,
    address_of: F,
) -> Result<KeyPair, CryptoError>
where
    F: Fn(&KeyPair) -> String,
{
    let payload = Zeroizing::new(
        bs58::decode(encrypted)
            .with_check(None)
            .into_vec()
            .map_err(|_| CryptoError::InvalidPassphraseOrCorrupt)?,
    );
    if payload.len() != PAYLOAD_LEN || payload[..3] != PREFIX {
        return Err(CryptoError::InvalidPassphraseOrCorrupt);
    }
    let mut salt = [0u8; 4];
    salt.copy_from_slice(&payload[3..7]);
    let stream = derive_stream(passphrase, &salt)?;

    let mut key_bytes = Zeroizing::new([0u8; 32]);
    for i in 0..32 {
        key_bytes[i] = payload[7 + i] ^ stream[i];
    }
    let pair = KeyPair::from_private_key(&*key_bytes)
        .map_err(|_| CryptoError::InvalidPassphraseOrCorrupt)?;

    let address = address_of(&pair);
    if checksum4(address.as_bytes()) != salt {
        return Err(CryptoError::InvalidPassphraseOrCorrupt);
    }
    Ok(pair)
}
