// Accounts: identities that author or co-author transactions
use crate::error::CoreError;
use crate::hash::Hash160;
use crate::script::builder::{multi_sig_script, parse_multi_sig_script, single_sig_script};
use crate::settings::ProtocolSettings;

use lattice_crypto::{address, encrypted, wif, KeyPair, SIGNATURE_LEN};

/// What an account is backed by.
#[derive(Debug, Clone)]
pub enum AccountKind {
    /// Single-signature account; the key pair is present only for accounts
    /// imported with their secret.
    SingleSig {
        key_pair: Option<KeyPair>,
        public_key: Vec<u8>,
    },
    /// Backed by an arbitrary verification script.
    Contract,
    /// M-of-N multi-signature account over a sorted key list.
    MultiSig {
        threshold: usize,
        public_keys: Vec<Vec<u8>>,
    },
    /// Address only; can appear as a signer but never sign.
    WatchOnly,
}

/// A wallet account.
///
/// The address and script hash are fixed at construction; a locked account
/// refuses every signing operation until unlocked.
#[derive(Debug, Clone)]
pub struct Account {
    script_hash: Hash160,
    address: String,
    verification_script: Option<Vec<u8>>,
    kind: AccountKind,
    pub label: Option<String>,
    locked: bool,
    pub is_default: bool,
}

impl Account {
    fn from_verification_script_internal(
        script: Vec<u8>,
        kind: AccountKind,
        settings: &ProtocolSettings,
    ) -> Self {
        let script_hash = Hash160::from_script(&script);
        Self {
            address: address::encode_address(settings.address_version, script_hash.as_bytes()),
            script_hash,
            verification_script: Some(script),
            kind,
            label: None,
            locked: false,
            is_default: false,
        }
    }

    /// Create a fresh single-signature account from OS entropy.
    pub fn create(settings: &ProtocolSettings) -> Result<Self, CoreError> {
        Self::from_key_pair(KeyPair::generate()?, settings)
    }

    /// Single-signature account holding `key_pair`.
    pub fn from_key_pair(
        key_pair: KeyPair,
        settings: &ProtocolSettings,
    ) -> Result<Self, CoreError> {
        let public_key = key_pair.public_key().to_vec();
        let script = single_sig_script(&public_key)?;
        Ok(Self::from_verification_script_internal(
            script,
            AccountKind::SingleSig {
                key_pair: Some(key_pair),
                public_key,
            },
            settings,
        ))
    }

    /// Import a 32-byte private key.
    pub fn from_private_key(
        private_key: &[u8],
        settings: &ProtocolSettings,
    ) -> Result<Self, CoreError> {
        Self::from_key_pair(KeyPair::from_private_key(private_key)?, settings)
    }

    /// Import a WIF string.
    pub fn from_wif(wif: &str, settings: &ProtocolSettings) -> Result<Self, CoreError> {
        Self::from_key_pair(wif::import_wif(wif)?, settings)
    }

    /// Decrypt a passphrase-encrypted key container.
    pub fn from_encrypted(
        encrypted: &str,
        passphrase: &str,
        settings: &ProtocolSettings,
    ) -> Result<Self, CoreError> {
        let version = settings.address_version;
        let key_pair = encrypted::decrypt_key(encrypted, passphrase, |pair| {
            address_for_key(pair, version)
        })?;
        Self::from_key_pair(key_pair, settings)
    }

    /// Watch-only single-signature account for a known public key.
    pub fn from_public_key(
        public_key: &[u8],
        settings: &ProtocolSettings,
    ) -> Result<Self, CoreError> {
        let script = single_sig_script(public_key)?;
        Ok(Self::from_verification_script_internal(
            script,
            AccountKind::SingleSig {
                key_pair: None,
                public_key: public_key.to_vec(),
            },
            settings,
        ))
    }

    /// Account backed by an arbitrary verification script. Recognizes the
    /// canonical multi-signature template and records its parameters.
    pub fn from_verification_script(
        script: Vec<u8>,
        settings: &ProtocolSettings,
    ) -> Result<Self, CoreError> {
        if script.is_empty() {
            return Err(CoreError::InvalidArgument(
                "verification script is empty".into(),
            ));
        }
        let kind = match parse_multi_sig_script(&script) {
            Some((threshold, public_keys)) => AccountKind::MultiSig {
                threshold,
                public_keys,
            },
            None => AccountKind::Contract,
        };
        Ok(Self::from_verification_script_internal(script, kind, settings))
    }

    /// M-of-N multi-signature account. Keys are sorted by compressed
    /// encoding; the sort fixes the script hash regardless of input order.
    pub fn from_public_keys(
        public_keys: &[Vec<u8>],
        threshold: usize,
        settings: &ProtocolSettings,
    ) -> Result<Self, CoreError> {
        let script = multi_sig_script(threshold, public_keys)?;
        let mut sorted = public_keys.to_vec();
        sorted.sort();
        Ok(Self::from_verification_script_internal(
            script,
            AccountKind::MultiSig {
                threshold,
                public_keys: sorted,
            },
            settings,
        ))
    }

    /// Address-only account; can be referenced as a signer but never sign.
    pub fn from_address(
        address: &str,
        settings: &ProtocolSettings,
    ) -> Result<Self, CoreError> {
        let hash = address::decode_address(address, settings.address_version)?;
        Ok(Self {
            script_hash: Hash160(hash),
            address: address.to_string(),
            verification_script: None,
            kind: AccountKind::WatchOnly,
            label: None,
            locked: false,
            is_default: false,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn script_hash(&self) -> &Hash160 {
        &self.script_hash
    }

    pub fn verification_script(&self) -> Option<&[u8]> {
        self.verification_script.as_deref()
    }

    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    pub fn key_pair(&self) -> Option<&KeyPair> {
        match &self.kind {
            AccountKind::SingleSig { key_pair, .. } => key_pair.as_ref(),
            _ => None,
        }
    }

    pub fn is_multi_sig(&self) -> bool {
        matches!(self.kind, AccountKind::MultiSig { .. })
    }

    /// Threshold and sorted key list of a multi-signature account.
    pub fn multi_sig_info(&self) -> Option<(usize, &[Vec<u8>])> {
        match &self.kind {
            AccountKind::MultiSig {
                threshold,
                public_keys,
            } => Some((*threshold, public_keys.as_slice())),
            _ => None,
        }
    }

    /// Whether `public_key` (compressed) participates in this account.
    pub fn contains(&self, public_key: &[u8]) -> bool {
        match &self.kind {
            AccountKind::SingleSig { public_key: own, .. } => own == public_key,
            AccountKind::MultiSig { public_keys, .. } => {
                public_keys.iter().any(|key| key == public_key)
            }
            _ => false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Sign a 32-byte digest with this account's key.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN], CoreError> {
        if self.locked {
            return Err(CoreError::AccountLocked);
        }
        let key_pair = self
            .key_pair()
            .ok_or_else(|| CoreError::MissingKey(self.address.clone()))?;
        Ok(key_pair.sign(digest)?)
    }

    /// Export the private key as WIF.
    pub fn export_wif(&self) -> Result<String, CoreError> {
        if self.locked {
            return Err(CoreError::AccountLocked);
        }
        let key_pair = self
            .key_pair()
            .ok_or_else(|| CoreError::MissingKey(self.address.clone()))?;
        Ok(wif::export_wif(key_pair))
    }

    /// Export the private key as a passphrase-encrypted container.
    pub fn export_encrypted(
        &self,
        passphrase: &str,
        settings: &ProtocolSettings,
    ) -> Result<String, CoreError> {
        if self.locked {
            return Err(CoreError::AccountLocked);
        }
        let key_pair = self
            .key_pair()
            .ok_or_else(|| CoreError::MissingKey(self.address.clone()))?;
        let version = settings.address_version;
        Ok(encrypted::encrypt_key(key_pair, passphrase, |pair| {
            address_for_key(pair, version)
        })?)
    }
}

/// Address of the canonical single-signature account for a key.
fn address_for_key(pair: &KeyPair, version: u8) -> String {
    // the script template is fixed, so this cannot fail for a valid pair
    let script = single_sig_script(&pair.public_key()).expect("valid compressed key");
    address::encode_address(version, Hash160::from_script(&script).as_bytes())
}
