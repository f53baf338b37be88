//! Account keys and transaction signing.
//!
//! # Security
//! - Mnemonics are read ONLY from environment variables
//! - Keys are never logged or serialized
//! - Held in process memory for the lifetime of the command

use ed25519_dalek::{Signer, SigningKey};

use crate::ledger::address::{sha512_256, Address};
use crate::ledger::types::{LedgerError, LedgerResult};

/// Number of words in an account mnemonic.
pub const MNEMONIC_WORDS: usize = 25;

/// Pack bytes into 11-bit word indices, least significant bits first.
fn to_word_indices(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len() * 8 / 11 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &b in bytes {
        acc |= (b as u32) << bits;
        bits += 8;
        if bits >= 11 {
            out.push((acc & 0x7ff) as u16);
            acc >>= 11;
            bits -= 11;
        }
    }
    if bits > 0 {
        out.push(acc as u16);
    }
    out
}

/// Inverse of [`to_word_indices`].
fn from_word_indices(indices: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(indices.len() * 11 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &i in indices {
        acc |= (i as u32) << bits;
        bits += 11;
        while bits >= 8 {
            out.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }
    out
}

fn word_list() -> &'static [&'static str; 2048] {
    bip39::Language::English.word_list()
}

fn checksum_word(seed: &[u8; 32]) -> &'static str {
    let digest = sha512_256(seed);
    word_list()[(to_word_indices(&digest)[0]) as usize]
}

/// Decode a 25-word mnemonic into the 32-byte key seed.
pub fn seed_from_mnemonic(phrase: &str) -> LedgerResult<[u8; 32]> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(LedgerError::Wallet(format!(
            "Mnemonic must have {} words, got {}",
            MNEMONIC_WORDS,
            words.len()
        )));
    }

    let list = word_list();
    let mut indices = Vec::with_capacity(MNEMONIC_WORDS - 1);
    for word in &words[..MNEMONIC_WORDS - 1] {
        let index = list
            .iter()
            .position(|w| w == word)
            .ok_or_else(|| LedgerError::Wallet("Mnemonic contains an unknown word".to_string()))?;
        indices.push(index as u16);
    }

    let bytes = from_word_indices(&indices);
    if bytes.len() != 33 || bytes[32] != 0 {
        return Err(LedgerError::Wallet("Mnemonic does not encode a key".to_string()));
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);

    if checksum_word(&seed) != words[MNEMONIC_WORDS - 1] {
        return Err(LedgerError::Wallet("Mnemonic checksum mismatch".to_string()));
    }
    Ok(seed)
}

/// Encode a 32-byte key seed as a 25-word mnemonic.
pub fn mnemonic_from_seed(seed: &[u8; 32]) -> String {
    let list = word_list();
    let mut words: Vec<&str> = to_word_indices(seed)
        .into_iter()
        .map(|i| list[i as usize])
        .collect();
    words.push(checksum_word(seed));
    words.join(" ")
}

/// A signing account: secret key plus derived address.
#[derive(Clone)]
pub struct Account {
    key: SigningKey,
    address: Address,
}

impl Account {
    /// Build an account from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let key = SigningKey::from_bytes(seed);
        let address = Address(key.verifying_key().to_bytes());
        Self { key, address }
    }

    /// Build an account from its 25-word mnemonic.
    pub fn from_mnemonic(phrase: &str) -> LedgerResult<Self> {
        let account = Self::from_seed(&seed_from_mnemonic(phrase)?);
        tracing::debug!(address = %account.address, "Account loaded");
        Ok(account)
    }

    /// Load an account from the mnemonic held in an environment variable.
    pub fn from_env(var: &str) -> LedgerResult<Self> {
        let phrase = std::env::var(var).map_err(|_| {
            LedgerError::Wallet(format!("Environment variable {} not set", var))
        })?;
        Self::from_mnemonic(&phrase)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign raw bytes, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
