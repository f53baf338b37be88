//! Account addresses.
//!
//! The text form is the unpadded base32 encoding of the 32-byte public key
//! followed by the last 4 bytes of its SHA-512/256 digest.

use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};

use crate::ledger::types::LedgerError;

const CHECKSUM_LEN: usize = 4;

/// Length of an address in its text form.
pub const ADDRESS_TEXT_LEN: usize = 58;

pub(crate) fn sha512_256(data: &[u8]) -> [u8; 32] {
    Sha512_256::digest(data).into()
}

/// A 32-byte Ed25519 public key identifying an account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = sha512_256(&self.0);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[32 - CHECKSUM_LEN..]);
        checksum
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_TEXT_LEN {
            return Err(LedgerError::InvalidAddress(s.to_string()));
        }
        let decoded = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|_| LedgerError::InvalidAddress(s.to_string()))?;
        if decoded.len() != 32 + CHECKSUM_LEN {
            return Err(LedgerError::InvalidAddress(s.to_string()));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&decoded[..32]);
        let address = Address(key);
        if address.checksum()[..] != decoded[32..] {
            return Err(LedgerError::InvalidAddress(s.to_string()));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = [0u8; 32 + CHECKSUM_LEN];
        raw[..32].copy_from_slice(&self.0);
        raw[32..].copy_from_slice(&self.checksum());
        f.write_str(&BASE32_NOPAD.encode(&raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn test_zero_address_text() {
        assert_eq!(Address::ZERO.to_string(), ZERO_ADDRESS);
        assert_eq!(ZERO_ADDRESS.parse::<Address>().unwrap(), Address::ZERO);
    }

    #[test]
    fn test_text_form_is_stable() {
        let address = Address([7u8; 32]);
        let text = address.to_string();
        assert_eq!(text.len(), ADDRESS_TEXT_LEN);
        assert_eq!(text.parse::<Address>().unwrap(), address);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let mut text = Address([7u8; 32]).to_string();
        // Flip the last character to another base32 symbol.
        let last = text.pop().unwrap();
        text.push(if last == 'A' { 'B' } else { 'A' });
        assert!(matches!(
            text.parse::<Address>(),
            Err(LedgerError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!("ABC".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
        assert!(format!("{}A", ZERO_ADDRESS).parse::<Address>().is_err());
    }

    #[test]
    fn test_lowercase_rejected() {
        assert!(ZERO_ADDRESS.to_lowercase().parse::<Address>().is_err());
    }
}
