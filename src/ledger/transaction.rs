//! Transaction construction, canonical encoding, and signing.
//!
//! # Responsibilities
//! - Build payment, asset-transfer, and asset-create transactions
//! - Encode them canonically (msgpack, sorted short keys, empty fields omitted)
//! - Sign with an account and derive the transaction id
//!
//! Fields below are declared in key order so that the derived serializer
//! emits sorted maps.

use data_encoding::BASE32_NOPAD;
use serde::{Serialize, Serializer};

use crate::ledger::address::{sha512_256, Address};
use crate::ledger::types::{LedgerError, LedgerResult, TxId, MAX_NOTE_LEN};
use crate::ledger::wallet::Account;

/// Domain separation prefix for transaction signing and ids.
const TX_PREFIX: &[u8] = b"TX";

/// Bytes a signature adds to the encoded transaction.
const SIGNATURE_OVERHEAD: u64 = 75;

/// Validity window in rounds after the suggested first round.
const VALIDITY_ROUNDS: u64 = 1000;

fn as_bin<S: Serializer, T: AsRef<[u8]>>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bytes(value.as_ref())
}

fn opt_as_bin<S: Serializer>(value: &Option<Address>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(address) => serializer.serialize_bytes(address.as_ref()),
        None => serializer.serialize_none(),
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero_address(value: &Option<Address>) -> bool {
    value.map_or(true, |a| a.is_zero())
}

/// Network-supplied parameters for building a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    /// Fee per byte in microAlgos.
    pub fee_per_byte: u64,
    /// Minimum total fee in microAlgos.
    pub min_fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

impl SuggestedParams {
    /// Params valid from `last_round` for the standard window.
    pub fn from_round(
        last_round: u64,
        fee_per_byte: u64,
        min_fee: u64,
        genesis_id: String,
        genesis_hash: [u8; 32],
    ) -> Self {
        Self {
            fee_per_byte,
            min_fee,
            first_valid: last_round,
            last_valid: last_round + VALIDITY_ROUNDS,
            genesis_id,
            genesis_hash,
        }
    }
}

/// Transaction type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Payment,
    AssetTransfer,
    AssetConfig,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Payment => "pay",
            TxType::AssetTransfer => "axfer",
            TxType::AssetConfig => "acfg",
        }
    }
}

impl Serialize for TxType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Parameters of a newly created asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetParams {
    #[serde(rename = "an", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "au", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(rename = "c", serialize_with = "opt_as_bin", skip_serializing_if = "is_zero_address")]
    pub clawback: Option<Address>,
    #[serde(rename = "dc", skip_serializing_if = "is_zero_u32")]
    pub decimals: u32,
    #[serde(rename = "df", skip_serializing_if = "is_false")]
    pub default_frozen: bool,
    #[serde(rename = "f", serialize_with = "opt_as_bin", skip_serializing_if = "is_zero_address")]
    pub freeze: Option<Address>,
    #[serde(rename = "m", serialize_with = "opt_as_bin", skip_serializing_if = "is_zero_address")]
    pub manager: Option<Address>,
    #[serde(rename = "r", serialize_with = "opt_as_bin", skip_serializing_if = "is_zero_address")]
    pub reserve: Option<Address>,
    #[serde(rename = "t", skip_serializing_if = "is_zero")]
    pub total: u64,
    #[serde(rename = "un", skip_serializing_if = "String::is_empty")]
    pub unit_name: String,
}

/// An unsigned transaction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(rename = "aamt", skip_serializing_if = "is_zero")]
    asset_amount: u64,
    #[serde(rename = "amt", skip_serializing_if = "is_zero")]
    amount: u64,
    #[serde(rename = "apar", skip_serializing_if = "Option::is_none")]
    asset_params: Option<AssetParams>,
    #[serde(rename = "arcv", serialize_with = "opt_as_bin", skip_serializing_if = "is_zero_address")]
    asset_receiver: Option<Address>,
    #[serde(rename = "fee", skip_serializing_if = "is_zero")]
    fee: u64,
    #[serde(rename = "fv", skip_serializing_if = "is_zero")]
    first_valid: u64,
    #[serde(rename = "gen", skip_serializing_if = "String::is_empty")]
    genesis_id: String,
    #[serde(rename = "gh", serialize_with = "as_bin")]
    genesis_hash: [u8; 32],
    #[serde(rename = "lv", skip_serializing_if = "is_zero")]
    last_valid: u64,
    #[serde(rename = "note", serialize_with = "as_bin", skip_serializing_if = "Vec::is_empty")]
    note: Vec<u8>,
    #[serde(rename = "rcv", serialize_with = "opt_as_bin", skip_serializing_if = "is_zero_address")]
    receiver: Option<Address>,
    #[serde(rename = "snd", serialize_with = "as_bin")]
    sender: Address,
    #[serde(rename = "type")]
    tx_type: TxType,
    #[serde(rename = "xaid", skip_serializing_if = "is_zero")]
    asset_id: u64,
}

impl Transaction {
    fn base(
        tx_type: TxType,
        sender: Address,
        note: Vec<u8>,
        params: &SuggestedParams,
    ) -> LedgerResult<Self> {
        if note.len() > MAX_NOTE_LEN {
            return Err(LedgerError::NoteTooLong(note.len()));
        }
        Ok(Self {
            asset_amount: 0,
            amount: 0,
            asset_params: None,
            asset_receiver: None,
            fee: 0,
            first_valid: params.first_valid,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash,
            last_valid: params.last_valid,
            note,
            receiver: None,
            sender,
            tx_type,
            asset_id: 0,
        })
    }

    /// Fee = max(per-byte fee × signed size, min fee).
    fn with_fee(mut self, params: &SuggestedParams) -> LedgerResult<Self> {
        let size = self.encode()?.len() as u64 + SIGNATURE_OVERHEAD;
        self.fee = params.fee_per_byte.saturating_mul(size).max(params.min_fee);
        Ok(self)
    }

    /// A native-currency payment.
    pub fn payment(
        sender: Address,
        receiver: Address,
        amount: u64,
        note: Vec<u8>,
        params: &SuggestedParams,
    ) -> LedgerResult<Self> {
        let mut tx = Self::base(TxType::Payment, sender, note, params)?;
        tx.receiver = Some(receiver);
        tx.amount = amount;
        tx.with_fee(params)
    }

    /// An asset transfer. A zero amount to the sender itself is an opt-in.
    pub fn asset_transfer(
        sender: Address,
        receiver: Address,
        asset_id: u64,
        amount: u64,
        note: Vec<u8>,
        params: &SuggestedParams,
    ) -> LedgerResult<Self> {
        let mut tx = Self::base(TxType::AssetTransfer, sender, note, params)?;
        tx.asset_receiver = Some(receiver);
        tx.asset_id = asset_id;
        tx.asset_amount = amount;
        tx.with_fee(params)
    }

    /// Creation of a new asset.
    pub fn asset_create(
        sender: Address,
        asset: AssetParams,
        params: &SuggestedParams,
    ) -> LedgerResult<Self> {
        let mut tx = Self::base(TxType::AssetConfig, sender, Vec::new(), params)?;
        tx.asset_params = Some(asset);
        tx.with_fee(params)
    }

    pub fn tx_type(&self) -> TxType {
        self.tx_type
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn note(&self) -> &[u8] {
        &self.note
    }

    pub fn amount(&self) -> u64 {
        match self.tx_type {
            TxType::AssetTransfer => self.asset_amount,
            _ => self.amount,
        }
    }

    /// Canonical msgpack encoding.
    pub fn encode(&self) -> LedgerResult<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| LedgerError::Encoding(e.to_string()))
    }

    fn bytes_to_sign(&self) -> LedgerResult<Vec<u8>> {
        let mut bytes = TX_PREFIX.to_vec();
        bytes.extend(self.encode()?);
        Ok(bytes)
    }

    /// The id this transaction will have once signed.
    pub fn id(&self) -> LedgerResult<TxId> {
        let digest = sha512_256(&self.bytes_to_sign()?);
        Ok(TxId(BASE32_NOPAD.encode(&digest)))
    }

    /// Sign with `account`, producing a broadcastable blob.
    pub fn sign(&self, account: &Account) -> LedgerResult<SignedTransaction> {
        let message = self.bytes_to_sign()?;
        let signature = account.sign(&message);
        let tx_id = TxId(BASE32_NOPAD.encode(&sha512_256(&message)));

        let blob = rmp_serde::to_vec_named(&SignedWire {
            sig: &signature,
            txn: self,
        })
        .map_err(|e| LedgerError::Encoding(e.to_string()))?;

        Ok(SignedTransaction { tx_id, blob })
    }
}

#[derive(Serialize)]
struct SignedWire<'a> {
    #[serde(serialize_with = "as_bin")]
    sig: &'a [u8; 64],
    txn: &'a Transaction,
}

/// A signed transaction: identifier plus opaque binary blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx_id: TxId,
    pub blob: Vec<u8>,
}
