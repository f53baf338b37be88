//! Bridge request notes and the rules an incoming request must pass.
//!
//! A request note is the compact JSON object
//! `{"assetId":<id>,"to":"<address>","amount":<n>}` attached to a fee
//! payment (or an asset transfer) sent to the bridge address.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::indexer::IndexedTransaction;
use crate::ledger::{Address, LedgerError, LedgerResult, TxId};

/// Request a single unit unless told otherwise.
pub const DEFAULT_REQUEST_AMOUNT: u64 = 1;

/// The JSON note carried by bridge requests. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRequest {
    #[serde(rename = "assetId")]
    pub asset_id: u64,

    pub to: String,

    pub amount: u64,
}

impl BridgeRequest {
    pub fn new(asset_id: u64, to: &Address) -> Self {
        Self {
            asset_id,
            to: to.to_string(),
            amount: DEFAULT_REQUEST_AMOUNT,
        }
    }

    /// Compact JSON bytes for a transaction note.
    pub fn to_note(&self) -> LedgerResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| LedgerError::Encoding(format!("Failed to encode request note: {}", e)))
    }
}

/// Why an incoming payment is not a valid bridge request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestRejection {
    #[error("not a payment")]
    NotPayment,

    #[error("payment is not addressed to the bridge")]
    WrongReceiver,

    #[error("payment of {amount} is below the minimum of {minimum}")]
    BelowMinimum { amount: u64, minimum: u64 },

    #[error("note is not a bridge request: {0}")]
    InvalidNote(String),

    #[error("destination {0} is not a valid address")]
    InvalidDestination(String),
}

/// A payment that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequest {
    pub tx_id: TxId,
    pub sender: String,
    pub round: u64,
    pub payment: u64,
    pub request: BridgeRequest,
    pub destination: Address,
}

/// Check an indexed transaction against the bridge request rules.
pub fn classify(
    txn: &IndexedTransaction,
    bridge: &Address,
    min_payment: u64,
) -> Result<IncomingRequest, RequestRejection> {
    let payment = match (&txn.payment, txn.tx_type.as_str()) {
        (Some(payment), "pay") => payment,
        _ => return Err(RequestRejection::NotPayment),
    };
    if payment.receiver != bridge.to_string() {
        return Err(RequestRejection::WrongReceiver);
    }
    if payment.amount < min_payment {
        return Err(RequestRejection::BelowMinimum {
            amount: payment.amount,
            minimum: min_payment,
        });
    }

    let request: BridgeRequest = serde_json::from_slice(&txn.note_bytes())
        .map_err(|e| RequestRejection::InvalidNote(e.to_string()))?;
    let destination = request
        .to
        .parse()
        .map_err(|_| RequestRejection::InvalidDestination(request.to.clone()))?;

    Ok(IncomingRequest {
        tx_id: txn.id.clone(),
        sender: txn.sender.clone(),
        round: txn.confirmed_round,
        payment: payment.amount,
        request,
        destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::indexer::PaymentDetails;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    fn bridge() -> Address {
        Address([7u8; 32])
    }

    fn payment(amount: u64, receiver: &Address, note: &[u8]) -> IndexedTransaction {
        IndexedTransaction {
            id: TxId::from("TX1"),
            tx_type: "pay".to_string(),
            sender: Address([1u8; 32]).to_string(),
            confirmed_round: 42,
            note: Some(BASE64.encode(note)),
            payment: Some(PaymentDetails {
                amount,
                receiver: receiver.to_string(),
            }),
            created_asset_index: None,
        }
    }

    #[test]
    fn test_note_field_order() {
        let request = BridgeRequest::new(12345, &Address::ZERO);
        let note = String::from_utf8(request.to_note().unwrap()).unwrap();
        assert_eq!(
            note,
            format!(r#"{{"assetId":12345,"to":"{}","amount":1}}"#, Address::ZERO)
        );
    }

    #[test]
    fn test_accepts_valid_request() {
        let note = BridgeRequest::new(9, &Address([3u8; 32])).to_note().unwrap();
        let accepted = classify(&payment(300_000, &bridge(), &note), &bridge(), 200_000).unwrap();
        assert_eq!(accepted.request.asset_id, 9);
        assert_eq!(accepted.destination, Address([3u8; 32]));
        assert_eq!(accepted.round, 42);
        assert_eq!(accepted.payment, 300_000);
    }

    #[test]
    fn test_minimum_is_inclusive() {
        let note = BridgeRequest::new(9, &bridge()).to_note().unwrap();
        assert!(classify(&payment(200_000, &bridge(), &note), &bridge(), 200_000).is_ok());
        assert_eq!(
            classify(&payment(199_999, &bridge(), &note), &bridge(), 200_000),
            Err(RequestRejection::BelowMinimum {
                amount: 199_999,
                minimum: 200_000
            })
        );
    }

    #[test]
    fn test_rejects_bad_notes() {
        let hello = payment(300_000, &bridge(), b"Hello world");
        assert!(matches!(
            classify(&hello, &bridge(), 200_000),
            Err(RequestRejection::InvalidNote(_))
        ));

        let bad_to = payment(
            300_000,
            &bridge(),
            br#"{"assetId":1,"to":"NOT-AN-ADDRESS","amount":1}"#,
        );
        assert_eq!(
            classify(&bad_to, &bridge(), 200_000),
            Err(RequestRejection::InvalidDestination("NOT-AN-ADDRESS".to_string()))
        );
    }

    #[test]
    fn test_rejects_other_receivers_and_types() {
        let note = BridgeRequest::new(9, &bridge()).to_note().unwrap();
        let elsewhere = payment(300_000, &Address([8u8; 32]), &note);
        assert_eq!(
            classify(&elsewhere, &bridge(), 200_000),
            Err(RequestRejection::WrongReceiver)
        );

        let mut axfer = payment(300_000, &bridge(), &note);
        axfer.tx_type = "axfer".to_string();
        assert_eq!(
            classify(&axfer, &bridge(), 200_000),
            Err(RequestRejection::NotPayment)
        );
    }
}
