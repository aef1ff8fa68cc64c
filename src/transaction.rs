//! Transaction payloads accepted by the dispatcher and the receipts it records
use super::event::Event;
use super::shipment::{GpsReading, TemperatureReading};
use super::types::TimeStamp;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    #[n(0)]
    ShipmentReceived {
        #[n(0)]
        shipment_id: String,
        #[n(1)]
        timestamp: TimeStamp,
    },
    #[n(1)]
    TemperatureReading(#[n(0)] TemperatureReading),
    #[n(2)]
    GpsReading(#[n(0)] GpsReading),
    #[n(3)]
    ShipmentAccepted {
        #[n(0)]
        shipment_id: String,
    },
    #[n(4)]
    ShipmentDeparted {
        #[n(0)]
        shipment_id: String,
    },
    #[n(5)]
    SetupDemo {
        #[n(0)]
        timestamp: TimeStamp,
    },
}

impl Transaction {
    pub fn kind(&self) -> &'static str {
        match self {
            Transaction::ShipmentReceived { .. } => "ShipmentReceived",
            Transaction::TemperatureReading(_) => "TemperatureReading",
            Transaction::GpsReading(_) => "GpsReading",
            Transaction::ShipmentAccepted { .. } => "ShipmentAccepted",
            Transaction::ShipmentDeparted { .. } => "ShipmentDeparted",
            Transaction::SetupDemo { .. } => "SetupDemo",
        }
    }
    /// The shipment this transaction targets, if any.
    pub fn shipment_id(&self) -> Option<&str> {
        match self {
            Transaction::ShipmentReceived { shipment_id, .. }
            | Transaction::ShipmentAccepted { shipment_id }
            | Transaction::ShipmentDeparted { shipment_id } => Some(shipment_id),
            Transaction::TemperatureReading(reading) => Some(&reading.shipment_id),
            Transaction::GpsReading(reading) => Some(&reading.shipment_id),
            Transaction::SetupDemo { .. } => None,
        }
    }
    /// Serialises the payload to CBOR and returns its sha256 digest with the encoding.
    pub fn finalise(&self) -> anyhow::Result<(String, Vec<u8>)> {
        let contents = minicbor::to_vec(self)?;
        let hash = sha256::digest(&contents);

        Ok((hash, contents))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptStatus {
    #[n(0)]
    Committed,
    /// Refused by the domain rules; no entity was changed.
    #[n(1)]
    Rejected {
        #[n(0)]
        reason: String,
    },
}

/// History record of one dispatched transaction.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    #[n(0)]
    pub transaction_id: String, // bech32 encoded uuid7
    #[n(1)]
    pub kind: String,
    #[n(2)]
    pub content_hash: String,
    #[n(3)]
    pub submitted_at: TimeStamp,
    #[n(4)]
    pub status: ReceiptStatus,
    #[n(5)]
    pub events: Vec<Event>,
}

impl Receipt {
    pub fn is_committed(&self) -> bool {
        self.status == ReceiptStatus::Committed
    }
    pub fn rejection(&self) -> Option<&str> {
        match &self.status {
            ReceiptStatus::Rejected { reason } => Some(reason),
            ReceiptStatus::Committed => None,
        }
    }
}
