use super::shipment::ShipmentStatus;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Min temperature {min} is above max temperature {max}")]
    InvertedTemperatureBounds { min: String, max: String },
    #[error("Contract term '{0}' must not be negative")]
    NegativeTerm(&'static str),
    #[error("Broker margin must be within 0..=100 percent, got {0}")]
    MarginOutOfRange(String),
    #[error("Shipment unit count must be greater than zero")]
    ZeroUnitCount,
    #[error("Required field '{0}' is not set")]
    MissingField(&'static str),
    #[error("Reading belongs to shipment '{reading}', not '{shipment}'")]
    ForeignReading { reading: String, shipment: String },
    #[error("Shipment '{shipment}' references contract '{expected}', got '{found}'")]
    ContractMismatch {
        shipment: String,
        expected: String,
        found: String,
    },
    #[error("Temperature {0}C is below absolute zero")]
    BelowAbsoluteZero(String),
    #[error("Amount overflow while computing {0}")]
    AmountOverflow(&'static str),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Cannot move shipment from {from} to {attempted}")]
pub struct TransitionError {
    pub from: ShipmentStatus,
    pub attempted: ShipmentStatus,
}

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("{kind} '{id}' was not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage failure: {0}")]
    Storage(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("failed to decode record: {0}")]
    Decode(#[from] minicbor::decode::Error),
}

impl LedgerError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
    pub fn already_exists(kind: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.into(),
        }
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for LedgerError {
    fn from(value: minicbor::encode::Error<E>) -> Self {
        Self::Encode(value.to_string())
    }
}
