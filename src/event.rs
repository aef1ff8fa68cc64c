//! Events produced by handlers and published after commit
use super::shipment::ShipmentStatus;
use super::types::decimal_cbor;
use rust_decimal::Decimal;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub enum Event {
    #[n(0)]
    TemperatureThreshold {
        #[n(0)]
        shipment_id: String,
        #[n(1)]
        #[cbor(with = "decimal_cbor")]
        temperature: Decimal,
        #[n(2)]
        message: String,
    },
    #[n(1)]
    ShipmentInPort {
        #[n(0)]
        shipment_id: String,
        #[n(1)]
        message: String,
    },
    #[n(2)]
    ShipmentArrived {
        #[n(0)]
        shipment_id: String,
        #[n(1)]
        #[cbor(with = "decimal_cbor")]
        base_amount: Decimal, // before penalties
        #[n(2)]
        #[cbor(with = "decimal_cbor")]
        penalty: Decimal, // per unit
        #[n(3)]
        #[cbor(with = "decimal_cbor")]
        payout: Decimal,
        #[n(4)]
        message: String,
    },
    #[n(3)]
    IllegalTransition {
        #[n(0)]
        shipment_id: String,
        #[n(1)]
        from: ShipmentStatus,
        #[n(2)]
        attempted: ShipmentStatus,
        #[n(3)]
        message: String,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TemperatureThreshold { .. } => "TemperatureThresholdEvent",
            Event::ShipmentInPort { .. } => "ShipmentInPortEvent",
            Event::ShipmentArrived { .. } => "ShipmentArrivedEvent",
            Event::IllegalTransition { .. } => "IllegalTransitionEvent",
        }
    }
    pub fn shipment_id(&self) -> &str {
        match self {
            Event::TemperatureThreshold { shipment_id, .. }
            | Event::ShipmentInPort { shipment_id, .. }
            | Event::ShipmentArrived { shipment_id, .. }
            | Event::IllegalTransition { shipment_id, .. } => shipment_id,
        }
    }
    pub fn message(&self) -> &str {
        match self {
            Event::TemperatureThreshold { message, .. }
            | Event::ShipmentInPort { message, .. }
            | Event::ShipmentArrived { message, .. }
            | Event::IllegalTransition { message, .. } => message,
        }
    }
}

/// Destination for events once a transaction has committed.
///
/// Delivery is fire-and-forget: a sink cannot fail the transaction.
pub trait EventSink {
    fn emit(&mut self, event: &Event);
}

/// Keeps every published event in order; handy for tests and the CLI.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

/// Publishes each event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &Event) {
        tracing::info!(
            kind = event.kind(),
            shipment = event.shipment_id(),
            "{}",
            event.message()
        );
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &Event) {
        (**self).emit(event)
    }
}
