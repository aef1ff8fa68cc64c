//! Shipment status transitions
//!
//! Statuses only move forward: CREATED -> ACCEPTED -> IN_TRANSIT -> ARRIVED.
//! ARRIVED is the exception; settlement forces it from any prior status.
use super::error::TransitionError;
use super::event::Event;
use super::shipment::{Shipment, ShipmentStatus};

impl ShipmentStatus {
    /// The single status a regular transition may lead to.
    pub fn next(&self) -> Option<ShipmentStatus> {
        match self {
            ShipmentStatus::Created => Some(ShipmentStatus::Accepted),
            ShipmentStatus::Accepted => Some(ShipmentStatus::InTransit),
            ShipmentStatus::InTransit => Some(ShipmentStatus::Arrived),
            ShipmentStatus::Arrived => None,
        }
    }
}

fn advance(shipment: &mut Shipment, attempted: ShipmentStatus) -> Result<(), TransitionError> {
    if shipment.status.next() != Some(attempted) {
        return Err(TransitionError {
            from: shipment.status,
            attempted,
        });
    }
    shipment.status = attempted;
    Ok(())
}

/// The carrier takes on a freshly created shipment.
pub fn accept(shipment: &mut Shipment) -> Result<(), TransitionError> {
    advance(shipment, ShipmentStatus::Accepted)
}

/// An accepted shipment leaves the origin.
pub fn depart(shipment: &mut Shipment) -> Result<(), TransitionError> {
    advance(shipment, ShipmentStatus::InTransit)
}

/// Terminal override used by settlement.
pub fn arrive(shipment: &mut Shipment) {
    shipment.status = ShipmentStatus::Arrived;
}

/// The event published when a transition is refused.
pub fn rejection_event(shipment: &Shipment, err: &TransitionError) -> Event {
    Event::IllegalTransition {
        shipment_id: shipment.id.clone(),
        from: err.from,
        attempted: err.attempted,
        message: format!(
            "Shipment {} is {} and cannot become {}",
            shipment.id, err.from, err.attempted
        ),
    }
}
