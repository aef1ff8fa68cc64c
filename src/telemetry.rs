//! Temperature and GPS ingestion with threshold and geofence checks
use super::contract::Contract;
use super::error::ValidationError;
use super::event::Event;
use super::shipment::{GpsReading, Shipment, TemperatureReading};
use rust_decimal::Decimal;

/// Destination port coordinate of the demo, the Port of New York.
pub const PORT_OF_NEW_YORK: &str = "/LAT:40.6840N/LONG:74.0062W";

/// Exact textual match against a destination coordinate.
///
/// `40.684` does not match `40.6840`; there is no numeric tolerance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geofence {
    pub destination: String,
}

impl Default for Geofence {
    fn default() -> Self {
        Self {
            destination: PORT_OF_NEW_YORK.to_string(),
        }
    }
}

impl Geofence {
    pub fn new(destination: &str) -> Self {
        Self {
            destination: destination.to_string(),
        }
    }
    pub fn contains(&self, reading: &GpsReading) -> bool {
        reading.lat_long() == self.destination
    }
}

/// -273.15 C, nothing colder can be measured.
pub const ABSOLUTE_ZERO: Decimal = Decimal::from_parts(27315, 0, 0, true, 2);

pub fn record_temperature(
    shipment: &mut Shipment,
    contract: &Contract,
    reading: TemperatureReading,
) -> Result<Vec<Event>, ValidationError> {
    let centigrade = reading.centigrade;
    if centigrade < ABSOLUTE_ZERO {
        return Err(ValidationError::BelowAbsoluteZero(centigrade.to_string()));
    }
    shipment.push_temperature(reading)?;

    let mut events = vec![];
    if contract.breaches_temperature(centigrade) {
        events.push(Event::TemperatureThreshold {
            shipment_id: shipment.id.clone(),
            temperature: centigrade,
            message: format!(
                "Temperature threshold violated! Emitting TemperatureEvent for shipment: {}",
                shipment.id
            ),
        });
    }

    Ok(events)
}

pub fn record_gps(
    shipment: &mut Shipment,
    reading: GpsReading,
    geofence: &Geofence,
) -> Result<Vec<Event>, ValidationError> {
    let in_port = geofence.contains(&reading);
    shipment.push_gps(reading)?;

    let mut events = vec![];
    if in_port {
        events.push(Event::ShipmentInPort {
            shipment_id: shipment.id.clone(),
            message: format!(
                "Shipment has reached the destination port of {}",
                geofence.destination
            ),
        });
    }

    Ok(events)
}
