//! Shipments and the telemetry readings they own
use super::error::ValidationError;
use super::types::{TimeStamp, decimal_cbor};
use rust_decimal::Decimal;
use std::fmt;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShipmentStatus {
    #[n(0)]
    Created,
    #[n(1)]
    Accepted,
    #[n(2)]
    InTransit,
    #[n(3)]
    Arrived,
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShipmentStatus::Created => "CREATED",
            ShipmentStatus::Accepted => "ACCEPTED",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Arrived => "ARRIVED",
        };
        f.write_str(name)
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductType {
    #[n(0)]
    Bananas,
    #[n(1)]
    Apples,
    #[n(2)]
    Pears,
    #[n(3)]
    Peaches,
    #[n(4)]
    Coffee,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatitudeDir {
    #[n(0)]
    N,
    #[n(1)]
    S,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongitudeDir {
    #[n(0)]
    E,
    #[n(1)]
    W,
}

impl fmt::Display for LatitudeDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LatitudeDir::N => "N",
            LatitudeDir::S => "S",
        })
    }
}

impl fmt::Display for LongitudeDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LongitudeDir::E => "E",
            LongitudeDir::W => "W",
        })
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct TemperatureReading {
    #[n(0)]
    pub shipment_id: String,
    #[n(1)]
    #[cbor(with = "decimal_cbor")]
    pub centigrade: Decimal,
    #[n(2)]
    pub timestamp: TimeStamp,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct GpsReading {
    #[n(0)]
    pub shipment_id: String,
    #[n(1)]
    pub latitude: String, // kept verbatim, port matching is textual
    #[n(2)]
    pub latitude_dir: LatitudeDir,
    #[n(3)]
    pub longitude: String,
    #[n(4)]
    pub longitude_dir: LongitudeDir,
    #[n(5)]
    pub timestamp: TimeStamp,
}

impl GpsReading {
    /// Renders the position as `/LAT:<lat><dir>/LONG:<long><dir>`.
    pub fn lat_long(&self) -> String {
        format!(
            "/LAT:{}{}/LONG:{}{}",
            self.latitude, self.latitude_dir, self.longitude, self.longitude_dir
        )
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub contract_id: String,
    #[n(2)]
    pub product: ProductType,
    #[n(3)]
    pub(crate) status: ShipmentStatus,
    #[n(4)]
    pub unit_count: u64,
    #[n(5)]
    temperature_readings: Vec<TemperatureReading>,
    #[n(6)]
    gps_readings: Vec<GpsReading>,
}

impl Shipment {
    pub fn new(
        id: &str,
        contract_id: &str,
        product: ProductType,
        unit_count: u64,
    ) -> Result<Self, ValidationError> {
        let shipment = Self {
            id: id.to_string(),
            contract_id: contract_id.to_string(),
            product,
            status: ShipmentStatus::Created,
            unit_count,
            temperature_readings: vec![],
            gps_readings: vec![],
        };
        shipment.validate()?;

        Ok(shipment)
    }
    /// Seeds a shipment at a later status. Only setup and tests construct these;
    /// every other move goes through `lifecycle`.
    pub(crate) fn with_status(mut self, status: ShipmentStatus) -> Self {
        self.status = status;
        self
    }
    pub fn status(&self) -> ShipmentStatus {
        self.status
    }
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.unit_count == 0 {
            return Err(ValidationError::ZeroUnitCount);
        }
        Ok(())
    }
    pub fn temperature_readings(&self) -> &[TemperatureReading] {
        &self.temperature_readings
    }
    pub fn gps_readings(&self) -> &[GpsReading] {
        &self.gps_readings
    }
    pub fn push_temperature(&mut self, reading: TemperatureReading) -> Result<(), ValidationError> {
        self.check_owner(&reading.shipment_id)?;
        self.temperature_readings.push(reading);
        Ok(())
    }
    pub fn push_gps(&mut self, reading: GpsReading) -> Result<(), ValidationError> {
        self.check_owner(&reading.shipment_id)?;
        self.gps_readings.push(reading);
        Ok(())
    }
    /// Lowest and highest recorded temperature, `None` without readings.
    pub fn temperature_extremes(&self) -> Option<(Decimal, Decimal)> {
        let mut readings = self.temperature_readings.iter().map(|r| r.centigrade);
        let first = readings.next()?;

        Some(readings.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
    fn check_owner(&self, reading_shipment: &str) -> Result<(), ValidationError> {
        if reading_shipment != self.id {
            return Err(ValidationError::ForeignReading {
                reading: reading_shipment.to_string(),
                shipment: self.id.clone(),
            });
        }
        Ok(())
    }
}
