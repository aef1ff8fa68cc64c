//! Seed data for running the demo
use super::contract::ContractBuilder;
use super::error::ValidationError;
use super::ledger::ChangeSet;
use super::shipment::{ProductType, Shipment, ShipmentStatus};
use super::types::{Address, Participant, Role, TimeStamp};
use rust_decimal::Decimal;

pub const DEMO_CUSTOMER: &str = "customer_test@email.com";
pub const DEMO_BROKER: &str = "coyote_test@email.com";
pub const DEMO_CARRIER: &str = "carrier_test@email.com";
pub const DEMO_CONTRACT: &str = "CON_001";
pub const DEMO_SHIPMENT: &str = "SHIP_001";

/// Builds the demo records. The shipment has to arrive one day after `timestamp`.
pub fn demo_records(timestamp: &TimeStamp) -> Result<ChangeSet, ValidationError> {
    let customer = Participant::new(Role::Customer, DEMO_CUSTOMER, Address::in_country("UK"));
    let broker = Participant::new(Role::Broker, DEMO_BROKER, Address::in_country("USA"));
    let carrier = Participant::new(Role::Carrier, DEMO_CARRIER, Address::in_country("Panama"));

    // 50 cents per unit, 20 cents off per degree below 2C, 10 cents per degree above 10C
    let contract = ContractBuilder::new(DEMO_CONTRACT)
        .set_customer(DEMO_CUSTOMER)
        .set_broker(DEMO_BROKER)
        .set_carrier(DEMO_CARRIER)
        .set_arrival_deadline(timestamp.plus_days(1))
        .set_unit_price(Decimal::new(5, 1))
        .set_temperature_range(Decimal::from(2), Decimal::from(10))
        .set_penalty_factors(Decimal::new(2, 1), Decimal::new(1, 1))
        .set_broker_margin_percent(Decimal::from(30))
        .build()?;

    let shipment = Shipment::new(DEMO_SHIPMENT, DEMO_CONTRACT, ProductType::Bananas, 5000)?
        .with_status(ShipmentStatus::InTransit);

    Ok(ChangeSet {
        participants: vec![customer, broker, carrier],
        contracts: vec![contract],
        shipments: vec![shipment],
        receipt: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn demo_contract_terms() {
        let ts = TimeStamp::new_with(2024, 3, 10, 9, 0, 0).unwrap();
        let records = demo_records(&ts).unwrap();

        let contract = &records.contracts[0];
        assert_eq!(contract.arrival_deadline, TimeStamp::new_with(2024, 3, 11, 9, 0, 0).unwrap());
        assert_eq!(contract.unit_price, dec!(0.5));
        assert_eq!(contract.broker_margin_percent, dec!(30));
        assert_eq!(records.participants.len(), 3);
        assert_eq!(records.shipments[0].unit_count, 5000);
        assert_eq!(records.shipments[0].status(), ShipmentStatus::InTransit);
    }
}
