//! Smoke Screen Unit tests for the settlement ledger components
//!
//! These tests span the public API of the crate and run against the
//! in-memory ledger. They mostly cover the happy path of each handler.

use coyote_ledger::{
    config::EngineConfig,
    contract::ContractBuilder,
    event::{Event, RecordingSink},
    ledger::{ChangeSet, MemoryLedger, WorldState},
    service::Dispatcher,
    settlement::{self, split},
    setup::{DEMO_BROKER, DEMO_CARRIER, DEMO_CONTRACT, DEMO_CUSTOMER, DEMO_SHIPMENT},
    shipment::{ShipmentStatus, TemperatureReading},
    transaction::Transaction,
    types::{Role, TimeStamp},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup_time() -> TimeStamp {
    TimeStamp::new_with(2024, 1, 15, 6, 30, 0).unwrap()
}

fn demo() -> Dispatcher<MemoryLedger, RecordingSink> {
    let mut dispatcher = Dispatcher::new(
        MemoryLedger::new(),
        RecordingSink::default(),
        &EngineConfig::default(),
    );
    dispatcher
        .submit(Transaction::SetupDemo {
            timestamp: setup_time(),
        })
        .unwrap();
    dispatcher
}

fn reading(centigrade: Decimal) -> Transaction {
    Transaction::TemperatureReading(TemperatureReading {
        shipment_id: DEMO_SHIPMENT.into(),
        centigrade,
        timestamp: setup_time().plus_seconds(10),
    })
}

// SETUP TESTS
#[cfg(test)]
mod setup_tests {
    use super::*;

    /// The demo seeds three zero-balance participants, one contract and one shipment
    #[test]
    fn demo_records_are_loadable() {
        let dispatcher = demo();

        for (role, id) in [
            (Role::Customer, DEMO_CUSTOMER),
            (Role::Broker, DEMO_BROKER),
            (Role::Carrier, DEMO_CARRIER),
        ] {
            let p = dispatcher.participant(role, id).unwrap();
            assert_eq!(p.account_balance, Decimal::ZERO);
            assert_eq!(p.role, role);
        }
        let contract = dispatcher.contract(DEMO_CONTRACT).unwrap();
        assert_eq!(contract.arrival_deadline, setup_time().plus_days(1));

        let shipment = dispatcher.shipment(DEMO_SHIPMENT).unwrap();
        assert_eq!(shipment.contract_id, DEMO_CONTRACT);
        assert!(shipment.temperature_readings().is_empty());
    }

    /// Setup emits nothing
    #[test]
    fn demo_setup_is_silent() {
        assert!(demo().sink().events.is_empty());
    }
}

// TELEMETRY TESTS
#[cfg(test)]
mod telemetry_tests {
    use super::*;

    /// Each reading grows the sequence by one and keeps submission order
    #[test]
    fn readings_append_in_order() {
        let mut dispatcher = demo();

        for (i, t) in [dec!(9), dec!(3), dec!(7)].into_iter().enumerate() {
            dispatcher.submit(reading(t)).unwrap();
            let shipment = dispatcher.shipment(DEMO_SHIPMENT).unwrap();
            assert_eq!(shipment.temperature_readings().len(), i + 1);
            assert_eq!(shipment.temperature_readings()[i].centigrade, t);
        }
    }

    /// Boundary readings are within the contract and produce no event
    #[test]
    fn boundary_readings_are_quiet() {
        let mut dispatcher = demo();

        let low = dispatcher.submit(reading(dec!(2))).unwrap();
        let high = dispatcher.submit(reading(dec!(10))).unwrap();

        assert!(low.events.is_empty());
        assert!(high.events.is_empty());
    }

    /// A breach is published with the offending temperature
    #[test]
    fn breach_is_published() {
        let mut dispatcher = demo();

        dispatcher.submit(reading(dec!(10.1))).unwrap();

        match dispatcher.sink().events.as_slice() {
            [Event::TemperatureThreshold { temperature, .. }] => {
                assert_eq!(*temperature, dec!(10.1))
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    /// Readings for unknown shipments are refused
    #[test]
    fn unknown_shipment_is_not_found() {
        let mut dispatcher = demo();
        let tx = Transaction::TemperatureReading(TemperatureReading {
            shipment_id: "SHIP_404".into(),
            centigrade: dec!(5),
            timestamp: setup_time(),
        });

        assert!(dispatcher.submit(tx).is_err());
    }
}

// SETTLEMENT TESTS
#[cfg(test)]
mod settlement_tests {
    use super::*;

    /// The worked example from the demo contract: readings 1, 4 and 12 on time
    #[test]
    fn worked_example() {
        let mut dispatcher = demo();
        for t in [dec!(1), dec!(4), dec!(12)] {
            dispatcher.submit(reading(t)).unwrap();
        }

        dispatcher
            .submit(Transaction::ShipmentReceived {
                shipment_id: DEMO_SHIPMENT.into(),
                timestamp: setup_time().plus_seconds(3600),
            })
            .unwrap();

        let customer = dispatcher.participant(Role::Customer, DEMO_CUSTOMER).unwrap();
        let broker = dispatcher.participant(Role::Broker, DEMO_BROKER).unwrap();
        let carrier = dispatcher.participant(Role::Carrier, DEMO_CARRIER).unwrap();
        assert_eq!(customer.account_balance, dec!(-500));
        assert_eq!(broker.account_balance + carrier.account_balance, dec!(500));
        assert_eq!(
            dispatcher.shipment(DEMO_SHIPMENT).unwrap().status(),
            ShipmentStatus::Arrived
        );
    }

    /// A zero margin hands the whole payout to the carrier
    #[test]
    fn zero_margin_split() {
        let contract = ContractBuilder::new("C")
            .set_customer("a")
            .set_carrier("b")
            .set_broker("c")
            .set_unit_price(dec!(1))
            .set_arrival_deadline(setup_time())
            .set_temperature_range(dec!(0), dec!(0))
            .build()
            .unwrap();

        assert_eq!(split(&contract, dec!(99.99)).unwrap(), (dec!(0), dec!(99.99)));
    }

    /// Evaluation alone never moves the shipment status
    #[test]
    fn evaluate_is_pure() {
        let dispatcher = demo();
        let contract = dispatcher.contract(DEMO_CONTRACT).unwrap();
        let shipment = dispatcher.shipment(DEMO_SHIPMENT).unwrap();

        let outcome = settlement::evaluate(&contract, &shipment, &setup_time()).unwrap();

        assert_eq!(outcome.payout, dec!(2500));
        assert_eq!(shipment.status(), ShipmentStatus::InTransit);
    }
}

// LEDGER AND SINK TESTS
#[cfg(test)]
mod ledger_tests {
    use super::*;

    /// An empty change set commits nothing
    #[test]
    fn empty_change_set() {
        let mut ledger = MemoryLedger::new();
        let changes = ChangeSet::default();
        assert!(changes.is_empty());

        ledger.commit(changes).unwrap();
        assert!(ledger.is_empty());
    }

    /// A dispatcher can publish into a sink it only borrows
    #[test]
    fn dispatcher_with_borrowed_sink() {
        let mut sink = RecordingSink::default();
        let mut dispatcher =
            Dispatcher::new(MemoryLedger::new(), &mut sink, &EngineConfig::default());
        dispatcher
            .submit(Transaction::SetupDemo {
                timestamp: setup_time(),
            })
            .unwrap();
        dispatcher.submit(reading(dec!(-1))).unwrap();
        drop(dispatcher);

        assert_eq!(sink.events.len(), 1);
    }
}
