//! Payout evaluation and balance transfer on shipment arrival
use super::contract::Contract;
use super::error::ValidationError;
use super::event::Event;
use super::lifecycle;
use super::shipment::Shipment;
use super::types::{Participant, TimeStamp};
use rust_decimal::Decimal;

/// The three participants a contract names, already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parties {
    pub customer: Participant,
    pub carrier: Participant,
    pub broker: Participant,
}

/// Financial outcome of a delivery, before any balance moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub base: Decimal,
    pub penalty: Decimal, // per unit
    pub payout: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub outcome: Outcome,
    pub broker_share: Decimal,
    pub carrier_share: Decimal,
    pub event: Event,
}

/// Computes base, penalty and payout without touching any state.
pub fn evaluate(
    contract: &Contract,
    shipment: &Shipment,
    received_at: &TimeStamp,
) -> Result<Outcome, ValidationError> {
    let units = Decimal::from(shipment.unit_count);
    let base = contract
        .unit_price
        .checked_mul(units)
        .ok_or(ValidationError::AmountOverflow("base amount"))?;

    if contract.is_late(received_at) {
        return Ok(Outcome {
            base,
            penalty: Decimal::ZERO,
            payout: Decimal::ZERO,
        });
    }

    let Some((lowest, highest)) = shipment.temperature_extremes() else {
        return Ok(Outcome {
            base,
            penalty: Decimal::ZERO,
            payout: base,
        });
    };

    // every term is non-negative, so saturating at Decimal::MAX only ever zeroes the payout
    let below = contract
        .min_temperature
        .saturating_sub(lowest)
        .max(Decimal::ZERO);
    let above = highest
        .saturating_sub(contract.max_temperature)
        .max(Decimal::ZERO);
    let penalty = below
        .saturating_mul(contract.min_penalty_factor)
        .saturating_add(above.saturating_mul(contract.max_penalty_factor));
    let payout = base
        .saturating_sub(penalty.saturating_mul(units))
        .max(Decimal::ZERO);

    Ok(Outcome {
        base,
        penalty,
        payout,
    })
}

/// Splits a payout into (broker, carrier) shares by the contract margin.
/// The carrier takes the remainder so the shares always sum to the payout.
pub fn split(contract: &Contract, payout: Decimal) -> Result<(Decimal, Decimal), ValidationError> {
    let broker = payout
        .checked_mul(contract.broker_margin_percent)
        .map(|share| share / Decimal::ONE_HUNDRED)
        .ok_or(ValidationError::AmountOverflow("broker share"))?;
    Ok((broker, payout - broker))
}

/// Marks the shipment arrived and moves the payout from customer to broker and carrier.
///
/// Nothing moves when the payout is zero. Every amount is computed before
/// any state changes, so an overflow leaves shipment and parties untouched.
pub fn settle(
    shipment: &mut Shipment,
    contract: &Contract,
    parties: &mut Parties,
    received_at: &TimeStamp,
) -> Result<Settlement, ValidationError> {
    let outcome = evaluate(contract, shipment, received_at)?;

    let (broker_share, carrier_share) = if outcome.payout > Decimal::ZERO {
        let (broker, carrier) = split(contract, outcome.payout)?;
        let mut settled = parties.clone();
        settled.customer.debit(outcome.payout)?;
        settled.broker.credit(broker)?;
        settled.carrier.credit(carrier)?;
        *parties = settled;
        (broker, carrier)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };
    lifecycle::arrive(shipment);

    let event = Event::ShipmentArrived {
        shipment_id: shipment.id.clone(),
        base_amount: outcome.base,
        penalty: outcome.penalty,
        payout: outcome.payout,
        message: format!(
            "Shipment {} arrived. Base amount {}, penalty {} per unit, payout {}",
            shipment.id, outcome.base, outcome.penalty, outcome.payout
        ),
    };

    Ok(Settlement {
        outcome,
        broker_share,
        carrier_share,
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractBuilder;
    use crate::shipment::{ProductType, ShipmentStatus, TemperatureReading};
    use crate::types::{Address, Role};
    use rust_decimal_macros::dec;

    fn deadline() -> TimeStamp {
        TimeStamp::new_with(2024, 6, 2, 12, 0, 0).unwrap()
    }

    fn contract() -> Contract {
        ContractBuilder::new("CON_001")
            .set_customer("customer")
            .set_carrier("carrier")
            .set_broker("broker")
            .set_unit_price(dec!(0.5))
            .set_arrival_deadline(deadline())
            .set_temperature_range(dec!(2), dec!(10))
            .set_penalty_factors(dec!(0.2), dec!(0.1))
            .set_broker_margin_percent(dec!(30))
            .build()
            .unwrap()
    }

    fn shipment(temps: &[Decimal]) -> Shipment {
        let mut shipment = Shipment::new("SHIP_001", "CON_001", ProductType::Bananas, 5000)
            .unwrap()
            .with_status(ShipmentStatus::InTransit);
        for t in temps {
            shipment
                .push_temperature(TemperatureReading {
                    shipment_id: "SHIP_001".into(),
                    centigrade: *t,
                    timestamp: TimeStamp::new_with(2024, 6, 1, 0, 0, 0).unwrap(),
                })
                .unwrap();
        }
        shipment
    }

    fn parties() -> Parties {
        Parties {
            customer: Participant::new(Role::Customer, "customer", Address::in_country("UK")),
            carrier: Participant::new(Role::Carrier, "carrier", Address::in_country("Panama")),
            broker: Participant::new(Role::Broker, "broker", Address::in_country("USA")),
        }
    }

    #[test]
    fn penalised_on_time_delivery() {
        let mut s = shipment(&[dec!(1), dec!(4), dec!(12)]);
        let mut p = parties();

        let settlement = settle(&mut s, &contract(), &mut p, &deadline()).unwrap();

        assert_eq!(settlement.outcome.base, dec!(2500));
        assert_eq!(settlement.outcome.penalty, dec!(0.4));
        assert_eq!(settlement.outcome.payout, dec!(500));
        assert_eq!(p.customer.account_balance, dec!(-500));
        assert_eq!(p.broker.account_balance, dec!(150));
        assert_eq!(p.carrier.account_balance, dec!(350));
        assert_eq!(s.status(), ShipmentStatus::Arrived);
    }

    #[test]
    fn late_delivery_pays_nothing() {
        let mut s = shipment(&[dec!(5), dec!(6)]);
        let mut p = parties();

        let settlement = settle(&mut s, &contract(), &mut p, &deadline().plus_seconds(1)).unwrap();

        assert_eq!(settlement.outcome.payout, Decimal::ZERO);
        assert_eq!(settlement.outcome.penalty, Decimal::ZERO);
        assert_eq!(p, parties());
        assert_eq!(s.status(), ShipmentStatus::Arrived);
    }

    #[test]
    fn no_readings_pays_base() {
        let mut s = shipment(&[]);
        let mut p = parties();

        let settlement = settle(&mut s, &contract(), &mut p, &deadline()).unwrap();

        assert_eq!(settlement.outcome.payout, dec!(2500));
        assert_eq!(settlement.outcome.penalty, Decimal::ZERO);
        assert_eq!(settlement.broker_share + settlement.carrier_share, dec!(2500));
    }

    #[test]
    fn payout_floors_at_zero() {
        let s = shipment(&[dec!(-40)]);

        let outcome = evaluate(&contract(), &s, &deadline()).unwrap();

        assert_eq!(outcome.penalty, dec!(8.4));
        assert_eq!(outcome.payout, Decimal::ZERO);
    }

    #[test]
    fn extreme_reading_zeroes_payout_instead_of_overflowing() {
        let mut s = shipment(&[Decimal::MAX]);
        let mut p = parties();

        let settlement = settle(&mut s, &contract(), &mut p, &deadline()).unwrap();

        assert!(settlement.outcome.penalty > dec!(1000000));
        assert_eq!(settlement.outcome.payout, Decimal::ZERO);
        assert_eq!(p, parties());
        assert_eq!(s.status(), ShipmentStatus::Arrived);
    }

    #[test]
    fn base_overflow_aborts_before_arrival() {
        let contract = ContractBuilder::new("CON_001")
            .set_customer("customer")
            .set_carrier("carrier")
            .set_broker("broker")
            .set_unit_price(Decimal::MAX)
            .set_arrival_deadline(deadline())
            .set_temperature_range(dec!(2), dec!(10))
            .build()
            .unwrap();
        let mut s = shipment(&[]);
        let mut p = parties();

        let err = settle(&mut s, &contract, &mut p, &deadline()).unwrap_err();

        assert!(matches!(err, ValidationError::AmountOverflow("base amount")));
        assert_eq!(s.status(), ShipmentStatus::InTransit);
        assert_eq!(p, parties());
    }

    #[test]
    fn settle_keeps_reading_order() {
        let mut s = shipment(&[dec!(12), dec!(1), dec!(4)]);
        settle(&mut s, &contract(), &mut parties(), &deadline()).unwrap();

        let order: Vec<_> = s.temperature_readings().iter().map(|r| r.centigrade).collect();
        assert_eq!(order, vec![dec!(12), dec!(1), dec!(4)]);
    }

    #[test]
    fn arrived_event_carries_amounts() {
        let mut s = shipment(&[dec!(1), dec!(4), dec!(12)]);
        let settlement = settle(&mut s, &contract(), &mut parties(), &deadline()).unwrap();

        match settlement.event {
            Event::ShipmentArrived {
                base_amount,
                penalty,
                payout,
                ..
            } => {
                assert_eq!(base_amount, dec!(2500));
                assert_eq!(penalty, dec!(0.4));
                assert_eq!(payout, dec!(500));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
