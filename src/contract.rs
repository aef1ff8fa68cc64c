//! Delivery contract terms binding a customer, carrier and broker
use super::error::ValidationError;
use super::types::{TimeStamp, decimal_cbor};
use rust_decimal::Decimal;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub customer_id: String,
    #[n(2)]
    pub carrier_id: String,
    #[n(3)]
    pub broker_id: String,
    #[n(4)]
    #[cbor(with = "decimal_cbor")]
    pub unit_price: Decimal,
    #[n(5)]
    pub arrival_deadline: TimeStamp,
    #[n(6)]
    #[cbor(with = "decimal_cbor")]
    pub min_temperature: Decimal,
    #[n(7)]
    #[cbor(with = "decimal_cbor")]
    pub max_temperature: Decimal,
    #[n(8)]
    #[cbor(with = "decimal_cbor")]
    pub min_penalty_factor: Decimal, // per degree below min, per unit
    #[n(9)]
    #[cbor(with = "decimal_cbor")]
    pub max_penalty_factor: Decimal, // per degree above max, per unit
    #[n(10)]
    #[cbor(with = "decimal_cbor")]
    pub broker_margin_percent: Decimal,
}

/// Draft form of a [`Contract`]; nothing is checked until [`ContractBuilder::build`].
#[derive(Debug, Default, Clone)]
pub struct ContractBuilder {
    id: Option<String>,
    customer_id: Option<String>,
    carrier_id: Option<String>,
    broker_id: Option<String>,
    unit_price: Option<Decimal>,
    arrival_deadline: Option<TimeStamp>,
    min_temperature: Option<Decimal>,
    max_temperature: Option<Decimal>,
    min_penalty_factor: Decimal,
    max_penalty_factor: Decimal,
    broker_margin_percent: Decimal,
}

impl ContractBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }
    pub fn set_customer(mut self, id: &str) -> Self {
        self.customer_id = Some(id.to_string());
        self
    }
    pub fn set_carrier(mut self, id: &str) -> Self {
        self.carrier_id = Some(id.to_string());
        self
    }
    pub fn set_broker(mut self, id: &str) -> Self {
        self.broker_id = Some(id.to_string());
        self
    }
    pub fn set_unit_price(mut self, price: Decimal) -> Self {
        self.unit_price = Some(price);
        self
    }
    pub fn set_arrival_deadline(mut self, deadline: TimeStamp) -> Self {
        self.arrival_deadline = Some(deadline);
        self
    }
    pub fn set_temperature_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_temperature = Some(min);
        self.max_temperature = Some(max);
        self
    }
    pub fn set_penalty_factors(mut self, below_min: Decimal, above_max: Decimal) -> Self {
        self.min_penalty_factor = below_min;
        self.max_penalty_factor = above_max;
        self
    }
    pub fn set_broker_margin_percent(mut self, percent: Decimal) -> Self {
        self.broker_margin_percent = percent;
        self
    }

    pub fn build(self) -> Result<Contract, ValidationError> {
        let contract = Contract {
            id: self.id.ok_or(ValidationError::MissingField("id"))?,
            customer_id: self
                .customer_id
                .ok_or(ValidationError::MissingField("customer"))?,
            carrier_id: self
                .carrier_id
                .ok_or(ValidationError::MissingField("carrier"))?,
            broker_id: self.broker_id.ok_or(ValidationError::MissingField("broker"))?,
            unit_price: self
                .unit_price
                .ok_or(ValidationError::MissingField("unit_price"))?,
            arrival_deadline: self
                .arrival_deadline
                .ok_or(ValidationError::MissingField("arrival_deadline"))?,
            min_temperature: self
                .min_temperature
                .ok_or(ValidationError::MissingField("min_temperature"))?,
            max_temperature: self
                .max_temperature
                .ok_or(ValidationError::MissingField("max_temperature"))?,
            min_penalty_factor: self.min_penalty_factor,
            max_penalty_factor: self.max_penalty_factor,
            broker_margin_percent: self.broker_margin_percent,
        };
        contract.validate()?;

        Ok(contract)
    }
}

impl Contract {
    /// Checks the invariants every contract must hold before it is evaluated.
    ///
    /// Stored records are re-checked on every dispatch since they may have been
    /// written by another party.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_temperature > self.max_temperature {
            return Err(ValidationError::InvertedTemperatureBounds {
                min: self.min_temperature.to_string(),
                max: self.max_temperature.to_string(),
            });
        }
        let terms = [
            ("unit_price", self.unit_price),
            ("min_penalty_factor", self.min_penalty_factor),
            ("max_penalty_factor", self.max_penalty_factor),
            ("broker_margin_percent", self.broker_margin_percent),
        ];
        if let Some((name, _)) = terms.iter().find(|(_, value)| *value < Decimal::ZERO) {
            return Err(ValidationError::NegativeTerm(*name));
        }
        if self.broker_margin_percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::MarginOutOfRange(
                self.broker_margin_percent.to_string(),
            ));
        }

        Ok(())
    }

    /// True when the temperature lies strictly outside the agreed range.
    pub fn breaches_temperature(&self, centigrade: Decimal) -> bool {
        centigrade < self.min_temperature || centigrade > self.max_temperature
    }

    /// True when a delivery at `received_at` misses the deadline.
    /// Arriving exactly on the deadline is on time.
    pub fn is_late(&self, received_at: &TimeStamp) -> bool {
        *received_at > self.arrival_deadline
    }
}
