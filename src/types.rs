//! Shared domain primitives: timestamps, decimal encoding and participants
use super::error::ValidationError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TimeStamp(DateTime<Utc>);

impl TimeStamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }
    pub fn plus_seconds(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }
}

impl From<DateTime<Utc>> for TimeStamp {
    fn from(value: DateTime<Utc>) -> Self {
        TimeStamp(value)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl<C> minicbor::Encode<C> for TimeStamp {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// CBOR codec for `Decimal` fields, used through `#[cbor(with = "...")]`.
///
/// The 16-byte form from `Decimal::serialize` keeps scale and sign exactly.
pub mod decimal_cbor {
    use rust_decimal::Decimal;

    pub fn encode<C, W: minicbor::encode::Write>(
        value: &Decimal,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&value.serialize())?.ok()
    }

    pub fn decode<'b, C>(
        d: &mut minicbor::Decoder<'b>,
        _: &mut C,
    ) -> Result<Decimal, minicbor::decode::Error> {
        let bytes: [u8; 16] = d
            .bytes()?
            .try_into()
            .map_err(|_| minicbor::decode::Error::message("decimal must be 16 bytes"))?;

        Ok(Decimal::deserialize(bytes))
    }
}

/// The three kinds of participant a contract binds together.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    #[n(0)]
    Customer,
    #[n(1)]
    Carrier,
    /// The freight broker, called "coyote" in the demo.
    #[n(2)]
    Broker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Carrier => "carrier",
            Role::Broker => "broker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    #[n(0)]
    pub country: String,
    #[n(1)]
    pub city: Option<String>,
    #[n(2)]
    pub street: Option<String>,
    #[n(3)]
    pub zip: Option<String>,
}

impl Address {
    pub fn in_country(country: &str) -> Self {
        Self {
            country: country.to_string(),
            ..Self::default()
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    #[n(0)]
    pub id: String, // email in the demo
    #[n(1)]
    pub role: Role,
    #[n(2)]
    pub address: Address,
    #[n(3)]
    #[cbor(with = "decimal_cbor")]
    pub account_balance: Decimal,
}

impl Participant {
    pub fn new(role: Role, id: &str, address: Address) -> Self {
        Self {
            id: id.to_string(),
            role,
            address,
            account_balance: Decimal::ZERO,
        }
    }
    pub fn credit(&mut self, amount: Decimal) -> Result<(), ValidationError> {
        self.account_balance = self
            .account_balance
            .checked_add(amount)
            .ok_or(ValidationError::AmountOverflow("account balance"))?;
        Ok(())
    }
    pub fn debit(&mut self, amount: Decimal) -> Result<(), ValidationError> {
        self.account_balance = self
            .account_balance
            .checked_sub(amount)
            .ok_or(ValidationError::AmountOverflow("account balance"))?;
        Ok(())
    }
}
