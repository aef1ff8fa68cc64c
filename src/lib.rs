//! Shipment tracking, telemetry ingestion and conditional payout settlement
//! for a perishable-goods supply chain.
//!
//! Transactions go through [`service::Dispatcher`], which resolves the
//! referenced records from a [`ledger::WorldState`], runs exactly one handler
//! over working copies, commits the result atomically and then publishes the
//! handler's events to an [`event::EventSink`].

pub mod config;
pub mod contract;
pub mod error;
pub mod event;
pub mod ledger;
pub mod lifecycle;
pub mod service;
pub mod settlement;
pub mod setup;
pub mod shipment;
pub mod telemetry;
pub mod transaction;
pub mod types;
pub mod utils;
