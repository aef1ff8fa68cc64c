//! Transaction dispatcher: resolve, apply one handler, commit, publish
use super::config::EngineConfig;
use super::contract::Contract;
use super::error::{LedgerError, TransitionError, ValidationError};
use super::event::{Event, EventSink};
use super::ledger::{ChangeSet, WorldState};
use super::lifecycle;
use super::settlement::{self, Parties};
use super::setup;
use super::shipment::Shipment;
use super::telemetry::{self, Geofence};
use super::transaction::{Receipt, ReceiptStatus, Transaction};
use super::types::{Participant, Role, TimeStamp};
use super::utils;
use tracing::{debug, info, warn};

/// What a handler produced, before anything is written.
struct Applied {
    changes: ChangeSet,
    events: Vec<Event>,
    status: ReceiptStatus,
}

impl Applied {
    fn committed(changes: ChangeSet, events: Vec<Event>) -> Self {
        Self {
            changes,
            events,
            status: ReceiptStatus::Committed,
        }
    }
}

/// Runs transactions one at a time against an injected world state.
///
/// `submit` takes `&mut self`, so two transactions can never interleave.
pub struct Dispatcher<S, E> {
    state: S,
    sink: E,
    geofence: Geofence,
}

impl<S: WorldState, E: EventSink> Dispatcher<S, E> {
    pub fn new(state: S, sink: E, config: &EngineConfig) -> Self {
        Self::with_geofence(state, sink, config.geofence())
    }
    pub fn with_geofence(state: S, sink: E, geofence: Geofence) -> Self {
        Self {
            state,
            sink,
            geofence,
        }
    }
    pub fn state(&self) -> &S {
        &self.state
    }
    pub fn sink(&self) -> &E {
        &self.sink
    }
    pub fn into_parts(self) -> (S, E) {
        (self.state, self.sink)
    }

    /// Processes one transaction to completion.
    ///
    /// A missing entity or an invalid record aborts with an error and leaves
    /// the world state untouched. A refused status transition is not an error:
    /// it is committed as a rejected receipt carrying one explanatory event.
    pub fn submit(&mut self, tx: Transaction) -> anyhow::Result<Receipt> {
        let transaction_id = utils::new_transaction_id()?;
        let (content_hash, _) = tx.finalise()?;
        info!(
            transaction = %transaction_id,
            kind = tx.kind(),
            shipment = tx.shipment_id().unwrap_or("-"),
            "dispatching transaction"
        );

        let Applied {
            mut changes,
            events,
            status,
        } = self.apply(&tx).inspect_err(|err| {
            warn!(transaction = %transaction_id, kind = tx.kind(), %err, "transaction aborted");
        })?;

        if let ReceiptStatus::Rejected { reason } = &status {
            warn!(transaction = %transaction_id, %reason, "transaction rejected");
        }

        let receipt = Receipt {
            transaction_id,
            kind: tx.kind().to_string(),
            content_hash,
            submitted_at: TimeStamp::now(),
            status,
            events,
        };
        changes.receipt = Some(receipt.clone());

        let records = changes.len();
        self.state.commit(changes)?;
        debug!(transaction = %receipt.transaction_id, records, "committed");

        for event in &receipt.events {
            self.sink.emit(event);
        }

        Ok(receipt)
    }

    fn apply(&self, tx: &Transaction) -> Result<Applied, LedgerError> {
        match tx {
            Transaction::ShipmentReceived {
                shipment_id,
                timestamp,
            } => {
                let mut shipment = self.resolve_shipment(shipment_id)?;
                let contract = self.resolve_contract(&shipment)?;
                let mut parties = self.resolve_parties(&contract)?;

                let settlement =
                    settlement::settle(&mut shipment, &contract, &mut parties, timestamp)?;
                debug!(
                    shipment = %shipment.id,
                    payout = %settlement.outcome.payout,
                    penalty = %settlement.outcome.penalty,
                    "settled"
                );

                let Parties {
                    customer,
                    carrier,
                    broker,
                } = parties;
                let changes = ChangeSet {
                    participants: vec![customer, broker, carrier],
                    shipments: vec![shipment],
                    ..ChangeSet::default()
                };
                Ok(Applied::committed(changes, vec![settlement.event]))
            }
            Transaction::TemperatureReading(reading) => {
                let mut shipment = self.resolve_shipment(&reading.shipment_id)?;
                let contract = self.resolve_contract(&shipment)?;

                let events =
                    telemetry::record_temperature(&mut shipment, &contract, reading.clone())?;
                Ok(Applied::committed(shipment_change(shipment), events))
            }
            Transaction::GpsReading(reading) => {
                let mut shipment = self.resolve_shipment(&reading.shipment_id)?;

                let events = telemetry::record_gps(&mut shipment, reading.clone(), &self.geofence)?;
                Ok(Applied::committed(shipment_change(shipment), events))
            }
            Transaction::ShipmentAccepted { shipment_id } => {
                let shipment = self.resolve_shipment(shipment_id)?;
                Ok(transition(shipment, lifecycle::accept))
            }
            Transaction::ShipmentDeparted { shipment_id } => {
                let shipment = self.resolve_shipment(shipment_id)?;
                Ok(transition(shipment, lifecycle::depart))
            }
            Transaction::SetupDemo { timestamp } => {
                let changes = setup::demo_records(timestamp)?;
                self.ensure_absent(&changes)?;
                Ok(Applied::committed(changes, vec![]))
            }
        }
    }

    fn resolve_shipment(&self, id: &str) -> Result<Shipment, LedgerError> {
        let shipment = self.state.load_shipment(id)?;
        shipment.validate()?;
        Ok(shipment)
    }

    fn resolve_contract(&self, shipment: &Shipment) -> Result<Contract, LedgerError> {
        let contract = self.state.load_contract(&shipment.contract_id)?;
        if contract.id != shipment.contract_id {
            return Err(ValidationError::ContractMismatch {
                shipment: shipment.id.clone(),
                expected: shipment.contract_id.clone(),
                found: contract.id,
            }
            .into());
        }
        contract.validate()?;
        Ok(contract)
    }

    fn resolve_parties(&self, contract: &Contract) -> Result<Parties, LedgerError> {
        Ok(Parties {
            customer: self
                .state
                .load_participant(Role::Customer, &contract.customer_id)?,
            carrier: self
                .state
                .load_participant(Role::Carrier, &contract.carrier_id)?,
            broker: self
                .state
                .load_participant(Role::Broker, &contract.broker_id)?,
        })
    }

    /// Seed records only ever insert; any id already present aborts the whole set.
    fn ensure_absent(&self, changes: &ChangeSet) -> Result<(), LedgerError> {
        for p in &changes.participants {
            absent(self.state.load_participant(p.role, &p.id), "participant", &p.id)?;
        }
        for c in &changes.contracts {
            absent(self.state.load_contract(&c.id), "contract", &c.id)?;
        }
        for s in &changes.shipments {
            absent(self.state.load_shipment(&s.id), "shipment", &s.id)?;
        }
        Ok(())
    }

    pub fn participant(&self, role: Role, id: &str) -> anyhow::Result<Participant> {
        Ok(self.state.load_participant(role, id)?)
    }
    pub fn contract(&self, id: &str) -> anyhow::Result<Contract> {
        Ok(self.state.load_contract(id)?)
    }
    pub fn shipment(&self, id: &str) -> anyhow::Result<Shipment> {
        Ok(self.state.load_shipment(id)?)
    }
    pub fn receipt(&self, transaction_id: &str) -> anyhow::Result<Receipt> {
        Ok(self.state.load_receipt(transaction_id)?)
    }
}

fn shipment_change(shipment: Shipment) -> ChangeSet {
    ChangeSet {
        shipments: vec![shipment],
        ..ChangeSet::default()
    }
}

fn absent<T>(
    loaded: Result<T, LedgerError>,
    kind: &'static str,
    id: &str,
) -> Result<(), LedgerError> {
    match loaded {
        Ok(_) => Err(LedgerError::already_exists(kind, id)),
        Err(err) if err.is_not_found() => Ok(()),
        Err(err) => Err(err),
    }
}

fn transition(
    mut shipment: Shipment,
    step: fn(&mut Shipment) -> Result<(), TransitionError>,
) -> Applied {
    match step(&mut shipment) {
        Ok(()) => Applied::committed(shipment_change(shipment), vec![]),
        Err(err) => Applied {
            changes: ChangeSet::default(),
            events: vec![lifecycle::rejection_event(&shipment, &err)],
            status: ReceiptStatus::Rejected {
                reason: err.to_string(),
            },
        },
    }
}
