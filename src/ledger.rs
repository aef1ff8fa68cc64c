//! World state held by the host ledger
//!
//! Records are stored as CBOR under prefixed string keys. A [`ChangeSet`] is
//! fully encoded before anything is written, so a commit either lands in full
//! or not at all.
use super::contract::Contract;
use super::error::LedgerError;
use super::shipment::Shipment;
use super::transaction::Receipt;
use super::types::{Participant, Role};
use sled::Batch;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub fn participant_key(role: Role, id: &str) -> String {
    format!("participant/{}/{}", role, id)
}
pub fn contract_key(id: &str) -> String {
    format!("contract/{id}")
}
pub fn shipment_key(id: &str) -> String {
    format!("shipment/{id}")
}
pub fn receipt_key(id: &str) -> String {
    format!("receipt/{id}")
}

/// Every record a single transaction creates or updates.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    pub participants: Vec<Participant>,
    pub contracts: Vec<Contract>,
    pub shipments: Vec<Shipment>,
    pub receipt: Option<Receipt>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
            && self.contracts.is_empty()
            && self.shipments.is_empty()
            && self.receipt.is_none()
    }
    pub fn len(&self) -> usize {
        self.participants.len()
            + self.contracts.len()
            + self.shipments.len()
            + usize::from(self.receipt.is_some())
    }
    /// Encodes every record into `(key, cbor)` pairs.
    pub fn encode(&self) -> Result<Vec<(String, Vec<u8>)>, LedgerError> {
        let mut out = Vec::with_capacity(self.len());
        for p in &self.participants {
            out.push((participant_key(p.role, &p.id), minicbor::to_vec(p)?));
        }
        for c in &self.contracts {
            out.push((contract_key(&c.id), minicbor::to_vec(c)?));
        }
        for s in &self.shipments {
            out.push((shipment_key(&s.id), minicbor::to_vec(s)?));
        }
        if let Some(r) = &self.receipt {
            out.push((receipt_key(&r.transaction_id), minicbor::to_vec(r)?));
        }
        Ok(out)
    }
}

/// Keyed collections of the host ledger, create-or-update semantics.
pub trait WorldState {
    fn load_participant(&self, role: Role, id: &str) -> Result<Participant, LedgerError>;
    fn load_contract(&self, id: &str) -> Result<Contract, LedgerError>;
    fn load_shipment(&self, id: &str) -> Result<Shipment, LedgerError>;
    fn load_receipt(&self, id: &str) -> Result<Receipt, LedgerError>;
    /// Applies all changes atomically.
    fn commit(&mut self, changes: ChangeSet) -> Result<(), LedgerError>;
}

fn decode_record<T>(kind: &'static str, id: &str, bytes: Option<&[u8]>) -> Result<T, LedgerError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    let bytes = bytes.ok_or_else(|| LedgerError::not_found(kind, id))?;
    Ok(minicbor::decode(bytes)?)
}

/// Ledger kept entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    records: BTreeMap<String, Vec<u8>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    fn get(&self, key: &str) -> Option<&[u8]> {
        self.records.get(key).map(Vec::as_slice)
    }
}

impl WorldState for MemoryLedger {
    fn load_participant(&self, role: Role, id: &str) -> Result<Participant, LedgerError> {
        decode_record(role.as_str(), id, self.get(&participant_key(role, id)))
    }
    fn load_contract(&self, id: &str) -> Result<Contract, LedgerError> {
        decode_record("contract", id, self.get(&contract_key(id)))
    }
    fn load_shipment(&self, id: &str) -> Result<Shipment, LedgerError> {
        decode_record("shipment", id, self.get(&shipment_key(id)))
    }
    fn load_receipt(&self, id: &str) -> Result<Receipt, LedgerError> {
        decode_record("receipt", id, self.get(&receipt_key(id)))
    }
    fn commit(&mut self, changes: ChangeSet) -> Result<(), LedgerError> {
        let encoded = changes.encode()?;
        self.records.extend(encoded);
        Ok(())
    }
}

/// Ledger persisted in an embedded sled database.
#[derive(Debug, Clone)]
pub struct SledLedger {
    instance: Arc<sled::Db>,
}

impl SledLedger {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let db = sled::open(path)?;
        Ok(Self::new(Arc::new(db)))
    }
    fn get(&self, key: &str) -> Result<Option<sled::IVec>, LedgerError> {
        Ok(self.instance.get(key.as_bytes())?)
    }
}

impl WorldState for SledLedger {
    fn load_participant(&self, role: Role, id: &str) -> Result<Participant, LedgerError> {
        let bytes = self.get(&participant_key(role, id))?;
        decode_record(role.as_str(), id, bytes.as_deref())
    }
    fn load_contract(&self, id: &str) -> Result<Contract, LedgerError> {
        let bytes = self.get(&contract_key(id))?;
        decode_record("contract", id, bytes.as_deref())
    }
    fn load_shipment(&self, id: &str) -> Result<Shipment, LedgerError> {
        let bytes = self.get(&shipment_key(id))?;
        decode_record("shipment", id, bytes.as_deref())
    }
    fn load_receipt(&self, id: &str) -> Result<Receipt, LedgerError> {
        let bytes = self.get(&receipt_key(id))?;
        decode_record("receipt", id, bytes.as_deref())
    }
    fn commit(&mut self, changes: ChangeSet) -> Result<(), LedgerError> {
        let mut batch = Batch::default();
        for (key, value) in changes.encode()? {
            batch.insert(key.as_bytes(), value);
        }
        self.instance.apply_batch(batch)?;
        self.instance.flush()?;
        Ok(())
    }
}
