//! Mock collaborators for testing the challenge/response flow.
//!
//! Available in test builds or with the `test-utils` feature.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Clock, Invoice, InvoiceProvider, L402Error, Result, Store};

/// Invoice provider returning a canned invoice (or a canned failure) and
/// recording every call.
pub struct MockInvoiceProvider {
    invoice: Option<Invoice>,
    calls: Mutex<Vec<(u64, String, String)>>,
}

impl MockInvoiceProvider {
    /// Provider that returns `invoice` for every call.
    pub fn succeeding(invoice: Invoice) -> Self {
        Self {
            invoice: Some(invoice),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Provider that fails every call.
    pub fn failing() -> Self {
        Self {
            invoice: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The `(amount, currency, description)` tuples seen so far.
    pub fn calls(&self) -> Vec<(u64, String, String)> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl InvoiceProvider for MockInvoiceProvider {
    async fn create_invoice(
        &self,
        amount: u64,
        currency: &str,
        description: &str,
    ) -> Result<Invoice> {
        self.calls.lock().expect("lock poisoned").push((
            amount,
            currency.to_string(),
            description.to_string(),
        ));

        match &self.invoice {
            Some(invoice) => Ok(invoice.clone()),
            None => Err(L402Error::InvoiceCreationFailed(
                "mock provider failure".to_string(),
            )),
        }
    }
}

/// In-memory root-key store enforcing the same unique-insert contract as the
/// real one.
#[derive(Default)]
pub struct MemoryStore {
    keys: Mutex<HashMap<[u8; 32], [u8; 32]>>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_root_key(&self, token_id: [u8; 32], root_key: [u8; 32]) -> Result<()> {
        let mut keys = self.keys.lock().expect("lock poisoned");
        if keys.contains_key(&token_id) {
            return Err(L402Error::Store(
                "root key already exists for token ID".to_string(),
            ));
        }
        keys.insert(token_id, root_key);
        Ok(())
    }

    async fn get_root_key(&self, token_id: [u8; 32]) -> Result<[u8; 32]> {
        self.keys
            .lock()
            .expect("lock poisoned")
            .get(&token_id)
            .copied()
            .ok_or(L402Error::RootKeyNotFound)
    }
}

/// Store whose writes always fail, for persistence-abort tests.
pub struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn create_root_key(&self, _token_id: [u8; 32], _root_key: [u8; 32]) -> Result<()> {
        Err(L402Error::Store("store unavailable".to_string()))
    }

    async fn get_root_key(&self, _token_id: [u8; 32]) -> Result<[u8; 32]> {
        Err(L402Error::Store("store unavailable".to_string()))
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Clock that always reports `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
