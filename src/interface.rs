//! Collaborator seams: the invoice provider and the root-key store.
//!
//! Both are shared, externally-synchronized resources reached over the
//! network or a database. The engine holds them behind trait objects and
//! never retries on its own; cancellation propagates by dropping the
//! in-flight future.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// An amount in a specific currency's smallest unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Amount in the currency's smallest unit.
    pub amount: u64,

    /// Currency code (e.g. "USD", "BTC").
    pub currency: String,
}

/// A Lightning Network invoice, owned by the external provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Amount in the currency the user was quoted.
    pub user_amount: Amount,

    /// Amount in the payment currency.
    pub payment_amount: Amount,

    /// Hex-encoded hash of the payment preimage.
    pub payment_hash: String,

    /// BOLT11 payment request.
    pub payment_request: String,
}

/// Creates new Lightning invoices.
#[async_trait]
pub trait InvoiceProvider: Send + Sync {
    /// Create an invoice for `amount` (smallest unit of `currency`) with the
    /// given description.
    async fn create_invoice(
        &self,
        amount: u64,
        currency: &str,
        description: &str,
    ) -> Result<Invoice>;
}

/// Persists root keys, keyed by token ID.
///
/// The store must create a root key atomically and enforce uniqueness per
/// token ID: a duplicate insert is an error to surface, never a silent
/// overwrite. Partial writes must not be observable.
#[async_trait]
pub trait Store: Send + Sync {
    /// Store the root key for a token ID.
    async fn create_root_key(&self, token_id: [u8; 32], root_key: [u8; 32]) -> Result<()>;

    /// Retrieve the root key for a token ID.
    ///
    /// Returns [`crate::L402Error::RootKeyNotFound`] when no key exists.
    async fn get_root_key(&self, token_id: [u8; 32]) -> Result<[u8; 32]>;
}
