//! L402 authentication engine.
//!
//! Implements the "HTTP 402 + Lightning + macaroon" bearer-credential
//! scheme: a client pays a Lightning invoice to obtain access to a protected
//! resource, proven cryptographically without a persistent login.
//!
//! This crate intentionally stays stateless and delegates invoice creation
//! and root-key persistence to callers through trait-based dependency
//! injection ([`InvoiceProvider`], [`Store`]).
//!
//! # Flow
//!
//! - **Challenge**: [`Authenticator::new_challenge`] creates an invoice,
//!   persists a fresh root key, and mints a macaroon binding the invoice's
//!   payment hash to the client's token ID. The [`Challenge`] serializes
//!   into a `WWW-Authenticate` response header alongside a 402 status.
//! - **Response**: the client pays the invoice, obtains the preimage, and
//!   retries with `Authorization: L402 <macaroon-b64>:<preimage-hex>`.
//! - **Validation**: [`Authenticator::validate_l402_credentials`] parses the
//!   header, checks `SHA256(preimage) == payment_hash`, and verifies the
//!   macaroon's chained tag against the stored root key.
//!
//! A separate Schnorr check ([`Authenticator::validate_signature`]) lets a
//! service require proof of key ownership before issuing a challenge at all.

pub mod authenticator;
pub mod challenge;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod identifier;
pub mod interface;
pub mod macaroon;

/// Mock collaborators for integration testing.
///
/// This module is only available with the `test-utils` feature or in test
/// builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use authenticator::Authenticator;
pub use challenge::{Challenge, CHALLENGE_HEADER_KEY};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use credentials::{Credentials, L402_SCHEME, LSAT_SCHEME};
pub use errors::L402Error;
pub use identifier::{Identifier, IDENTIFIER_VERSION};
pub use interface::{Amount, Invoice, InvoiceProvider, Store};
pub use macaroon::Macaroon;

/// Common result alias for L402 operations.
pub type Result<T> = std::result::Result<T, L402Error>;
