//! Orchestration of the L402 challenge/response flow.
//!
//! The authenticator is stateless per call: issuing a challenge is a single
//! invoice-create plus root-key insert, and validating credentials is a read
//! followed by pure computation. Concurrent requests for different token IDs
//! are independent; a duplicate insert for the same token ID is rejected by
//! the store and surfaced, never retried here.

use std::sync::Arc;

use rand::{CryptoRng, RngCore};
use secp256k1::schnorr;
use secp256k1::{Message, Secp256k1, VerifyOnly, XOnlyPublicKey};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{
    Challenge, Clock, Config, Credentials, Identifier, InvoiceProvider, L402Error, Macaroon,
    Result, Store,
};

/// Maximum age (and forward skew) of a signed pre-authorization timestamp.
const SIGNATURE_FRESHNESS_WINDOW_SECS: i64 = 10 * 60;

/// Currency challenges are priced in.
const CHALLENGE_CURRENCY: &str = "USD";

/// Drives credential minting and validation against the external invoice
/// provider and root-key store.
pub struct Authenticator {
    provider: Arc<dyn InvoiceProvider>,
    store: Arc<dyn Store>,
    config: Config,
    clock: Arc<dyn Clock>,
    secp: Secp256k1<VerifyOnly>,
}

impl Authenticator {
    /// Create a new L402 authenticator.
    pub fn new(
        provider: Arc<dyn InvoiceProvider>,
        store: Arc<dyn Store>,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            store,
            config,
            clock,
            secp: Secp256k1::verification_only(),
        }
    }

    /// Mint a new L402 challenge (macaroon plus invoice) for the client key
    /// `pub_key_hex`.
    ///
    /// The root key is drawn from the injected `rng` and persisted before
    /// the macaroon is minted; if persistence fails the whole operation
    /// aborts so an unverifiable macaroon is never issued.
    pub async fn new_challenge<R>(
        &self,
        product_name: &str,
        pub_key_hex: &str,
        price_in_usd_cents: u64,
        caveats: &[(String, String)],
        rng: &mut R,
    ) -> Result<Challenge>
    where
        R: RngCore + CryptoRng,
    {
        let pub_key = decode_hex32(pub_key_hex, "public key")?;

        debug!(product_name, price_in_usd_cents, "creating L402 challenge");

        let invoice = self
            .provider
            .create_invoice(price_in_usd_cents, CHALLENGE_CURRENCY, product_name)
            .await
            .map_err(|err| L402Error::InvoiceCreationFailed(err.to_string()))?;

        let mut root_key = [0u8; 32];
        rng.fill_bytes(&mut root_key);

        self.store
            .create_root_key(pub_key, root_key)
            .await
            .map_err(|err| L402Error::RootKeyPersistenceFailed(err.to_string()))?;

        let payment_hash = decode_hex32(&invoice.payment_hash, "payment hash")?;
        let identifier = Identifier::new(payment_hash, pub_key);

        let macaroon = Macaroon::mint(
            &self.config.location,
            identifier.encode(),
            &root_key,
            caveats,
        )?;

        Ok(Challenge::new(macaroon, invoice))
    }

    /// Validate the L402 credentials in an `Authorization` header.
    ///
    /// On success returns the hex-encoded payment hash, which callers use as
    /// the purchase-ledger key.
    pub async fn validate_l402_credentials(&self, auth_header: &str) -> Result<String> {
        let creds = Credentials::from_authorization_header(auth_header)
            .map_err(|err| L402Error::CredentialExtraction(Box::new(err)))?;

        self.validate_credentials(&creds).await?;

        Ok(hex::encode(creds.payment_hash))
    }

    async fn validate_credentials(&self, creds: &Credentials) -> Result<()> {
        creds.validate_preimage()?;

        let root_key = self.store.get_root_key(creds.token_id).await?;

        if let Err(err) = creds.macaroon.verify(&root_key) {
            warn!(version = creds.version as u64, "macaroon verification failed");
            return Err(err);
        }

        Ok(())
    }

    /// Verify a signed proof of key ownership used to authorize challenge
    /// issuance before any macaroon exists.
    ///
    /// The client signs `"<domain>:<timestamp>"` with the BIP340 Schnorr key
    /// it wants the challenge minted for. Timestamps older than ten minutes
    /// are rejected, and so are timestamps the same distance in the future;
    /// a client clock that far ahead is as suspect as one behind.
    pub fn validate_signature(
        &self,
        pub_key_hex: &str,
        signature_hex: &str,
        domain: &str,
        timestamp: i64,
    ) -> Result<()> {
        let now = self.clock.now().timestamp();
        if (now - timestamp).abs() > SIGNATURE_FRESHNESS_WINDOW_SECS {
            return Err(L402Error::StaleTimestamp { timestamp });
        }

        if domain != self.config.domain {
            return Err(L402Error::DomainMismatch {
                expected: self.config.domain.clone(),
                actual: domain.to_string(),
            });
        }

        let message = format!("{domain}:{timestamp}");
        self.verify_schnorr(pub_key_hex, signature_hex, &message)
    }

    fn verify_schnorr(&self, pub_key_hex: &str, signature_hex: &str, message: &str) -> Result<()> {
        let pub_key_bytes = hex::decode(pub_key_hex)
            .map_err(|err| L402Error::InvalidSignature(format!("invalid public key hex: {err}")))?;
        let pub_key = XOnlyPublicKey::from_slice(&pub_key_bytes)
            .map_err(|err| L402Error::InvalidSignature(format!("invalid public key: {err}")))?;

        let sig_bytes = hex::decode(signature_hex)
            .map_err(|err| L402Error::InvalidSignature(format!("invalid signature hex: {err}")))?;
        let sig = schnorr::Signature::from_slice(&sig_bytes)
            .map_err(|err| L402Error::InvalidSignature(format!("failed to parse signature: {err}")))?;

        let digest: [u8; 32] = Sha256::digest(message.as_bytes()).into();
        let msg = Message::from_digest(digest);

        self.secp
            .verify_schnorr(&sig, &msg, &pub_key)
            .map_err(|_| L402Error::InvalidSignature("signature verification failed".to_string()))
    }
}

fn decode_hex32(hex_str: &str, field: &str) -> Result<[u8; 32]> {
    let raw = hex::decode(hex_str)
        .map_err(|err| L402Error::Format(format!("invalid {field} hex: {err}")))?;
    if raw.len() != 32 {
        return Err(L402Error::Format(format!(
            "invalid {field}: expected 32 bytes, got {}",
            raw.len()
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&raw);
    Ok(out)
}
