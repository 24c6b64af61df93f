//! Chained keyed-hash bearer tokens with ordered first-party caveats.
//!
//! The signature is an HMAC-SHA256 chain: the root key keys the tag over the
//! identifier, then each caveat re-keys the tag over its `key=value` string
//! in order. Any insertion, deletion, reordering, or mutation of a caveat
//! breaks the chain, so verification proves the caveat set is exactly what
//! was minted. Caveat *content* (e.g. whether `expires_at` has passed) is
//! deliberately not evaluated here; callers enforce policy after a
//! successful verification.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{L402Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Caveat key whose value must be a well-formed RFC3339 timestamp.
const EXPIRES_AT_CAVEAT: &str = "expires_at";

/// A minted bearer credential.
///
/// Immutable once minted: this engine only ever appends caveats at mint
/// time and never strips them, so a macaroon can only narrow authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macaroon {
    /// Issuing location, informational only.
    pub location: String,

    /// Encoded identifier (see [`crate::Identifier`]).
    pub identifier: Vec<u8>,

    /// Ordered `key=value` caveats, exactly as chained into the signature.
    pub caveats: Vec<String>,

    /// Chained HMAC-SHA256 authentication tag.
    pub signature: [u8; 32],
}

impl Macaroon {
    /// Mint a macaroon over `identifier` with the given root key and
    /// caller-ordered caveats.
    ///
    /// An `expires_at` caveat must carry an RFC3339 timestamp; any other
    /// value fails the mint.
    pub fn mint(
        location: &str,
        identifier: Vec<u8>,
        root_key: &[u8; 32],
        caveats: &[(String, String)],
    ) -> Result<Self> {
        let mut tag = keyed_hash(root_key, &identifier)?;
        let mut chained = Vec::with_capacity(caveats.len());

        for (key, value) in caveats {
            if key == EXPIRES_AT_CAVEAT {
                chrono::DateTime::parse_from_rfc3339(value).map_err(|err| {
                    L402Error::Format(format!("invalid expires_at format: {err}"))
                })?;
            }

            let raw = format!("{key}={value}");
            tag = keyed_hash(&tag, raw.as_bytes())?;
            chained.push(raw);
        }

        Ok(Self {
            location: location.to_string(),
            identifier,
            caveats: chained,
            signature: tag,
        })
    }

    /// Recompute the tag chain from scratch and compare it against the
    /// stored signature in constant time.
    pub fn verify(&self, root_key: &[u8; 32]) -> Result<()> {
        let mut tag = keyed_hash(root_key, &self.identifier)?;
        for caveat in &self.caveats {
            tag = keyed_hash(&tag, caveat.as_bytes())?;
        }

        if bool::from(tag.ct_eq(&self.signature)) {
            Ok(())
        } else {
            Err(L402Error::SignatureVerificationFailed)
        }
    }

    /// Serialize to the binary wire format.
    pub fn serialize_binary(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Deserialize from the binary wire format.
    pub fn deserialize_binary(bytes: &[u8]) -> Result<Self> {
        Ok(postcard::from_bytes(bytes)?)
    }

    /// Serialize and base64-encode for header transport.
    pub fn to_base64(&self) -> Result<String> {
        Ok(BASE64.encode(self.serialize_binary()?))
    }

    /// Decode from a base64-encoded wire representation.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64.decode(encoded)?;
        Self::deserialize_binary(&bytes)
    }
}

fn keyed_hash(key: &[u8], data: &[u8]) -> Result<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| L402Error::Format(format!("invalid hmac key: {err}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}
