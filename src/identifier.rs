//! Binary codec for the opaque identifier embedded in every macaroon.
//!
//! A version 0 identifier is 66 bytes: a 2-byte big-endian version, the
//! 32-byte payment hash of the invoice the credential is bound to, and the
//! 32-byte token ID used to look up the root key. Future versions must keep
//! the 2-byte version prefix so old decoders can reject them cleanly.

use crate::{L402Error, Result};

/// The only identifier version currently defined.
pub const IDENTIFIER_VERSION: u16 = 0;

/// Encoded size of a version 0 identifier.
const V0_LEN: usize = 2 + 32 + 32;

/// Decoded macaroon identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identifier {
    /// Layout version; only 0 is defined.
    pub version: u16,

    /// Payment hash of the invoice tied to this credential.
    pub payment_hash: [u8; 32],

    /// Token ID keying the root key in the store.
    pub token_id: [u8; 32],
}

impl Identifier {
    /// Create a version 0 identifier.
    pub fn new(payment_hash: [u8; 32], token_id: [u8; 32]) -> Self {
        Self {
            version: IDENTIFIER_VERSION,
            payment_hash,
            token_id,
        }
    }

    /// Encode to the 66-byte version 0 wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(V0_LEN);
        buf.extend_from_slice(&self.version.to_be_bytes());
        buf.extend_from_slice(&self.payment_hash);
        buf.extend_from_slice(&self.token_id);
        buf
    }

    /// Decode an identifier from its wire layout.
    ///
    /// The version is read first; anything other than version 0 is rejected
    /// before the remaining length is even considered. Trailing bytes beyond
    /// the version 0 layout are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(L402Error::TruncatedIdentifier {
                expected: 2,
                actual: bytes.len(),
            });
        }

        let version = u16::from_be_bytes([bytes[0], bytes[1]]);
        if version != IDENTIFIER_VERSION {
            return Err(L402Error::UnknownIdentifierVersion(version));
        }

        if bytes.len() < V0_LEN {
            return Err(L402Error::TruncatedIdentifier {
                expected: V0_LEN,
                actual: bytes.len(),
            });
        }

        let mut payment_hash = [0u8; 32];
        payment_hash.copy_from_slice(&bytes[2..34]);
        let mut token_id = [0u8; 32];
        token_id.copy_from_slice(&bytes[34..66]);

        Ok(Self {
            version,
            payment_hash,
            token_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let id = Identifier::new([0x01; 32], [0x02; 32]);
        let encoded = id.encode();
        assert_eq!(encoded.len(), 66);
        assert_eq!(&encoded[..2], &[0, 0]);

        let decoded = Identifier::decode(&encoded).unwrap();
        assert_eq!(decoded, id);
    }

    #[test]
    fn unknown_version_rejected_regardless_of_length() {
        // Version 256, nothing else.
        let err = Identifier::decode(&[0x01, 0x00]).unwrap_err();
        assert!(matches!(err, L402Error::UnknownIdentifierVersion(256)));

        // Version 1 with a full-length body still fails on the version.
        let mut bytes = vec![0x00, 0x01];
        bytes.extend_from_slice(&[0xaa; 64]);
        let err = Identifier::decode(&bytes).unwrap_err();
        assert!(matches!(err, L402Error::UnknownIdentifierVersion(1)));
    }

    #[test]
    fn truncated_input_rejected() {
        let err = Identifier::decode(&[0x00]).unwrap_err();
        assert!(matches!(err, L402Error::TruncatedIdentifier { .. }));

        // Valid version 0 prefix but only half a payment hash.
        let mut bytes = vec![0x00, 0x00];
        bytes.extend_from_slice(&[0x01; 16]);
        let err = Identifier::decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            L402Error::TruncatedIdentifier {
                expected: 66,
                actual: 18,
            }
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let id = Identifier::new([0x03; 32], [0x04; 32]);
        let mut encoded = id.encode();
        encoded.extend_from_slice(&[0xff; 4]);

        let decoded = Identifier::decode(&encoded).unwrap();
        assert_eq!(decoded, id);
    }
}
