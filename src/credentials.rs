//! Parsing of the `Authorization` header into structured, not-yet-verified
//! credentials.
//!
//! Parsing is independent of verification: this module proves nothing about
//! the macaroon or the preimage beyond their shape. Verification happens in
//! [`crate::Authenticator`] once the root key is in hand.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{Identifier, L402Error, Macaroon, Result};

/// Current authentication scheme prefix.
pub const L402_SCHEME: &str = "L402";

/// Legacy scheme name, accepted as an alias for [`L402_SCHEME`].
pub const LSAT_SCHEME: &str = "LSAT";

/// Decoded L402 credentials from an `Authorization` header.
///
/// The identifier fields are unpacked from the macaroon for convenience;
/// nothing here has been verified yet.
#[derive(Clone, Debug)]
pub struct Credentials {
    /// The bearer macaroon.
    pub macaroon: Macaroon,

    /// Claimed payment preimage.
    pub preimage: [u8; 32],

    /// Identifier layout version.
    pub version: u16,

    /// Payment hash bound into the macaroon identifier.
    pub payment_hash: [u8; 32],

    /// Token ID keying the root key.
    pub token_id: [u8; 32],
}

/// Split an `Authorization` header into its base64 macaroon and hex preimage
/// parts without decoding either.
///
/// Clients may send multiple comma-separated macaroons; only the first is
/// consumed. This is a protocol-compatibility shim, not an error.
pub(crate) fn split_authorization_header(header: &str) -> Result<(&str, &str)> {
    if header.is_empty() {
        return Err(L402Error::MissingAuthorizationHeader);
    }

    // Accept the old LSAT scheme as an alias for L402.
    let token = match header.strip_prefix("L402 ") {
        Some(rest) => rest,
        None => header
            .strip_prefix("LSAT ")
            .ok_or(L402Error::MissingSchemeHeader)?,
    };

    let mut parts = token.split(':');
    let (mac_part, preimage_hex) = match (parts.next(), parts.next(), parts.next()) {
        (Some(mac), Some(preimage), None) => (mac, preimage),
        _ => {
            return Err(L402Error::MalformedToken {
                header: header.to_string(),
            })
        }
    };

    let mac_base64 = mac_part.split(',').next().unwrap_or(mac_part);

    Ok((mac_base64, preimage_hex))
}

impl Credentials {
    /// Extract credentials from a raw `Authorization` header value.
    pub fn from_authorization_header(header: &str) -> Result<Self> {
        let (mac_base64, preimage_hex) = split_authorization_header(header)?;
        Self::decode(mac_base64, preimage_hex)
    }

    /// Decode credentials from their already-split encoded parts.
    pub fn decode(mac_base64: &str, preimage_hex: &str) -> Result<Self> {
        let macaroon = Macaroon::from_base64(mac_base64)?;
        let identifier = Identifier::decode(&macaroon.identifier)?;

        if preimage_hex.len() != 64 {
            return Err(L402Error::Format(format!(
                "invalid preimage: {preimage_hex}"
            )));
        }
        let raw = hex::decode(preimage_hex)
            .map_err(|_| L402Error::Format(format!("invalid preimage: {preimage_hex}")))?;
        let mut preimage = [0u8; 32];
        preimage.copy_from_slice(&raw);

        Ok(Self {
            macaroon,
            preimage,
            version: identifier.version,
            payment_hash: identifier.payment_hash,
            token_id: identifier.token_id,
        })
    }

    /// Check that SHA256 of the preimage equals the payment hash bound into
    /// the identifier.
    pub fn validate_preimage(&self) -> Result<()> {
        let digest: [u8; 32] = Sha256::digest(self.preimage).into();
        if bool::from(digest.ct_eq(&self.payment_hash)) {
            Ok(())
        } else {
            Err(L402Error::InvalidPreimage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minted_header(preimage_hex: &str) -> (String, Macaroon) {
        let identifier = Identifier::new([0x05; 32], [0x06; 32]);
        let macaroon = Macaroon::mint(
            "localhost:8080",
            identifier.encode(),
            &[0x11; 32],
            &[("service".to_string(), "video".to_string())],
        )
        .unwrap();
        let header = format!("L402 {}:{}", macaroon.to_base64().unwrap(), preimage_hex);
        (header, macaroon)
    }

    #[test]
    fn split_header_parts() {
        let preimage_hex = "de".repeat(32);
        let header = format!("L402 AAAA:{preimage_hex}");
        let (mac, preimage) = split_authorization_header(&header).unwrap();
        assert_eq!(mac, "AAAA");
        assert_eq!(preimage, preimage_hex);
    }

    #[test]
    fn lsat_scheme_is_an_alias() {
        let preimage_hex = "de".repeat(32);
        let l402 = format!("L402 AAAA:{preimage_hex}");
        let lsat = format!("LSAT AAAA:{preimage_hex}");
        assert_eq!(
            split_authorization_header(&l402).unwrap(),
            split_authorization_header(&lsat).unwrap(),
        );
    }

    #[test]
    fn missing_header_and_scheme() {
        assert!(matches!(
            split_authorization_header(""),
            Err(L402Error::MissingAuthorizationHeader)
        ));
        assert!(matches!(
            split_authorization_header("Bearer abc"),
            Err(L402Error::MissingSchemeHeader)
        ));
    }

    #[test]
    fn wrong_part_count_is_malformed() {
        assert!(matches!(
            split_authorization_header("L402 AAAA"),
            Err(L402Error::MalformedToken { .. })
        ));
        assert!(matches!(
            split_authorization_header("L402 AAAA:bbbb:cccc"),
            Err(L402Error::MalformedToken { .. })
        ));
    }

    #[test]
    fn only_first_macaroon_of_a_list_is_used() {
        let preimage_hex = "de".repeat(32);
        let header = format!("L402 AAAA,BBBB:{preimage_hex}");
        let (mac, _) = split_authorization_header(&header).unwrap();
        assert_eq!(mac, "AAAA");
    }

    #[test]
    fn full_header_round_trip() {
        let preimage_hex = "ab".repeat(32);
        let (header, macaroon) = minted_header(&preimage_hex);

        let creds = Credentials::from_authorization_header(&header).unwrap();
        assert_eq!(creds.macaroon, macaroon);
        assert_eq!(creds.version, 0);
        assert_eq!(creds.payment_hash, [0x05; 32]);
        assert_eq!(creds.token_id, [0x06; 32]);
        assert_eq!(hex::encode(creds.preimage), preimage_hex);
    }

    #[test]
    fn preimage_must_be_64_hex_chars() {
        let (header, _) = minted_header(&"ab".repeat(31));
        assert!(matches!(
            Credentials::from_authorization_header(&header),
            Err(L402Error::Format(_))
        ));

        let (header, _) = minted_header(&"zz".repeat(32));
        assert!(matches!(
            Credentials::from_authorization_header(&header),
            Err(L402Error::Format(_))
        ));
    }

    #[test]
    fn preimage_binding() {
        // Known pair: SHA256(preimage) == payment_hash.
        let preimage_hex = "5bdf3bac241faf6eacb035e0b9aa911a615e62b80bef3f91d415e561b2a4da7a";
        let hash_hex = "35cf3da4dfdefa01a3859659d447eb2eeb070c9c6610f4faa52b1510a4c5f597";

        let mut preimage = [0u8; 32];
        preimage.copy_from_slice(&hex::decode(preimage_hex).unwrap());
        let mut payment_hash = [0u8; 32];
        payment_hash.copy_from_slice(&hex::decode(hash_hex).unwrap());

        let identifier = Identifier::new(payment_hash, [0x06; 32]);
        let macaroon =
            Macaroon::mint("localhost:8080", identifier.encode(), &[0x11; 32], &[]).unwrap();

        let valid = Credentials {
            macaroon: macaroon.clone(),
            preimage,
            version: 0,
            payment_hash,
            token_id: [0x06; 32],
        };
        valid.validate_preimage().unwrap();

        let mismatched = Credentials {
            macaroon,
            preimage: [0u8; 32],
            version: 0,
            payment_hash,
            token_id: [0x06; 32],
        };
        assert!(matches!(
            mismatched.validate_preimage(),
            Err(L402Error::InvalidPreimage)
        ));
    }
}
