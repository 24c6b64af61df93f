//! Wire-ready HTTP 402 challenge: one macaroon paired with one invoice.
//!
//! A challenge is ephemeral. It is built per request, serialized into the
//! `WWW-Authenticate` response header, and discarded; nothing here is ever
//! persisted.

use crate::{Invoice, L402Error, Macaroon, Result};

/// Response header the challenge is carried in.
pub const CHALLENGE_HEADER_KEY: &str = "WWW-Authenticate";

/// An L402 challenge.
///
/// In protocol version 0 the credentials are a macaroon and the payment
/// request is a Lightning Network invoice.
#[derive(Clone, Debug)]
pub struct Challenge {
    /// Credentials the client must pay for and present back.
    pub macaroon: Macaroon,

    /// Lightning invoice used as the payment request.
    pub invoice: Invoice,
}

impl Challenge {
    /// Pair a minted macaroon with its invoice.
    pub fn new(macaroon: Macaroon, invoice: Invoice) -> Self {
        Self { macaroon, invoice }
    }

    /// Base64-encoded macaroon for the challenge header.
    pub fn encoded_credentials(&self) -> Result<String> {
        self.macaroon.to_base64()
    }

    /// The invoice's BOLT11 payment request.
    pub fn encoded_payment_request(&self) -> Result<&str> {
        if self.invoice.payment_request.is_empty() {
            return Err(L402Error::EmptyPaymentRequest);
        }
        Ok(&self.invoice.payment_request)
    }

    /// Header key the challenge is sent under.
    pub fn header_key(&self) -> &'static str {
        CHALLENGE_HEADER_KEY
    }

    /// Full header value: `L402 macaroon="<b64>", invoice="<payreq>"`.
    pub fn header_value(&self) -> Result<String> {
        let credentials = self.encoded_credentials()?;
        let invoice = self.encoded_payment_request()?;
        Ok(format!(
            "L402 macaroon=\"{credentials}\", invoice=\"{invoice}\""
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Amount, Identifier};

    fn test_invoice(payment_request: &str) -> Invoice {
        Invoice {
            payment_hash: "ab".repeat(32),
            payment_request: payment_request.to_string(),
            user_amount: Amount {
                amount: 1000,
                currency: "USD".to_string(),
            },
            payment_amount: Amount {
                amount: 12345,
                currency: "BTC".to_string(),
            },
        }
    }

    fn test_macaroon() -> Macaroon {
        let identifier = Identifier::new([0x05; 32], [0x06; 32]);
        Macaroon::mint("localhost:8080", identifier.encode(), &[0x11; 32], &[]).unwrap()
    }

    #[test]
    fn header_value_format() {
        let challenge = Challenge::new(test_macaroon(), test_invoice("lnbc..."));

        let value = challenge.header_value().unwrap();
        let expected = format!(
            "L402 macaroon=\"{}\", invoice=\"lnbc...\"",
            challenge.encoded_credentials().unwrap()
        );
        assert_eq!(value, expected);
        assert_eq!(challenge.header_key(), "WWW-Authenticate");
    }

    #[test]
    fn empty_payment_request_is_an_error() {
        let challenge = Challenge::new(test_macaroon(), test_invoice(""));

        assert!(matches!(
            challenge.encoded_payment_request(),
            Err(L402Error::EmptyPaymentRequest)
        ));
        assert!(challenge.header_value().is_err());
    }

    #[test]
    fn encoded_credentials_round_trip() {
        let macaroon = test_macaroon();
        let challenge = Challenge::new(macaroon.clone(), test_invoice("lnbc..."));

        let encoded = challenge.encoded_credentials().unwrap();
        assert_eq!(Macaroon::from_base64(&encoded).unwrap(), macaroon);
    }
}
