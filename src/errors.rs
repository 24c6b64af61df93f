//! Error types for L402 operations.
//!
//! Every failure mode of the credential pipeline maps to one variant here so
//! callers can decide between issuing a fresh challenge and failing the
//! request outright. Variants carry enough context for logging but never the
//! root key or the raw preimage.

/// Comprehensive error type for L402 operations.
#[derive(Debug, thiserror::Error)]
pub enum L402Error {
    /// The request carried no `Authorization` header at all.
    #[error("missing Authorization header")]
    MissingAuthorizationHeader,

    /// The `Authorization` header does not use the L402 (or legacy LSAT)
    /// scheme.
    #[error("missing L402 Authorization header")]
    MissingSchemeHeader,

    /// The L402 token did not split into exactly a macaroon and a preimage.
    #[error("invalid L402 token: {header}")]
    MalformedToken {
        /// The raw header, kept for diagnostics.
        header: String,
    },

    /// SHA256 of the presented preimage does not match the payment hash
    /// bound into the macaroon identifier.
    #[error("preimage does not match payment hash")]
    InvalidPreimage,

    /// The macaroon identifier declares a version this engine does not know.
    #[error("unknown identifier version: {0}")]
    UnknownIdentifierVersion(u16),

    /// The macaroon identifier is shorter than its version layout requires.
    #[error("truncated identifier: expected {expected} bytes, got {actual}")]
    TruncatedIdentifier {
        /// Bytes required by the declared version.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// No root key is stored for the credential's token ID.
    #[error("root key not found")]
    RootKeyNotFound,

    /// The recomputed macaroon tag does not match the stored signature.
    #[error("macaroon signature verification failed")]
    SignatureVerificationFailed,

    /// The Schnorr pre-authorization signature (or its encoding) is invalid.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The signed timestamp falls outside the freshness window.
    #[error("timestamp outside freshness window: {timestamp}")]
    StaleTimestamp {
        /// The rejected unix timestamp.
        timestamp: i64,
    },

    /// The signed domain does not match the configured one.
    #[error("domain mismatch: expected {expected}, got {actual}")]
    DomainMismatch {
        /// Domain this service is configured for.
        expected: String,
        /// Domain the client signed.
        actual: String,
    },

    /// The external invoice provider failed to create an invoice.
    #[error("unable to create invoice: {0}")]
    InvoiceCreationFailed(String),

    /// The external store failed to persist a freshly minted root key.
    #[error("unable to store root key: {0}")]
    RootKeyPersistenceFailed(String),

    /// The challenge's invoice has no payment request to serialize.
    #[error("payment request is empty")]
    EmptyPaymentRequest,

    /// A field failed structural validation (hex length, RFC3339, ...).
    #[error("invalid format: {0}")]
    Format(String),

    /// Macaroon wire-format encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The external store failed for a reason other than a missing key.
    #[error("store error: {0}")]
    Store(String),

    /// Credential extraction failed; wraps the underlying parse error.
    #[error("unable to extract credentials: {0}")]
    CredentialExtraction(#[source] Box<L402Error>),
}

impl L402Error {
    /// Returns true when the caller should respond with a fresh 402
    /// challenge instead of a hard failure.
    ///
    /// Only a missing `Authorization` header and a preimage that does not
    /// match the payment hash qualify; every other kind is terminal for the
    /// request.
    pub fn should_issue_new_challenge(&self) -> bool {
        match self {
            Self::MissingAuthorizationHeader | Self::InvalidPreimage => true,
            Self::CredentialExtraction(inner) => inner.should_issue_new_challenge(),
            _ => false,
        }
    }
}

impl From<postcard::Error> for L402Error {
    fn from(err: postcard::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for L402Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::Format(format!("invalid base64: {err}"))
    }
}
