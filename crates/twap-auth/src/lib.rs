//! Authorization for TWAP conditional orders.
//!
//! A conditional order is authorized once by the owning wallet signing its
//! creation digest, and revoked for good by the wallet signing its
//! cancellation digest. This crate computes both digests and reads the
//! wallet's signed-message ledger; it never writes to it.
//!
//! # Key Components
//!
//! - [`AuthorizationVerifier`]: creation/cancellation lookups for a payload
//! - [`AuthorizationOracle`]: read-only ledger capability (injected)
//! - [`GenericSignatureVerifier`]: fallback for non conditional order payloads
//! - [`InMemoryLedger`]: in-process ledger for tests and simulations

pub mod digest;
pub mod generic;
pub mod oracle;
pub mod verifier;

pub use digest::{
    cancellation_digest, creation_digest, eip712_signing_hash, wallet_domain, wallet_message_hash,
};
pub use generic::{EcdsaSignatureVerifier, GenericSignatureVerifier, ECDSA_SIGNATURE_LENGTH};
pub use oracle::{AuthorizationOracle, InMemoryLedger};
pub use verifier::{AuthorizationStatus, AuthorizationVerifier};
