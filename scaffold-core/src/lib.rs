//! Scaffold Core - authenticated command protocol primitives
//!
//! This crate holds the pieces of the Scaffold API client that signer and
//! verifier must agree on byte-for-byte:
//!
//! - [`ParameterSet`]: typed request parameters with one string rendering per value kind
//! - [`Canonicalizer`]: the sorted, concatenated string that is fed to the MAC
//! - [`Signer`]: HMAC signing and constant-time verification
//! - [`url_codec`]: query string construction and parsing
//!
//! Nothing in here performs I/O.

pub mod canonical;
pub mod error;
pub mod params;
pub mod signature;
pub mod url_codec;

pub use canonical::{Canonicalizer, DEFAULT_IGNORED_PARAMS};
pub use error::{CoreError, CoreResult};
pub use params::{ParamValue, ParameterSet};
pub use signature::{sign_url, verify_url, SignatureAlgorithm, Signer};

/// Parameter carrying the caller's service identifier on signed requests
pub const SERVICE_ID_PARAM: &str = "service_id";

/// Parameter carrying the Unix timestamp (seconds) on signed requests
pub const TIMESTAMP_PARAM: &str = "timestamp";

/// Parameter carrying the lowercase hex MAC on signed requests
pub const SIGNATURE_PARAM: &str = "signature";
