//! Scaffold Client - authenticated access to the Scaffold verification API
//!
//! A [`Session`] pings the server, trades the API key for a token, and then
//! signs each command with that token. Commands are plain GET requests to
//! `{server}/v1/{command}` and answer with a JSON object.
//!
//! ```no_run
//! use scaffold_client::{ClientConfig, Session};
//!
//! # fn main() -> scaffold_client::ScaffoldResult<()> {
//! let session = Session::connect(ClientConfig::new("svc1", "api-key"))?;
//! if session.verify_signature()? {
//!     let request_id = session.phone_number_send_code(
//!         "+15550100",
//!         "user@example.com",
//!         scaffold_client::PhoneCodeChannel::Sms,
//!     )?;
//!     println!("sent code, request {}", request_id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod products;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, Credential, BASE_URI, DEFAULT_SERVER, DEFAULT_TIMEOUT_MS};
pub use dispatcher::{CommandDispatcher, CommandResult, SUCCESS_STATUS};
pub use error::{ScaffoldError, ScaffoldErrorCategory, ScaffoldResult};
pub use products::{
    BackgroundCheckOptions, BackgroundCheckRequest, CheckType, LicenseRequest, MailingAddress, PhoneCodeChannel,
};
pub use session::{Session, SessionState};
pub use transport::{HttpResponse, HttpTransport, Transport};

pub use scaffold_core::{ParamValue, ParameterSet, SignatureAlgorithm};
