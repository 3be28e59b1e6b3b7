//! Signed command dispatch
//!
//! Every API call goes through [`CommandDispatcher::dispatch`]: stamp and sign
//! the parameters when a secret is supplied, encode them onto
//! `{server}/v1/{command}`, GET it, and decode the JSON envelope.

use scaffold_core::{url_codec, ParameterSet, Signer, SERVICE_ID_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::BASE_URI;
use crate::transport::Transport;
use crate::{ScaffoldError, ScaffoldResult};

/// Status the API uses for success
pub const SUCCESS_STATUS: u16 = 200;

/// Decoded response of one command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    /// HTTP status code
    pub status: u16,
    /// JSON object body
    pub body: Map<String, Value>,
}

impl CommandResult {
    /// Whether the server reported success
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// The server's `error` message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// Look up a body field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// A required string field; absence is a contract violation
    pub fn str_field(&self, name: &str) -> ScaffoldResult<&str> {
        match self.body.get(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ScaffoldError::Protocol(format!(
                "field {:?} is not a string: {}",
                name, other
            ))),
            None => Err(ScaffoldError::Protocol(format!("response is missing field {:?}", name))),
        }
    }

    /// A required identifier field, accepting a string or a number
    pub fn id_field(&self, name: &str) -> ScaffoldResult<String> {
        match self.body.get(name) {
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => self.str_field(name).map(str::to_string),
        }
    }

    /// The body on success, otherwise a command failure
    pub fn into_success(self) -> ScaffoldResult<Map<String, Value>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(self.into_failure())
        }
    }

    /// Turn this result into a [`ScaffoldError::CommandFailed`]
    pub fn into_failure(self) -> ScaffoldError {
        let message = self
            .error_message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("server returned status {}", self.status));
        ScaffoldError::CommandFailed {
            status: self.status,
            message,
        }
    }
}

/// Builds, signs and sends API commands
///
/// Stateless per call: the only inputs are the server, the service
/// identity, the secret handed in by the caller, and the clock.
#[derive(Clone)]
pub struct CommandDispatcher {
    server: String,
    service_id: String,
    signer: Signer,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("server", &self.server)
            .field("service_id", &self.service_id)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl CommandDispatcher {
    /// Create a dispatcher
    pub fn new(
        server: impl Into<String>,
        service_id: impl Into<String>,
        signer: Signer,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            server: server.into(),
            service_id: service_id.into(),
            signer,
            transport,
        }
    }

    /// Get the server base URL
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Get the signer
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// `{server}/v1/{command}`
    pub fn command_url(&self, command: &str) -> String {
        format!("{}{}{}", self.server, BASE_URI, command)
    }

    /// Stamp and sign `params` when `signed_with` is present
    ///
    /// The signature covers `service_id` and `timestamp`. The timestamp is
    /// read from the clock on every call.
    pub fn sign_params(&self, mut params: ParameterSet, signed_with: Option<&SecretString>) -> ScaffoldResult<ParameterSet> {
        if let Some(secret) = signed_with {
            params.insert(SERVICE_ID_PARAM, self.service_id.as_str());
            params.insert(TIMESTAMP_PARAM, chrono::Utc::now().timestamp());
            let signature = self.signer.sign_params(&params, secret.expose_secret())?;
            params.insert(SIGNATURE_PARAM, signature);
        }
        Ok(params)
    }

    /// Full request URL for a command
    pub fn request_url(&self, command: &str, signed_with: Option<&SecretString>, params: ParameterSet) -> ScaffoldResult<String> {
        let params = self.sign_params(params, signed_with)?;
        Ok(url_codec::build(&self.command_url(command), &params))
    }

    /// Send a command and decode the response
    ///
    /// Status codes are not interpreted here; a non-success status with a
    /// JSON body is still an `Ok` result.
    pub fn dispatch(&self, command: &str, signed_with: Option<&SecretString>, params: ParameterSet) -> ScaffoldResult<CommandResult> {
        let url = self.request_url(command, signed_with, params)?;
        tracing::debug!(command, signed = signed_with.is_some(), "dispatching command");

        let response = self.transport.get(&url)?;
        tracing::debug!(command, status = response.status, "command completed");

        let body = decode_body(&response.body)?;
        Ok(CommandResult {
            status: response.status,
            body,
        })
    }
}

fn decode_body(body: &str) -> ScaffoldResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(ScaffoldError::Protocol(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
