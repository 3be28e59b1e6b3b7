//! Session and token lifecycle
//!
//! A session pings the server, exchanges its API key for a token, and signs
//! every later command with that token:
//!
//! ```text
//! Unauthenticated --ping ok--> Pinged --get_token ok--> Tokened
//!        |                                |
//!        +--ping failed--> PingFailed     +--get_token rejected--> error
//! ```

use scaffold_core::ParameterSet;
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::{ClientConfig, Credential};
use crate::dispatcher::{CommandDispatcher, CommandResult};
use crate::transport::{HttpTransport, Transport};
use crate::{ScaffoldError, ScaffoldResult};

/// Authentication state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing sent yet
    Unauthenticated,
    /// Server answered the ping; no token yet
    Pinged,
    /// Token obtained; signed calls are usable
    Tokened,
    /// Ping failed; no token was requested
    PingFailed,
}

/// Authenticated connection to the Scaffold API
#[derive(Debug)]
pub struct Session {
    credential: Credential,
    dispatcher: CommandDispatcher,
    token: Option<SecretString>,
    state: SessionState,
}

impl Session {
    /// Connect to the configured server over HTTP and authenticate
    pub fn connect(config: ClientConfig) -> ScaffoldResult<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Authenticate over a caller-supplied transport
    ///
    /// A failed ping leaves the session tokenless but still returns it; a
    /// rejected token exchange is an error.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> ScaffoldResult<Self> {
        let mut session = Self::unauthenticated(&config, transport)?;
        session.authenticate()?;
        Ok(session)
    }

    /// Build a session without touching the network
    pub fn unauthenticated(config: &ClientConfig, transport: Arc<dyn Transport>) -> ScaffoldResult<Self> {
        config.validate()?;
        let credential = config.credential()?;
        let dispatcher = CommandDispatcher::new(
            config.server_base(),
            credential.service_id(),
            config.signer(),
            transport,
        );

        Ok(Self {
            credential,
            dispatcher,
            token: None,
            state: SessionState::Unauthenticated,
        })
    }

    /// Run ping and token exchange from scratch
    ///
    /// This is how a caller recovers a session whose ping failed.
    pub fn authenticate(&mut self) -> ScaffoldResult<SessionState> {
        self.token = None;
        self.state = SessionState::Unauthenticated;

        if !self.ping() {
            self.state = SessionState::PingFailed;
            tracing::warn!(server = self.dispatcher.server(), "ping failed; session has no token");
            return Ok(self.state);
        }
        self.state = SessionState::Pinged;

        let token = self.get_token()?;
        self.token = Some(token);
        self.state = SessionState::Tokened;
        tracing::info!(service_id = self.credential.service_id(), "session authenticated");

        Ok(self.state)
    }

    /// Send an unsigned ping; any failure reads as "unreachable"
    pub fn ping(&self) -> bool {
        match self.dispatcher.dispatch("ping", None, ParameterSet::new()) {
            Ok(result) => result.is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "ping did not complete");
                false
            }
        }
    }

    /// Exchange the API key for a token
    pub fn get_token(&self) -> ScaffoldResult<SecretString> {
        let result = self
            .dispatcher
            .dispatch("get_token", Some(self.credential.api_key()), ParameterSet::new())?;

        if !result.is_success() {
            let message = result
                .error_message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("get_token returned status {}", result.status));
            return Err(ScaffoldError::AuthenticationFailed(message));
        }

        Ok(SecretString::new(result.str_field("token")?.to_string()))
    }

    /// Ask the server whether it accepts this session's signature
    pub fn verify_signature(&self) -> ScaffoldResult<bool> {
        Ok(self.call("verify_signature", ParameterSet::new())?.is_success())
    }

    /// Dispatch a command signed with the session token
    ///
    /// Without a token the command still goes out, unsigned, and the
    /// server's rejection comes back as an ordinary result.
    pub fn call(&self, command: &str, params: ParameterSet) -> ScaffoldResult<CommandResult> {
        self.dispatcher.dispatch(command, self.token.as_ref(), params)
    }

    /// [`call`](Self::call), mapping any non-success status to
    /// [`ScaffoldError::CommandFailed`]
    pub fn call_checked(&self, command: &str, params: ParameterSet) -> ScaffoldResult<Map<String, Value>> {
        self.call(command, params)?.into_success()
    }

    /// Get the session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get the session token, if one was obtained
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Whether signed calls will carry a signature
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Tokened
    }

    /// Get the service identifier
    pub fn service_id(&self) -> &str {
        self.credential.service_id()
    }

    /// Get the server base URL
    pub fn server(&self) -> &str {
        self.dispatcher.server()
    }

    /// Get the command dispatcher
    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }
}
