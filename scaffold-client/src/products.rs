//! Verification product commands
//!
//! Each method marshals its arguments into a [`ParameterSet`], calls the
//! command with the session token, and maps a non-success status to
//! [`ScaffoldError::CommandFailed`](crate::ScaffoldError::CommandFailed).

use scaffold_core::ParameterSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::session::Session;
use crate::ScaffoldResult;

/// Scope of a background check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// Electronic records only
    #[default]
    Electronic,
    /// Recent records
    Recent,
    /// Every available source
    All,
}

impl CheckType {
    /// Wire name of the check type
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Electronic => "electronic",
            CheckType::Recent => "recent",
            CheckType::All => "all",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional background check switches
///
/// Unset fields are left out of the request and the server applies its
/// own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundCheckOptions {
    /// Fail the check on any misdemeanor
    pub fail_on_misdemeanor: Option<bool>,
    /// Fail the check on any felony
    pub fail_on_felony: Option<bool>,
    /// Fail the check on a DUI or related offense
    pub fail_on_dui: Option<bool>,
    /// Fail the check on a sex offense
    pub fail_on_sex_offense: Option<bool>,
    /// Fail the check on an OFAC terrorist list match
    pub fail_on_terrorist: Option<bool>,
    /// Which records to search
    pub check_type: Option<CheckType>,
}

impl BackgroundCheckOptions {
    fn apply(&self, params: &mut ParameterSet) {
        params.insert_optional("fail_on_misdemeanor", self.fail_on_misdemeanor);
        params.insert_optional("fail_on_felony", self.fail_on_felony);
        params.insert_optional("fail_on_dui", self.fail_on_dui);
        params.insert_optional("fail_on_sex_offense", self.fail_on_sex_offense);
        params.insert_optional("fail_on_terrorist", self.fail_on_terrorist);
        params.insert_optional("check_type", self.check_type.map(|t| t.as_str()));
    }
}

/// Subject of a background check
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundCheckRequest {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth, as the server expects it
    pub dob: String,
    /// Social security number
    pub ssn: String,
    /// Contact email for the subject
    pub email: String,
    /// Where the server posts the finished result
    pub callback_url: String,
    /// Failure switches and check scope
    #[serde(default)]
    pub options: BackgroundCheckOptions,
}

impl fmt::Debug for BackgroundCheckRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundCheckRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("ssn", &"[REDACTED]")
            .field("email", &self.email)
            .field("callback_url", &self.callback_url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl BackgroundCheckRequest {
    fn to_params(&self) -> ParameterSet {
        let mut params = ParameterSet::new()
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("dob", self.dob.as_str())
            .with("ssn", self.ssn.as_str())
            .with("email", self.email.as_str())
            .with("callback_url", self.callback_url.as_str());
        self.options.apply(&mut params);
        params
    }
}

/// Postal address to receive a verification code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailingAddress {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Street address
    pub address: String,
    /// Apartment, suite or unit; left out of the request when absent
    pub address2: Option<String>,
    /// City
    pub city: String,
    /// State
    pub state: String,
    /// Postal code
    pub zip: String,
    /// Contact email for the subject
    pub email: String,
}

impl MailingAddress {
    fn to_params(&self) -> ParameterSet {
        let mut params = ParameterSet::new()
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("address", self.address.as_str())
            .with("city", self.city.as_str())
            .with("state", self.state.as_str())
            .with("zip", self.zip.as_str())
            .with("email", self.email.as_str());
        params.insert_optional("address2", self.address2.as_deref());
        params
    }
}

/// How a phone verification code is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneCodeChannel {
    /// Text message
    #[default]
    Sms,
    /// Voice call
    Voice,
}

impl PhoneCodeChannel {
    /// Wire name of the channel
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneCodeChannel::Sms => "sms",
            PhoneCodeChannel::Voice => "voice",
        }
    }
}

impl fmt::Display for PhoneCodeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Professional license to look up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRequest {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Issuing state
    pub state: String,
    /// License category, as the issuing board names it
    pub license_type: String,
    /// License number
    pub license_number: String,
    /// Where the server posts the result
    pub callback_url: String,
    /// Contact email for the subject
    pub email: String,
}

impl LicenseRequest {
    fn to_params(&self) -> ParameterSet {
        ParameterSet::new()
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("state", self.state.as_str())
            .with("license_type", self.license_type.as_str())
            .with("license_number", self.license_number.as_str())
            .with("callback_url", self.callback_url.as_str())
            .with("email", self.email.as_str())
    }
}

fn check_code_params(code: &str, request_id: &str) -> ParameterSet {
    ParameterSet::new().with("code", code).with("request_id", request_id)
}

impl Session {
    /// Start a background check; returns the request id
    pub fn submit_background_check_request(&self, request: &BackgroundCheckRequest) -> ScaffoldResult<String> {
        self.submit("background_check/submit_request", request.to_params())
    }

    /// Fetch the outcome of a background check
    pub fn check_background_check_result(&self, request_id: &str) -> ScaffoldResult<Map<String, Value>> {
        self.call_checked(
            "background_check/check_result",
            ParameterSet::new().with("request_id", request_id),
        )
    }

    /// Mail a verification code; returns the request id
    pub fn mailing_address_send_code(&self, address: &MailingAddress) -> ScaffoldResult<String> {
        self.submit("mailing_address/send_code", address.to_params())
    }

    /// Check a mailed code
    pub fn mailing_address_check_code(&self, code: &str, request_id: &str) -> ScaffoldResult<()> {
        self.call_checked("mailing_address/check_code", check_code_params(code, request_id))?;
        Ok(())
    }

    /// Send a code to a phone number; returns the request id
    pub fn phone_number_send_code(
        &self,
        phone_number: &str,
        email: &str,
        channel: PhoneCodeChannel,
    ) -> ScaffoldResult<String> {
        let params = ParameterSet::new()
            .with("phone_number", phone_number)
            .with("email", email)
            .with("type", channel.as_str());
        self.submit("phone_number/send_code", params)
    }

    /// Check a phone code
    pub fn phone_number_check_code(&self, code: &str, request_id: &str) -> ScaffoldResult<()> {
        self.call_checked("phone_number/check_code", check_code_params(code, request_id))?;
        Ok(())
    }

    /// Start a professional license lookup; returns the request id
    pub fn professional_license_submit_request(&self, request: &LicenseRequest) -> ScaffoldResult<String> {
        self.submit("license/submit_request", request.to_params())
    }

    fn submit(&self, command: &str, params: ParameterSet) -> ScaffoldResult<String> {
        let result = self.call(command, params)?;
        if !result.is_success() {
            return Err(result.into_failure());
        }
        let request_id = result.id_field("request_id")?;
        tracing::info!(command, request_id = %request_id, "request submitted");
        Ok(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::dispatcher::tests::ScriptedTransport;
    use crate::ScaffoldError;
    use scaffold_core::url_codec;
    use std::sync::Arc;

    fn session(transport: &Arc<ScriptedTransport>) -> Session {
        let config = ClientConfig::new("svc1", "k").with_server("https://api.example.com");
        Session::with_transport(config, transport.clone()).unwrap()
    }

    fn authenticated(transport: ScriptedTransport) -> Arc<ScriptedTransport> {
        Arc::new(
            ScriptedTransport::new()
                .respond(200, "{}")
                .respond(200, r#"{"token":"tok123"}"#)
                .chain(transport),
        )
    }

    fn last_request(transport: &ScriptedTransport) -> (String, ParameterSet) {
        let requests = transport.requested();
        url_codec::parse(requests.last().unwrap()).unwrap()
    }

    fn sample_check() -> BackgroundCheckRequest {
        BackgroundCheckRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            dob: "1815-12-10".to_string(),
            ssn: "123-45-6789".to_string(),
            email: "ada@example.com".to_string(),
            callback_url: "https://example.com/cb".to_string(),
            options: BackgroundCheckOptions::default(),
        }
    }

    #[test]
    fn test_submit_background_check() {
        let transport = authenticated(ScriptedTransport::new().respond(200, r#"{"request_id":"r-77"}"#));
        let session = session(&transport);

        let mut request = sample_check();
        request.options.fail_on_dui = Some(false);
        request.options.check_type = Some(CheckType::All);

        assert_eq!(session.submit_background_check_request(&request).unwrap(), "r-77");

        let (base, params) = last_request(&transport);
        assert_eq!(base, "https://api.example.com/v1/background_check/submit_request");
        assert_eq!(params.get("ssn").map(|v| v.render()), Some("123-45-6789".to_string()));
        assert_eq!(params.get("fail_on_dui").map(|v| v.render()), Some("false".to_string()));
        assert_eq!(params.get("check_type").map(|v| v.render()), Some("all".to_string()));
        assert!(!params.contains("fail_on_felony"));
    }

    #[test]
    fn test_submit_failure_carries_server_error() {
        let transport = authenticated(ScriptedTransport::new().respond(422, r#"{"error":"invalid ssn"}"#));
        let session = session(&transport);

        match session.submit_background_check_request(&sample_check()) {
            Err(ScaffoldError::CommandFailed { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid ssn");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_submit_without_request_id_is_protocol_error() {
        let transport = authenticated(ScriptedTransport::new().respond(200, "{}"));
        let result = session(&transport).professional_license_submit_request(&LicenseRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            state: "CA".to_string(),
            license_type: "rn".to_string(),
            license_number: "N-1".to_string(),
            callback_url: "https://example.com/cb".to_string(),
            email: "ada@example.com".to_string(),
        });
        assert!(matches!(result, Err(ScaffoldError::Protocol(_))));
    }

    #[test]
    fn test_check_background_check_result() {
        let transport = authenticated(
            ScriptedTransport::new().respond(200, r#"{"status":"complete","background_check_passed":true}"#),
        );
        let body = session(&transport).check_background_check_result("r-77").unwrap();

        assert_eq!(body.get("background_check_passed"), Some(&Value::Bool(true)));
        let (base, params) = last_request(&transport);
        assert_eq!(base, "https://api.example.com/v1/background_check/check_result");
        assert_eq!(params.get("request_id").map(|v| v.render()), Some("r-77".to_string()));
    }

    #[test]
    fn test_mailing_address_omits_missing_address2() {
        let transport = authenticated(ScriptedTransport::new().respond(200, r#"{"request_id":9}"#));
        let address = MailingAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address: "12 St James's Square".to_string(),
            address2: None,
            city: "London".to_string(),
            state: "LN".to_string(),
            zip: "SW1Y".to_string(),
            email: "ada@example.com".to_string(),
        };

        assert_eq!(session(&transport).mailing_address_send_code(&address).unwrap(), "9");
        let (_, params) = last_request(&transport);
        assert!(!params.contains("address2"));
        assert_eq!(
            params.get("address").map(|v| v.render()),
            Some("12 St James's Square".to_string())
        );
    }

    #[test]
    fn test_check_codes() {
        let transport = authenticated(
            ScriptedTransport::new()
                .respond(200, "{}")
                .respond(400, r#"{"error":"wrong code"}"#),
        );
        let session = session(&transport);

        assert!(session.mailing_address_check_code("1234", "r-1").is_ok());
        let error = session.phone_number_check_code("0000", "r-2").unwrap_err();
        assert_eq!(error.server_message(), Some("wrong code"));

        let (base, params) = last_request(&transport);
        assert_eq!(base, "https://api.example.com/v1/phone_number/check_code");
        assert_eq!(params.get("code").map(|v| v.render()), Some("0000".to_string()));
    }

    #[test]
    fn test_phone_channel_is_sent_as_type() {
        let transport = authenticated(ScriptedTransport::new().respond(200, r#"{"request_id":"p-1"}"#));
        session(&transport)
            .phone_number_send_code("+15550100", "ada@example.com", PhoneCodeChannel::Voice)
            .unwrap();

        let (_, params) = last_request(&transport);
        assert_eq!(params.get("type").map(|v| v.render()), Some("voice".to_string()));
        assert_eq!(PhoneCodeChannel::default(), PhoneCodeChannel::Sms);
    }

    #[test]
    fn test_debug_redacts_ssn() {
        let debug = format!("{:?}", sample_check());
        assert!(!debug.contains("123-45-6789"));
        assert!(debug.contains("Lovelace"));
    }

    #[test]
    fn test_options_from_json() {
        let options: BackgroundCheckOptions =
            serde_json::from_str(r#"{"fail_on_felony":true,"check_type":"recent"}"#).unwrap();
        assert_eq!(options.fail_on_felony, Some(true));
        assert_eq!(options.check_type, Some(CheckType::Recent));
        assert_eq!(options.fail_on_dui, None);
    }
}
