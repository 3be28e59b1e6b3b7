//! Request URL construction and parsing
//!
//! `build` and `parse` are inverses: the signer builds the URL it sends and a
//! verifier parses it back into the exact parameter set that was signed.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{CoreError, CoreResult};
use crate::params::ParameterSet;

/// Bytes left unescaped in names and values: ASCII alphanumerics and `-._~`
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single query component
pub fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, QUERY_COMPONENT).to_string()
}

/// Decode a single query component, treating `+` as a space
pub fn decode_component(component: &str) -> CoreResult<String> {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CoreError::InvalidEncoding {
            segment: component.to_string(),
            reason: e.to_string(),
        })
}

/// Emit `base?name=value&...` in the set's iteration order
///
/// An empty set still produces the trailing `?`.
pub fn build(base: &str, params: &ParameterSet) -> String {
    let mut url = String::with_capacity(base.len() + 1 + params.len() * 16);
    url.push_str(base);
    url.push('?');

    for (idx, (name, value)) in params.iter().enumerate() {
        if idx > 0 {
            url.push('&');
        }
        url.push_str(&encode_component(name));
        url.push('=');
        url.push_str(&encode_component(&value.render()));
    }

    url
}

/// Split a URL into its base and decoded parameters
///
/// The base ends at the first `?`. Empty segments are skipped; a segment
/// without `=` is a parameter with an empty value. A repeated name keeps
/// its last value.
pub fn parse(url: &str) -> CoreResult<(String, ParameterSet)> {
    let (base, query) = url.split_once('?').unwrap_or((url, ""));

    let mut params = ParameterSet::new();
    for segment in query.split('&') {
        if segment.is_empty() {
            continue;
        }
        let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
        params.insert(decode_component(name)?, decode_component(value)?);
    }

    Ok((base.to_string(), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn test_build_empty_keeps_question_mark() {
        let url = build("https://api.example.com/v1/ping", &ParameterSet::new());
        assert_eq!(url, "https://api.example.com/v1/ping?");
    }

    #[test]
    fn test_build_encodes_values() {
        let params = ParameterSet::new()
            .with("email", "jane+doe@example.com")
            .with("first_name", "Jane Q")
            .with("callback_url", "https://cb.example.com/x?a=1&b=2");

        let url = build("https://api.example.com/v1/license/submit_request", &params);
        assert_eq!(
            url,
            "https://api.example.com/v1/license/submit_request?\
             callback_url=https%3A%2F%2Fcb.example.com%2Fx%3Fa%3D1%26b%3D2&\
             email=jane%2Bdoe%40example.com&\
             first_name=Jane%20Q"
        );
    }

    #[test]
    fn test_build_renders_typed_values() {
        let params = ParameterSet::new().with("timestamp", 1_350_000_000_u64).with("fail_on_dui", true);
        assert_eq!(build("http://h/v1/x", &params), "http://h/v1/x?fail_on_dui=true&timestamp=1350000000");
    }

    #[test]
    fn test_parse_basic() {
        let (base, params) = parse("https://h/v1/ping?b=2&a=hello%20world").unwrap();
        assert_eq!(base, "https://h/v1/ping");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some(&ParamValue::from("hello world")));
        assert_eq!(params.get("b"), Some(&ParamValue::from("2")));
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let (_, params) = parse("https://h/x?&a=1&&b=2&").unwrap();
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let (_, params) = parse("https://h/x?token=abc==&flag").unwrap();
        assert_eq!(params.get("token"), Some(&ParamValue::from("abc==")));
        assert_eq!(params.get("flag"), Some(&ParamValue::from("")));
    }

    #[test]
    fn test_parse_plus_is_space() {
        let (_, params) = parse("https://h/x?name=Jane+Q").unwrap();
        assert_eq!(params.get("name"), Some(&ParamValue::from("Jane Q")));
    }

    #[test]
    fn test_parse_without_query() {
        let (base, params) = parse("https://h/v1/ping").unwrap();
        assert_eq!(base, "https://h/v1/ping");
        assert!(params.is_empty());

        let (base, params) = parse("https://h/v1/ping?").unwrap();
        assert_eq!(base, "https://h/v1/ping");
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let result = parse("https://h/x?name=%FF%FE");
        assert!(matches!(result, Err(CoreError::InvalidEncoding { .. })));
    }

    #[test]
    fn test_empty_base_round_trips() {
        let params = ParameterSet::new().with("a", 1);
        let url = build("", &params);
        assert_eq!(url, "?a=1");

        let (base, parsed) = parse(&url).unwrap();
        assert_eq!(base, "");
        assert_eq!(parsed, params);

        let (base, parsed) = parse("").unwrap();
        assert_eq!(base, "");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_round_trip_unicode_and_reserved() {
        let params = ParameterSet::new()
            .with("address", "1 Main St. #4 & Co.")
            .with("city", "São Paulo")
            .with("note", "100% = done?");

        let (base, parsed) = parse(&build("https://h/v1/mailing_address/send_code", &params)).unwrap();
        assert_eq!(base, "https://h/v1/mailing_address/send_code");
        assert_eq!(parsed, params);
    }
}
