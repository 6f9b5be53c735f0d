//! Property-based tests for error module.
//!
//! These tests validate that error messages carry enough context for a tool
//! caller to act on them without access to the server logs.

use proptest::prelude::*;

use crate::error::{ConfigError, Error};

/// Generate valid HTTP status codes (100-599)
fn http_status_strategy() -> impl Strategy<Value = u16> {
    100u16..600u16
}

/// Generate API endpoint URLs
fn endpoint_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("https://api\\.[a-z]+\\.com/v[12]/[a-z_.]+")
        .unwrap()
        .prop_filter("endpoint must be non-empty", |s| !s.is_empty())
}

/// Generate error messages
fn message_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{1,100}"
}

/// Generate environment variable names
fn env_var_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{2,30}"
}

proptest! {
    /// *For any* API error, the message includes the endpoint and status code.
    #[test]
    fn api_error_includes_endpoint_and_status(
        endpoint in endpoint_strategy(),
        status_code in http_status_strategy(),
        message in message_strategy()
    ) {
        let err = Error::api(&endpoint, status_code, &message);
        let err_string = err.to_string();

        prop_assert!(
            err_string.contains(&endpoint),
            "API error should include endpoint '{}' in message: {}",
            endpoint,
            err_string
        );
        prop_assert!(
            err_string.contains(&status_code.to_string()),
            "API error should include status code '{}' in message: {}",
            status_code,
            err_string
        );
        prop_assert!(err_string.contains(&message));
    }

    /// *For any* network or decode error, the message includes the endpoint.
    #[test]
    fn transport_errors_include_endpoint(
        endpoint in endpoint_strategy(),
        message in message_strategy()
    ) {
        let network = Error::network(&endpoint, &message).to_string();
        let decode = Error::decode(&endpoint, &message).to_string();

        prop_assert!(network.contains(&endpoint));
        prop_assert!(network.contains(&message));
        prop_assert!(decode.contains(&endpoint));
        prop_assert!(decode.contains(&message));
    }

    /// *For any* configuration error, the message names the offending variable.
    #[test]
    fn config_error_names_variable(
        name in env_var_strategy(),
        reason in message_strategy()
    ) {
        let missing: Error = ConfigError::missing_env_var(&name).into();
        let invalid: Error = ConfigError::invalid_value(&name, &reason).into();

        prop_assert!(missing.to_string().contains(&name));
        prop_assert!(invalid.to_string().contains(&name));
        prop_assert!(invalid.to_string().contains(&reason));
    }

    /// Error strings are never empty, so a failed tool result always carries
    /// a usable message.
    #[test]
    fn error_strings_are_never_empty(message in message_strategy()) {
        let errors = [
            Error::validation(&message),
            Error::precondition(&message),
            Error::network("https://api.heygen.com", &message),
        ];
        for err in errors {
            prop_assert!(!err.to_string().trim().is_empty());
        }
    }
}
