use {
    crate::constants::*,
    derive_builder::UninitializedFieldError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
        io::{Error as IOError, ErrorKind as IOErrorKind},
    },
};

/// Error returned when a request cannot be signed, or when a signed request fails verification.
///
/// Signing errors are input errors: the request is aborted rather than signed incorrectly.
#[derive(Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// The request signature does not conform to AWS standards. Sample messages:
    /// `Authorization header requires 'Credential' parameter. Authorization=...`
    /// `Unsupported AWS 'algorithm': 'AWS4-HMAC-SHA512'`
    IncompleteSignature(/* message */ String),

    /// The region or service cannot be placed in a credential scope (empty, or contains a `/`
    /// or whitespace), or a credential scope being verified does not match the expected one.
    InvalidCredentialScope(/* message */ String),

    /// The expiry requested for a presigned (query string) request is out of range.
    InvalidExpiry(/* message */ String),

    /// Invalid request method.
    InvalidRequestMethod(/* message */ String),

    /// A timestamp could not be parsed as an ISO 8601 basic format UTC timestamp
    /// (`YYYYMMDD'T'HHMMSS'Z'`).
    InvalidTimestamp(/* message */ String),

    /// The URI path includes invalid components. This can be a malformed hex encoding (e.g. `%0J`) or a
    /// non-absolute URI path (`foo/bar`).
    InvalidURIPath(/* message */ String),

    /// A header was malformed: the name is not a valid HTTP token, the value contains a line
    /// break, or the header is reserved for the signer (e.g. `authorization`).
    MalformedHeader(/* message */ String),

    /// A query parameter was malformed, or collides with a parameter reserved for the signer.
    ///
    /// `Incomplete trailing escape % sequence`
    MalformedQueryString(/* message */ String),

    /// The signed request carries neither an `Authorization` header nor an `X-Amz-Algorithm` query
    /// parameter.
    MissingAuthenticationToken(/* message */ String),

    /// A required request parameter was not supplied to the builder.
    MissingParameter(/* message */ String),

    /// Signature did not match the calculated signature value.
    SignatureDoesNotMatch(Option</* message */ String>),
}

impl SignatureError {
    /// Return a stable, machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IncompleteSignature(_) => ERR_CODE_INCOMPLETE_SIGNATURE,
            Self::InvalidCredentialScope(_) => ERR_CODE_INVALID_CREDENTIAL_SCOPE,
            Self::InvalidExpiry(_) => ERR_CODE_INVALID_EXPIRY,
            Self::InvalidRequestMethod(_) => ERR_CODE_INVALID_REQUEST_METHOD,
            Self::InvalidTimestamp(_) => ERR_CODE_INVALID_TIMESTAMP,
            Self::InvalidURIPath(_) => ERR_CODE_INVALID_URI_PATH,
            Self::MalformedHeader(_) => ERR_CODE_MALFORMED_HEADER,
            Self::MalformedQueryString(_) => ERR_CODE_MALFORMED_QUERY_STRING,
            Self::MissingAuthenticationToken(_) => ERR_CODE_MISSING_AUTHENTICATION_TOKEN,
            Self::MissingParameter(_) => ERR_CODE_MISSING_PARAMETER,
            Self::SignatureDoesNotMatch(_) => ERR_CODE_SIGNATURE_DOES_NOT_MATCH,
        }
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::IncompleteSignature(msg) => f.write_str(msg),
            Self::InvalidCredentialScope(msg) => f.write_str(msg),
            Self::InvalidExpiry(msg) => f.write_str(msg),
            Self::InvalidRequestMethod(msg) => f.write_str(msg),
            Self::InvalidTimestamp(msg) => f.write_str(msg),
            Self::InvalidURIPath(msg) => f.write_str(msg),
            Self::MalformedHeader(msg) => f.write_str(msg),
            Self::MalformedQueryString(msg) => f.write_str(msg),
            Self::MissingAuthenticationToken(msg) => f.write_str(msg),
            Self::MissingParameter(msg) => f.write_str(msg),
            Self::SignatureDoesNotMatch(msg) => {
                if let Some(msg) = msg {
                    f.write_str(msg)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Error for SignatureError {}

impl From<UninitializedFieldError> for SignatureError {
    fn from(e: UninitializedFieldError) -> SignatureError {
        SignatureError::MissingParameter(format!("Request parameter '{}' must be set", e.field_name()))
    }
}

/// Error returned by the dispatcher when a signed request could not be executed.
///
/// A non-2xx response is *not* an error; it is returned as a
/// [`DispatchResponse`][crate::DispatchResponse] so the caller can read the service's error payload.
#[derive(Debug)]
#[non_exhaustive]
pub enum DispatchError {
    /// The signed request could not be converted into a transport request (e.g. an unparseable URL).
    InvalidRequest(/* message */ String),

    /// The request did not complete within the dispatcher's timeout.
    Timeout(/* message */ String),

    /// The transport failed: DNS resolution, connection refused, TLS failure, or a broken body stream.
    Transport(Box<dyn Error + Send + Sync>),
}

impl DispatchError {
    /// Indicates whether this error is a timeout rather than a generic transport failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidRequest(msg) => f.write_str(msg),
            Self::Timeout(msg) => f.write_str(msg),
            Self::Transport(ref e) => Display::fmt(e, f),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(ref e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<IOError> for DispatchError {
    fn from(e: IOError) -> DispatchError {
        if e.kind() == IOErrorKind::TimedOut {
            DispatchError::Timeout(e.to_string())
        } else {
            DispatchError::Transport(Box::new(e))
        }
    }
}

/// Error returned when client configuration is missing or unusable.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required setting (e.g. an environment variable) is not present.
    Missing(/* message */ String),

    /// A setting is present but its value cannot be used, e.g. a zero or non-numeric timeout.
    Invalid(/* message */ String),
}

impl ConfigError {
    /// Return a stable, machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => ERR_CODE_MISSING_CONFIGURATION,
            Self::Invalid(_) => ERR_CODE_INVALID_CONFIGURATION,
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Missing(msg) | Self::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl Error for ConfigError {}

/// Error returned by `KSecretKey::from_str` when the secret key is unusable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyLengthError {
    /// The key is empty.
    TooShort,
}

impl Display for KeyLengthError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            KeyLengthError::TooShort => f.write_str(ERR_MSG_KEY_TOO_SHORT),
        }
    }
}

impl Error for KeyLengthError {}

#[cfg(test)]
mod tests {
    use {
        crate::{ConfigError, DispatchError, KeyLengthError, SignatureError},
        derive_builder::UninitializedFieldError,
        std::{
            error::Error,
            io::{Error as IOError, ErrorKind as IOErrorKind},
        },
    };

    #[test_log::test]
    fn test_signature_error_codes() {
        let e = SignatureError::MalformedQueryString("foo".to_string());
        assert_eq!(e.to_string(), "foo");
        assert_eq!(e.error_code(), "MalformedQueryString");

        let e = SignatureError::InvalidRequestMethod("Invalid request method: ".to_string());
        assert_eq!(e.error_code(), "InvalidRequestMethod");
        assert_eq!(format!("{}", e), "Invalid request method: ");

        let e = SignatureError::SignatureDoesNotMatch(None);
        assert_eq!(e.error_code(), "SignatureDoesNotMatch");
        assert_eq!(e.to_string(), "");
        assert!(e.source().is_none());
    }

    #[test_log::test]
    fn test_from_uninitialized_field() {
        let e: SignatureError = UninitializedFieldError::new("host").into();
        assert_eq!(e.error_code(), "MissingParameter");
        assert_eq!(e.to_string(), "Request parameter 'host' must be set");
    }

    #[test_log::test]
    fn test_dispatch_error_from_io() {
        let e: DispatchError = IOError::new(IOErrorKind::TimedOut, "read timed out").into();
        assert!(e.is_timeout());
        assert_eq!(e.to_string(), "read timed out");
        assert!(e.source().is_none());

        let e: DispatchError = IOError::new(IOErrorKind::ConnectionReset, "connection reset").into();
        assert!(!e.is_timeout());
        assert_eq!(e.to_string(), "connection reset");
        assert!(e.source().is_some());
    }

    #[test_log::test]
    fn test_config_error_codes() {
        let e = ConfigError::Missing("Environment variable SIGV4_HOST must be set".to_string());
        assert_eq!(e.error_code(), "MissingConfiguration");
        assert_eq!(e.to_string(), "Environment variable SIGV4_HOST must be set");

        let e = ConfigError::Invalid("Timeout must be greater than zero".to_string());
        assert_eq!(e.error_code(), "InvalidConfiguration");
        assert_ne!(e, ConfigError::Missing("Timeout must be greater than zero".to_string()));
    }

    #[test]
    fn test_key_length_error() {
        assert_eq!(KeyLengthError::TooShort.to_string(), "Key too short");
    }
}
