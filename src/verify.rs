//! Receiving-side verification of a signed request.
//!
//! The checks run in a fixed order: authentication mechanism, required parameters, timestamp,
//! credential scope, signed headers, and finally the signature itself.

use {
    crate::{
        canonical::{query_string_to_normalized_pairs, unescape_uri_encoding, CanonicalRequest},
        chronoutil::{format_date, ParseISO8601Basic},
        constants::*,
        crypto::sha256_hex,
        signature::{credential_scope, string_to_sign},
        Credentials, SignatureError, SignedRequest,
    },
    chrono::{DateTime, Utc},
    http::uri::Uri,
    log::{debug, trace},
    qualifier_attr::qualifiers,
    std::{collections::HashMap, str::FromStr},
    subtle::ConstantTimeEq,
};

/// Authentication parameters extracted from either the `Authorization` header or the query string.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone, Debug, Eq, PartialEq)]
struct AuthParams {
    /// `keyid/date/region/service/aws4_request`
    credential: String,

    /// The signature supplied with the request.
    signature: String,

    /// The signed header names, sorted.
    signed_headers: Vec<String>,

    /// The raw `X-Amz-Date` value.
    timestamp_str: String,
}

/// Verify a signed request against the credentials, region, and service it should have been
/// signed with.
///
/// The signature may be carried either in an `Authorization` header or in the query string, but
/// not both. The canonical request is rebuilt from the request's own URL and headers and the
/// signature is recomputed and compared in constant time.
///
/// Request freshness is not checked; the caller owns the clock.
pub fn sigv4_verify_signed_request(
    signed: &SignedRequest,
    credentials: &Credentials,
    region: &str,
    service: &str,
) -> Result<(), SignatureError> {
    let uri = Uri::from_str(signed.url())
        .map_err(|e| SignatureError::InvalidURIPath(format!("Invalid URL {:?}: {}", signed.url(), e)))?;
    let query_parameters = query_string_to_normalized_pairs(uri.query().unwrap_or(""))?;

    let auth_params = get_auth_parameters(signed, &query_parameters)?;
    trace!("sigv4_verify_signed_request: {:?}", auth_params);

    let timestamp = DateTime::<Utc>::parse_from_iso8601_basic(&auth_params.timestamp_str).ok_or_else(|| {
        SignatureError::InvalidTimestamp(format!(
            "X-Amz-Date must be in ISO 8601 basic format (YYYYMMDD'T'HHMMSS'Z'): {}",
            auth_params.timestamp_str
        ))
    })?;

    prevalidate(&auth_params, credentials, region, service, &timestamp)?;

    if !auth_params.signed_headers.iter().any(|h| h == HDR_HOST) {
        return Err(SignatureError::SignatureDoesNotMatch(Some(MSG_HOST_MUST_BE_SIGNED.to_string())));
    }

    let canonical = CanonicalRequest::from_signed_parts(
        signed.method(),
        &uri,
        signed.headers(),
        &auth_params.signed_headers,
        sha256_hex(signed.body()),
    )?;

    let scope = credential_scope(&timestamp, region, service);
    let string_to_sign = string_to_sign(&timestamp, &scope, &hex::encode(canonical.canonical_request_sha256()));
    trace!("String to sign:\n{}", string_to_sign);

    let signing_key = credentials.secret_key().to_ksigning(timestamp.date_naive(), region, service);
    let expected_signature = signing_key.sign(string_to_sign.as_bytes());
    let is_equal: bool = auth_params.signature.as_bytes().ct_eq(expected_signature.as_bytes()).into();

    if !is_equal {
        trace!("Signature mismatch: expected '{}', got '{}'", expected_signature, auth_params.signature);
        return Err(SignatureError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
    }

    debug!("sigv4_verify_signed_request: signature verified for scope {}", scope);
    Ok(())
}

/// Determine which authentication mechanism the request uses and extract its parameters.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn get_auth_parameters(
    signed: &SignedRequest,
    query_parameters: &[(String, String)],
) -> Result<AuthParams, SignatureError> {
    let auth_header = signed.headers().get(HDR_AUTHORIZATION);
    let query_alg = query_parameters.iter().find(|(name, _)| name == QP_X_AMZ_ALGORITHM).map(|(_, value)| value);

    match (auth_header, query_alg) {
        (Some(_), Some(_)) => Err(SignatureError::IncompleteSignature(MSG_ONLY_ONE_AUTH_MECHANISM.to_string())),
        (None, None) => Err(SignatureError::MissingAuthenticationToken(MSG_REQUEST_MISSING_AUTH_TOKEN.to_string())),
        (Some(auth_header), None) => {
            let auth_header = auth_header.to_str().map_err(|_| {
                SignatureError::IncompleteSignature("Authorization header is not valid ASCII".to_string())
            })?;
            let timestamp_str = match signed.headers().get(HDR_X_AMZ_DATE) {
                Some(date) => Some(
                    date.to_str()
                        .map_err(|_| SignatureError::InvalidTimestamp("X-Amz-Date is not valid ASCII".to_string()))?
                        .to_string(),
                ),
                None => None,
            };
            get_auth_parameters_from_auth_header(auth_header, timestamp_str)
        }
        (None, Some(query_alg)) => get_auth_parameters_from_query_parameters(query_alg, query_parameters),
    }
}

/// Create an [`AuthParams`] structure from the `Authorization` header.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn get_auth_parameters_from_auth_header(
    auth_header: &str,
    timestamp_str: Option<String>,
) -> Result<AuthParams, SignatureError> {
    let auth_header = auth_header.trim();

    // Make sure the Authorization header starts with "AWS4-HMAC-SHA256".
    let (algorithm, parameters) = auth_header.split_once(' ').unwrap_or((auth_header, ""));
    if algorithm != AWS4_HMAC_SHA256 {
        return Err(SignatureError::IncompleteSignature(format!("{}'{}'.", MSG_UNSUPPORTED_ALGORITHM, algorithm)));
    }

    // Split the parameters by commas; trim each one; then split into key=value pairs.
    let mut parameter_map = HashMap::new();
    for parameter in parameters.split(',').map(str::trim) {
        if parameter.is_empty() {
            continue;
        }

        let Some((key, value)) = parameter.split_once('=') else {
            return Err(SignatureError::IncompleteSignature(format!(
                "'{}' not a valid key=value pair (missing equal-sign) in Authorization header: '{}'",
                parameter, auth_header
            )));
        };

        // Use the last value for each key; overwriting is ok.
        parameter_map.insert(key, value);
    }

    let mut missing_messages = Vec::new();

    let credential = parameter_map.get(CREDENTIAL).map(|s| s.to_string());
    if credential.is_none() {
        missing_messages.push(MSG_AUTH_HEADER_REQ_CREDENTIAL);
    }

    let signature = parameter_map.get(SIGNATURE).map(|s| s.to_string());
    if signature.is_none() {
        missing_messages.push(MSG_AUTH_HEADER_REQ_SIGNATURE);
    }

    let signed_headers = parameter_map.get(SIGNED_HEADERS).map(|s| split_signed_headers(s));
    if signed_headers.is_none() {
        missing_messages.push(MSG_AUTH_HEADER_REQ_SIGNED_HEADERS);
    }

    if timestamp_str.is_none() {
        missing_messages.push(MSG_AUTH_HEADER_REQ_DATE);
    }

    match (credential, signature, signed_headers, timestamp_str) {
        (Some(credential), Some(signature), Some(signed_headers), Some(timestamp_str)) => Ok(AuthParams {
            credential,
            signature,
            signed_headers,
            timestamp_str,
        }),
        _ => Err(SignatureError::IncompleteSignature(format!(
            "{} Authorization={}",
            missing_messages.join(" "),
            algorithm
        ))),
    }
}

/// Create an [`AuthParams`] structure from the query parameters.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn get_auth_parameters_from_query_parameters(
    query_alg: &str,
    query_parameters: &[(String, String)],
) -> Result<AuthParams, SignatureError> {
    // Make sure the X-Amz-Algorithm query parameter is "AWS4-HMAC-SHA256".
    if query_alg != AWS4_HMAC_SHA256 {
        return Err(SignatureError::MissingAuthenticationToken(MSG_REQUEST_MISSING_AUTH_TOKEN.to_string()));
    }

    // Use the first value for each key.
    let get = |name: &str| query_parameters.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str());
    let mut missing_messages = Vec::new();

    let credential = get(QP_X_AMZ_CREDENTIAL);
    if credential.is_none() {
        missing_messages.push(MSG_QUERY_STRING_MUST_INCLUDE_CREDENTIAL);
    }

    let signature = get(QP_X_AMZ_SIGNATURE);
    if signature.is_none() {
        missing_messages.push(MSG_QUERY_STRING_MUST_INCLUDE_SIGNATURE);
    }

    let signed_headers = get(QP_X_AMZ_SIGNED_HEADERS);
    if signed_headers.is_none() {
        missing_messages.push(MSG_QUERY_STRING_MUST_INCLUDE_SIGNED_HEADERS);
    }

    let timestamp_str = get(QP_X_AMZ_DATE);
    if timestamp_str.is_none() {
        missing_messages.push(MSG_QUERY_STRING_MUST_INCLUDE_DATE);
    }

    if let Some(expires) = get(QP_X_AMZ_EXPIRES) {
        if expires.parse::<u64>().is_err() {
            return Err(SignatureError::MalformedQueryString(format!(
                "X-Amz-Expires should be a number: {}",
                expires
            )));
        }
    }

    match (credential, signature, signed_headers, timestamp_str) {
        (Some(credential), Some(signature), Some(signed_headers), Some(timestamp_str)) => Ok(AuthParams {
            credential: unescape_uri_encoding(credential)?,
            signature: signature.to_string(),
            signed_headers: split_signed_headers(&unescape_uri_encoding(signed_headers)?),
            timestamp_str: unescape_uri_encoding(timestamp_str)?,
        }),
        _ => Err(SignatureError::IncompleteSignature(format!(
            "{} {}",
            missing_messages.join(" "),
            MSG_REEXAMINE_QUERY_STRING_PARAMS
        ))),
    }
}

/// Verify the credential in the request makes sense for the access key, region, service, and
/// request timestamp.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn prevalidate(
    auth_params: &AuthParams,
    credentials: &Credentials,
    region: &str,
    service: &str,
    timestamp: &DateTime<Utc>,
) -> Result<(), SignatureError> {
    // Credential scope must have exactly five elements.
    let credential_parts = auth_params.credential.split('/').collect::<Vec<&str>>();
    if credential_parts.len() != 5 {
        trace!("prevalidate: credential has {} parts, expected 5", credential_parts.len());
        return Err(SignatureError::IncompleteSignature(format!(
            "{} got '{}'",
            MSG_CREDENTIAL_MUST_HAVE_FIVE_PARTS, auth_params.credential
        )));
    }

    let cscope_access_key = credential_parts[0];
    let cscope_date = credential_parts[1];
    let cscope_region = credential_parts[2];
    let cscope_service = credential_parts[3];
    let cscope_term = credential_parts[4];

    let mut cscope_errors = Vec::new();
    if cscope_access_key != credentials.access_key_id() {
        trace!("prevalidate: credential access key '{}' is not the expected key", cscope_access_key);
        cscope_errors.push(format!("Credential access key '{}' is not recognized.", cscope_access_key));
    }

    if cscope_region != region {
        trace!("prevalidate: credential region '{}' does not match expected region '{}'", cscope_region, region);
        cscope_errors.push(format!("Credential should be scoped to a valid region, not '{}'.", cscope_region));
    }

    if cscope_service != service {
        trace!("prevalidate: credential service '{}' does not match expected service '{}'", cscope_service, service);
        cscope_errors.push(format!("Credential should be scoped to correct service: '{}'.", service));
    }

    if cscope_term != AWS4_REQUEST {
        trace!("prevalidate: credential terminator '{}' is not '{}'", cscope_term, AWS4_REQUEST);
        cscope_errors.push(format!(
            "Credential should be scoped with a valid terminator: 'aws4_request', not '{}'.",
            cscope_term
        ));
    }

    let expected_cscope_date = format_date(timestamp);
    if cscope_date != expected_cscope_date {
        trace!("prevalidate: credential date '{}' does not match '{}'", cscope_date, expected_cscope_date);
        cscope_errors.push(format!(
            "Date in Credential scope does not match YYYYMMDD from ISO-8601 version of date from HTTP: '{}' != '{}', from '{}'.",
            cscope_date, expected_cscope_date, auth_params.timestamp_str
        ));
    }

    if !cscope_errors.is_empty() {
        return Err(SignatureError::SignatureDoesNotMatch(Some(cscope_errors.join(" "))));
    }

    Ok(())
}

/// Split a `;`-delimited signed headers list into sorted names.
fn split_signed_headers(signed_headers: &str) -> Vec<String> {
    let mut result: Vec<String> =
        signed_headers.split(';').filter(|s| !s.is_empty()).map(|s| s.to_string()).collect();
    result.sort();
    result
}
