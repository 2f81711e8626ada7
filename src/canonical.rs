//! Canonicalization functionality for signature generation and validation.
//!
//! This includes URI path, query string, and header canonicalization, as well as the ability to
//! assemble an AWS SigV4 canonical request either from caller-supplied parameters (signing) or
//! from an already-signed request (verification).
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! The functions and types are subject to change in minor/patch versions. This is exposed for
//! testing purposes only.

use {
    crate::{
        constants::*,
        crypto::sha256,
        SignatureError,
    },
    http::{
        header::{HeaderMap, HeaderName, HeaderValue},
        method::Method,
        uri::Uri,
    },
    log::trace,
    qualifier_attr::qualifiers,
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// A canonicalized request for AWS SigV4.
///
/// Query parameters and headers are held in explicitly sorted vectors; the sort happens once,
/// when the request is assembled, and never depends on caller insertion order.
#[derive(Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// The HTTP method for the request (e.g., "GET", "POST", etc.)
    request_method: String,

    /// The canonicalized path from the HTTP request. This is guaranteed to be ASCII.
    canonical_path: String,

    /// Percent-encoded query parameters, sorted by name and then by value.
    query_parameters: Vec<(String, String)>,

    /// Lower-cased header names with normalized values, sorted by name. Duplicate names have been
    /// merged into a single comma-separated value.
    headers: Vec<(String, String)>,

    /// The SHA-256 hash of the body, as a lower-case hex string.
    body_sha256: String,
}

impl CanonicalRequest {
    /// Assemble a canonical request from components that have already been canonicalized
    /// individually. The query parameters and headers are sorted here.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn new(
        request_method: String,
        canonical_path: String,
        mut query_parameters: Vec<(String, String)>,
        headers: Vec<(String, String)>,
        body_sha256: String,
    ) -> Self {
        sort_query_parameters(&mut query_parameters);
        let headers = sort_and_merge_headers(headers);

        Self {
            request_method,
            canonical_path,
            query_parameters,
            headers,
            body_sha256,
        }
    }

    /// Rebuild the canonical request of a request that has already been signed.
    ///
    /// The `X-Amz-Signature` query parameter is dropped, since it cannot have participated in its
    /// own computation. Only the headers listed in `signed_headers` are included; if `host` is
    /// listed but absent from `headers`, the authority of `uri` is used.

    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn from_signed_parts(
        method: &str,
        uri: &Uri,
        headers: &HeaderMap,
        signed_headers: &[String],
        body_sha256: String,
    ) -> Result<Self, SignatureError> {
        let request_method = canonicalize_request_method(method)?;
        let canonical_path = canonicalize_uri_path(uri.path())?;
        let query_parameters: Vec<(String, String)> = query_string_to_normalized_pairs(uri.query().unwrap_or(""))?
            .into_iter()
            .filter(|(name, _)| name != QP_X_AMZ_SIGNATURE)
            .collect();

        let mut canonical_headers = Vec::with_capacity(signed_headers.len());
        for name in signed_headers {
            let mut found = false;

            for value in headers.get_all(name.as_str()) {
                let value = std::str::from_utf8(value.as_bytes()).map_err(|_| {
                    SignatureError::MalformedHeader(format!("Header '{}' is not valid UTF-8", name))
                })?;
                canonical_headers.push((name.clone(), normalize_header_value(value)));
                found = true;
            }

            if !found {
                match uri.authority() {
                    Some(authority) if name == HDR_HOST => {
                        canonical_headers.push((name.clone(), authority.as_str().to_string()));
                    }
                    _ => {
                        trace!("from_signed_parts: signed header '{}' is not present", name);
                        return Err(SignatureError::SignatureDoesNotMatch(Some(format!(
                            "Signed header '{}' is not present in the request.",
                            name
                        ))));
                    }
                }
            }
        }

        Ok(Self::new(request_method, canonical_path, query_parameters, canonical_headers, body_sha256))
    }

    /// Retrieve the HTTP request method.
    #[inline(always)]
    pub fn request_method(&self) -> &str {
        &self.request_method
    }

    /// Retrieve the canonicalized URI path from the request.
    #[inline(always)]
    pub fn canonical_path(&self) -> &str {
        &self.canonical_path
    }

    /// Retrieve the sorted, percent-encoded query parameters.
    #[inline(always)]
    pub fn query_parameters(&self) -> &[(String, String)] {
        &self.query_parameters
    }

    /// Retrieve the sorted, normalized headers.
    #[inline(always)]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Retrieve the SHA-256 hash of the request body.
    #[inline(always)]
    pub fn body_sha256(&self) -> &str {
        &self.body_sha256
    }

    /// Get the canonical query string from the request.
    pub fn canonical_query_string(&self) -> String {
        let pairs: Vec<String> =
            self.query_parameters.iter().map(|(name, value)| format!("{}={}", name, value)).collect();
        pairs.join("&")
    }

    /// The semicolon-delimited list of signed header names, in canonical order.
    pub fn signed_headers(&self) -> String {
        let names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        names.join(";")
    }

    /// Get the canonical request string.
    pub fn canonical_request(&self) -> String {
        let mut result = String::with_capacity(256);
        result.push_str(&self.request_method);
        result.push('\n');
        result.push_str(&self.canonical_path);
        result.push('\n');
        result.push_str(&self.canonical_query_string());
        result.push('\n');

        for (name, value) in &self.headers {
            result.push_str(name);
            result.push(':');
            result.push_str(value);
            result.push('\n');
        }

        result.push('\n');
        result.push_str(&self.signed_headers());
        result.push('\n');
        result.push_str(&self.body_sha256);
        result
    }

    /// Get the SHA-256 hash of the canonical request.
    pub fn canonical_request_sha256(&self) -> [u8; SHA256_OUTPUT_LEN] {
        let canonical_request = self.canonical_request();
        trace!("Canonical request:\n{}", canonical_request);
        sha256(canonical_request.as_bytes())
    }
}

impl Debug for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CanonicalRequest")
            .field("request_method", &self.request_method)
            .field("canonical_path", &self.canonical_path)
            .field("query_parameters", &self.query_parameters)
            .field("headers", &self.headers)
            .field("body_sha256", &self.body_sha256)
            .finish()
    }
}

/// Indicates whether we are normalizing a URI path element or a query string element. This is
/// used to create the correct error message and to decide how `+` is interpreted.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum UriElement {
    /// URI element represents a path
    Path,

    /// URI element represents a query string
    Query,
}

/// Validate an HTTP method and return it upper-cased.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_request_method(method: &str) -> Result<String, SignatureError> {
    if method.is_empty() || Method::from_bytes(method.as_bytes()).is_err() {
        return Err(SignatureError::InvalidRequestMethod(format!("Invalid request method: {}", method)));
    }

    Ok(method.to_ascii_uppercase())
}

/// Canonicalize a URI path. An empty path becomes `/`; otherwise the path must be absolute, and
/// each `/`-delimited segment is normalized with [`normalize_uri_path_component`].
///
/// `.` and `..` segments (including their `%2E` spellings) are resolved the same way an HTTP
/// client resolves them before sending, so the signed path is the path on the wire. A path ending
/// in a dot segment keeps its trailing slash. Repeated slashes are left as-is.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_uri_path(uri_path: &str) -> Result<String, SignatureError> {
    // Special case: empty path is converted to '/'; also short-circuit the usual '/' path here.
    if uri_path.is_empty() || uri_path == "/" {
        return Ok("/".to_string());
    }

    // All other paths must be abolute.
    if !uri_path.starts_with('/') {
        return Err(SignatureError::InvalidURIPath(format!("Path is not absolute: {}", uri_path)));
    }

    // Skip the empty element before the leading '/'.
    let mut components: Vec<String> = vec![String::new()];
    let mut ends_in_dot_segment = false;

    for segment in uri_path.split('/').skip(1) {
        let component = normalize_uri_path_component(segment)?;
        ends_in_dot_segment = component == "." || component == "..";

        if component == ".." {
            if components.len() <= 1 {
                return Err(SignatureError::InvalidURIPath(format!(
                    "Relative path entry '..' navigates above root: {}",
                    uri_path
                )));
            }
            components.pop();
        } else if component != "." {
            components.push(component);
        }
    }

    if ends_in_dot_segment || components.len() == 1 {
        components.push(String::new());
    }

    Ok(components.join("/"))
}

/// Percent-encode a raw query parameter name or value. Every byte outside the RFC 3986 unreserved
/// set is encoded, including `%`, `+`, and space.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn encode_query_element(element: &str) -> String {
    let mut result = String::with_capacity(element.len());

    for c in element.bytes() {
        if is_rfc3986_unreserved(c) {
            result.push(c as char);
        } else {
            push_percent_encoded(&mut result, c);
        }
    }

    result
}

/// Indicates whether the specified byte is RFC3986 unreserved -- i.e., can be represented without being
/// percent-encoded, e.g. '?' -> '%3F'.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
fn is_rfc3986_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Normalizes a header value by trimming whitespace and converting multiple spaces to a single space.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_header_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut last_was_space = false;

    for c in value.trim_matches(|c: char| c.is_ascii_whitespace()).chars() {
        if c == ' ' {
            if !last_was_space {
                result.push(' ');
            }
            last_was_space = true;
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result
}

/// Normalize a single element (key or value from key=value) of a query string.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_query_string_element(element: &str) -> Result<String, SignatureError> {
    normalize_uri_element(element, UriElement::Query)
}

/// Normalizes a path element of a URI.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_uri_path_component(path: &str) -> Result<String, SignatureError> {
    normalize_uri_element(path, UriElement::Path)
}

/// Normalize the URI or query string according to RFC 3986.  This performs the following operations:
/// * Alpha, digit, and the symbols `-`, `.`, `_`, and `~` (unreserved characters) are left alone.
/// * Characters outside this range are percent-encoded.
/// * Percent-encoded values are upper-cased (`%2a` becomes `%2A`)
/// * Percent-encoded values in the unreserved space (`%41`-`%5A`, `%61`-`%7A`, `%30`-`%39`, `%2D`, `%2E`, `%5F`,
///   `%7E`) are converted to normal characters.
/// * A `+` is a literal plus (`%2B`) in a path, and a form-encoded space (`%20`) in a query string.
///
/// If a percent encoding is incomplete, an error is returned.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_uri_element(uri_el: &str, uri_el_type: UriElement) -> Result<String, SignatureError> {
    let bytes = uri_el.as_bytes();
    let mut i = 0;
    let mut result = String::with_capacity(bytes.len());

    while i < bytes.len() {
        let c = bytes[i];

        if is_rfc3986_unreserved(c) {
            result.push(c as char);
            i += 1;
        } else if c == b'%' {
            if i + 2 >= bytes.len() {
                // % encoding would go beyond end of string.
                return Err(uri_element_error(uri_el_type, MSG_INCOMPLETE_TRAILING_ESCAPE.to_string()));
            }

            let hex_digits = &bytes[i + 1..i + 3];
            match hex::decode(hex_digits) {
                Ok(value) => {
                    let c = value[0];

                    if is_rfc3986_unreserved(c) {
                        result.push(c as char);
                    } else {
                        // Rewrite the hex-escape so it's always upper-cased.
                        push_percent_encoded(&mut result, c);
                    }
                    i += 3;
                }
                Err(_) => {
                    let message = format!("{}{}", MSG_ILLEGAL_HEX_CHAR, String::from_utf8_lossy(hex_digits));
                    return Err(uri_element_error(uri_el_type, message));
                }
            }
        } else if c == b'+' {
            match uri_el_type {
                UriElement::Path => result.push_str("%2B"),
                // Plus-encoded space. Convert this to %20.
                UriElement::Query => result.push_str("%20"),
            }
            i += 1;
        } else {
            // Character should have been encoded.
            push_percent_encoded(&mut result, c);
            i += 1;
        }
    }

    Ok(result)
}

/// Append `%XX` with upper-case hex digits.
#[inline(always)]
fn push_percent_encoded(result: &mut String, c: u8) {
    let [hi, lo] = u8_to_upper_hex(c);
    result.push('%');
    result.push(hi as char);
    result.push(lo as char);
}

/// Split a raw query string into normalized `(name, value)` pairs, in the order they appear.
/// Parameters without an `=` get an empty value; empty components are skipped.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn query_string_to_normalized_pairs(query_string: &str) -> Result<Vec<(String, String)>, SignatureError> {
    let mut result = Vec::new();

    for component in query_string.split('&') {
        if component.is_empty() {
            continue;
        }

        let (name, value) = component.split_once('=').unwrap_or((component, ""));
        result.push((normalize_query_string_element(name)?, normalize_query_string_element(value)?));
    }

    Ok(result)
}

/// Sort header entries by name and merge repeated names into one comma-separated value. The sort is
/// stable, so merged values keep the order in which they were supplied.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn sort_and_merge_headers(mut headers: Vec<(String, String)>) -> Vec<(String, String)> {
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result: Vec<(String, String)> = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        match result.last_mut() {
            Some((last_name, last_value)) if *last_name == name => {
                last_value.push(',');
                last_value.push_str(&value);
            }
            _ => result.push((name, value)),
        }
    }

    result
}

/// Sort encoded query parameters byte-wise by name, breaking ties by value.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
fn sort_query_parameters(query_parameters: &mut [(String, String)]) {
    query_parameters.sort_unstable();
}

/// Convert a byte to uppercase hex representation.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
const fn u8_to_upper_hex(b: u8) -> [u8; 2] {
    [HEX_DIGITS_UPPER[((b >> 4) & 0xf) as usize], HEX_DIGITS_UPPER[(b & 0xf) as usize]]
}

/// Unescapes a normalized, percent-encoded query element back to its raw value.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn unescape_uri_encoding(s: &str) -> Result<String, SignatureError> {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return Err(SignatureError::MalformedQueryString(MSG_INCOMPLETE_TRAILING_ESCAPE.to_string()));
            }

            let decoded = hex::decode(&bytes[i + 1..i + 3]).map_err(|_| {
                SignatureError::MalformedQueryString(format!(
                    "{}{}",
                    MSG_ILLEGAL_HEX_CHAR,
                    String::from_utf8_lossy(&bytes[i + 1..i + 3])
                ))
            })?;
            result.extend(decoded);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(result)
        .map_err(|_| SignatureError::MalformedQueryString(format!("Query parameter is not valid UTF-8: {}", s)))
}

/// Validate a caller-supplied header, returning the parsed name and value. The returned name is
/// lower-cased.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn validate_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), SignatureError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| SignatureError::MalformedHeader(format!("Invalid header name: {:?}", name)))?;

    if value.contains(['\r', '\n']) {
        return Err(SignatureError::MalformedHeader(format!("Header '{}' value contains a line break", header_name)));
    }

    let header_value = HeaderValue::from_str(value)
        .map_err(|_| SignatureError::MalformedHeader(format!("Invalid value for header '{}'", header_name)))?;

    Ok((header_name, header_value))
}

/// Map a URI element error to the error variant for its location.
fn uri_element_error(uri_el_type: UriElement, message: String) -> SignatureError {
    match uri_el_type {
        UriElement::Path => SignatureError::InvalidURIPath(message),
        UriElement::Query => SignatureError::MalformedQueryString(message),
    }
}
