use {
    crate::{
        canonical::{
            canonicalize_request_method, canonicalize_uri_path, encode_query_element, normalize_header_value,
            validate_header, CanonicalRequest,
        },
        chronoutil::{format_date, format_iso8601},
        constants::*,
        crypto::{sha256, sha256_hex},
        Credentials, KSigningKey, RequestParameters, SignatureError, SignatureLocation, SignatureOptions,
    },
    bytes::Bytes,
    chrono::{DateTime, Utc},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, HOST},
        request::Request,
    },
    log::{debug, trace},
    qualifier_attr::qualifiers,
};

/// Query parameters the signer sets itself; callers may not supply them.
const RESERVED_QUERY_PARAMETERS: [&str; 7] = [
    QP_X_AMZ_ALGORITHM,
    QP_X_AMZ_CREDENTIAL,
    QP_X_AMZ_DATE,
    QP_X_AMZ_EXPIRES,
    QP_X_AMZ_SECURITY_TOKEN,
    QP_X_AMZ_SIGNATURE,
    QP_X_AMZ_SIGNED_HEADERS,
];

/// Headers the signer sets itself; callers may not supply them.
const RESERVED_HEADERS: [&str; 5] =
    [HDR_AUTHORIZATION, HDR_HOST, HDR_X_AMZ_CONTENT_SHA256, HDR_X_AMZ_DATE, HDR_X_AMZ_SECURITY_TOKEN];

/// A request ready to be executed: the final URL, the headers to send, and the body.
///
/// Rebuilding the canonical request from this value (dropping the signature itself) reproduces the
/// canonical request it was signed from; see
/// [`sigv4_verify_signed_request`][crate::sigv4_verify_signed_request].
#[derive(Clone, Debug)]
pub struct SignedRequest {
    method: String,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl SignedRequest {
    /// Create a signed request from its parts. This is normally produced by
    /// [`sigv4_sign_request`]; constructing one directly is useful for verification.
    pub fn new(method: String, url: String, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// The HTTP method.
    #[inline(always)]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The final URL, including the canonical query string.
    #[inline(always)]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The headers to send.
    #[inline(always)]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the headers, e.g. to add unsigned transport headers.
    #[inline(always)]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The request body.
    #[inline(always)]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Convert this into an [`http::Request`].
    pub fn to_http_request(&self) -> Result<Request<Bytes>, http::Error> {
        let mut builder = Request::builder().method(self.method.as_str()).uri(self.url.as_str());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers.clone());
        }
        builder.body(self.body.clone())
    }
}

/// Every artifact of one signing operation.
///
/// The canonical request, string to sign, and signature are safe to log. The signing key is
/// available for diagnostics but its `Debug` output is redacted; call [`KSigningKey::to_hex`]
/// explicitly to display it.
#[derive(Clone, Debug)]
pub struct SigningOutput {
    canonical_request: String,
    string_to_sign: String,
    credential_scope: String,
    signing_key: KSigningKey,
    signature: String,
    signed_request: SignedRequest,
}

impl SigningOutput {
    /// The canonical request that was hashed.
    #[inline(always)]
    pub fn canonical_request(&self) -> &str {
        &self.canonical_request
    }

    /// The string that was signed.
    #[inline(always)]
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// The credential scope: `date/region/service/aws4_request`.
    #[inline(always)]
    pub fn credential_scope(&self) -> &str {
        &self.credential_scope
    }

    /// The derived signing key.
    #[inline(always)]
    pub fn signing_key(&self) -> &KSigningKey {
        &self.signing_key
    }

    /// The lower-case hex signature.
    #[inline(always)]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The request to execute.
    #[inline(always)]
    pub fn signed_request(&self) -> &SignedRequest {
        &self.signed_request
    }

    /// Consume this output, keeping only the request to execute.
    pub fn into_signed_request(self) -> SignedRequest {
        self.signed_request
    }
}

/// Return the credential scope for a timestamp, region, and service:
/// `YYYYMMDD/region/service/aws4_request`.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn credential_scope(timestamp: &DateTime<Utc>, region: &str, service: &str) -> String {
    format!("{}/{}/{}/{}", format_date(timestamp), region, service, AWS4_REQUEST)
}

/// Return the string to sign: the algorithm, the timestamp, the credential scope, and the hex
/// SHA-256 of the canonical request, one per line.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn string_to_sign(timestamp: &DateTime<Utc>, credential_scope: &str, canonical_request_sha256: &str) -> String {
    let mut result = String::with_capacity(
        AWS4_HMAC_SHA256.len() + 1 + ISO8601_UTC_LENGTH + 1 + credential_scope.len() + 1 + SHA256_HEX_LENGTH,
    );

    result.push_str(AWS4_HMAC_SHA256);
    result.push('\n');
    result.push_str(&format_iso8601(timestamp));
    result.push('\n');
    result.push_str(credential_scope);
    result.push('\n');
    result.push_str(canonical_request_sha256);
    result
}

/// Sign a request with AWS SigV4.
///
/// This is a pure function of its inputs: it performs no I/O and does not read the clock. The
/// returned [`SigningOutput`] carries the intermediate artifacts along with the [`SignedRequest`].
///
/// # Errors
/// Malformed input aborts signing; no partially-signed request is returned.
/// * [`SignatureError::InvalidURIPath`]: the path is not absolute or has a bad `%` escape.
/// * [`SignatureError::MalformedQueryString`]: a query parameter uses a name reserved for the
///   signature (e.g. `X-Amz-Signature`).
/// * [`SignatureError::MalformedHeader`]: a header name or value is not valid HTTP, or the header
///   is set by the signer (e.g. `Authorization`, `Host`).
/// * [`SignatureError::InvalidExpiry`]: a presigned URL expiry outside one second to seven days.
/// * [`SignatureError::InvalidRequestMethod`]: the method is not a valid HTTP token.
pub fn sigv4_sign_request(
    credentials: &Credentials,
    params: &RequestParameters,
    options: &SignatureOptions,
) -> Result<SigningOutput, SignatureError> {
    let timestamp = params.timestamp();
    let amz_date = format_iso8601(&timestamp);
    let scope = credential_scope(&timestamp, params.region(), params.service());

    let request_method = canonicalize_request_method(params.method())?;
    let canonical_path = canonicalize_uri_path(params.path())?;

    let mut query_parameters = Vec::with_capacity(params.query().len() + RESERVED_QUERY_PARAMETERS.len());
    for (name, value) in params.query() {
        if RESERVED_QUERY_PARAMETERS.contains(&name.as_str()) {
            return Err(SignatureError::MalformedQueryString(format!(
                "Query parameter '{}' is set by the signer",
                name
            )));
        }
        query_parameters.push((encode_query_element(name), encode_query_element(value)));
    }

    let mut wire_headers = HeaderMap::with_capacity(params.headers().len() + RESERVED_HEADERS.len());
    let mut caller_headers = Vec::with_capacity(params.headers().len());
    for (name, value) in params.headers() {
        let (header_name, header_value) = validate_header(name, value)?;
        if RESERVED_HEADERS.contains(&header_name.as_str()) {
            return Err(SignatureError::MalformedHeader(format!("Header '{}' is set by the signer", header_name)));
        }

        caller_headers.push((header_name.as_str().to_string(), normalize_header_value(value)));
        wire_headers.append(header_name, header_value);
    }

    let host = header_value(params.host())?;
    wire_headers.insert(HOST, host);

    let body_sha256 = sha256_hex(params.body());
    let host_header = (HDR_HOST.to_string(), params.host().to_string());

    let canonical_headers = match options.location {
        SignatureLocation::Headers => {
            let mut signed = caller_headers;
            signed.push(host_header);
            signed.push((HDR_X_AMZ_DATE.to_string(), amz_date.clone()));
            wire_headers.insert(HeaderName::from_static(HDR_X_AMZ_DATE), header_value(&amz_date)?);

            if let Some(token) = credentials.session_token() {
                signed.push((HDR_X_AMZ_SECURITY_TOKEN.to_string(), normalize_header_value(token)));
                wire_headers.insert(HeaderName::from_static(HDR_X_AMZ_SECURITY_TOKEN), header_value(token)?);
            }

            if options.content_sha256_header {
                signed.push((HDR_X_AMZ_CONTENT_SHA256.to_string(), body_sha256.clone()));
                wire_headers.insert(HeaderName::from_static(HDR_X_AMZ_CONTENT_SHA256), header_value(&body_sha256)?);
            }

            signed
        }

        SignatureLocation::QueryString {
            expires_in,
        } => {
            let expires_secs = expires_in.as_secs();
            if expires_secs == 0 || expires_secs > MAX_EXPIRES_SECS || expires_in.subsec_nanos() != 0 {
                return Err(SignatureError::InvalidExpiry(format!(
                    "X-Amz-Expires must be a whole number of seconds between 1 and {}; got {:?}",
                    MAX_EXPIRES_SECS, expires_in
                )));
            }

            let credential = format!("{}/{}", credentials.access_key_id(), scope);
            query_parameters.push((QP_X_AMZ_ALGORITHM.to_string(), AWS4_HMAC_SHA256.to_string()));
            query_parameters.push((QP_X_AMZ_CREDENTIAL.to_string(), encode_query_element(&credential)));
            query_parameters.push((QP_X_AMZ_DATE.to_string(), amz_date.clone()));
            query_parameters.push((QP_X_AMZ_EXPIRES.to_string(), expires_secs.to_string()));
            if let Some(token) = credentials.session_token() {
                query_parameters.push((QP_X_AMZ_SECURITY_TOKEN.to_string(), encode_query_element(token)));
            }
            query_parameters.push((QP_X_AMZ_SIGNED_HEADERS.to_string(), HDR_HOST.to_string()));

            vec![host_header]
        }
    };

    let canonical = CanonicalRequest::new(request_method, canonical_path, query_parameters, canonical_headers, body_sha256);
    let canonical_request = canonical.canonical_request();
    trace!("Canonical request:\n{}", canonical_request);

    let hashed_canonical_request = hex::encode(sha256(canonical_request.as_bytes()));
    let string_to_sign = string_to_sign(&timestamp, &scope, &hashed_canonical_request);
    trace!("String to sign:\n{}", string_to_sign);

    let signing_key = credentials.secret_key().to_ksigning(timestamp.date_naive(), params.region(), params.service());
    let signature = signing_key.sign(string_to_sign.as_bytes());
    let signed_headers = canonical.signed_headers();
    debug!("sigv4_sign_request: scope={} signed_headers={} signature={}", scope, signed_headers, signature);

    let mut query_string = canonical.canonical_query_string();
    match options.location {
        SignatureLocation::Headers => {
            let authorization = format!(
                "{} {}={}/{},{}={},{}={}",
                AWS4_HMAC_SHA256,
                CREDENTIAL,
                credentials.access_key_id(),
                scope,
                SIGNED_HEADERS,
                signed_headers,
                SIGNATURE,
                signature
            );
            wire_headers.insert(AUTHORIZATION, header_value(&authorization)?);
        }

        SignatureLocation::QueryString {
            ..
        } => {
            // The signature is appended after canonicalization; it never signs itself.
            query_string.push('&');
            query_string.push_str(QP_X_AMZ_SIGNATURE);
            query_string.push('=');
            query_string.push_str(&signature);
        }
    }

    let mut url = format!("{}://{}{}", params.scheme(), params.host(), canonical.canonical_path());
    if !query_string.is_empty() {
        url.push('?');
        url.push_str(&query_string);
    }

    let signed_request = SignedRequest::new(canonical.request_method().to_string(), url, wire_headers, params.body().clone());

    Ok(SigningOutput {
        canonical_request,
        string_to_sign,
        credential_scope: scope,
        signing_key,
        signature,
        signed_request,
    })
}

/// Convert a signer-generated value into a header value.
fn header_value(value: &str) -> Result<HeaderValue, SignatureError> {
    HeaderValue::from_str(value).map_err(|_| SignatureError::MalformedHeader(format!("Invalid header value: {:?}", value)))
}
