use {
    crate::{canonical::canonicalize_request_method, SignatureError},
    bytes::Bytes,
    chrono::{DateTime, Utc},
    derive_builder::Builder,
    http::uri::Authority,
    std::{str::FromStr, time::Duration},
};

/// Everything the signer needs to know about one API call.
///
/// RequestParameters are immutable. Use [RequestParametersBuilder] to construct one; `region`,
/// `service`, `host`, and `timestamp` are required. Query parameters and headers are kept in the
/// order they were added; they are sorted only when the canonical request is built.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(error = "SignatureError", validate = "Self::validate"), derive(Debug))]
pub struct RequestParameters {
    /// The HTTP method. Defaults to `GET`.
    #[builder(setter(into), default = "\"GET\".to_string()")]
    method: String,

    /// The URI path, unencoded or already percent-encoded. Defaults to `/`.
    #[builder(setter(into), default = "\"/\".to_string()")]
    path: String,

    /// Raw (unencoded) query parameters.
    #[builder(setter(custom), default)]
    query: Vec<(String, String)>,

    /// Additional headers to send and sign.
    #[builder(setter(custom), default)]
    headers: Vec<(String, String)>,

    /// The request body. Defaults to empty.
    #[builder(setter(into), default)]
    body: Bytes,

    /// The region used in the credential scope, e.g. `us-east-1`.
    #[builder(setter(into))]
    region: String,

    /// The service used in the credential scope, e.g. `ec2`.
    #[builder(setter(into))]
    service: String,

    /// The endpoint host (optionally with a port), e.g. `ec2.amazonaws.com`.
    #[builder(setter(into))]
    host: String,

    /// The request timestamp. The caller supplies this; the signer never reads the clock.
    timestamp: DateTime<Utc>,

    /// The URL scheme. Defaults to `https`.
    #[builder(setter(into), default = "\"https\".to_string()")]
    scheme: String,
}

impl RequestParameters {
    /// Create a [RequestParametersBuilder] to construct a [RequestParameters].
    pub fn builder() -> RequestParametersBuilder {
        RequestParametersBuilder::default()
    }

    /// The HTTP method.
    #[inline(always)]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The URI path.
    #[inline(always)]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query parameters, in insertion order.
    #[inline(always)]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// The caller-supplied headers, in insertion order.
    #[inline(always)]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The request body.
    #[inline(always)]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The credential scope region.
    #[inline(always)]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The credential scope service.
    #[inline(always)]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The endpoint host.
    #[inline(always)]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The request timestamp.
    #[inline(always)]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The URL scheme.
    #[inline(always)]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl RequestParametersBuilder {
    /// Add a query parameter. Names are case-sensitive; repeated names are allowed.
    pub fn query_param<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        self.query.get_or_insert_with(Vec::new).push((name.into(), value.into()));
        self
    }

    /// Add a header. Names are case-insensitive; a repeated name is signed as one comma-separated
    /// value.
    pub fn header<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        self.headers.get_or_insert_with(Vec::new).push((name.into(), value.into()));
        self
    }

    fn validate(&self) -> Result<(), SignatureError> {
        if let Some(method) = &self.method {
            canonicalize_request_method(method)?;
        }

        if let Some(region) = &self.region {
            validate_scope_element("region", region)?;
        }

        if let Some(service) = &self.service {
            validate_scope_element("service", service)?;
        }

        if let Some(host) = &self.host {
            // An authority may carry userinfo; a Host header may not.
            if host.is_empty() || host.contains('@') || Authority::from_str(host).is_err() {
                return Err(SignatureError::MalformedHeader(format!("Invalid host: {:?}", host)));
            }
        }

        Ok(())
    }
}

/// A region or service must be usable as one element of `date/region/service/aws4_request`.
fn validate_scope_element(kind: &str, value: &str) -> Result<(), SignatureError> {
    if value.is_empty() || value.contains('/') || value.chars().any(char::is_whitespace) {
        return Err(SignatureError::InvalidCredentialScope(format!(
            "Credential scope {} must be non-empty and contain no '/' or whitespace: {:?}",
            kind, value
        )));
    }

    Ok(())
}

/// Where the signature and its metadata are carried.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SignatureLocation {
    /// `X-Amz-Date` (and `X-Amz-Security-Token`, if any) headers are signed; the signature is sent in
    /// an `Authorization` header.
    #[default]
    Headers,

    /// The signing parameters are embedded in the query string (a presigned URL) and only `host`
    /// is signed. The URL is valid for `expires_in`, which must be between one second and seven
    /// days.
    QueryString {
        /// How long the presigned URL remains valid.
        expires_in: Duration,
    },
}

/// Options that can be used to configure the signer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SignatureOptions {
    /// Where to place the signature.
    pub location: SignatureLocation,

    /// Also send (and sign) an `x-amz-content-sha256` header carrying the body hash. Only used with
    /// [`SignatureLocation::Headers`].
    pub content_sha256_header: bool,
}

impl SignatureOptions {
    /// Header-mode signing without `x-amz-content-sha256`.
    pub const HEADERS: Self = Self {
        location: SignatureLocation::Headers,
        content_sha256_header: false,
    };

    /// Create a `SignatureOptions` for a presigned URL valid for `expires_in`.
    pub const fn query_string(expires_in: Duration) -> Self {
        Self {
            location: SignatureLocation::QueryString {
                expires_in,
            },
            content_sha256_header: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{RequestParameters, SignatureError, SignatureLocation, SignatureOptions},
        chrono::{DateTime, TimeZone, Utc},
        std::time::Duration,
    };

    macro_rules! expect_err {
        ($test:expr, $expected:ident) => {
            match $test {
                Ok(ref v) => panic!("Expected Err({}); got Ok({:?})", stringify!($expected), v),
                Err(ref e) => match e {
                    SignatureError::$expected(_) => e.to_string(),
                    _ => panic!("Expected {}; got {:#?}: {}", stringify!($expected), &e, &e),
                },
            }
        };
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    #[test_log::test]
    fn test_defaults() {
        let params = RequestParameters::builder()
            .region("us-east-1")
            .service("ec2")
            .host("ec2.amazonaws.com")
            .timestamp(timestamp())
            .build()
            .unwrap();

        assert_eq!(params.method(), "GET");
        assert_eq!(params.path(), "/");
        assert_eq!(params.scheme(), "https");
        assert!(params.query().is_empty());
        assert!(params.headers().is_empty());
        assert!(params.body().is_empty());
        assert_eq!(params.timestamp(), timestamp());
    }

    #[test_log::test]
    fn test_insertion_order_is_kept() {
        let params = RequestParameters::builder()
            .region("us-east-1")
            .service("ec2")
            .host("ec2.amazonaws.com")
            .timestamp(timestamp())
            .query_param("Version", "2016-11-15")
            .query_param("Action", "DescribeNetworkAcls")
            .header("X-Custom", "1")
            .body("payload")
            .build()
            .unwrap();

        assert_eq!(params.query()[0].0, "Version");
        assert_eq!(params.query()[1].0, "Action");
        assert_eq!(params.headers()[0], ("X-Custom".to_string(), "1".to_string()));
        assert_eq!(params.body().as_ref(), b"payload");
    }

    #[test_log::test]
    fn test_missing_parameters() {
        let e = expect_err!(
            RequestParameters::builder().service("ec2").host("ec2.amazonaws.com").timestamp(timestamp()).build(),
            MissingParameter
        );
        assert_eq!(e, "Request parameter 'region' must be set");

        let e = expect_err!(
            RequestParameters::builder().region("us-east-1").service("ec2").host("ec2.amazonaws.com").build(),
            MissingParameter
        );
        assert_eq!(e, "Request parameter 'timestamp' must be set");
    }

    #[test_log::test]
    fn test_invalid_parameters() {
        let mut builder = RequestParameters::builder();
        builder.region("us-east-1").service("ec2").host("ec2.amazonaws.com").timestamp(timestamp());

        expect_err!(builder.clone().region("").build(), InvalidCredentialScope);
        expect_err!(builder.clone().region("us-east-1/x").build(), InvalidCredentialScope);
        expect_err!(builder.clone().service("ec 2").build(), InvalidCredentialScope);
        expect_err!(builder.clone().host("").build(), MalformedHeader);
        expect_err!(builder.clone().host("bad host").build(), MalformedHeader);
        expect_err!(builder.clone().host("user@ec2.amazonaws.com").build(), MalformedHeader);
        expect_err!(builder.clone().host("user:pass@ec2.amazonaws.com:443").build(), MalformedHeader);
        assert!(builder.clone().host("ec2.amazonaws.com:8443").build().is_ok());
        expect_err!(builder.clone().method("").build(), InvalidRequestMethod);
        assert!(builder.clone().method("POST").build().is_ok());
        assert!(builder.clone().host("localhost:8080").build().is_ok());
    }

    #[test]
    fn test_signature_options() {
        assert_eq!(SignatureOptions::default(), SignatureOptions::HEADERS);
        let options = SignatureOptions::query_string(Duration::from_secs(300));
        assert_eq!(
            options.location,
            SignatureLocation::QueryString {
                expires_in: Duration::from_secs(300)
            }
        );
        assert!(!options.content_sha256_header);
    }
}
