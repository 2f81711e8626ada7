//! Single-shot, synchronous execution of a signed request.
//!
//! The [`Dispatcher`] performs exactly one HTTP exchange per call: no retries and no backoff. The
//! transport is a trait so the exchange can be replaced in tests; [`ReqwestTransport`] is the
//! production implementation.

use {
    crate::{constants::DEFAULT_TIMEOUT_SECS, ConfigError, DispatchError, SignedRequest},
    bytes::Bytes,
    http::{header::HeaderMap, Request, StatusCode},
    log::{debug, warn},
    reqwest::blocking::{Client, Response},
    std::{borrow::Cow, fmt::Debug, time::Duration},
};

/// An open HTTP exchange whose status and headers have been received.
///
/// Dropping the connection releases it, whether or not the body was read.
pub trait HttpConnection {
    /// The response status.
    fn status(&self) -> StatusCode;

    /// The response headers.
    fn headers(&self) -> &HeaderMap;

    /// Read the rest of the body and release the connection.
    fn into_body(self) -> Result<Bytes, DispatchError>;
}

/// Opens one HTTP exchange for a request, bounded by a timeout.
pub trait HttpTransport: Debug {
    /// The connection type produced by this transport.
    type Connection: HttpConnection;

    /// Send `request` and wait for the response head. The timeout covers the whole exchange,
    /// including reading the body.
    fn open(&self, request: Request<Bytes>, timeout: Duration) -> Result<Self::Connection, DispatchError>;
}

/// [`HttpTransport`] backed by a blocking [`reqwest`] client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new ReqwestTransport with a reqwest blocking client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
        }
    }
}

/// A response being received by [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestConnection {
    response: Response,
}

impl HttpConnection for ReqwestConnection {
    fn status(&self) -> StatusCode {
        self.response.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    fn into_body(self) -> Result<Bytes, DispatchError> {
        self.response.bytes().map_err(from_reqwest_error)
    }
}

impl HttpTransport for ReqwestTransport {
    type Connection = ReqwestConnection;

    fn open(&self, request: Request<Bytes>, timeout: Duration) -> Result<ReqwestConnection, DispatchError> {
        let (parts, body) = request.into_parts();
        let url = parts.uri.to_string();

        let response = self
            .client
            .request(parts.method, url.as_str())
            .headers(parts.headers)
            .body(body.to_vec())
            .timeout(timeout)
            .send()
            .map_err(from_reqwest_error)?;

        Ok(ReqwestConnection {
            response,
        })
    }
}

fn from_reqwest_error(e: reqwest::Error) -> DispatchError {
    if e.is_timeout() {
        DispatchError::Timeout(e.to_string())
    } else if e.is_builder() {
        DispatchError::InvalidRequest(e.to_string())
    } else {
        DispatchError::Transport(Box::new(e))
    }
}

/// A response received from the service, whatever its status code.
#[derive(Clone, Debug)]
pub struct DispatchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl DispatchResponse {
    /// Create a new response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The response status.
    #[inline(always)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Indicates whether the status is 2xx.
    #[inline(always)]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The response headers.
    #[inline(always)]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body.
    #[inline(always)]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The response body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Consume the response, keeping only the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Executes signed requests, one exchange per call.
#[derive(Clone, Debug)]
pub struct Dispatcher<T: HttpTransport = ReqwestTransport> {
    transport: T,
    timeout: Duration,
}

impl Default for Dispatcher<ReqwestTransport> {
    fn default() -> Self {
        Self::with_transport(ReqwestTransport::default())
    }
}

impl Dispatcher<ReqwestTransport> {
    /// Create a dispatcher using a default reqwest client and a 10 second timeout.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: HttpTransport> Dispatcher<T> {
    /// Create a dispatcher over the given transport with a 10 second timeout.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Replace the timeout. A zero timeout is rejected.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(self.with_validated_timeout(validate_timeout(timeout)?))
    }

    /// Replace the timeout with one that has already passed [validate_timeout].
    pub(crate) fn with_validated_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The timeout applied to each exchange.
    #[inline(always)]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The underlying transport.
    #[inline(always)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a signed request once.
    ///
    /// A non-2xx status is not an error: the response, including its body, is returned and a
    /// warning is logged. The connection is released before this returns on every path.
    pub fn execute(&self, request: &SignedRequest) -> Result<DispatchResponse, DispatchError> {
        let http_request = request.to_http_request().map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;
        let method = http_request.method().clone();
        let path = http_request.uri().path().to_string();
        debug!("dispatch: {} {} (timeout {:?})", method, path, self.timeout);

        let connection = self.transport.open(http_request, self.timeout)?;
        let status = connection.status();
        let headers = connection.headers().clone();
        let body = connection.into_body()?;

        if status.is_success() {
            debug!("dispatch: {} {} returned {} ({} bytes)", method, path, status, body.len());
        } else {
            warn!("dispatch: {} {} returned {}; headers: {:?}", method, path, status, headers);
        }

        Ok(DispatchResponse::new(status, headers, body))
    }

    /// Execute a signed request once and return its body.
    ///
    /// Transport failures and timeouts are logged and yield an empty body. A non-2xx response
    /// still yields whatever body the service sent.
    pub fn fetch(&self, request: &SignedRequest) -> Bytes {
        match self.execute(request) {
            Ok(response) => response.into_body(),
            Err(e) if e.is_timeout() => {
                warn!("dispatch: request timed out after {:?}: {}", self.timeout, e);
                Bytes::new()
            }
            Err(e) => {
                warn!("dispatch: request failed: {}", e);
                Bytes::new()
            }
        }
    }
}

/// A dispatch timeout must leave the exchange some time to run.
pub(crate) fn validate_timeout(timeout: Duration) -> Result<Duration, ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::Invalid("Timeout must be greater than zero".to_string()));
    }

    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use {
        super::{DispatchResponse, Dispatcher},
        crate::ConfigError,
        bytes::Bytes,
        http::{header::HeaderMap, StatusCode},
        std::time::Duration,
    };

    #[test_log::test]
    fn test_dispatch_response() {
        let response =
            DispatchResponse::new(StatusCode::FORBIDDEN, HeaderMap::new(), Bytes::from_static(b"<Error/>"));
        assert!(!response.is_success());
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.body_text(), "<Error/>");
        assert_eq!(response.into_body(), Bytes::from_static(b"<Error/>"));

        let response = DispatchResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(&[0xff, b'a']));
        assert!(response.is_success());
        assert_eq!(response.body_text(), "\u{fffd}a");
    }

    #[test_log::test]
    fn test_default_timeout() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.timeout(), Duration::from_secs(10));
        assert_eq!(
            dispatcher.with_timeout(Duration::from_millis(250)).unwrap().timeout(),
            Duration::from_millis(250)
        );
    }

    #[test_log::test]
    fn test_zero_timeout_rejected() {
        let e = Dispatcher::new().with_timeout(Duration::ZERO).unwrap_err();
        assert!(matches!(e, ConfigError::Invalid(_)), "{:?}", e);
        assert_eq!(e.to_string(), "Timeout must be greater than zero");
        assert!(Dispatcher::new().with_timeout(Duration::from_nanos(1)).is_ok());
    }
}
