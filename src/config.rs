use {
    crate::{
        constants::*, credentials::non_empty_var, dispatch::validate_timeout, ConfigError, Dispatcher,
        RequestParameters, RequestParametersBuilder,
    },
    log::debug,
    std::time::Duration,
};

/// Endpoint settings shared by every request to one service: region, service, host, and the
/// dispatcher timeout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    region: String,
    service: String,
    host: String,
    timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default 10 second timeout.
    pub fn new<R: Into<String>, S: Into<String>, H: Into<String>>(region: R, service: S, host: H) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
            host: host.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load the configuration from the environment.
    ///
    /// This looks for the following environment variables:
    /// - `AWS_REGION`, falling back to `AWS_DEFAULT_REGION`: the region
    /// - `SIGV4_SERVICE`: the service name used in the credential scope
    /// - `SIGV4_HOST`: the endpoint host
    /// - `SIGV4_TIMEOUT_SECS`: the dispatcher timeout in seconds (optional, default 10)
    ///
    /// A missing variable is [ConfigError::Missing]; a timeout that is not a positive whole number
    /// of seconds is [ConfigError::Invalid].
    pub fn from_env() -> Result<Self, ConfigError> {
        let region = non_empty_var(ENV_AWS_REGION).or_else(|| non_empty_var(ENV_AWS_DEFAULT_REGION)).ok_or_else(|| {
            ConfigError::Missing(format!(
                "Environment variable {} or {} must be set",
                ENV_AWS_REGION, ENV_AWS_DEFAULT_REGION
            ))
        })?;
        let service = required_var(ENV_SIGV4_SERVICE)?;
        let host = required_var(ENV_SIGV4_HOST)?;

        let timeout = match non_empty_var(ENV_SIGV4_TIMEOUT_SECS) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(value) => {
                let invalid = || {
                    ConfigError::Invalid(format!(
                        "Environment variable {} must be a positive number of seconds, not '{}'",
                        ENV_SIGV4_TIMEOUT_SECS, value
                    ))
                };
                let secs = value.parse::<u64>().map_err(|_| invalid())?;
                validate_timeout(Duration::from_secs(secs)).map_err(|_| invalid())?
            }
        };

        debug!("loaded client config from the environment: region={} service={} host={}", region, service, host);
        Ok(Self {
            region,
            service,
            host,
            timeout,
        })
    }

    /// Replace the dispatcher timeout. A zero timeout is rejected, as it is by
    /// [Dispatcher::with_timeout].
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.timeout = validate_timeout(timeout)?;
        Ok(self)
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

    /// The dispatcher timeout.
    #[inline(always)]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A [RequestParametersBuilder] with the region, service, and host filled in. The caller adds
    /// the timestamp and the per-call parameters.
    pub fn request_builder(&self) -> RequestParametersBuilder {
        let mut builder = RequestParameters::builder();
        builder.region(self.region.as_str()).service(self.service.as_str()).host(self.host.as_str());
        builder
    }

    /// A reqwest-backed [Dispatcher] using this configuration's timeout.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new().with_validated_timeout(self.timeout)
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    non_empty_var(name).ok_or_else(|| ConfigError::Missing(format!("Environment variable {} must be set", name)))
}
