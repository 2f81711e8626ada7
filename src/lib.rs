//! AWS API request signing using [AWS Signature Version 4](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_aws-signing.html),
//! with a single-shot synchronous dispatcher.
//!
//! Signing is a pure function of [`Credentials`], [`RequestParameters`], and
//! [`SignatureOptions`]: it performs no I/O and does not read the clock. The signature can be
//! carried in an `Authorization` header or embedded in the query string (a presigned URL).
//!
//! ```no_run
//! use {
//!     chrono::{DateTime, Utc},
//!     scratchstack_aws_signer::{sigv4_sign_request, Credentials, Dispatcher, RequestParameters, SignatureOptions},
//!     std::time::SystemTime,
//! };
//!
//! let credentials = Credentials::from_env().expect("AWS credentials must be set");
//! let params = RequestParameters::builder()
//!     .region("us-east-1")
//!     .service("ec2")
//!     .host("ec2.us-east-1.amazonaws.com")
//!     .timestamp(DateTime::<Utc>::from(SystemTime::now()))
//!     .query_param("Action", "DescribeNetworkAcls")
//!     .query_param("Version", "2016-11-15")
//!     .build()
//!     .unwrap();
//!
//! let signed = sigv4_sign_request(&credentials, &params, &SignatureOptions::default()).unwrap();
//! let body = Dispatcher::new().fetch(signed.signed_request());
//! println!("{}", String::from_utf8_lossy(&body));
//! ```

#![warn(clippy::all)]
#![allow(clippy::manual_range_contains)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

#[cfg(any(doc, feature = "unstable"))]
pub mod canonical;
#[cfg(not(any(doc, feature = "unstable")))]
mod canonical;

mod chronoutil;
mod config;
mod constants;
mod credentials;
mod crypto;
mod dispatch;
mod error;
mod request;
mod signature;
mod signing_key;
mod verify;

pub use {
    canonical::CanonicalRequest,
    chronoutil::ParseISO8601Basic,
    config::ClientConfig,
    credentials::Credentials,
    dispatch::{
        DispatchResponse, Dispatcher, HttpConnection, HttpTransport, ReqwestConnection, ReqwestTransport,
    },
    error::{ConfigError, DispatchError, KeyLengthError, SignatureError},
    request::{RequestParameters, RequestParametersBuilder, SignatureLocation, SignatureOptions},
    signature::{sigv4_sign_request, SignedRequest, SigningOutput},
    signing_key::{KDateKey, KRegionKey, KServiceKey, KSecretKey, KSigningKey},
    verify::sigv4_verify_signed_request,
};
