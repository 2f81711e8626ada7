//! The SigV4 signing key chain.
//!
//! Each link of the chain is a distinct type holding raw HMAC-SHA256 output. Keys are only ever
//! passed to the next step as raw bytes; the only encoded form available is
//! [`KSigningKey::to_hex`], which exists for explicit diagnostics.

use {
    crate::{
        constants::*,
        crypto::hmac_sha256,
        KeyLengthError,
    },
    chrono::NaiveDate,
    std::{
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// A raw AWS secret key (`kSecret`), held with the `AWS4` prefix already applied.
#[derive(Clone, PartialEq, Eq)]
pub struct KSecretKey {
    prefixed_key: Vec<u8>,
}

impl AsRef<[u8]> for KSecretKey {
    /// The secret key as supplied, without the prefix.
    fn as_ref(&self) -> &[u8] {
        &self.prefixed_key[AWS4_PREFIX.len()..]
    }
}

macro_rules! redacted_fmt {
    ($name:ident) => {
        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(stringify!($name))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(stringify!($name))
            }
        }
    };
}

/// Declare one link of the derived key chain: a raw HMAC-SHA256 output whose `Debug` and
/// `Display` forms print only the type name.
macro_rules! derived_key {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            key: [u8; SHA256_OUTPUT_LEN],
        }

        impl AsRef<[u8; SHA256_OUTPUT_LEN]> for $name {
            fn as_ref(&self) -> &[u8; SHA256_OUTPUT_LEN] {
                &self.key
            }
        }

        redacted_fmt!($name);
    };
}

redacted_fmt!(KSecretKey);

derived_key!(
    /// `kDate`: the prefixed secret keyed over the `YYYYMMDD` date.
    KDateKey
);

derived_key!(
    /// `kRegion`: `kDate` keyed over the region name.
    KRegionKey
);

derived_key!(
    /// `kService`: `kRegion` keyed over the service name.
    KServiceKey
);

derived_key!(
    /// `kSigning`: `kService` keyed over `aws4_request`. This is the key that signs the string to
    /// sign.
    KSigningKey
);

impl FromStr for KSecretKey {
    type Err = KeyLengthError;

    /// Wrap a raw AWS secret access key. An empty key is rejected.
    fn from_str(raw: &str) -> Result<Self, KeyLengthError> {
        if raw.is_empty() {
            return Err(KeyLengthError::TooShort);
        }

        let mut prefixed_key = Vec::with_capacity(AWS4_PREFIX.len() + raw.len());
        prefixed_key.extend_from_slice(AWS4_PREFIX);
        prefixed_key.extend_from_slice(raw.as_bytes());
        Ok(Self {
            prefixed_key,
        })
    }
}

impl KSecretKey {
    /// Derive `kDate` for `date`.
    pub fn to_kdate(&self, date: NaiveDate) -> KDateKey {
        let date = date.format(ISO8601_DATE_FORMAT).to_string();
        KDateKey {
            key: hmac_sha256(&self.prefixed_key, date.as_bytes()),
        }
    }

    /// Derive `kRegion` for `date` and `region`.
    pub fn to_kregion(&self, date: NaiveDate, region: &str) -> KRegionKey {
        self.to_kdate(date).to_kregion(region)
    }

    /// Derive `kService` for `date`, `region`, and `service`.
    pub fn to_kservice(&self, date: NaiveDate, region: &str, service: &str) -> KServiceKey {
        self.to_kregion(date, region).to_kservice(service)
    }

    /// Derive the signing key for one credential scope.
    pub fn to_ksigning(&self, date: NaiveDate, region: &str, service: &str) -> KSigningKey {
        self.to_kservice(date, region, service).to_ksigning()
    }
}

impl KDateKey {
    /// Derive `kRegion`.
    pub fn to_kregion(&self, region: &str) -> KRegionKey {
        KRegionKey {
            key: hmac_sha256(&self.key, region.as_bytes()),
        }
    }

    /// Derive `kService` by way of `kRegion`.
    pub fn to_kservice(&self, region: &str, service: &str) -> KServiceKey {
        self.to_kregion(region).to_kservice(service)
    }

    /// Derive the signing key by way of `kRegion` and `kService`.
    pub fn to_ksigning(&self, region: &str, service: &str) -> KSigningKey {
        self.to_kservice(region, service).to_ksigning()
    }
}

impl KRegionKey {
    /// Derive `kService`.
    pub fn to_kservice(&self, service: &str) -> KServiceKey {
        KServiceKey {
            key: hmac_sha256(&self.key, service.as_bytes()),
        }
    }

    /// Derive the signing key by way of `kService`.
    pub fn to_ksigning(&self, service: &str) -> KSigningKey {
        self.to_kservice(service).to_ksigning()
    }
}

impl KServiceKey {
    /// Derive the signing key.
    pub fn to_ksigning(&self) -> KSigningKey {
        KSigningKey {
            key: hmac_sha256(&self.key, AWS4_REQUEST.as_bytes()),
        }
    }
}

impl KSigningKey {
    /// Sign the string to sign, returning the lower-case hex signature.
    pub fn sign(&self, string_to_sign: &[u8]) -> String {
        hex::encode(hmac_sha256(self.key.as_slice(), string_to_sign))
    }

    /// Hex encoding of the signing key, for diagnostics only. This key can sign any request for its
    /// date, region, and service; do not log it in production.
    pub fn to_hex(&self) -> String {
        hex::encode(self.key)
    }
}
