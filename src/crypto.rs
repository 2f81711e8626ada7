use {
    crate::constants::{SHA256_EMPTY, SHA256_OUTPUT_LEN},
    hmac::{Hmac, Mac},
    sha2::{Digest, Sha256},
};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `value` keyed with the raw bytes of `key`.
#[inline]
pub(crate) fn hmac_sha256(key: &[u8], value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    // HMAC is defined for keys of any length; this cannot fail.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(value);
    let mut result = [0; SHA256_OUTPUT_LEN];
    result.copy_from_slice(mac.finalize().into_bytes().as_slice());
    result
}

#[inline]
pub(crate) fn sha256(value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    let mut result = [0; SHA256_OUTPUT_LEN];
    result.copy_from_slice(Sha256::digest(value).as_slice());
    result
}

/// Lower-case hex SHA-256 of `value`. Empty input yields the well-known empty digest without hashing.
#[inline]
pub(crate) fn sha256_hex(value: &[u8]) -> String {
    if value.is_empty() {
        SHA256_EMPTY.to_string()
    } else {
        hex::encode(sha256(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{hmac_sha256, sha256, sha256_hex};

    #[test_log::test]
    fn empty_digest_matches_constant() {
        assert_eq!(hex::encode(sha256(b"")), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
        assert_eq!(sha256_hex(b""), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[test_log::test]
    fn hmac_rfc4231_case_2() {
        let tag = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(hex::encode(tag), "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");
    }
}
