use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Base64-encoded HMAC-SHA256 of `data`. This is the format the identity provider uses in `X-Identity-Hmac-SHA256`.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    base64::encode(hmac_bytes(secret.as_bytes(), data))
}

/// Raw HMAC-SHA256 of `data`
pub fn hmac_bytes(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so this never comes back empty
    HmacSha256::new_from_slice(key)
        .map(|mut mac| {
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        })
        .unwrap_or_default()
}

/// Checks `tag` against the HMAC-SHA256 of `data` in constant time.
pub fn verify_hmac(key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    match HmacSha256::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(data);
            mac.verify_slice(tag).is_ok()
        },
        Err(_) => false,
    }
}
