use sha2::{Digest, Sha256};

/// Hex SHA-256 of `{salt}:{ip}`. Stored beside the raw IP so exports can
/// be cross-checked without revealing addresses downstream.
pub fn hash_ip(salt: &str, ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hex SHA-256 of a plaintext OTP code. The plaintext only ever travels
/// in the email.
pub fn hash_otp_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
