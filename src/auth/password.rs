/// Bcrypt only looks at the first 72 bytes of input. Both hashing and
/// verification trim whitespace and truncate at that boundary so the two
/// paths always agree on what the password "is".
const BCRYPT_MAX_BYTES: usize = 72;

fn prepare(password: &str) -> &[u8] {
    let bytes = password.trim().as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)]
}

/// Hash a plain-text password with bcrypt (salted, cost-factored).
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    Ok(bcrypt::hash(prepare(password), bcrypt::DEFAULT_COST)?)
}

/// Verify a plain-text password against a stored bcrypt hash. Any decoding
/// failure counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(prepare(password), hash).unwrap_or(false)
}
