use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes behind a session token (hex encoded = 32 characters)
pub const TOKEN_BYTES: usize = 16;

/// Generate `len` bytes from the OS CSPRNG, hex encoded.
///
/// Fails only if the operating system cannot supply randomness.
pub fn generate_hex(len: usize) -> Result<String, rand::Error> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

/// Generate a new opaque session token
pub fn generate_token() -> Result<String, rand::Error> {
    generate_hex(TOKEN_BYTES)
}
