/// Secure random secrets for magic links
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// Length of every generated secret
pub const SECRET_LENGTH: usize = 32;

/// Generate a new alphanumeric secret from the operating system RNG
pub fn generate_secret() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

/// Byte-wise equality that does not stop at the first differing byte
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    expected.len() == provided.len()
        && expected
            .bytes()
            .zip(provided.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
