//! Random short path and token generation.

use rand::Rng;
use rand::distr::Alphanumeric;

pub const MIN_PATH_LENGTH: usize = 4;
pub const MAX_PATH_LENGTH: usize = 64;

/// Random string of `len` characters from `[A-Za-z0-9]`.
///
/// Uses the thread-local CSPRNG.
pub fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generates a short path of `len` characters.
pub fn generate_path(len: usize) -> String {
    random_alphanumeric(len)
}
