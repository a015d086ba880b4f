//! Secret token generation.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};

/// Length of the generated application secret.
pub const SECRET_LEN: usize = 48;

/// Characters a secret may contain.
pub const SECRET_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a [`SECRET_LEN`]-character alphanumeric secret from the OS CSPRNG.
#[must_use]
pub fn generate_secret() -> String {
    generate_secret_with(&mut OsRng, SECRET_LEN)
}

/// Generate an alphanumeric secret of `len` characters from `rng`.
///
/// The bound on `CryptoRng` keeps seeded non-cryptographic generators out.
pub fn generate_secret_with<R: RngCore + CryptoRng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
