//! Staff registration numbers.

use rand::Rng;

/// Length of a generated registration number.
pub const REGISTRATION_LEN: usize = 9;

/// Generate a fresh registration number from the thread-local RNG.
pub fn generate() -> String { generate_with(&mut rand::thread_rng()) }

/// Generate a registration number from `rng`: nine uniformly random decimal
/// digits, leading zeros allowed.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
  (0..REGISTRATION_LEN)
    .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
    .collect()
}
