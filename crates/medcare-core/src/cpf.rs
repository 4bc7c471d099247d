//! CPF (Cadastro de Pessoas Físicas) normalisation and checksum validation.
//!
//! A CPF is 11 digits: a 9-digit base followed by two mod-11 check digits.
//! Formatting such as `123.456.789-09` is accepted everywhere and stripped
//! before any comparison or storage.

/// Number of digits in a normalised CPF.
pub const CPF_LEN: usize = 11;

/// Strip every non-digit character.
pub fn normalize(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

/// Whether `raw` is a well-formed CPF once formatting is removed.
///
/// Sequences made of a single repeated digit pass the checksum but are never
/// issued, so they are rejected explicitly.
pub fn is_valid(raw: &str) -> bool {
  let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

  if digits.len() != CPF_LEN {
    return false;
  }
  if digits.iter().all(|&d| d == digits[0]) {
    return false;
  }

  check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Mod-11 check digit over `base`, weighting from `base.len() + 1` down to 2.
fn check_digit(base: &[u32]) -> u32 {
  let top = base.len() as u32 + 1;
  let sum: u32 = base
    .iter()
    .zip((2..=top).rev())
    .map(|(d, w)| d * w)
    .sum();

  match sum % 11 {
    r if r < 2 => 0,
    r => 11 - r,
  }
}
