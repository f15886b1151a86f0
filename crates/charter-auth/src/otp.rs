//! One-time code generation and format checks.

use rand::Rng;

pub const CODE_LENGTH: usize = 6;

/// A random six-digit code without a leading zero.
pub fn generate_code() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

/// Exactly six ASCII digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
