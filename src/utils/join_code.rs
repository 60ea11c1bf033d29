// scoreboard-service/src/utils/join_code.rs
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

lazy_static! {
    static ref JOIN_CODE_RE: Regex = Regex::new(r"^\d{8}$").unwrap();
}

// Produce a candidate 8-digit join code. Uniqueness is the caller's
// responsibility: candidates must be checked against the existing mappings
// and regenerated on collision.
pub fn generate() -> String {
    let code: u32 = rand::rng().random_range(10_000_000..=99_999_999);
    code.to_string()
}

// Check that a user-supplied code has the 8-digit numeric format
pub fn is_valid_format(code: &str) -> bool {
    JOIN_CODE_RE.is_match(code)
}
