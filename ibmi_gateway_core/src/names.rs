//! IBM i object-name handling.
//!
//! Builders interpolate caller-supplied library/file/member names into
//! fixed command templates, so those names must never be able to alter
//! the surrounding keyword structure. Anything outside the system object
//! naming character set is refused before a command string exists.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Error, Result};

/// System object names: 1-10 chars from the *NAME character set.
fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_#$@.]{0,9}$").expect("hardcoded pattern"))
}

/// Normalize and check one object name.
///
/// Returns the upper-cased name, ready for template interpolation.
///
/// # Errors
/// `Error::InvalidObjectName` when the value is not a valid system
/// object name.
pub fn object_name(field: &'static str, value: &str) -> Result<String> {
    let normalized = value.trim().to_uppercase();
    if name_pattern().is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(Error::InvalidObjectName {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::object_name;
    use crate::errors::Error;
    use rstest::rstest;

    #[rstest]
    #[case("DEVLIB", "DEVLIB")]
    #[case("devlib", "DEVLIB")]
    #[case("  qclsrc  ", "QCLSRC")]
    #[case("A", "A")]
    #[case("Q#$@_2.X", "Q#$@_2.X")]
    #[case("ABCDEFGHIJ", "ABCDEFGHIJ")]
    fn accepts(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(object_name("library", value).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ABCDEFGHIJK")] // 11 chars
    #[case("1LIB")] // must start with a letter
    #[case("DEV LIB")]
    #[case("X) CALL PGM(EVIL")]
    #[case("LIB;DLTLIB")]
    #[case("LIB/OTHER")]
    #[case("LIB'X")]
    fn refuses(#[case] value: &str) {
        assert!(matches!(
            object_name("member", value),
            Err(Error::InvalidObjectName { field: "member", .. })
        ));
    }
}
