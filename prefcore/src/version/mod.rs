//! Semantic Versioning 2.0.0 parsing and precedence.
//!
//! Input is untrusted (it comes straight out of persisted settings), so parsing is
//! bounded: anything longer than [`MAX_VERSION_LENGTH`] is rejected outright, then a
//! cheap coarse pattern filters the input before the detailed grammar runs.
//!
//! [`compare`] keeps the pipeline's historical sign convention: a `base` that outranks
//! `target` yields `-1`. [`SemanticVersion`] itself implements [`Ord`] the usual way
//! (higher precedence is [`Ordering::Greater`]).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Longest version string the parser will look at.
pub const MAX_VERSION_LENGTH: usize = 256;

static COARSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+(?:[-+][0-9A-Za-z.+-]*)?$")
        .expect("coarse version pattern is valid")
});

static SEMVER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<major>0|[1-9][0-9]*)\.(?P<minor>0|[1-9][0-9]*)\.(?P<patch>0|[1-9][0-9]*)",
        r"(?:-(?P<prerelease>(?:0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*)",
        r"(?:\.(?:0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*))*))?",
        r"(?:\+(?P<build>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$",
    ))
    .expect("semantic version pattern is valid")
});

/// Reasons a version string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidVersionError {
    /// The value handed to [`parse_value`] is not a JSON string.
    #[error("version must be a string, found {found}")]
    NotAString {
        /// JSON type of the rejected value.
        found: String,
    },
    /// The input exceeds [`MAX_VERSION_LENGTH`].
    #[error("version is {length} bytes long, the maximum is {max}")]
    TooLong {
        /// Length of the rejected input in bytes.
        length: usize,
        /// The enforced maximum.
        max: usize,
    },
    /// The input is not `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
    #[error("invalid semantic version: {input:?}")]
    Malformed {
        /// The rejected input.
        input: String,
    },
}

/// An unbounded non-negative integer kept as its canonical digit string.
///
/// The grammar forbids leading zeros, so ordering by `(length, digits)` is numeric
/// ordering for any length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Numeral(String);

impl Numeral {
    /// Digits matched by the version grammar; never empty, no leading zero.
    fn from_canonical(digits: &str) -> Self {
        Self(digits.to_string())
    }

    /// The value, when it fits in 64 bits.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for Numeral {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl PartialEq<u64> for Numeral {
    fn eq(&self, other: &u64) -> bool {
        self.as_u64() == Some(*other)
    }
}

impl Ord for Numeral {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Numeral {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Numeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One dot-separated prerelease identifier.
///
/// Variant order matters: the derived [`Ord`] ranks every numeric identifier below
/// every alphanumeric one, as SemVer requires.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrereleaseIdentifier {
    /// Digits only, compared numerically.
    Numeric(Numeral),
    /// Contains a letter or hyphen, compared lexically in ASCII order.
    AlphaNumeric(String),
}

impl PrereleaseIdentifier {
    fn parse(identifier: &str) -> Self {
        if identifier.bytes().all(|b| b.is_ascii_digit()) {
            Self::Numeric(Numeral::from_canonical(identifier))
        } else {
            Self::AlphaNumeric(identifier.to_string())
        }
    }
}

impl fmt::Display for PrereleaseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::AlphaNumeric(s) => f.write_str(s),
        }
    }
}

/// A parsed semantic version. Build metadata is discarded at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    /// Incompatible changes.
    pub major: Numeral,
    /// Backwards compatible additions.
    pub minor: Numeral,
    /// Backwards compatible fixes.
    pub patch: Numeral,
    /// Prerelease identifiers, empty for a release.
    pub prerelease: Vec<PrereleaseIdentifier>,
}

impl SemanticVersion {
    /// Whether this is a prerelease (`1.0.0-beta`) rather than a release.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.is_prerelease(), other.is_prerelease()) {
                (false, false) => Ordering::Equal,
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                // Field by field; a longer list wins when all shared fields match
                (true, true) => self.prerelease.cmp(&other.prerelease),
            })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, identifier) in self.prerelease.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            write!(f, "{identifier}")?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = InvalidVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses a semantic version string.
///
/// # Errors
/// - [`InvalidVersionError::TooLong`] past [`MAX_VERSION_LENGTH`] bytes
/// - [`InvalidVersionError::Malformed`] when either pattern rejects the input
///
/// Numeric segments are not bounded by any integer width; only the input length is.
pub fn parse(input: &str) -> Result<SemanticVersion, InvalidVersionError> {
    if input.len() > MAX_VERSION_LENGTH {
        return Err(InvalidVersionError::TooLong {
            length: input.len(),
            max: MAX_VERSION_LENGTH,
        });
    }

    let malformed = || InvalidVersionError::Malformed {
        input: input.to_string(),
    };

    if !COARSE_PATTERN.is_match(input) {
        return Err(malformed());
    }
    let captures = SEMVER_PATTERN.captures(input).ok_or_else(malformed)?;

    let prerelease = captures.name("prerelease").map_or_else(Vec::new, |m| {
        m.as_str()
            .split('.')
            .map(PrereleaseIdentifier::parse)
            .collect()
    });

    Ok(SemanticVersion {
        major: Numeral::from_canonical(&captures["major"]),
        minor: Numeral::from_canonical(&captures["minor"]),
        patch: Numeral::from_canonical(&captures["patch"]),
        prerelease,
    })
}

/// Parses a version held in a JSON value, as read out of a settings object.
///
/// # Errors
/// [`InvalidVersionError::NotAString`] for non-string values, otherwise as [`parse`].
pub fn parse_value(value: &Value) -> Result<SemanticVersion, InvalidVersionError> {
    value.as_str().map_or_else(
        || {
            Err(InvalidVersionError::NotAString {
                found: json_type_name(value).to_string(),
            })
        },
        parse,
    )
}

/// Compares two version strings: `-1` when `base` has higher precedence than
/// `target`, `1` when lower, `0` when equal. Build metadata is ignored.
///
/// ```rust
/// use prefcore::version::compare;
///
/// assert_eq!(compare("2.0.0", "1.9.9").unwrap(), -1);
/// assert_eq!(compare("1.0.0-alpha", "1.0.0").unwrap(), 1);
/// assert_eq!(compare("1.0.0+build.7", "1.0.0").unwrap(), 0);
/// ```
///
/// # Errors
/// Fails when either side does not [`parse`]. Callers that want "skip on bad input"
/// must handle the error themselves.
pub fn compare(base: &str, target: &str) -> Result<i8, InvalidVersionError> {
    let base = parse(base)?;
    let target = parse(target)?;
    Ok(match base.cmp(&target) {
        Ordering::Greater => -1,
        Ordering::Equal => 0,
        Ordering::Less => 1,
    })
}

pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORDERED: &[&str] = &[
        "0.0.1",
        "0.9.0",
        "1.0.0-alpha",
        "1.0.0-alpha.1",
        "1.0.0-alpha.beta",
        "1.0.0-beta",
        "1.0.0-beta.2",
        "1.0.0-beta.11",
        "1.0.0-rc.1",
        "1.0.0",
        "1.2.9",
        "1.10.0",
        "2.0.0",
    ];

    #[test]
    fn test_parse_extracts_fields() {
        let version = parse("1.4.2-rc.3+sha.5114f85").unwrap();
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 4);
        assert_eq!(version.patch, 2);
        assert_eq!(
            version.prerelease,
            vec![
                PrereleaseIdentifier::AlphaNumeric("rc".to_string()),
                PrereleaseIdentifier::Numeric(Numeral::from(3)),
            ]
        );
        assert_eq!(version.to_string(), "1.4.2-rc.3");
    }

    #[test]
    fn test_compare_is_reflexive() {
        for v in ORDERED {
            assert_eq!(compare(v, v).unwrap(), 0, "{v}");
        }
    }

    #[test]
    fn test_compare_follows_precedence_and_is_antisymmetric() {
        for (i, a) in ORDERED.iter().enumerate() {
            for (j, b) in ORDERED.iter().enumerate() {
                let forward = compare(a, b).unwrap();
                assert_eq!(forward, -compare(b, a).unwrap(), "{a} vs {b}");
                let expected = match i.cmp(&j) {
                    Ordering::Greater => -1,
                    Ordering::Equal => 0,
                    Ordering::Less => 1,
                };
                assert_eq!(forward, expected, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_release_outranks_its_prerelease() {
        assert_eq!(compare("1.0.0", "1.0.0-alpha").unwrap(), -1);
        assert_eq!(compare("1.0.0-alpha", "1.0.0").unwrap(), 1);
    }

    #[test]
    fn test_numeric_identifier_ranks_below_alphanumeric() {
        assert_eq!(compare("1.0.0-1", "1.0.0-a").unwrap(), 1);
        assert_eq!(compare("1.0.0-alpha.9", "1.0.0-alpha.x").unwrap(), 1);
    }

    #[test]
    fn test_build_metadata_is_ignored() {
        assert_eq!(compare("1.0.0+a", "1.0.0+b").unwrap(), 0);
        assert_eq!(compare("1.0.0-rc.1+a", "1.0.0-rc.1").unwrap(), 0);
    }

    #[test]
    fn test_rejects_overlong_input() {
        let long = format!("1.0.0-{}", "a".repeat(MAX_VERSION_LENGTH));
        assert!(matches!(
            parse(&long),
            Err(InvalidVersionError::TooLong { max: MAX_VERSION_LENGTH, .. })
        ));
        assert!(compare(&long, "1.0.0").is_err());
        assert!(compare("1.0.0", &long).is_err());
    }

    #[test]
    fn test_rejects_malformed_shapes() {
        for input in [
            "",
            "1",
            "1.0",
            "1.x.0",
            "v1.0.0",
            " 1.0.0",
            "1.0.0 ",
            "01.0.0",
            "1.0.0-",
            "1.0.0-01",
            "1.0.0-a..b",
            "1.0.0+",
            "1.0.0+a+b",
            "1.0.0.0",
            "\u{0661}.0.0",
        ] {
            assert!(
                matches!(parse(input), Err(InvalidVersionError::Malformed { .. })),
                "{input:?} should be malformed"
            );
        }
        assert!(compare("1.x.0", "1.0.0").is_err());
    }

    #[test]
    fn test_numbers_beyond_64_bits_compare_numerically() {
        for v in ["1.0.0-18446744073709551616", "99999999999999999999.0.0"] {
            assert_eq!(compare(v, v).unwrap(), 0, "{v}");
            assert_eq!(parse(v).unwrap().to_string(), v);
        }

        assert_eq!(compare("1.0.0-18446744073709551616", "1.0.0-18446744073709551615").unwrap(), -1);
        assert_eq!(compare("1.0.0-9", "1.0.0-18446744073709551616").unwrap(), 1);
        assert_eq!(compare("1.0.0-18446744073709551616", "1.0.0-alpha").unwrap(), 1);
        assert_eq!(compare("99999999999999999999.0.0", "18446744073709551615.0.0").unwrap(), -1);
        assert_eq!(compare("100.0.0", "99.0.0").unwrap(), -1);

        let huge = parse("1.0.0-18446744073709551616").unwrap();
        assert_eq!(huge.major.as_u64(), Some(1));
        match &huge.prerelease[0] {
            PrereleaseIdentifier::Numeric(n) => assert_eq!(n.as_u64(), None),
            other => panic!("Expected Numeric, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_value_requires_string() {
        assert_eq!(parse_value(&json!("1.3.0")).unwrap(), parse("1.3.0").unwrap());
        assert_eq!(
            parse_value(&json!(130)),
            Err(InvalidVersionError::NotAString {
                found: "number".to_string()
            })
        );
        assert!(parse_value(&Value::Null).is_err());
    }

    #[test]
    fn test_from_str_round_trips_display() {
        let version: SemanticVersion = "3.1.4-beta.2".parse().unwrap();
        assert_eq!(version.to_string(), "3.1.4-beta.2");
        assert!(version.is_prerelease());
    }
}
