use pretty_assertions::assert_eq;
use prefcore::version::{self, InvalidVersionError, MAX_VERSION_LENGTH};

const SAMPLES: [&str; 12] = [
    "0.0.0",
    "0.9.12",
    "1.0.0-alpha",
    "1.0.0-alpha.1",
    "1.0.0-alpha.beta",
    "1.0.0-beta",
    "1.0.0-beta.2",
    "1.0.0-beta.11",
    "1.0.0-rc.1",
    "1.0.0",
    "1.3.0+build.7",
    "1.4.0",
];

#[test]
fn test_compare_is_reflexive() {
    for v in SAMPLES {
        assert_eq!(version::compare(v, v).unwrap(), 0, "{v}");
    }
}

#[test]
fn test_compare_is_antisymmetric() {
    for a in SAMPLES {
        for b in SAMPLES {
            assert_eq!(
                version::compare(a, b).unwrap(),
                -version::compare(b, a).unwrap(),
                "{a} vs {b}"
            );
        }
    }
}

#[test]
fn test_samples_are_in_ascending_precedence() {
    for pair in SAMPLES.windows(2) {
        // base outranking target is negative
        assert_eq!(version::compare(pair[1], pair[0]).unwrap(), -1, "{pair:?}");
        assert_eq!(version::compare(pair[0], pair[1]).unwrap(), 1, "{pair:?}");
    }
}

#[test]
fn test_release_outranks_its_prerelease() {
    assert_eq!(version::compare("1.0.0", "1.0.0-alpha").unwrap(), -1);
    assert_eq!(version::compare("1.0.0-alpha", "1.0.0").unwrap(), 1);
}

#[test]
fn test_build_metadata_is_ignored() {
    assert_eq!(version::compare("1.3.0+build.7", "1.3.0+other").unwrap(), 0);
    assert_eq!(version::compare("1.3.0+build.7", "1.3.0").unwrap(), 0);
}

#[test]
fn test_malformed_input_is_rejected() {
    let too_long = format!("1.0.0-{}", "a".repeat(MAX_VERSION_LENGTH));
    assert!(matches!(
        version::parse(&too_long),
        Err(InvalidVersionError::TooLong { .. })
    ));
    assert!(version::compare(&too_long, "1.0.0").is_err());

    for input in ["1.0", "1", "", "1.0.0.0", "a.b.c", "1.x.0", "01.0.0", "1.0.0-", "v1.0.0"] {
        assert!(version::parse(input).is_err(), "{input}");
        assert!(version::compare("1.0.0", input).is_err(), "{input}");
    }
}
