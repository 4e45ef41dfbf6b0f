//! Identifier generation: fixed prefix + uppercased random alphanumerics

use super::random::RandomSource;

pub const CASE_PREFIX: &str = "DC";
pub const UPDATE_PREFIX: &str = "UPD";
pub const DOCUMENT_PREFIX: &str = "DOC";
pub const APPOINTMENT_PREFIX: &str = "APT";

pub const CASE_SUFFIX_LEN: usize = 10;
pub const SUFFIX_LEN: usize = 8;

pub fn generate(rng: &mut dyn RandomSource, prefix: &str, suffix_len: usize) -> String {
    let mut id = String::with_capacity(prefix.len() + suffix_len);
    id.push_str(prefix);
    for _ in 0..suffix_len {
        id.push(rng.alphanumeric().to_ascii_uppercase());
    }
    id
}

pub fn case_id(rng: &mut dyn RandomSource) -> String {
    generate(rng, CASE_PREFIX, CASE_SUFFIX_LEN)
}

pub fn update_id(rng: &mut dyn RandomSource) -> String {
    generate(rng, UPDATE_PREFIX, SUFFIX_LEN)
}

pub fn document_id(rng: &mut dyn RandomSource) -> String {
    generate(rng, DOCUMENT_PREFIX, SUFFIX_LEN)
}

pub fn appointment_id(rng: &mut dyn RandomSource) -> String {
    generate(rng, APPOINTMENT_PREFIX, SUFFIX_LEN)
}

/// True if `id` is `prefix` followed by exactly `suffix_len` of `[A-Z0-9]`
pub fn matches_pattern(id: &str, prefix: &str, suffix_len: usize) -> bool {
    id.strip_prefix(prefix).is_some_and(|suffix| {
        suffix.len() == suffix_len
            && suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    proptest! {
        #[test]
        fn prop_ids_match_documented_shape(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let rng: &mut dyn RandomSource = &mut rng;
            prop_assert!(matches_pattern(&case_id(rng), CASE_PREFIX, CASE_SUFFIX_LEN));
            prop_assert!(matches_pattern(&update_id(rng), UPDATE_PREFIX, SUFFIX_LEN));
            prop_assert!(matches_pattern(&document_id(rng), DOCUMENT_PREFIX, SUFFIX_LEN));
            prop_assert!(matches_pattern(&appointment_id(rng), APPOINTMENT_PREFIX, SUFFIX_LEN));
        }
    }

    #[test]
    fn test_pattern_rejects_lowercase_and_wrong_length() {
        assert!(matches_pattern("DCABCDEF1234", "DC", 10));
        assert!(!matches_pattern("DCabcdef1234", "DC", 10));
        assert!(!matches_pattern("DCABC", "DC", 10));
        assert!(!matches_pattern("UPDABCDEFGH", "DOC", 8));
    }
}
