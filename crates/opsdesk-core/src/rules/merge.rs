use crate::domain::RawContact;
use crate::rules::validation::DigitKey;
use std::collections::HashSet;

/// Unions both sources in order, drops anything whose phone does not end in
/// `key`, and keeps the first sighting of each id.
pub fn merge_matches(
    key: &DigitKey,
    primary: Vec<RawContact>,
    directory: Vec<RawContact>,
) -> Vec<RawContact> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for contact in primary.into_iter().chain(directory) {
        if contact.phone_suffix() != key.as_str() {
            continue;
        }
        if !seen.insert(contact.dedup_key().to_string()) {
            continue;
        }
        merged.push(contact);
    }

    merged
}
