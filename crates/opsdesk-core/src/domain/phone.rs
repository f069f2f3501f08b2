pub const SUFFIX_LEN: usize = 4;

pub fn digits_only(value: &str) -> String {
    value.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

pub fn phone_suffix(value: &str, len: usize) -> String {
    let digits = digits_only(value);
    let start = digits.len().saturating_sub(len);
    digits[start..].to_string()
}

pub fn normalize_phone_suffix(value: Option<&str>) -> String {
    match value {
        Some(value) => phone_suffix(value, SUFFIX_LEN),
        None => String::new(),
    }
}
