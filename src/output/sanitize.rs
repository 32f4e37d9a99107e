//! Filesystem-safe names from page titles

/// Characters rejected by common filesystems
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names reserved on Windows regardless of extension
const RESERVED_NAMES: &[&str] = &["con", "prn", "aux", "nul"];

/// Maps an arbitrary title to a string usable as a filename component
///
/// Applied in order:
///
/// 1. Removes `< > : " / \ | ? *`
/// 2. Removes control characters U+0000–U+001F and U+0080–U+009F
/// 3. A string made only of dots becomes empty
/// 4. A whole-string reserved device name (`con`, `prn`, `aux`, `nul`,
///    `com1`–`com9`, `lpt1`–`lpt9`, any case) becomes empty
/// 5. Trailing dots and spaces are stripped, then surrounding whitespace
/// 6. A result that is now a reserved device name (`CON.`, ` con `) becomes
///    empty
///
/// The result is empty only when nothing usable remains.
///
/// # Example
///
/// ```
/// use pagebench::output::sanitize;
///
/// assert_eq!(sanitize("My:Title?"), "MyTitle");
/// assert_eq!(sanitize("Rust (programming language) - Wikipedia"), "Rust (programming language) - Wikipedia");
/// ```
pub fn sanitize(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !is_stripped_control(*c))
        .collect();

    if is_only_dots(&stripped) || is_reserved_device_name(&stripped) {
        return String::new();
    }

    let trimmed = stripped.trim_end_matches(['.', ' ']).trim();
    if is_reserved_device_name(trimmed) {
        return String::new();
    }
    trimmed.to_string()
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{0080}'..='\u{009F}')
}

fn is_only_dots(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c == '.')
}

fn is_reserved_device_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if RESERVED_NAMES.contains(&lower.as_str()) {
        return true;
    }

    match lower.strip_prefix("com").or_else(|| lower.strip_prefix("lpt")) {
        Some(digit) => matches!(digit.as_bytes(), [b'1'..=b'9']),
        None => false,
    }
}
