//! Extraction of the numeric pictogram code embedded in upstream icon URLs.

const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Return the digits immediately preceding the trailing image suffix.
///
/// `"//cdn.weatherapi.com/weather/64x64/day/113.png"` yields `Some("113")`.
/// Absent input, a missing suffix or no digits before it yield `None`.
pub fn extract_icon_code(icon: Option<&str>) -> Option<String> {
    let icon = icon?.trim();

    // Query strings and fragments are not part of the file name.
    let path = icon.split(['?', '#']).next().unwrap_or(icon);
    let lower = path.to_ascii_lowercase();

    let suffix = IMAGE_SUFFIXES.iter().find(|suffix| lower.ends_with(*suffix))?;
    let stem = &path[..path.len() - suffix.len()];

    let digits_start = stem
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);
    let digits = &stem[digits_start..];

    if digits.is_empty() { None } else { Some(digits.to_string()) }
}
