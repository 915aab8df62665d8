//! Display-name normalization.
//!
//! The host renders names with a font that only covers ASCII, and it splits
//! its payloads on `;`. Feed names are normalized once, at parse time, so
//! nothing downstream has to care.

/// Replacement for a single character, or `None` to keep it.
fn substitute(c: char) -> Option<&'static str> {
    match c {
        'ß' => Some("ss"),
        'ö' => Some("oe"),
        'ä' => Some("ae"),
        'ü' => Some("ue"),
        'Ö' => Some("Oe"),
        'Ä' => Some("Ae"),
        'Ü' => Some("Ue"),
        // The host payload delimiter must never appear inside a value.
        ';' => Some(","),
        _ => None,
    }
}

/// Transliterate German diacritics to ASCII and strip the payload delimiter.
///
/// # Examples
///
/// ```
/// use acbus::domain::transliterate;
///
/// assert_eq!(transliterate("Würselen Straßenbahnstr."), "Wuerselen Strassenbahnstr.");
/// ```
pub fn transliterate(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        match substitute(c) {
            Some(s) => out.push_str(s),
            None => out.push(c),
        }
    }
    out
}
