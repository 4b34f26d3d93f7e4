use serde::{Deserialize, Deserializer};

/// Normalizes submitted text by stripping surrounding whitespace and
/// composing it into Unicode Normalization Form C.
///
/// ```
/// use site_backend::normalization::normalize_text;
/// assert_eq!(normalize_text(" Cafe\u{301} "), "Caf\u{e9}");
/// ```
pub fn normalize_text(text: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    text.as_ref().trim().nfc().collect()
}

/// Deserializes an optional `String` after running it through
/// `normalize_text`. Blank strings become `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let o: Option<String> = Deserialize::deserialize(deserializer)?;

    Ok(o.map(normalize_text).filter(|s| !s.is_empty()))
}
