//! Name and title sanitization

/// Fallback used when a name transliterates to nothing (e.g. only punctuation)
pub const FALLBACK_NAME: &str = "file";

/// Transliterate `text` into a lowercase, hyphen-separated slug.
///
/// Non-ASCII letters are transliterated, everything else outside `[a-z0-9]` becomes a
/// single separator. Never returns an empty string.
pub fn slugify(text: &str) -> String {
    let slug = slug::slugify(text);
    if slug.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        slug
    }
}

/// Check a name that will be used verbatim as a file stem.
///
/// Returns a description of the problem, or `None` when the name can be used as is.
pub fn raw_name_problem(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else {
        None
    }
}
