//! Name resolver

use pictor_core::sanitize::{raw_name_problem, slugify};
use pictor_core::{NamedImage, PipelineError, PipelineResult, ValidatedImage};

/// Base name (without extension) for `image`.
///
/// An explicit name wins; otherwise the origin basename minus its trailing `.<extension>`.
/// With `sanitize` the result is slugified. Without it the name is used verbatim and must
/// not be empty or contain a path separator.
pub fn resolve_only_name(
    image: &ValidatedImage,
    explicit: Option<&str>,
    sanitize: bool,
) -> PipelineResult<String> {
    let base = match explicit {
        Some(name) => name,
        None => strip_extension(image.source().basename(), image.extension()),
    };

    if sanitize {
        return Ok(slugify(base));
    }

    match raw_name_problem(base) {
        Some(problem) => Err(PipelineError::InvalidName(format!("'{}': {}", base, problem))),
        None => Ok(base.to_string()),
    }
}

pub fn name_image(
    image: ValidatedImage,
    explicit: Option<&str>,
    sanitize: bool,
) -> PipelineResult<NamedImage> {
    let only_name = resolve_only_name(&image, explicit, sanitize)?;
    Ok(NamedImage::new(image, only_name))
}

fn strip_extension<'a>(basename: &'a str, extension: &str) -> &'a str {
    basename
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(basename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_core::{ImageSource, SourceKind};

    fn validated(basename: &str, extension: &str) -> ValidatedImage {
        let source = ImageSource::new(basename, SourceKind::Local, basename, basename);
        ValidatedImage::new(source, "image/jpeg", extension, Some(1), None, None)
    }

    #[test]
    fn test_default_name_strips_extension() {
        let named = name_image(validated("Summer Trip.jpg", "jpg"), None, true).unwrap();
        assert_eq!(named.only_name(), "summer-trip");
        assert_eq!(named.name(), "summer-trip.jpg");

        let raw = name_image(validated("Summer Trip.jpg", "jpg"), None, false).unwrap();
        assert_eq!(raw.name(), "Summer Trip.jpg");
    }

    #[test]
    fn test_only_trailing_extension_is_stripped() {
        let named = name_image(validated("archive.jpg.jpg", "jpg"), None, false).unwrap();
        assert_eq!(named.only_name(), "archive.jpg");
    }

    #[test]
    fn test_explicit_name() {
        let image = validated("a.jpg", "jpg");
        assert_eq!(resolve_only_name(&image, Some("My Photo!"), true).unwrap(), "my-photo");
        assert_eq!(resolve_only_name(&image, Some("My Photo!"), false).unwrap(), "My Photo!");
    }

    #[test]
    fn test_sanitized_empty_falls_back() {
        let image = validated("a.jpg", "jpg");
        assert_eq!(resolve_only_name(&image, Some("***"), true).unwrap(), "file");
        let hidden = validated(".jpg", "jpg");
        assert_eq!(resolve_only_name(&hidden, None, true).unwrap(), "file");
    }

    #[test]
    fn test_raw_name_cannot_escape_directory() {
        let image = validated("a.jpg", "jpg");
        assert!(matches!(
            resolve_only_name(&image, Some("../../etc/passwd"), false),
            Err(PipelineError::InvalidName(_))
        ));
        assert!(matches!(
            resolve_only_name(&image, Some(""), false),
            Err(PipelineError::InvalidName(_))
        ));
        assert_eq!(
            resolve_only_name(&image, Some("../../etc/passwd"), true).unwrap(),
            "etc-passwd"
        );
    }
}
