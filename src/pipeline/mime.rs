use std::path::Path;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

pub fn is_svg(path: &Path) -> bool {
    content_type_for_path(path) == Some(SVG_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_svg_extensions() {
        assert!(is_svg(Path::new("icons/plus.svg")));
        assert!(is_svg(Path::new("icons/PLUS.SVG")));
    }

    #[test]
    fn rejects_other_content_types() {
        assert!(!is_svg(Path::new("icons/plus.png")));
        assert!(!is_svg(Path::new("notes.txt")));
        assert!(!is_svg(Path::new("no_extension")));
        assert_eq!(content_type_for_path(Path::new("no_extension")), None);
    }
}
