//! MIME utilities shared across modules

pub const IMAGE_PNG: &str = "image/png";

/// Content type to attach to an upload, guessed from the object name.
///
/// Unknown extensions (including `.parquet` and `.pkl`) map to
/// `application/octet-stream`.
#[must_use]
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_from_extension() {
        assert_eq!(content_type_for("prefix/data.json"), "application/json");
        assert_eq!(content_type_for("out.csv"), "text/csv");
        assert_eq!(content_type_for("plot.png"), IMAGE_PNG);
        assert_eq!(content_type_for("model.pkl"), "application/octet-stream");
    }
}
