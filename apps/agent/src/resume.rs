//! Resume text extraction — thin wrapper over the PDF extractor.

use std::path::Path;

use crate::errors::GenerationError;

/// Extracts the full text of a PDF resume.
pub fn extract_text(path: impl AsRef<Path>) -> Result<String, GenerationError> {
    Ok(pdf_extract::extract_text(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_a_generation_failure() {
        let result = extract_text("no-such-resume.pdf");
        assert!(matches!(result, Err(GenerationError::Resume(_))));
    }
}
