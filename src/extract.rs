//! Document text extraction seam
//!
//! PDF parsing and OCR are external collaborators; the server only
//! depends on this contract. `PlainTextExtractor` covers development and
//! tests, where uploads are plain text rather than real PDFs.

use async_trait::async_trait;

/// Contract for turning an uploaded file into text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the document's text. Implementations should fail rather
    /// than return garbage for unreadable input; the caller maps failure
    /// to the document's `error` status.
    async fn extract(&self, file_name: &str, data: &[u8]) -> anyhow::Result<String>;
}

/// Treats the upload as UTF-8 text
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, _file_name: &str, data: &[u8]) -> anyhow::Result<String> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_text_extractor() {
        let extractor = PlainTextExtractor;
        let text = extractor
            .extract("plan.txt", b"Deductible: $500")
            .await
            .unwrap();
        assert_eq!(text, "Deductible: $500");
    }
}
