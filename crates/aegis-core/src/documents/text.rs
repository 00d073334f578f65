//! Pure text processing for plan documents

use serde::{Deserialize, Serialize};

/// Target chunk size in characters. ~800 chars balances context window
/// usage with retrieval precision for insurance documents.
pub const CHUNK_SIZE: usize = 800;

/// Overlap between consecutive chunks so context is not lost at chunk
/// boundaries.
pub const CHUNK_OVERLAP: usize = 200;

/// Maximum upload size we will process (bytes)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Minimum significant characters before a PDF counts as text-based.
/// Insurance docs are typically 2000+ chars even when short.
pub const MIN_TEXT_THRESHOLD: usize = 50;

/// Document classification derived from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Summary of Benefits and Coverage - the key plan document
    Sbc,
    /// Explanation of Benefits - shows what was billed and paid
    Eob,
    /// Claim denial letter
    DenialLetter,
    /// Medical bill or statement
    MedicalBill,
    /// Drug formulary
    Formulary,
    /// Anything else; users can still ask questions about it
    Other,
}

impl DocumentType {
    /// String representation used in storage and the API
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sbc => "sbc",
            Self::Eob => "eob",
            Self::DenialLetter => "denial_letter",
            Self::MedicalBill => "medical_bill",
            Self::Formulary => "formulary",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sbc" => Ok(Self::Sbc),
            "eob" => Ok(Self::Eob),
            "denial_letter" => Ok(Self::DenialLetter),
            "medical_bill" => Ok(Self::MedicalBill),
            "formulary" => Ok(Self::Formulary),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Processing lifecycle of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Stored, processing not started
    Uploaded,
    /// Text extraction and chunking in progress
    Processing,
    /// Ready for retrieval
    Completed,
    /// Processing failed; the document is not searchable
    Error,
}

impl DocumentStatus {
    /// String representation used in storage and the API
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(Self::Uploaded),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// Detect document type from the file name. A simple heuristic; content
/// analysis could refine it later.
#[must_use]
pub fn detect_document_type(file_name: &str) -> DocumentType {
    let lower = file_name.to_lowercase();

    if lower.contains("sbc") || lower.contains("summary of benefits") {
        return DocumentType::Sbc;
    }
    if lower.contains("eob") || lower.contains("explanation of benefits") {
        return DocumentType::Eob;
    }
    if lower.contains("denial") || lower.contains("denied") {
        return DocumentType::DenialLetter;
    }
    if lower.contains("bill") || lower.contains("statement") || lower.contains("invoice") {
        return DocumentType::MedicalBill;
    }
    if lower.contains("formulary") || lower.contains("drug list") {
        return DocumentType::Formulary;
    }

    DocumentType::Other
}

/// Whether extracted text is too short to be useful, i.e. the PDF is
/// likely a scanned image rather than a text document.
#[must_use]
pub fn is_likely_scanned(extracted_text: Option<&str>) -> bool {
    match extracted_text {
        None => true,
        Some(text) => {
            let significant = text.split_whitespace().collect::<Vec<_>>().join(" ");
            significant.trim().len() < MIN_TEXT_THRESHOLD
        }
    }
}

/// Split text into overlapping chunks on word boundaries.
///
/// Chunks are about [`CHUNK_SIZE`] characters; each carries roughly
/// [`CHUNK_OVERLAP`] characters of trailing context from its predecessor.
#[must_use]
pub fn chunk_text(text: &str) -> Vec<String> {
    let cleaned = text.replace("\r\n", "\n");
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    // Overlap measured in words, assuming ~5 chars per word
    let overlap_words = CHUNK_OVERLAP / 5;

    for word in words {
        current.push(word);
        current_len += word.len() + 1;

        if current_len >= CHUNK_SIZE {
            chunks.push(current.join(" "));
            let keep_from = current.len().saturating_sub(overlap_words);
            current = current.split_off(keep_from);
            current_len = current.iter().map(|w| w.len() + 1).sum();
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}
