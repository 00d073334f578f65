//! Tests for the documents module

use super::*;

async fn test_store() -> DocumentStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    DocumentStore::new(pool).await.unwrap()
}

#[test]
fn test_detect_document_type() {
    assert_eq!(detect_document_type("Aetna_SBC_2026.pdf"), DocumentType::Sbc);
    assert_eq!(
        detect_document_type("summary of benefits.pdf"),
        DocumentType::Sbc
    );
    assert_eq!(detect_document_type("march_EOB.pdf"), DocumentType::Eob);
    assert_eq!(
        detect_document_type("claim-denied-notice.pdf"),
        DocumentType::DenialLetter
    );
    assert_eq!(
        detect_document_type("hospital_bill_march.pdf"),
        DocumentType::MedicalBill
    );
    assert_eq!(
        detect_document_type("2026 drug list.pdf"),
        DocumentType::Formulary
    );
    assert_eq!(detect_document_type("random.pdf"), DocumentType::Other);
}

#[test]
fn test_is_likely_scanned() {
    assert!(is_likely_scanned(None));
    assert!(is_likely_scanned(Some("")));
    assert!(is_likely_scanned(Some("   \n\n  short  ")));
    let real_text = "Your plan covers preventive care at no cost when you \
                     visit an in-network provider for an annual physical.";
    assert!(!is_likely_scanned(Some(real_text)));
}

#[test]
fn test_chunk_text_short_input_single_chunk() {
    let chunks = chunk_text("deductible applies to out-of-network care");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0], "deductible applies to out-of-network care");
}

#[test]
fn test_chunk_text_produces_overlapping_chunks() {
    let word = "coverage";
    let text = std::iter::repeat(word)
        .take(400)
        .collect::<Vec<_>>()
        .join(" ");
    let chunks = chunk_text(&text);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        // Every chunk stays near the target size (last may be smaller)
        assert!(chunk.len() <= CHUNK_SIZE + word.len() + 1);
    }

    // Consecutive chunks share trailing/leading words
    let first_tail: Vec<&str> = chunks[0].split(' ').rev().take(5).collect();
    let second_head: Vec<&str> = chunks[1].split(' ').take(5).collect();
    assert_eq!(first_tail[0], second_head[0]);
}

#[test]
fn test_chunk_text_empty() {
    assert!(chunk_text("").is_empty());
    assert!(chunk_text("   \n\n ").is_empty());
}

#[test]
fn test_type_and_status_round_trip() {
    for doc_type in [
        DocumentType::Sbc,
        DocumentType::Eob,
        DocumentType::DenialLetter,
        DocumentType::MedicalBill,
        DocumentType::Formulary,
        DocumentType::Other,
    ] {
        assert_eq!(doc_type.as_str().parse::<DocumentType>().unwrap(), doc_type);
    }

    for status in [
        DocumentStatus::Uploaded,
        DocumentStatus::Processing,
        DocumentStatus::Completed,
        DocumentStatus::Error,
    ] {
        assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
    }
    assert!("bogus".parse::<DocumentStatus>().is_err());
}

#[tokio::test]
async fn test_document_lifecycle() {
    let store = test_store().await;

    let doc = store
        .insert("user-1", "Aetna_SBC_2026.pdf", DocumentType::Sbc)
        .await
        .unwrap();
    assert_eq!(doc.status, DocumentStatus::Uploaded);

    store
        .set_status(&doc.id, DocumentStatus::Processing)
        .await
        .unwrap();
    store
        .set_raw_text(&doc.id, "Deductible: $500. Aetna pays 80% after deductible.")
        .await
        .unwrap();
    store
        .replace_chunks(
            &doc.id,
            &[
                ("Deductible: $500.".to_string(), Some(vec![0.1, 0.2])),
                ("Aetna pays 80% after deductible.".to_string(), None),
            ],
        )
        .await
        .unwrap();
    store
        .set_status(&doc.id, DocumentStatus::Completed)
        .await
        .unwrap();

    let listed = store.list_for_user("user-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, DocumentStatus::Completed);
    assert_eq!(listed[0].doc_type, DocumentType::Sbc);

    let texts = store.texts_for_user("user-1").await.unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Aetna"));

    let chunks = store.chunks_for_user("user-1").await.unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].chunk_index, 0);
    assert_eq!(chunks[0].embedding, Some(vec![0.1, 0.2]));
    assert!(chunks[1].embedding.is_none());
    assert_eq!(chunks[0].file_name, "Aetna_SBC_2026.pdf");
}

#[tokio::test]
async fn test_incomplete_documents_are_not_searchable() {
    let store = test_store().await;

    let doc = store
        .insert("user-1", "statement.pdf", DocumentType::MedicalBill)
        .await
        .unwrap();
    store.set_raw_text(&doc.id, "some text").await.unwrap();
    store
        .replace_chunks(&doc.id, &[("some text".to_string(), None)])
        .await
        .unwrap();
    store.set_status(&doc.id, DocumentStatus::Error).await.unwrap();

    assert!(store.texts_for_user("user-1").await.unwrap().is_empty());
    assert!(store.chunks_for_user("user-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_documents_are_scoped_per_user() {
    let store = test_store().await;
    store
        .insert("user-1", "a.pdf", DocumentType::Other)
        .await
        .unwrap();

    assert!(store.list_for_user("user-2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_status_unknown_document() {
    let store = test_store().await;
    let result = store.set_status("missing", DocumentStatus::Error).await;
    assert!(matches!(result, Err(crate::error::Error::NotFound(_))));
}
