//! End-to-end pipeline tests with deterministic stub providers

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use grounded_rag::providers::{
    EmbeddingProvider, InMemoryVectorStore, LlmProvider, LocalVectorStore, VectorStoreProvider,
};
use grounded_rag::types::{ScoredRecord, VectorRecord};
use grounded_rag::{Error, RagConfig, RagPipeline, Result, INSUFFICIENT_CONTEXT};

const DIMENSIONS: usize = 64;

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; DIMENSIONS];
                for word in text
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| !w.is_empty())
                {
                    let mut hasher = DefaultHasher::new();
                    word.to_lowercase().hash(&mut hasher);
                    vector[(hasher.finish() % DIMENSIONS as u64) as usize] += 1.0;
                }
                vector
            })
            .collect())
    }

    fn name(&self) -> &str {
        "hash"
    }

    fn model(&self) -> &str {
        "hash-bow"
    }
}

/// Returns the prompt it was given and remembers every call
#[derive(Default)]
struct EchoLlm {
    prompts: Mutex<Vec<String>>,
}

impl EchoLlm {
    fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(prompt.to_string())
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Embedding service that is always down
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(Error::embedding("service unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Embedding service that drops the last vector of every batch
struct ShortEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(vec![vec![1.0; 4]; texts.len().saturating_sub(1)])
    }

    fn name(&self) -> &str {
        "short"
    }

    fn model(&self) -> &str {
        "short"
    }
}

/// In-memory store whose record count is unavailable
#[derive(Default)]
struct UncountableStore {
    inner: InMemoryVectorStore,
}

#[async_trait]
impl VectorStoreProvider for UncountableStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        self.inner.upsert(records).await
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        self.inner.query(vector, k).await
    }

    async fn len(&self) -> Result<usize> {
        Err(Error::persistence("count unavailable"))
    }

    fn name(&self) -> &str {
        "uncountable"
    }
}

fn test_config(persist: &Path) -> RagConfig {
    RagConfig {
        persist_path: persist.to_path_buf(),
        chunk_size: 100,
        chunk_overlap: 10,
        ..RagConfig::default()
    }
}

fn write_text_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Build a PDF with one line of Courier text per page
fn write_pdf_file(dir: &Path, name: &str, page_texts: &[&str]) -> std::path::PathBuf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    doc.save_to(&mut file).unwrap();
    path
}

fn pipeline_with(
    dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<EchoLlm>,
    store: Arc<dyn VectorStoreProvider>,
) -> RagPipeline {
    RagPipeline::new(test_config(&dir.join("vectorstore")), embedder, llm, store).unwrap()
}

#[tokio::test]
async fn answer_on_empty_store_skips_generation() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        llm.clone(),
        Arc::new(InMemoryVectorStore::new()),
    );

    assert!(pipeline.retrieve("What is the policy?").await.unwrap().is_empty());

    let answer = pipeline.answer("What is the policy?").await.unwrap();
    assert_eq!(answer, "Insufficient context to answer this question.");
    assert_eq!(answer, INSUFFICIENT_CONTEXT);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn ingest_masks_pii_before_storage() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_text_file(
        dir.path(),
        "contacts.txt",
        "Contact Jane at jane@example.com or 5551234567, reference ticket #42.",
    );
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        Arc::new(EchoLlm::default()),
        store.clone(),
    );

    let report = pipeline.ingest(&file).await.unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.chunks, 1);
    assert_eq!(report.masked_chunks, 1);

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].content,
        "Contact Jane at [EMAIL] or [PHONE], reference ticket #42."
    );
    assert!(!records[0].content.contains("jane@example.com"));
    assert!(!records[0].content.contains("5551234567"));
    assert_eq!(records[0].metadata.page_number, 1);
    assert_eq!(records[0].embedding.len(), DIMENSIONS);
}

#[tokio::test]
async fn pdf_pages_keep_their_numbers_and_are_masked() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_pdf_file(
        dir.path(),
        "handbook.pdf",
        &[
            "Alpha page one text",
            "Contact Jane at jane@example.com or 5551234567, reference ticket #42.",
        ],
    );
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        Arc::new(EchoLlm::default()),
        store.clone(),
    );

    let report = pipeline.ingest(&file).await.unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.chunks, 2);
    assert_eq!(report.masked_chunks, 1);

    let records = store.records();
    let pages: Vec<u32> = records.iter().map(|r| r.metadata.page_number).collect();
    assert_eq!(pages, vec![1, 2]);
    assert!(records[0].content.contains("Alpha page one text"));
    assert!(records[1].content.contains("[EMAIL]"));
    assert!(records[1].content.contains("[PHONE]"));
    assert!(!records[1].content.contains("jane@example.com"));
    assert!(!records[1].content.contains("5551234567"));
    assert!(records
        .iter()
        .all(|r| r.metadata.source == file.display().to_string()));
}

#[tokio::test]
async fn ingest_does_not_depend_on_store_count() {
    // Log arguments are only evaluated when the level is enabled
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish(),
    );

    let dir = tempfile::tempdir().unwrap();
    let file = write_text_file(dir.path(), "policy.txt", "Data retention period is 90 days.");
    let store = Arc::new(UncountableStore::default());
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        Arc::new(EchoLlm::default()),
        store.clone(),
    );

    let report = pipeline.ingest(&file).await.unwrap();
    assert_eq!(report.chunks, 1);
    assert_eq!(store.inner.records().len(), 1);
}

#[tokio::test]
async fn answer_is_grounded_in_retrieved_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_text_file(dir.path(), "policy.txt", "Data retention period is 90 days.");
    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        llm.clone(),
        Arc::new(InMemoryVectorStore::new()),
    );

    pipeline.ingest(&file).await.unwrap();

    let question = "What is the data retention period?";
    let answer = pipeline.answer(question).await.unwrap();

    assert_eq!(llm.calls(), 1);
    assert!(answer.contains("Context:\nData retention period is 90 days.\n"));
    assert!(answer.contains(&format!("Question:\n{}\n", question)));
    assert!(answer.starts_with("You are an enterprise knowledge assistant."));
}

#[tokio::test]
async fn multi_chunk_document_uses_top_k_context() {
    let dir = tempfile::tempdir().unwrap();
    let sentences = [
        "Backups run nightly at two in the morning.",
        "Data retention period is 90 days for audit logs.",
        "Laptops must use full disk encryption at all times.",
        "Visitors sign in at the front desk and wear badges.",
        "Passwords rotate every quarter for service accounts.",
        "Incident reports go to the security team within a day.",
    ];
    let file = write_text_file(dir.path(), "handbook.txt", &sentences.join(" "));
    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        llm.clone(),
        Arc::new(InMemoryVectorStore::new()),
    );

    let report = pipeline.ingest(&file).await.unwrap();
    // 303 characters in windows of 100 advancing by 90
    assert_eq!(report.chunks, 4);
    assert_eq!(pipeline.store().len().await.unwrap(), report.chunks);
    assert_eq!(pipeline.config().top_k, 4);

    let retrieved = pipeline.retrieve("retention period audit logs").await.unwrap();
    assert_eq!(retrieved.len(), 4);
    assert!(retrieved[0].contains("retention"));

    let scored = pipeline.retrieve_scored("retention period audit logs").await.unwrap();
    assert_eq!(scored[0].record.metadata.chunk_index, 0);
    assert!(scored.windows(2).all(|w| w[0].similarity >= w[1].similarity));

    pipeline.answer("retention period audit logs").await.unwrap();
    let prompts = llm.prompts.lock();
    assert!(prompts[0].contains(&retrieved.join("\n\n")));
}

#[tokio::test]
async fn local_store_persists_across_reopen_and_appends() {
    let dir = tempfile::tempdir().unwrap();
    let persist = dir.path().join("vectorstore");
    let file = write_text_file(dir.path(), "policy.txt", "Data retention period is 90 days.");

    {
        let store = Arc::new(LocalVectorStore::open(&persist).unwrap());
        let pipeline = pipeline_with(
            dir.path(),
            Arc::new(HashEmbedder),
            Arc::new(EchoLlm::default()),
            store,
        );
        pipeline.ingest(&file).await.unwrap();
    }

    let store = Arc::new(LocalVectorStore::open(&persist).unwrap());
    assert_eq!(store.len().await.unwrap(), 1);

    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(dir.path(), Arc::new(HashEmbedder), llm.clone(), store.clone());

    let answer = pipeline.answer("What is the data retention period?").await.unwrap();
    assert!(answer.contains("Data retention period is 90 days."));

    // Re-ingesting the same file appends, it does not deduplicate
    pipeline.ingest(&file).await.unwrap();
    assert_eq!(store.len().await.unwrap(), 2);
}

#[tokio::test]
async fn never_created_collection_answers_insufficient_context() {
    let dir = tempfile::tempdir().unwrap();
    let persist = dir.path().join("nested").join("vectorstore");
    assert!(!persist.exists());

    let store = Arc::new(LocalVectorStore::open(&persist).unwrap());
    let llm = Arc::new(EchoLlm::default());
    let pipeline = pipeline_with(dir.path(), Arc::new(HashEmbedder), llm.clone(), store);

    assert!(pipeline.retrieve("What is the policy?").await.unwrap().is_empty());
    assert_eq!(
        pipeline.answer("What is the policy?").await.unwrap(),
        INSUFFICIENT_CONTEXT
    );
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn missing_file_is_load_error_and_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        Arc::new(EchoLlm::default()),
        store.clone(),
    );

    let err = pipeline
        .ingest(dir.path().join("does-not-exist.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Load { .. }));
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn unsupported_or_malformed_files_are_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline_with(
        dir.path(),
        Arc::new(HashEmbedder),
        Arc::new(EchoLlm::default()),
        Arc::new(InMemoryVectorStore::new()),
    );

    let docx = write_text_file(dir.path(), "memo.docx", "not really a docx");
    assert!(matches!(pipeline.ingest(&docx).await, Err(Error::Load { .. })));

    let fake_pdf = write_text_file(dir.path(), "broken.pdf", "this is not a pdf");
    assert!(matches!(pipeline.ingest(&fake_pdf).await, Err(Error::Load { .. })));
}

#[tokio::test]
async fn embedding_failure_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_text_file(dir.path(), "policy.txt", "Data retention period is 90 days.");

    let embedders: [Arc<dyn EmbeddingProvider>; 2] =
        [Arc::new(FailingEmbedder), Arc::new(ShortEmbedder)];
    for embedder in embedders {
        let store = Arc::new(InMemoryVectorStore::new());
        let pipeline = pipeline_with(
            dir.path(),
            embedder,
            Arc::new(EchoLlm::default()),
            store.clone(),
        );

        let err = pipeline.ingest(&file).await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingService(_)));
        assert!(store.is_empty().await.unwrap());
    }
}

#[test]
fn invalid_chunking_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = RagConfig {
        chunk_size: 50,
        chunk_overlap: 50,
        ..test_config(dir.path())
    };

    let result = RagPipeline::new(
        config,
        Arc::new(HashEmbedder),
        Arc::new(EchoLlm::default()),
        Arc::new(InMemoryVectorStore::new()),
    );
    assert!(matches!(result, Err(Error::Config(_))));
}
