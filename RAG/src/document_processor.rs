use crate::error::{RagError, Result};
use crate::models::*;
use pdf_extract::extract_text;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

pub struct DocumentProcessor {
    max_documents: usize,
}

impl DocumentProcessor {
    pub fn new(max_documents: usize) -> Self {
        Self { max_documents }
    }

    /// Loads the first `max_documents` PDFs of `documents_dir`, ordered by file name.
    pub async fn process_documents(&self, documents_dir: &Path) -> Result<Vec<Document>> {
        let mut pdf_paths = self.list_pdfs(documents_dir)?;
        if pdf_paths.is_empty() {
            return Err(RagError::NoDocuments(documents_dir.to_path_buf()));
        }

        if pdf_paths.len() > self.max_documents {
            log::info!(
                "Found {} PDFs in {}, indexing only the first {}",
                pdf_paths.len(),
                documents_dir.display(),
                self.max_documents
            );
            pdf_paths.truncate(self.max_documents);
        }

        let mut documents = Vec::with_capacity(pdf_paths.len());
        for file_path in pdf_paths {
            documents.push(self.process_pdf(file_path).await?);
        }

        log::info!("Processed {} documents", documents.len());
        Ok(documents)
    }

    fn list_pdfs(&self, documents_dir: &Path) -> Result<Vec<PathBuf>> {
        let dir_error = |source| RagError::DocumentsDir {
            path: documents_dir.to_path_buf(),
            source,
        };

        let mut pdf_paths = Vec::new();
        for entry in fs::read_dir(documents_dir).map_err(dir_error)? {
            let file_path = entry.map_err(dir_error)?.path();
            let is_pdf = file_path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);

            if is_pdf && file_path.is_file() {
                pdf_paths.push(file_path);
            }
        }

        pdf_paths.sort();
        Ok(pdf_paths)
    }

    async fn process_pdf(&self, file_path: PathBuf) -> Result<Document> {
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());

        log::info!("Processing PDF: {}", filename);

        // pdf-extract is synchronous and panics on some malformed files.
        let extracted = tokio::task::spawn_blocking(move || extract_text(&file_path))
            .await
            .map_err(|e| RagError::Pdf {
                file: filename.clone(),
                message: format!("extractor panicked: {}", e),
            })?
            .map_err(|e| RagError::Pdf {
                file: filename.clone(),
                message: e.to_string(),
            })?;

        let content = clean_text(&extracted);
        if content.is_empty() {
            log::warn!("No text extracted from {}", filename);
        }

        Ok(Document {
            id: Uuid::new_v4().to_string(),
            filename,
            content,
        })
    }
}

/// Collapses whitespace runs and drops control characters left behind by
/// PDF text extraction.
pub fn clean_text(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re_whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let without_controls: String = text
        .chars()
        .map(|c| if c.is_control() && !c.is_whitespace() { ' ' } else { c })
        .collect();

    re_whitespace
        .replace_all(&without_controls, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    /// Writes a one-page PDF that draws `lines` with a standard Type1 font.
    fn write_pdf(path: &Path, lines: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-24).into()]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Hello \n\n world\t!  "), "Hello world !");
        assert_eq!(clean_text("a\u{0}b\u{c}c"), "a b c");
        assert_eq!(clean_text(" \n "), "");
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let err = DocumentProcessor::new(20).process_documents(&missing).await.unwrap_err();
        assert!(matches!(err, RagError::DocumentsDir { .. }));
    }

    #[tokio::test]
    async fn test_directory_without_pdfs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.txt"), "not a pdf").unwrap();
        fs::create_dir(temp.path().join("nested.pdf")).unwrap();

        let err = DocumentProcessor::new(20).process_documents(temp.path()).await.unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));
    }

    #[test]
    fn test_lists_pdfs_sorted_case_insensitive() {
        let temp = TempDir::new().unwrap();
        for name in ["b.pdf", "a.PDF", "c.txt", "d.pdf"] {
            fs::write(temp.path().join(name), b"%PDF-1.4").unwrap();
        }

        let names: Vec<String> = DocumentProcessor::new(20)
            .list_pdfs(temp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "d.pdf"]);
    }

    #[tokio::test]
    async fn test_loads_first_documents_by_file_name() {
        let temp = TempDir::new().unwrap();
        for name in ["e", "b", "d", "a", "c"] {
            let heading = format!("Section {}", name.to_uppercase());
            write_pdf(
                &temp.path().join(format!("{}.pdf", name)),
                &[heading.as_str(), "Median   household income", "Population    by county"],
            );
        }

        let documents = DocumentProcessor::new(3).process_documents(temp.path()).await.unwrap();

        let names: Vec<&str> = documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);

        for (document, section) in documents.iter().zip(["A", "B", "C"]) {
            let content = &document.content;
            assert!(!content.is_empty());
            assert!(content.contains(&format!("Section {}", section)), "{:?}", content);
            assert!(content.contains("household"), "{:?}", content);
            assert_eq!(content.trim(), content);
            assert!(!content.contains("  "), "{:?}", content);
            assert!(!content.contains(['\n', '\t', '\r']), "{:?}", content);
        }
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_typed_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("broken.pdf"), b"this is not really a pdf").unwrap();

        let err = DocumentProcessor::new(20).process_documents(temp.path()).await.unwrap_err();
        match err {
            RagError::Pdf { file, .. } => assert_eq!(file, "broken.pdf"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
