use crate::models::{Document, DocumentChunk};
use uuid::Uuid;

/// Fixed-size character windows with a constant overlap between neighbours.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// `chunk_overlap` must be smaller than `chunk_size`; `RagConfig::validate`
    /// enforces this for configured values.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(chunk_size > 0 && chunk_overlap < chunk_size);
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Character ranges `[start, end)` covering `char_count` characters.
    pub fn windows(&self, char_count: usize) -> Vec<(usize, usize)> {
        let step = self.chunk_size - self.chunk_overlap;
        let mut windows = Vec::new();
        let mut start = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            windows.push((start, end));
            if end == char_count {
                break;
            }
            start += step;
        }

        windows
    }

    pub fn split_document(&self, document: &Document) -> Vec<DocumentChunk> {
        // Byte offset of every char boundary, plus the end of the string.
        let boundaries: Vec<usize> = document
            .content
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(document.content.len()))
            .collect();
        let char_count = boundaries.len() - 1;

        self.windows(char_count)
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| DocumentChunk {
                id: Uuid::new_v4().to_string(),
                document: document.filename.clone(),
                index,
                start_position: start,
                end_position: end,
                content: document.content[boundaries[start]..boundaries[end]].to_string(),
            })
            .collect()
    }
}
