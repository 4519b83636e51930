/// A source file collected during a single scan.
///
/// Ephemeral: constructed while walking the tree, consumed during
/// aggregation, never persisted.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Relative path from the scan root
    pub relative_path: String,

    /// Human-readable language label derived from the extension
    pub language: &'static str,

    /// UTF-8 text content
    pub content: String,
}

impl SourceFile {
    /// Creates a new source file record.
    #[must_use]
    pub fn new(relative_path: String, language: &'static str, content: String) -> Self {
        Self {
            relative_path,
            language,
            content,
        }
    }

    /// Returns the UTF-8 byte length of the content.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    /// Renders this file as an aggregate block: delimiter, path and
    /// language labels, delimiter, blank line, raw content.
    #[must_use]
    pub fn to_block(&self) -> String {
        let delimiter = "=".repeat(80);
        format!(
            "\n{delimiter}\nFILE: {path}\nLANGUAGE: {language}\n{delimiter}\n\n{content}",
            path = self.relative_path,
            language = self.language,
            content = self.content,
        )
    }
}
