use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::parsers::{extract_docx_text, extract_pdf_text};
use crate::types::{Document, FileType};
use crate::utils::parse_filetype;

/// Anything that can hand the matcher a fresh, ordered list of documents.
///
/// `snapshot` is called once per question. `None` means the source is
/// unavailable, which the matcher reports as a missing corpus.
pub trait DocumentSource {
    fn snapshot(&self) -> Option<Vec<Document>>;
}

/// Documents held in memory, mostly for embedding and tests
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    documents: Option<Vec<Document>>,
}

impl MemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
        }
    }

    /// A source that is always unavailable
    pub fn unavailable() -> Self {
        Self { documents: None }
    }

    pub fn from_pairs<I, N, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, text)| Document::new(name, text))
                .collect(),
        )
    }
}

impl DocumentSource for MemorySource {
    fn snapshot(&self) -> Option<Vec<Document>> {
        self.documents.clone()
    }
}

/// A file that would be scanned, in scan order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusEntry {
    pub name: String,
    pub path: PathBuf,
    pub file_type: FileType,
}

/// Documents read from a directory on every snapshot
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
    patterns: Vec<Pattern>,
    recursive: bool,
}

impl DirectorySource {
    pub fn new<I, S>(root: impl Into<PathBuf>, patterns: I, recursive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|source| Error::Pattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.into(),
            patterns,
            recursive,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.corpus_dir, &settings.patterns, settings.recursive)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    /// Files the next snapshot would read, sorted by name
    pub fn entries(&self) -> Option<Vec<CorpusEntry>> {
        if !self.is_available() {
            return None;
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let entries = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable corpus entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| self.is_recognized(&entry.file_name().to_string_lossy()))
            .map(|entry| {
                let name = self.document_name(entry.path());
                let file_type = parse_filetype(&name);
                CorpusEntry {
                    name,
                    path: entry.into_path(),
                    file_type,
                }
            })
            .collect();

        Some(entries)
    }

    fn is_recognized(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }

    fn document_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn read_entry(entry: &CorpusEntry) -> Result<String> {
        let path = entry.path.to_string_lossy();
        match entry.file_type {
            FileType::Text => {
                let bytes = fs::read(&entry.path).map_err(|e| Error::io(&entry.path, e))?;
                Ok(normalize_newlines(&String::from_utf8_lossy(&bytes)))
            }
            FileType::Pdf => extract_pdf_text(&path),
            FileType::Docx => extract_docx_text(&path),
        }
    }
}

/// Turn `\r\n` and lone `\r` line endings into `\n`
fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

impl DocumentSource for DirectorySource {
    fn snapshot(&self) -> Option<Vec<Document>> {
        let Some(entries) = self.entries() else {
            tracing::warn!(root = %self.root.display(), "corpus directory is unavailable");
            return None;
        };

        let documents = entries
            .iter()
            .filter_map(|entry| match Self::read_entry(entry) {
                Ok(text) => Some(Document::new(entry.name.clone(), text)),
                Err(err) => {
                    tracing::warn!(document = %entry.name, error = %err, "skipping document");
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            root = %self.root.display(),
            documents = documents.len(),
            "loaded corpus snapshot"
        );
        Some(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn corpus(files: &[(&str, &[u8])]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn names(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path().join("data"), ["*.txt"], false).unwrap();
        assert!(!source.is_available());
        assert!(source.snapshot().is_none());
    }

    #[test]
    fn file_instead_of_directory_is_unavailable() {
        let dir = corpus(&[("data", b"not a directory")]);
        let source = DirectorySource::new(dir.path().join("data"), ["*.txt"], false).unwrap();
        assert!(source.snapshot().is_none());
    }

    #[test]
    fn empty_directory_is_available_but_empty() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        assert_eq!(source.snapshot(), Some(Vec::new()));
    }

    #[test]
    fn only_recognized_extensions_sorted_by_name() {
        let dir = corpus(&[
            ("zeta.txt", b"last"),
            ("alpha.txt", b"first"),
            ("notes.md", b"ignored"),
            ("UPPER.TXT", b"ignored, patterns are case-sensitive"),
            ("image.png", b"\x89PNG"),
        ]);
        let source = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        let documents = source.snapshot().unwrap();
        assert_eq!(names(&documents), vec!["alpha.txt", "zeta.txt"]);
        assert_eq!(documents[0].text, "first");
    }

    #[test]
    fn subdirectories_need_recursive() {
        let dir = corpus(&[("top.txt", b"top"), ("hr/leave.txt", b"leave")]);

        let flat = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        assert_eq!(names(&flat.snapshot().unwrap()), vec!["top.txt"]);

        let deep = DirectorySource::new(dir.path(), ["*.txt"], true).unwrap();
        let documents = deep.snapshot().unwrap();
        assert_eq!(names(&documents), vec!["hr/leave.txt", "top.txt"]);
    }

    #[test]
    fn invalid_utf8_is_read_lossily() {
        let dir = corpus(&[("broken.txt", b"caf\xe9 menu")]);
        let source = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        let documents = source.snapshot().unwrap();
        assert_eq!(documents[0].text, "caf\u{fffd} menu");
    }

    #[test]
    fn unreadable_office_document_is_skipped() {
        let dir = corpus(&[("bad.docx", b"not a zip"), ("good.txt", b"fine")]);
        let source = DirectorySource::new(dir.path(), ["*.txt", "*.docx"], false).unwrap();
        let documents = source.snapshot().unwrap();
        assert_eq!(names(&documents), vec!["good.txt"]);
    }

    #[test]
    fn entries_report_file_types() {
        let dir = corpus(&[("a.txt", b"a"), ("b.pdf", b"b")]);
        let source = DirectorySource::new(dir.path(), ["*.txt", "*.pdf"], false).unwrap();
        let entries = source.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_type, FileType::Text);
        assert_eq!(entries[1].file_type, FileType::Pdf);
    }

    #[test]
    fn snapshot_reflects_latest_contents() {
        let dir = corpus(&[("a.txt", b"before")]);
        let source = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        assert_eq!(source.snapshot().unwrap()[0].text, "before");
        fs::write(dir.path().join("a.txt"), "after").unwrap();
        fs::write(dir.path().join("b.txt"), "new").unwrap();
        let documents = source.snapshot().unwrap();
        assert_eq!(documents[0].text, "after");
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let err = DirectorySource::new(".", ["[*.txt"], false).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_documents_are_read() {
        let target = corpus(&[("policy.txt", b"Annual leave policy allows 20 days per year.")]);
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(target.path().join("policy.txt"), dir.path().join("leave.txt"))
            .unwrap();

        let source = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        let documents = source.snapshot().unwrap();
        assert_eq!(names(&documents), vec!["leave.txt"]);
        assert!(documents[0].text.starts_with("Annual leave"));

        let answer = crate::matcher::Matcher::default().answer("annual", &source);
        assert_eq!(answer.found().unwrap().source, "leave.txt");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_skipped() {
        let dir = corpus(&[("real.txt", b"real")]);
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt"))
            .unwrap();
        let source = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        assert_eq!(names(&source.snapshot().unwrap()), vec!["real.txt"]);
    }

    #[test]
    fn windows_line_endings_become_newlines() {
        let dir = corpus(&[("crlf.txt", b"line one\r\nannual\r\nold mac\rend")]);
        let source = DirectorySource::new(dir.path(), ["*.txt"], false).unwrap();
        let documents = source.snapshot().unwrap();
        assert_eq!(documents[0].text, "line one\nannual\nold mac\nend");

        let answer = crate::matcher::Matcher::default().answer("annual", &source);
        assert_eq!(answer.found().unwrap().snippet, "line one\nannual\nold mac\nend...");
    }

    #[test]
    fn memory_source() {
        let source = MemorySource::from_pairs([("a.txt", "alpha")]);
        assert_eq!(source.snapshot().unwrap()[0].name, "a.txt");
        assert!(MemorySource::unavailable().snapshot().is_none());
    }
}
