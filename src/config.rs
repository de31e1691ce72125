use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Words dropped from every query before scoring
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "what", "is", "the", "are", "how", "many", "can", "for", "about", "policy", "of", "please",
    "tell",
];

pub const DEFAULT_REFUSAL_MESSAGE: &str =
    "I can only answer questions based on the official policy corpus. No relevant information found.";

/// Settings shared by the matcher, the corpus loader and the front ends
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the documents
    pub corpus_dir: PathBuf,

    /// File name patterns a document must match to be scanned
    pub patterns: Vec<String>,

    /// Descend into subdirectories of `corpus_dir`
    pub recursive: bool,

    pub stop_words: BTreeSet<String>,

    /// Query tokens shorter than this many characters are dropped
    pub min_token_len: usize,

    /// Characters of the winning document kept in the snippet
    pub snippet_chars: usize,

    pub refusal_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("./data"),
            patterns: vec!["*.txt".to_string()],
            recursive: false,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_token_len: 3,
            snippet_chars: 250,
            refusal_message: DEFAULT_REFUSAL_MESSAGE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&content).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let settings: Settings = serde_json::from_str(content)?;
        Ok(settings.normalized())
    }

    /// Replace the stop-word set, lowercasing every entry
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_corpus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.corpus_dir = dir.into();
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    fn normalized(mut self) -> Self {
        self.stop_words = self.stop_words.iter().map(|w| w.to_lowercase()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_policy_bot() {
        let settings = Settings::default();
        assert_eq!(settings.corpus_dir, PathBuf::from("./data"));
        assert_eq!(settings.patterns, vec!["*.txt".to_string()]);
        assert_eq!(settings.stop_words.len(), 13);
        assert!(settings.stop_words.contains("policy"));
        assert_eq!(settings.min_token_len, 3);
        assert_eq!(settings.snippet_chars, 250);
        assert!(!settings.recursive);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{"corpus_dir": "/srv/hr", "stop_words": ["Leave", "DAYS"]}"#)
                .unwrap();
        assert_eq!(settings.corpus_dir, PathBuf::from("/srv/hr"));
        assert_eq!(settings.min_token_len, 3);
        let words: Vec<&str> = settings.stop_words.iter().map(String::as_str).collect();
        assert_eq!(words, vec!["days", "leave"]);
    }

    #[test]
    fn from_file_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Settings { .. }));
    }

    #[test]
    fn from_file_missing() {
        let err = Settings::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn builders_override() {
        let settings = Settings::default()
            .with_corpus_dir("docs")
            .with_patterns(["*.txt", "*.md"])
            .with_stop_words(["THE"]);
        assert_eq!(settings.corpus_dir, PathBuf::from("docs"));
        assert_eq!(settings.patterns.len(), 2);
        assert!(settings.stop_words.contains("the"));
        assert_eq!(settings.stop_words.len(), 1);
    }
}
