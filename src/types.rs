use serde::Serialize;

/// Supported document file types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    /// Plain text, read as UTF-8
    Text,
    /// Microsoft Word document (.docx)
    Docx,
    /// Portable Document Format (.pdf)
    Pdf,
}

impl FileType {
    /// Short label used when listing a corpus
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Text => "TXT",
            FileType::Docx => "DOCX",
            FileType::Pdf => "PDF",
        }
    }
}

/// A named document loaded for one request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// The winning document of a search
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// Full original text of the winning document
    pub answer: String,
    /// Name of the winning document
    pub source: String,
    pub snippet: String,
    /// Number of distinct query tokens found in the document
    pub score: usize,
    /// Wall-clock seconds for the request, rounded to 4 decimal places
    pub latency_secs: f64,
}

/// Why no answer was produced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    /// The document source is missing or unavailable
    NoCorpus,
    /// The query has no usable tokens after filtering
    EmptyQuery,
    /// No document contains any query token
    NoMatch,
}

/// Outcome of one question
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Found(MatchResult),
    Refused {
        reason: RefusalReason,
        latency_secs: f64,
    },
}

impl Answer {
    pub fn is_found(&self) -> bool {
        matches!(self, Answer::Found(_))
    }

    pub fn found(&self) -> Option<&MatchResult> {
        match self {
            Answer::Found(result) => Some(result),
            Answer::Refused { .. } => None,
        }
    }

    pub fn refusal_reason(&self) -> Option<RefusalReason> {
        match self {
            Answer::Found(_) => None,
            Answer::Refused { reason, .. } => Some(*reason),
        }
    }

    pub fn latency_secs(&self) -> f64 {
        match self {
            Answer::Found(result) => result.latency_secs,
            Answer::Refused { latency_secs, .. } => *latency_secs,
        }
    }
}
