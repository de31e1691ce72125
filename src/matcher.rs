//! Keyword-overlap matching of a question against a set of documents.
//!
//! A question is lowercased, split on whitespace, and stripped of stop-words
//! and short words. Each remaining token scores one point for every document
//! that contains it anywhere in its lowercased text. The first document with
//! the highest score wins.

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use crate::config::Settings;
use crate::corpus::DocumentSource;
use crate::types::{Answer, Document, MatchResult, RefusalReason};
use crate::utils::{first_char_boundary, round_secs};

const SNIPPET_SUFFIX: &str = "...";
const LATENCY_DECIMALS: i32 = 4;

#[derive(Clone, Debug)]
pub struct Matcher {
    stop_words: BTreeSet<String>,
    min_token_len: usize,
    snippet_chars: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Matcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            stop_words: settings.stop_words.clone(),
            min_token_len: settings.min_token_len,
            snippet_chars: settings.snippet_chars,
        }
    }

    /// Lowercased query words that survive stop-word and length filtering,
    /// in query order, without repeats.
    pub fn tokenize(&self, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        query
            .to_lowercase()
            .split_whitespace()
            .filter(|word| !self.stop_words.contains(*word))
            .filter(|word| word.chars().count() >= self.min_token_len)
            .filter(|word| seen.insert(word.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Number of tokens contained in `text`. Containment is a plain substring
    /// test, so `art` is found inside `start`.
    pub fn score(&self, tokens: &[String], text: &str) -> usize {
        let text = text.to_lowercase();
        tokens
            .iter()
            .filter(|token| text.contains(token.as_str()))
            .count()
    }

    /// The first `snippet_chars` characters of `text` followed by `...`,
    /// even when nothing was cut.
    pub fn snippet(&self, text: &str) -> String {
        let end = first_char_boundary(text, self.snippet_chars);
        let mut snippet = String::with_capacity(end + SNIPPET_SUFFIX.len());
        snippet.push_str(&text[..end]);
        snippet.push_str(SNIPPET_SUFFIX);
        snippet
    }

    /// Answer `query` from a fresh snapshot of `source`
    pub fn answer<S>(&self, query: &str, source: &S) -> Answer
    where
        S: DocumentSource + ?Sized,
    {
        let start = Instant::now();

        let tokens = self.tokenize(query);
        if tokens.is_empty() {
            tracing::info!("query has no usable tokens");
            return Answer::Refused {
                reason: RefusalReason::EmptyQuery,
                latency_secs: 0.0,
            };
        }

        let Some(documents) = source.snapshot() else {
            tracing::info!("no corpus to search");
            return Answer::Refused {
                reason: RefusalReason::NoCorpus,
                latency_secs: 0.0,
            };
        };

        self.select(&tokens, &documents, start)
    }

    /// Answer `query` from documents already in hand
    pub fn answer_documents(&self, query: &str, documents: &[Document]) -> Answer {
        let start = Instant::now();

        let tokens = self.tokenize(query);
        if tokens.is_empty() {
            tracing::info!("query has no usable tokens");
            return Answer::Refused {
                reason: RefusalReason::EmptyQuery,
                latency_secs: 0.0,
            };
        }

        self.select(&tokens, documents, start)
    }

    fn select(&self, tokens: &[String], documents: &[Document], start: Instant) -> Answer {
        tracing::debug!(?tokens, documents = documents.len(), "scoring documents");

        let mut best_score = 0;
        let mut best: Option<(&Document, String)> = None;

        for document in documents {
            let score = self.score(tokens, &document.text);
            tracing::debug!(document = %document.name, score, "scored document");

            // Ties keep the earlier document.
            if score > best_score {
                best_score = score;
                best = Some((document, self.snippet(&document.text)));
            }
        }

        let latency_secs = round_secs(start.elapsed().as_secs_f64(), LATENCY_DECIMALS);

        match best {
            Some((document, snippet)) => {
                tracing::info!(
                    source = %document.name,
                    score = best_score,
                    latency_secs,
                    "answered from corpus"
                );
                Answer::Found(MatchResult {
                    answer: document.text.clone(),
                    source: document.name.clone(),
                    snippet,
                    score: best_score,
                    latency_secs,
                })
            }
            None => {
                tracing::info!(latency_secs, "no document matched");
                Answer::Refused {
                    reason: RefusalReason::NoMatch,
                    latency_secs,
                }
            }
        }
    }
}
