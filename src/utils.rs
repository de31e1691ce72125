use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::str::from_utf8;

use nom::bytes::complete::take_while1;
use nom::character::complete::one_of;
use nom::combinator::{all_consuming, opt, recognize};
use nom::multi::{many1_count, separated_list1};
use nom::sequence::delimited;
use nom::IResult;

use crate::error::{Error, Result};
use crate::types::FileType;

fn word_separator(input: &str) -> IResult<&str, &str> {
    recognize(many1_count(one_of(", \t")))(input)
}

fn stop_word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '\'' || c == '-')(input)
}

/// Parse one line of a stop-word list: words separated by commas and/or blanks
pub fn parse_stop_word_line(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(delimited(
        opt(word_separator),
        separated_list1(word_separator, stop_word),
        opt(word_separator),
    ))(input)
}

/// Read a stop-word list from a file
pub fn read_stop_words_from_file(path: &Path) -> Result<BTreeSet<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    read_stop_words_from_string(&content)
}

/// Read a stop-word list from a byte slice
pub fn read_stop_words_from_mem(bytes: &[u8]) -> Result<BTreeSet<String>> {
    let content = from_utf8(bytes).map_err(|_| Error::StopWords {
        line: 0,
        content: "stop-word list is not valid UTF-8".to_string(),
    })?;
    read_stop_words_from_string(content)
}

fn read_stop_words_from_string(content: &str) -> Result<BTreeSet<String>> {
    let mut words = BTreeSet::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        }
        .trim();

        if line.is_empty() {
            continue;
        }

        match parse_stop_word_line(line) {
            Ok((_, parsed)) => words.extend(parsed.into_iter().map(str::to_lowercase)),
            Err(_) => {
                return Err(Error::StopWords {
                    line: line_num + 1,
                    content: line.to_string(),
                })
            }
        }
    }

    Ok(words)
}

/// Parse file type from a file path. Anything that is not a PDF or DOCX
/// document is read as plain text.
pub fn parse_filetype(file_path: &str) -> FileType {
    let extension = Path::new(file_path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("pdf") => FileType::Pdf,
        Some("docx") => FileType::Docx,
        _ => FileType::Text,
    }
}

/// Round a number of seconds to `places` decimal places
pub fn round_secs(secs: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (secs * factor).round() / factor
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Byte offset just past the first `max_chars` characters of `text`
pub fn first_char_boundary(text: &str, max_chars: usize) -> usize {
    text.char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
