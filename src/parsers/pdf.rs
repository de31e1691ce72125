use std::time::Instant;

use crate::error::{Error, Result};

pub fn extract_text_from_path(file_path: &str) -> Result<String> {
    let start = Instant::now();
    let text = pdf_extract::extract_text(file_path).map_err(|e| Error::extract(file_path, e))?;
    tracing::debug!(
        file_path,
        chars = text.chars().count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "extracted pdf text"
    );
    Ok(text)
}

pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String> {
    let start = Instant::now();
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| Error::extract("<memory>", e))?;
    tracing::debug!(
        chars = text.chars().count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "extracted pdf text"
    );
    Ok(text)
}
