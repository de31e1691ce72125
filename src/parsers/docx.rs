use std::{
    fs::File,
    io::{Cursor, Read, Seek},
    time::Instant,
};
use zip::ZipArchive;

use crate::error::{Error, Result};

enum AttributeType {
    OfficeDocument,
}

impl AttributeType {
    fn as_str(&self) -> &'static str {
        match self {
            AttributeType::OfficeDocument => {
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument"
            }
        }
    }
}

fn get_doc_name<R>(archive: &mut ZipArchive<R>) -> Option<String>
where
    R: Seek + Read,
{
    let mut rels = archive.by_name("_rels/.rels").ok()?;
    let mut rels_buffer = String::new();
    rels.read_to_string(&mut rels_buffer).ok()?;

    let rel_xml = roxmltree::Document::parse(&rels_buffer).ok()?;

    let doc_name = rel_xml
        .descendants()
        .find(|elem| elem.attribute("Type") == Some(AttributeType::OfficeDocument.as_str()))
        .and_then(|elem| elem.attribute("Target"))
        .map(|target| target.trim_start_matches('/').to_owned());

    doc_name
}

pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::extract("<memory>", e))?;
    extract(&mut archive, "<memory>")
}

pub fn extract_text_from_path(file_path: &str) -> Result<String> {
    let file = File::open(file_path).map_err(|e| Error::io(file_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::extract(file_path, e))?;
    extract(&mut archive, file_path)
}

fn extract<R>(archive: &mut ZipArchive<R>, origin: &str) -> Result<String>
where
    R: Seek + Read,
{
    let start = Instant::now();

    let doc_name = get_doc_name(archive)
        .ok_or_else(|| Error::extract(origin, "could not find document name"))?;

    let mut document = archive
        .by_name(&doc_name)
        .map_err(|_| Error::extract(origin, format!("{doc_name} is missing from archive")))?;

    let mut buffer = String::new();
    document
        .read_to_string(&mut buffer)
        .map_err(|e| Error::extract(origin, e))?;

    let doc = roxmltree::Document::parse(&buffer).map_err(|e| Error::extract(origin, e))?;

    let paragraphs: Vec<String> = doc
        .descendants()
        .filter(|elem| elem.has_tag_name("p"))
        .map(|paragraph| {
            paragraph
                .descendants()
                .filter(|elem| elem.has_tag_name("t"))
                .filter_map(|elem| elem.text())
                .collect::<String>()
        })
        .collect();

    tracing::debug!(
        origin,
        paragraphs = paragraphs.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "extracted docx text"
    );

    Ok(paragraphs.join("\n"))
}
