pub mod docx;
pub mod pdf;

pub use docx::extract_text_from_path as extract_docx_text;
pub use pdf::extract_text_from_path as extract_pdf_text;
