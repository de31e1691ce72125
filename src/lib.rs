pub mod cmd;
pub mod config;
pub mod corpus;
pub mod error;
pub mod matcher;
pub mod parsers;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use corpus::{DirectorySource, DocumentSource, MemorySource};
pub use error::{Error, Result};
pub use matcher::Matcher;
pub use types::{Answer, Document, FileType, MatchResult, RefusalReason};
pub use utils::{parse_filetype, read_stop_words_from_file, read_stop_words_from_mem};
