//! Reading and writing delimited customer files.

mod parser;
mod source;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;
pub use writer::{to_delimited_string, write_dataset};
