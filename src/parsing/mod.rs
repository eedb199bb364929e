//! Source front ends turning files into code-node entities.

pub mod language;
pub mod parser;
pub mod python;
pub mod rust;
pub mod walker;

pub use language::Language;
pub use parser::{CodeNodeParser, ParseError, ParseResult, create_parser};
pub use python::PythonNodeParser;
pub use rust::RustNodeParser;
pub use walker::{CodeCollection, FileWalker, IGNORE_FILE_NAME, collect_code_nodes};
