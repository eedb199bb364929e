//! Rust language front end

pub mod parser;

pub use parser::RustNodeParser;
