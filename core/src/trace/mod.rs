pub mod parser;
pub mod sample;

pub use parser::TraceParser;
pub use sample::{Sample, Trace, TraceMetadata};
