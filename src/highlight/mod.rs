//! Syntax highlighting - simplified classes, tokenization and run segmentation.

mod class;
mod segment;
mod tokenizer;

pub use class::*;
pub use segment::*;
pub use tokenizer::*;
