//! Extraction engine adapters.

mod builtin;

pub use builtin::BuiltinExtractionEngine;
