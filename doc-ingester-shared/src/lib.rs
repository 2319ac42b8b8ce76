//! # Document Ingester Shared
//!
//! Wire and domain types shared by the document ingester crates: the
//! indexable [`Document`], the raw queue [`EventMessage`] and the resolved
//! [`Event`] that flows through the pipeline.

mod document;
mod event;

pub use document::{Document, Keyword, COMPOSITE_SITE};
pub use event::{Event, EventBody, EventMessage, PayloadRef, UnknownVerb, Verb};
