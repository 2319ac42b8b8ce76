//! Messages passed from the consumer to the orchestrator.

/// A message on the consumer channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// Raw event bodies, one per input line, in input order.
    Events(Vec<String>),
    /// The input is exhausted or the consumer was asked to stop.
    End,
    /// A read error; the consumer keeps going.
    Error(String),
}
