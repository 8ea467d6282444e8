use thiserror::Error;

/// A parse failure, naming the production that could not be completed
/// and where the parser gave up. Backtracking restores position between
/// alternatives, so the reported error is the furthest point reached.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("expected {expected} at position {position}, found {found:?}")]
pub struct ParseError {
    pub position: usize,
    pub expected: &'static str,
    pub found: String,
}
