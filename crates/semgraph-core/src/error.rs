use thiserror::Error;

/// Raised when a label does not name a known enum variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown proximity: {0} (expected same_sentence, same_section or same_page)")]
    Proximity(String),
    #[error("Unknown position: {0} (expected h1, h2, h3, body, alt_text or meta)")]
    Position(String),
    #[error("Unknown edge category: {0} (expected ROOT, UNIQUE, RARE or COMMON)")]
    Category(String),
}
