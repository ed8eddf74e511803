use thiserror::Error;

/// A BVH document that does not follow the grammar.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {message}")]
pub struct FormatError {
    /// 1-based line of the offending token (the last line for unexpected end of input).
    pub line: usize,
    pub message: String,
}

impl FormatError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        FormatError {
            line,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum BvhError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("BVH format error: {0}")]
    Format(#[from] FormatError),
}
