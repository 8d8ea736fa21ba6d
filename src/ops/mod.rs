//! Transform operations.
//!
//! Each operation maps a fixed-length request frame to a response frame.
//! The operation is selected once at startup from the CLI token and passed
//! down by value; dispatch is a plain `match` over the two variants.

pub mod increment;
pub mod scalar_mult;

use bytes::Bytes;

/// The operation active for the process lifetime, selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Counter increment over 8-byte frames.
    Increment,
    /// Scalar multiplication over 32-byte frames.
    ScalarMult,
}

impl OperationKind {
    /// Number of request bytes the operation consumes.
    pub fn input_len(&self) -> usize {
        match self {
            OperationKind::Increment => increment::INPUT_LEN,
            OperationKind::ScalarMult => scalar_mult::INPUT_LEN,
        }
    }

    /// CLI token naming the operation.
    pub fn token(&self) -> &'static str {
        match self {
            OperationKind::Increment => "inc",
            OperationKind::ScalarMult => "mul",
        }
    }

    /// Apply the operation to a request frame of exactly `input_len()` bytes.
    pub fn transform(&self, input: &[u8]) -> Result<Bytes, OperationError> {
        match self {
            OperationKind::Increment => increment::transform(input),
            OperationKind::ScalarMult => scalar_mult::transform(input),
        }
    }
}

/// Resolve the startup token to an operation.
pub fn select(token: Option<&str>) -> Result<OperationKind, SelectError> {
    match token {
        None => Err(SelectError::Missing),
        Some("inc") => Ok(OperationKind::Increment),
        Some("mul") => Ok(OperationKind::ScalarMult),
        Some(other) => Err(SelectError::Unknown(other.to_string())),
    }
}

/// Operation selection errors
#[derive(Debug, PartialEq, Eq)]
pub enum SelectError {
    /// No operation token was given on the command line.
    Missing,
    /// The token matches no known operation.
    Unknown(String),
}

impl std::fmt::Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectError::Missing => {
                write!(f, "No operation given: use 'inc' or 'mul'")
            }
            SelectError::Unknown(token) => {
                write!(f, "Unknown operation '{}': use 'inc' or 'mul'", token)
            }
        }
    }
}

impl std::error::Error for SelectError {}

/// Errors raised by an operation's transform
#[derive(Debug, PartialEq, Eq)]
pub enum OperationError {
    /// The request frame does not match the declared input length.
    InputLength { expected: usize, got: usize },
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationError::InputLength { expected, got } => {
                write!(f, "Input length mismatch: expected {} bytes, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for OperationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_inc() {
        let kind = select(Some("inc")).unwrap();
        assert_eq!(kind, OperationKind::Increment);
        assert_eq!(kind.input_len(), 8);
        assert_eq!(kind.token(), "inc");
    }

    #[test]
    fn test_select_mul() {
        let kind = select(Some("mul")).unwrap();
        assert_eq!(kind, OperationKind::ScalarMult);
        assert_eq!(kind.input_len(), 32);
        assert_eq!(kind.token(), "mul");
    }

    #[test]
    fn test_select_unknown_token() {
        match select(Some("div")) {
            Err(SelectError::Unknown(token)) => assert_eq!(token, "div"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_select_missing_token() {
        assert_eq!(select(None), Err(SelectError::Missing));
    }

    #[test]
    fn test_transform_dispatch() {
        let response = OperationKind::Increment.transform(&[0u8; 8]).unwrap();
        assert_eq!(response.len(), 8);

        let response = OperationKind::ScalarMult.transform(&[0u8; 32]).unwrap();
        assert_eq!(response.len(), 32);
    }

    #[test]
    fn test_transform_rejects_wrong_length() {
        match OperationKind::Increment.transform(&[0u8; 4]) {
            Err(OperationError::InputLength { expected: 8, got: 4 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }
}
