use crate::error::FetchError;

/// A user-entered location, checked to be non-blank.
///
/// The text is kept exactly as typed (whitespace and case included); the
/// provider does its own matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        if input.trim().is_empty() {
            return Err(FetchError::InvalidInput);
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LocationQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
