use derive_more::{Display, From};

/// Identifier of a reader slot holding a card
///
/// For PC/SC this is the reader name. The value is a snapshot taken at
/// enumeration time and is opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{_0}")]
pub struct CardId(String);

impl CardId {
    /// Create an id from a reader name
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_display() {
        let id = CardId::from("reader0:card-ABC");
        assert_eq!(id.to_string(), "reader0:card-ABC");
        assert_eq!(id.as_str(), "reader0:card-ABC");
        assert_eq!(id, CardId::new(String::from("reader0:card-ABC")));
    }
}
