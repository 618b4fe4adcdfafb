//! Identifier types for catalog entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a product or cart line (e.g. `p1`).
/// Opaque to the conversion engine; only carried through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_is_transparent() {
        let id = ProductId::from("p1");
        assert_eq!(id.as_str(), "p1");
        assert_eq!(id.to_string(), "p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
    }
}
