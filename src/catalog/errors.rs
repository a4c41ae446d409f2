//! # Catalog Errors

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog errors
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Index '{index}' has a malformed key-expression payload: {detail}")]
    MalformedIndexExpressions { index: String, detail: String },
}

impl CatalogError {
    /// Create a malformed-index error from a deserialization failure
    pub fn malformed_index(index: impl Into<String>, detail: impl ToString) -> Self {
        CatalogError::MalformedIndexExpressions {
            index: index.into(),
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_the_index() {
        let err = CatalogError::malformed_index("ix_doc", "expected value at line 1");
        let display = format!("{}", err);
        assert!(display.contains("ix_doc"));
        assert!(display.contains("malformed"));
    }
}
