use thiserror::Error;

/// Errors raised while mapping entities to and from records.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("column {column}: {source}")]
    Field {
        column: String,
        #[source]
        source: Box<ModelError>,
    },

    #[error(transparent)]
    Types(#[from] tetra_types::Error),
}

impl ModelError {
    /// Attaches the column being decoded to an error.
    #[must_use]
    pub fn in_column(self, column: impl Into<String>) -> Self {
        ModelError::Field {
            column: column.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for mapping operations.
pub type ModelResult<T> = Result<T, ModelError>;
