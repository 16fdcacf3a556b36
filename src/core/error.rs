use super::types::Product;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("{field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("{product} expects {expected} inputs")]
    InputMismatch {
        product: Product,
        expected: &'static str,
    },
}

impl ProjectionError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
