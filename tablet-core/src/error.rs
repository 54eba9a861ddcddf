use thiserror::Error;

/// Precondition violations detected by the template before reaching the executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The entity to update does not carry a value for the primary key field.
    #[error("Please determine `{0}` for update")]
    MissingPrimaryKey(String),
}
