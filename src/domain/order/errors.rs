// ============================================================================
// Order Errors
// ============================================================================

/// Programmer errors surfaced by the order processor.
///
/// Business-rule rejections and persistence failures are not errors at this
/// level; they collapse into a `false` processing result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid argument: {name} must be provided")]
    InvalidArgument { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    #[error("Amount cannot be empty")]
    Empty,

    #[error("Invalid amount: {0}")]
    InvalidDigits(String),

    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(String),

    #[error("Amount out of range: {0}")]
    Overflow(String),
}
