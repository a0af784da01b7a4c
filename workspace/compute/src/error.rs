use rust_decimal::Decimal;
use thiserror::Error;

/// Failures of the analytics computations
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The requested reporting window cannot be built
    #[error("{0}")]
    InvalidWindow(String),

    /// A running total left the representable decimal range
    #[error("Amount overflow while computing {0}")]
    Overflow(&'static str),
}

pub type Result<T> = std::result::Result<T, ComputeError>;

/// `a + b`, or an overflow error naming `what` was being summed.
pub(crate) fn checked_sum(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_add(b).ok_or(ComputeError::Overflow(what))
}

/// `a - b`, or an overflow error naming `what` was being computed.
pub(crate) fn checked_diff(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_sub(b).ok_or(ComputeError::Overflow(what))
}
