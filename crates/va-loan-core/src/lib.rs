pub mod error;
pub mod policy;
pub mod time_value;
pub mod types;
mod validation;

#[cfg(feature = "va")]
pub mod va;

#[cfg(feature = "mortgage")]
pub mod mortgage;

pub use error::VaLoanError;
pub use policy::VaLoanPolicy;
pub use types::*;

/// Standard result type for all VA loan calculations
pub type VaLoanResult<T> = Result<T, VaLoanError>;
