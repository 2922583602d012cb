pub mod clock;
pub mod errors;
pub mod retry;
pub mod validations;

pub use clock::{Clock, SystemClock};
pub use errors::{AppError, DomainError, InfraError};
pub use retry::{retry_with_backoff, RetryConfig};
