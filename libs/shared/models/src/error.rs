use thiserror::Error;

/// Errors raised while constructing or validating a booking contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("at least one court must be provided")]
    EmptyCourtPreference,

    #[error("target_time '{0}' does not match HH:MM")]
    InvalidTargetTime(String),

    #[error("request id is required to build a request from a reservation record")]
    MissingRequestId,
}
