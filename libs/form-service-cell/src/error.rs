use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("missing required fields: {0:?}")]
    MissingFields(Vec<String>),

    #[error("could not fill any form fields")]
    NothingFilled,

    #[error("form validation failed: {0}")]
    ValidationFailed(String),

    #[error("form submission failed")]
    SubmitFailed,

    #[error("bot detection triggered - use a manual browser to book")]
    BotDetected,

    #[error("page interaction failed: {0}")]
    Page(#[from] browser_pool_cell::PoolError),
}
