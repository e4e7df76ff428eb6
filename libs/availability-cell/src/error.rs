use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("court {0} page was not ready within the extraction timeout")]
    NotReady(u32),

    #[error("court {0} page interaction failed: {1}")]
    Page(u32, #[source] browser_pool_cell::PoolError),

    #[error("malformed day-section payload: {0}")]
    MalformedPayload(String),
}
