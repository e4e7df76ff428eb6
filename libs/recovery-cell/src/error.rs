use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("browser pool error during recovery: {0}")]
    Pool(#[from] browser_pool_cell::PoolError),

    #[error("no strategy succeeded after {attempted} attempt(s)")]
    Exhausted { attempted: usize },
}
