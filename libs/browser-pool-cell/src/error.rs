use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("no session backs court {0}")]
    NoSession(u32),

    #[error("browser engine error on court {court}: {source}")]
    Engine { court: u32, source: anyhow::Error },

    #[error("pool is not started")]
    NotStarted,

    #[error("webdriver connection failed: {0}")]
    Connect(#[from] fantoccini::error::NewSessionError),

    #[error("page command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),
}
