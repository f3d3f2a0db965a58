#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store serialization error: {0}")]
    Serialization(String),

    #[error("store watch error: {0}")]
    Watch(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}
