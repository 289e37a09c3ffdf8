#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Request error")]
    Request(#[from] reqwest::Error),
    #[error("Malformed JSON payload")]
    Json(#[from] serde_json::Error),
    #[error("Malformed feed")]
    Feed(#[from] rss::Error),
    #[error("Io error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
