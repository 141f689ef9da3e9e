use tokio_tungstenite::tungstenite;

#[derive(Debug, thiserror::Error)]
pub enum VapiError {
    #[error("Invalid API base URL '{0}': {1}")]
    InvalidBaseUrl(String, String),
    #[error("Client has no event subscriber")]
    NotSubscribed,
    #[error("A call is already in progress")]
    CallInProgress,
    #[error("Call creation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Call creation rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Call {0} has no call channel URL")]
    MissingCallUrl(String),
    #[error("Failed to open call channel: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("Call channel failed: {0}")]
    Channel(#[source] tungstenite::Error),
    #[error("Call was stopped before it connected")]
    Cancelled,
}
