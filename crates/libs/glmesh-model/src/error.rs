/// Errors from loading or saving persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("state document: {0}")]
    Json(#[from] serde_json::Error),
}
