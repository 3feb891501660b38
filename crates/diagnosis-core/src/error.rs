/// Error types shared by the diagnosis components.
///
/// These errors represent failures in the scoring, persistence and rendering layers.
/// The HTTP layer wraps `CoreError` via `#[from]` and decides which variants are the
/// caller's fault (validation) and which are internal.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("spreadsheet read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("chart error: {0}")]
    Chart(String),

    #[error("catalogue error: {0}")]
    Catalogue(String),

    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("invalid report payload: {0}")]
    InvalidReport(String),
}
