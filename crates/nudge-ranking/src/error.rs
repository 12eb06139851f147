use thiserror::Error;

/// Errors that abort a ranking run.
///
/// Per-candidate fetch and parse failures are not errors; they surface as
/// warnings on the run result.
#[derive(Debug, Error)]
pub enum RankingError {
    /// The cancellation token fired during search or feed retrieval.
    #[error("ranking run cancelled")]
    Cancelled,
}
