use thiserror::Error;

/// Internal tracker failures.
///
/// None of these ever reach the embedding page: the public tracker
/// surface catches every variant and degrades (less-accurate
/// attribution, a dropped event) instead of propagating.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The script tag's `src` was absent or unparseable, so no backend
    /// origin could be derived. Aborts the affected send only.
    #[error("backend origin could not be derived from script context")]
    MissingScriptContext,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
