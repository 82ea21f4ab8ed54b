use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuessingError {
    #[error("could not determine a usable video kind from {0:?}")]
    Unrecognized(String),

    #[error("guess asserts episode but is missing series, season, or episode/episode_title in {0:?}")]
    IncompleteEpisode(String),

    #[error("guess asserts movie but is missing a title in {0:?}")]
    IncompleteMovie(String),
}
