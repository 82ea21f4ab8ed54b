//! Video identification (C2): the `Video` sum type and the filename guesser
//! that constructs one.

mod error;
mod guess;
mod types;

pub use error::GuessingError;
pub use guess::{guess_from_name, video_from_name, GuessDict, GuessKind};
pub use types::{Episode, Movie, Video, VideoHeader, VideoKind};
