use thiserror;

/// The Result type for core48.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("the game is over; no further moves are accepted")]
    IllegalMove,

    #[error("invalid direction {0:?}, expected one of left/right/up/down")]
    InvalidDirection(String),
}
