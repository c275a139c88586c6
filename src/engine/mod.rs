pub mod board;
mod line;
pub mod transition;
