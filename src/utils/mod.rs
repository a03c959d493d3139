pub mod colors;
pub mod date;
pub mod formatting;
pub mod path;
pub mod time;

pub use formatting::secs2readable;
