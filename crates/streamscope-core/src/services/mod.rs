//! Built-in services

pub mod bandcamp;
pub mod rumble;

pub use bandcamp::{BANDCAMP_ID, BandcampService};
pub use rumble::{RUMBLE_ID, RumbleService};
