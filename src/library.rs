//! Library scanning: genre folder discovery and per-file track metadata.

mod artist;
mod display;
mod duration;
mod model;
mod scan;

pub use model::*;
pub use scan::{find_genre_folders, process_genre_folder};
