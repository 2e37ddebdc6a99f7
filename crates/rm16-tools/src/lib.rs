pub mod model;

pub use model::{listing, load_raw_bin, read_word, save_raw_bin, Image, ListingLine};
