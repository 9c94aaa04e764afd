pub mod error;
pub mod frequency;
pub mod generator;
pub mod index;
pub mod models;
pub mod snapshot;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
