pub mod config;
pub mod error;
pub mod types;

pub use config::{config, VisConfig};
pub use error::{Result, VisError};
pub use types::{ActorId, Colour, FileId, Timestamp};
