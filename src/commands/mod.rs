pub mod config;
pub mod permissions;
pub mod recording;

pub use config::*;
pub use permissions::*;
pub use recording::*;
