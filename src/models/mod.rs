// Data models (structs)
pub mod auth;
pub mod settings;
pub mod warranty;

pub use auth::*;
pub use settings::*;
pub use warranty::*;
