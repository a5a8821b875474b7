pub mod config;
pub mod errors;
pub mod logger;
pub mod password;

pub use config::EnvLoader;
pub use config::*;
pub use errors::*;
pub use logger::*;
pub use password::*;
