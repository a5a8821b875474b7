pub mod jwt;
pub mod middleware;
pub mod models;
pub mod permissions;

pub use jwt::*;
pub use middleware::*;
pub use models::*;
pub use permissions::*;
