pub mod actor;
pub mod query_extractor;
pub mod validation_extractor;

pub use actor::{Actor, ClientIp};
pub use query_extractor::QueryExtractor;
pub use validation_extractor::ValidationExtractor;
