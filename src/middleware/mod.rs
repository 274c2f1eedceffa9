pub mod body;
pub mod cors;
pub mod response;

pub use body::LooseJson;
pub use cors::cors_layer;
pub use response::{ApiMessage, ApiResult};
