pub mod discount;
pub mod error;
pub mod handlers;
pub mod janitor;
pub mod materializer;
pub mod models;
pub mod pricing;
pub mod service;

pub use discount::*;
pub use error::*;
pub use handlers::*;
pub use janitor::*;
pub use materializer::*;
pub use models::*;
pub use pricing::*;
pub use service::*;
