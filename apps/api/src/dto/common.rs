mod conversions;
mod types;

pub use types::{HealthResponse, UserIdentityResponse};
