//! Bearer-token authentication for the REST surface

pub mod middleware;
pub mod service;

pub use middleware::{AuthAccount, jwt_auth_middleware};
pub use service::{Claims, JwtAuth};
