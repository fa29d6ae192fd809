pub mod auth;
pub mod rate_limit;
pub mod webhook;

pub use auth::auth_middleware;
pub use rate_limit::apply_rate_limit;
pub use webhook::webhook_auth_middleware;
