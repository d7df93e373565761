pub mod admin;
pub mod auth;
pub mod rate_limit;

pub use admin::{AdminGuard, EmptyBody};
pub use auth::{require_user, AuthUser, MaybeUser};
pub use rate_limit::{limit_reads, limit_writes, Admission, Bucket, RateLimit, WindowLimiter};
