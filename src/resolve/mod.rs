//! Family resolvers: one module per connection URL convention.
//!
//! Each family follows the same shape: a scheme registry enum, a request
//! builder with `var` / `default_url` / override / `option` chainers, and
//! a `resolve` that reads the variable through [`check_var`](crate::env::check_var)
//! and produces an ordered [`ConfigRecord`](crate::record::ConfigRecord).

mod cache;
mod database;
mod email;
mod queue;
mod search;

pub use cache::{CacheScheme, CacheUrl};
pub use database::{DatabaseUrl, DbScheme};
pub use email::{EmailScheme, EmailUrl};
pub use queue::{QueueScheme, QueueUrl};
pub use search::{SearchScheme, SearchUrl};

use crate::env::EnvSource;
use crate::error::EnvResult;
use crate::record::ConfigRecord;

/// Resolve `DATABASE_URL` with the default settings.
pub fn database_url(env: &impl EnvSource) -> EnvResult<ConfigRecord> {
    DatabaseUrl::new().resolve(env)
}

/// Resolve `CACHE_URL` with the default settings.
pub fn cache_url(env: &impl EnvSource) -> EnvResult<ConfigRecord> {
    CacheUrl::new().resolve(env)
}

/// Resolve `EMAIL_URL` with the default settings.
pub fn email_url(env: &impl EnvSource) -> EnvResult<ConfigRecord> {
    EmailUrl::new().resolve(env)
}

/// Resolve `SEARCH_URL` with the default settings.
pub fn search_url(env: &impl EnvSource) -> EnvResult<ConfigRecord> {
    SearchUrl::new().resolve(env)
}

/// Resolve `QUEUE_URL` with the default settings.
pub fn queue_url(env: &impl EnvSource) -> EnvResult<ConfigRecord> {
    QueueUrl::new().resolve(env)
}
