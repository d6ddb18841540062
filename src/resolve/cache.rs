//! Cache URL resolution.

use tracing::debug;

use crate::env::{EnvSource, check_var};
use crate::error::{EnvError, EnvResult, Family};
use crate::query::QueryParams;
use crate::record::{ConfigRecord, ConfigValue};
use crate::url::UrlParts;

/// Query options promoted to the top level of a cache record.
const CACHE_BASE_OPTIONS: [&str; 5] = [
    "TIMEOUT",
    "KEY_PREFIX",
    "VERSION",
    "KEY_FUNCTION",
    "BINARY",
];

/// Cache scheme registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScheme {
    /// Database-table cache (`dbcache`).
    Db,
    /// Dummy cache (`dummycache`).
    Dummy,
    /// File-based cache (`filecache`).
    File,
    /// Local-memory cache (`locmemcache`).
    LocMem,
    /// Memcached (`memcache`, `unix`).
    Memcached,
    /// Memcached via pylibmc (`pymemcache`).
    PyLibMc,
    /// Redis (`redis`, `rediscache`).
    Redis,
}

impl CacheScheme {
    /// Look up a scheme token.
    pub fn from_scheme(scheme: &str) -> EnvResult<Self> {
        match scheme {
            "dbcache" => Ok(Self::Db),
            "dummycache" => Ok(Self::Dummy),
            "filecache" => Ok(Self::File),
            "locmemcache" => Ok(Self::LocMem),
            "memcache" | "unix" => Ok(Self::Memcached),
            "pymemcache" => Ok(Self::PyLibMc),
            "redis" | "rediscache" => Ok(Self::Redis),
            _ => Err(EnvError::UnknownScheme {
                family: Family::Cache,
                scheme: scheme.to_string(),
            }),
        }
    }

    /// The backend identifier for this scheme.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Db => "django.core.cache.backends.db.DatabaseCache",
            Self::Dummy => "django.core.cache.backends.dummy.DummyCache",
            Self::File => "django.core.cache.backends.filebased.FileBasedCache",
            Self::LocMem => "django.core.cache.backends.locmem.LocMemCache",
            Self::Memcached => "django.core.cache.backends.memcached.MemcachedCache",
            Self::PyLibMc => "django.core.cache.backends.memcached.PyLibMCCache",
            Self::Redis => "django_redis.cache.RedisCache",
        }
    }
}

/// Builder for cache URL resolution.
///
/// ```
/// use prax_env::env::MapEnvSource;
/// use prax_env::resolve::CacheUrl;
///
/// let env = MapEnvSource::new().set("CACHE_URL", "redis://localhost:6379/5");
/// let config = CacheUrl::new().resolve(&env).unwrap();
/// assert_eq!(config.get_str("LOCATION"), Some("redis://localhost:6379/5"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheUrl {
    var: Option<String>,
    default_url: Option<String>,
    backend: Option<String>,
    options: ConfigRecord,
}

impl CacheUrl {
    /// Resolve from `CACHE_URL`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a different variable instead.
    pub fn var(mut self, var: impl Into<String>) -> Self {
        self.var = Some(var.into());
        self
    }

    /// Fallback URL used when the variable is not set.
    pub fn default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    /// Backend identifier override. A non-empty override suppresses the
    /// scheme lookup.
    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Explicit option, merged into `OPTIONS` last with the key as given.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.options.insert(key, value);
        self
    }

    /// Resolve against an environment source.
    pub fn resolve(&self, env: &impl EnvSource) -> EnvResult<ConfigRecord> {
        let var = self.var.as_deref().unwrap_or(Family::Cache.default_var());
        let url = check_var(env, var, self.default_url.as_deref())?;
        resolve_url(&url, self.backend.as_deref(), &self.options)
    }
}

fn resolve_url(
    url: &str,
    backend_override: Option<&str>,
    explicit: &ConfigRecord,
) -> EnvResult<ConfigRecord> {
    let parts = UrlParts::decompose(url)?;

    let backend = match backend_override {
        Some(backend) if !backend.is_empty() => backend.to_string(),
        _ => CacheScheme::from_scheme(&parts.scheme)?.backend().to_string(),
    };

    let mut config = ConfigRecord::new();
    config.insert("BACKEND", backend);
    config.insert("LOCATION", collapse(split_netloc(&parts.netloc)));

    if parts.scheme == "filecache" {
        config.insert("LOCATION", format!("{}{}", parts.netloc, parts.path));
    }

    if !parts.path.is_empty()
        && matches!(parts.scheme.as_str(), "memcache" | "pymemcache" | "unix")
    {
        config.insert("LOCATION", format!("unix:{}", parts.path));
    } else if parts.scheme.starts_with("redis") {
        let segment = if parts.host.is_empty() {
            "unix".to_string()
        } else {
            parts.scheme.replace("cache", "")
        };
        let locations: Vec<String> = parts
            .netloc
            .split(',')
            .map(|loc| format!("{segment}://{loc}{}", parts.path))
            .collect();
        config.insert("LOCATION", collapse(locations));
    }

    let params = QueryParams::parse(&parts.query);
    let (promoted, opaque) = params.partition(&CACHE_BASE_OPTIONS);
    for (key, value) in promoted {
        config.insert(key, value);
    }
    let mut cache_options = ConfigRecord::new();
    for (key, value) in opaque {
        cache_options.insert(key.to_uppercase(), value);
    }
    for (key, value) in explicit {
        cache_options.insert(key.as_str(), value.clone());
    }
    // Cache records always carry OPTIONS, even empty.
    config.insert("OPTIONS", cache_options);

    debug!(scheme = %parts.scheme, keys = config.len(), "cache URL resolved");
    Ok(config)
}

fn split_netloc(netloc: &str) -> Vec<String> {
    netloc.split(',').map(str::to_string).collect()
}

fn collapse(mut locations: Vec<String>) -> ConfigValue {
    if locations.len() == 1 {
        ConfigValue::Str(locations.remove(0))
    } else {
        ConfigValue::List(locations)
    }
}
