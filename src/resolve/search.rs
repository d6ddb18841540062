//! Search URL resolution.

use tracing::debug;

use crate::env::{EnvSource, check_var, is_true, to_int};
use crate::error::{EnvError, EnvResult, Family};
use crate::query::QueryParams;
use crate::record::{ConfigRecord, ConfigValue};
use crate::url::UrlParts;

/// Search scheme registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchScheme {
    /// Elasticsearch 1.x.
    Elasticsearch,
    /// Elasticsearch 2.x.
    Elasticsearch2,
    /// Apache Solr.
    Solr,
    /// Whoosh.
    Whoosh,
    /// Xapian.
    Xapian,
    /// Non-indexing simple engine.
    Simple,
}

impl SearchScheme {
    /// Look up a scheme token.
    pub fn from_scheme(scheme: &str) -> EnvResult<Self> {
        match scheme {
            "elasticsearch" => Ok(Self::Elasticsearch),
            "elasticsearch2" => Ok(Self::Elasticsearch2),
            "solr" => Ok(Self::Solr),
            "whoosh" => Ok(Self::Whoosh),
            "xapian" => Ok(Self::Xapian),
            "simple" => Ok(Self::Simple),
            _ => Err(EnvError::UnknownScheme {
                family: Family::Search,
                scheme: scheme.to_string(),
            }),
        }
    }

    /// The engine identifier for this scheme.
    pub fn engine(&self) -> &'static str {
        match self {
            Self::Elasticsearch => {
                "haystack.backends.elasticsearch_backend.ElasticsearchSearchEngine"
            }
            Self::Elasticsearch2 => {
                "haystack.backends.elasticsearch2_backend.Elasticsearch2SearchEngine"
            }
            Self::Solr => "haystack.backends.solr_backend.SolrEngine",
            Self::Whoosh => "haystack.backends.whoosh_backend.WhooshEngine",
            Self::Xapian => "haystack.backends.xapian_backend.XapianEngine",
            Self::Simple => "haystack.backends.simple_backend.SimpleEngine",
        }
    }
}

/// Builder for search URL resolution.
///
/// ```
/// use prax_env::env::MapEnvSource;
/// use prax_env::resolve::SearchUrl;
///
/// let env = MapEnvSource::new().set("SEARCH_URL", "elasticsearch2://127.0.0.1:9200/index");
/// let config = SearchUrl::new().resolve(&env).unwrap();
/// assert_eq!(config.get_str("URL"), Some("http://127.0.0.1:9200"));
/// assert_eq!(config.get_str("INDEX_NAME"), Some("index"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchUrl {
    var: Option<String>,
    default_url: Option<String>,
    engine: Option<String>,
    options: ConfigRecord,
}

impl SearchUrl {
    /// Resolve from `SEARCH_URL`.
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

    /// Engine identifier override. The scheme must still be registered —
    /// the structural branches key on it.
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Explicit option, merged into the record last with an uppercased
    /// key, overriding anything the URL produced.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.options.insert(key, value);
        self
    }

    /// Resolve against an environment source.
    pub fn resolve(&self, env: &impl EnvSource) -> EnvResult<ConfigRecord> {
        let var = self.var.as_deref().unwrap_or(Family::Search.default_var());
        let url = check_var(env, var, self.default_url.as_deref())?;
        let mut config = resolve_url(&url, self.engine.as_deref())?;
        for (key, value) in &self.options {
            config.insert(key.to_uppercase(), value.clone());
        }
        Ok(config)
    }
}

fn resolve_url(url: &str, engine_override: Option<&str>) -> EnvResult<ConfigRecord> {
    let parts = UrlParts::decompose(url)?;
    let mut path = parts.decoded_path();

    let scheme = SearchScheme::from_scheme(&parts.scheme)?;
    let engine = match engine_override {
        Some(engine) if !engine.is_empty() => engine.to_string(),
        _ => scheme.engine().to_string(),
    };

    debug!(scheme = %parts.scheme, "search URL resolved");
    let mut config = ConfigRecord::new();
    config.insert("ENGINE", engine);

    let params = QueryParams::parse(&parts.query);
    if let Some(indexes) = params.get("EXCLUDED_INDEXES") {
        let indexes: Vec<String> = indexes.split(',').map(str::to_string).collect();
        config.insert("EXCLUDED_INDEXES", indexes);
    }
    if let Some(spelling) = params.get("INCLUDE_SPELLING") {
        config.insert("INCLUDE_SPELLING", is_true(spelling));
    }
    if let Some(batch) = params.get("BATCH_SIZE") {
        config.insert("BATCH_SIZE", to_int(batch));
    }

    if scheme == SearchScheme::Simple {
        return Ok(config);
    }
    if matches!(
        scheme,
        SearchScheme::Solr | SearchScheme::Elasticsearch | SearchScheme::Elasticsearch2
    ) {
        if let Some(kwargs) = params.get("KWARGS") {
            config.insert("KWARGS", kwargs);
        }
    }

    if let Some(stripped) = path.strip_suffix('/') {
        path = stripped.to_string();
    }

    if scheme == SearchScheme::Solr {
        config.insert("URL", http_url(&parts.netloc, &path));
        if let Some(timeout) = params.get("TIMEOUT") {
            config.insert("TIMEOUT", to_int(timeout));
        }
        return Ok(config);
    }

    if matches!(
        scheme,
        SearchScheme::Elasticsearch | SearchScheme::Elasticsearch2
    ) {
        // The last path segment is the index; anything before it is a
        // URL prefix.
        let (prefix, index) = match path.rsplit_once('/') {
            Some((prefix, index)) => (prefix.to_string(), index.to_string()),
            None => (String::new(), path),
        };
        config.insert("URL", http_url(&parts.netloc, &prefix));
        if let Some(timeout) = params.get("TIMEOUT") {
            config.insert("TIMEOUT", to_int(timeout));
        }
        config.insert("INDEX_NAME", index);
        return Ok(config);
    }

    config.insert("PATH", format!("/{path}"));
    match scheme {
        SearchScheme::Whoosh => {
            if let Some(storage) = params.get("STORAGE") {
                config.insert("STORAGE", storage);
            }
            if let Some(limit) = params.get("POST_LIMIT") {
                config.insert("POST_LIMIT", to_int(limit));
            }
        }
        SearchScheme::Xapian => {
            if let Some(flags) = params.get("FLAGS") {
                config.insert("FLAGS", flags);
            }
        }
        _ => {}
    }

    Ok(config)
}

/// Rebuild an `http://` endpoint from the verbatim authority and a
/// decoded path.
fn http_url(netloc: &str, path: &str) -> String {
    if path.is_empty() {
        format!("http://{netloc}")
    } else if let Some(absolute) = path.strip_prefix('/') {
        format!("http://{netloc}/{absolute}")
    } else {
        format!("http://{netloc}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnvSource;

    fn resolve(url: &str) -> ConfigRecord {
        let env = MapEnvSource::new().set("SEARCH_URL", url);
        SearchUrl::new().resolve(&env).unwrap()
    }

    #[test]
    fn test_elasticsearch2_url() {
        let config = resolve("elasticsearch2://127.0.0.1:9200/index");
        assert_eq!(
            config.get_str("ENGINE"),
            Some("haystack.backends.elasticsearch2_backend.Elasticsearch2SearchEngine")
        );
        assert_eq!(config.get_str("URL"), Some("http://127.0.0.1:9200"));
        assert_eq!(config.get_str("INDEX_NAME"), Some("index"));

        let keys: Vec<&str> = config.keys().collect();
        assert_eq!(keys, ["ENGINE", "URL", "INDEX_NAME"]);
    }

    #[test]
    fn test_elasticsearch_prefix_split() {
        let config = resolve("elasticsearch://es.example.com:9200/search/main-index/");
        assert_eq!(config.get_str("URL"), Some("http://es.example.com:9200/search"));
        assert_eq!(config.get_str("INDEX_NAME"), Some("main-index"));
    }

    #[test]
    fn test_elasticsearch_no_index() {
        let config = resolve("elasticsearch://es.example.com:9200/");
        assert_eq!(config.get_str("URL"), Some("http://es.example.com:9200"));
        assert_eq!(config.get_str("INDEX_NAME"), Some(""));
    }

    #[test]
    fn test_solr_url() {
        let config = resolve("solr://solr.example.com:8983/solr/collection1?TIMEOUT=10");
        assert_eq!(
            config.get_str("ENGINE"),
            Some("haystack.backends.solr_backend.SolrEngine")
        );
        assert_eq!(
            config.get_str("URL"),
            Some("http://solr.example.com:8983/solr/collection1")
        );
        assert_eq!(config.get_int("TIMEOUT"), Some(10));
        assert!(!config.contains_key("INDEX_NAME"));
    }

    #[test]
    fn test_whoosh_path() {
        let config = resolve("whoosh:///var/search/index?STORAGE=file&POST_LIMIT=128000");
        assert_eq!(config.get_str("PATH"), Some("/var/search/index"));
        assert_eq!(config.get_str("STORAGE"), Some("file"));
        assert_eq!(config.get_int("POST_LIMIT"), Some(128000));
    }

    #[test]
    fn test_xapian_flags() {
        let config = resolve("xapian:///var/search/xapian?FLAGS=myflags");
        assert_eq!(config.get_str("PATH"), Some("/var/search/xapian"));
        assert_eq!(config.get_str("FLAGS"), Some("myflags"));
    }

    #[test]
    fn test_simple_returns_engine_only() {
        let config = resolve("simple:///?BATCH_SIZE=100&KWARGS=ignored");
        assert_eq!(
            config.get_str("ENGINE"),
            Some("haystack.backends.simple_backend.SimpleEngine")
        );
        assert_eq!(config.get_int("BATCH_SIZE"), Some(100));
        assert!(!config.contains_key("KWARGS"));
        assert!(!config.contains_key("PATH"));
    }

    #[test]
    fn test_common_options() {
        let config = resolve(
            "elasticsearch://host:9200/index?EXCLUDED_INDEXES=a.idx,b.idx&INCLUDE_SPELLING=true&BATCH_SIZE=200",
        );
        assert_eq!(
            config["EXCLUDED_INDEXES"].as_list(),
            Some(&["a.idx".to_string(), "b.idx".to_string()][..])
        );
        assert_eq!(config.get_bool("INCLUDE_SPELLING"), Some(true));
        assert_eq!(config.get_int("BATCH_SIZE"), Some(200));
    }

    #[test]
    fn test_kwargs_for_elasticsearch() {
        let config = resolve("elasticsearch://host:9200/index?KWARGS=timeout%3D60");
        assert_eq!(config.get_str("KWARGS"), Some("timeout=60"));
    }

    #[test]
    fn test_unknown_scheme_even_with_engine_override() {
        let env = MapEnvSource::new().set("SEARCH_URL", "sphinx://host:9312/index");
        let err = SearchUrl::new().engine("custom.Engine").resolve(&env).unwrap_err();
        assert!(matches!(
            err,
            EnvError::UnknownScheme { family: Family::Search, scheme } if scheme == "sphinx"
        ));
    }

    #[test]
    fn test_engine_override() {
        let env = MapEnvSource::new().set("SEARCH_URL", "whoosh:///var/index");
        let config = SearchUrl::new().engine("custom.Engine").resolve(&env).unwrap();
        assert_eq!(config.get_str("ENGINE"), Some("custom.Engine"));
        assert_eq!(config.get_str("PATH"), Some("/var/index"));
    }

    #[test]
    fn test_explicit_options_override_record() {
        let env = MapEnvSource::new().set("SEARCH_URL", "solr://host:8983/core?TIMEOUT=10");
        let config = SearchUrl::new().option("timeout", 60i64).resolve(&env).unwrap();
        assert_eq!(config.get_int("TIMEOUT"), Some(60));
    }

    #[test]
    fn test_missing_var() {
        let env = MapEnvSource::new();
        let err = SearchUrl::new().resolve(&env).unwrap_err();
        assert!(matches!(err, EnvError::MissingVar(var) if var == "SEARCH_URL"));
    }
}
