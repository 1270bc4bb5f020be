use super::error::{CouchDaoError, CouchResult};

/// Connection settings for the CouchDB state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchConfig {
    /// Server URL, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database holding the state documents.
    pub database: String,
    /// Basic-auth user name and password.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Construct a configuration from explicit base URL and database name.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            credentials: None,
        }
    }

    /// Read `COUCH_BASE_URL`, `COUCH_DB`, and the optional `COUCH_USERNAME`/`COUCH_PASSWORD` pair.
    pub fn from_env() -> CouchResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> CouchResult<Self> {
        let required = |var: &'static str| lookup(var).ok_or(CouchDaoError::MissingEnvVar { var });

        let mut config = Self::new(required("COUCH_BASE_URL")?, required("COUCH_DB")?);
        config.credentials = lookup("COUCH_USERNAME").zip(lookup("COUCH_PASSWORD"));
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_need_both_halves() {
        let config = CouchConfig::from_vars(|name| match name {
            "COUCH_BASE_URL" => Some("http://couch:5984".into()),
            "COUCH_DB" => Some("trivia".into()),
            "COUCH_USERNAME" => Some("admin".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config, CouchConfig::new("http://couch:5984", "trivia"));
    }

    #[test]
    fn database_name_is_required() {
        let err = CouchConfig::from_vars(|name| {
            (name == "COUCH_BASE_URL").then(|| "http://couch:5984".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, CouchDaoError::MissingEnvVar { var: "COUCH_DB" }));
    }
}
