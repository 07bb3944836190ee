//! Per-request database connection parameters.

/// Credentials and target for one database operation.
///
/// Supplied with each request and never stored. `database` is omitted for
/// server-level operations (listing or creating databases) and required for
/// everything else.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub user: String,
    /// May legitimately be empty (e.g. local root without a password).
    pub password: String,
    pub database: Option<String>,
}

impl ConnectionParams {
    /// Server-level parameters without a database selected.
    pub fn server(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: None,
        }
    }

    /// Parameters targeting a specific database.
    pub fn for_database(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: Some(database.into()),
        }
    }

    /// The same credentials with no database selected.
    pub fn without_database(&self) -> Self {
        Self {
            host: self.host.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: None,
        }
    }
}
