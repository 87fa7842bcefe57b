//! Authentication token sent in the `hello` message.

use serde::Deserialize;

use crate::value::Value;

/// Scheme name for username/password authentication.
pub const BASIC_SCHEME: &str = "basic";

/// Authentication token.
///
/// `Debug` output never includes the credentials.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthToken {
    pub scheme: String,
    pub principal: String,
    pub credentials: String,
}

impl AuthToken {
    pub fn new(
        scheme: impl Into<String>,
        principal: impl Into<String>,
        credentials: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            principal: principal.into(),
            credentials: credentials.into(),
        }
    }

    /// Username/password token.
    pub fn basic(principal: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self::new(BASIC_SCHEME, principal, credentials)
    }

    /// The token as a map value with `scheme`, `principal` and `credentials`.
    pub fn to_value(&self) -> Value {
        Value::map([
            ("scheme", Value::from(self.scheme.as_str())),
            ("principal", Value::from(self.principal.as_str())),
            ("credentials", Value::from(self.credentials.as_str())),
        ])
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("scheme", &self.scheme)
            .field("principal", &self.principal)
            .field("credentials", &"<redacted>")
            .finish()
    }
}
