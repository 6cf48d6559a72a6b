//! Caller-supplied HTTP basic authentication

use httprpc_core::models::AuthConfig;
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn to_basic_auth(&self) -> String {
        use base64::Engine;
        let credentials = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

impl From<&AuthConfig> for BasicAuth {
    fn from(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

// Keep the password out of logs.
impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
