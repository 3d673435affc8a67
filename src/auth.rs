//! Auth plugins
//!
//! A plugin shapes the identity payload POSTed to the tokens endpoint. It
//! never talks to the network itself; the client does that and classifies
//! whatever comes back.

use std::collections::HashMap;
use std::fmt;

use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Option names each built-in plugin requires, in the order they are
/// reported when missing.
const PASSWORD_OPTIONS: &[&str] = &["username", "password"];
const TOKEN_OPTIONS: &[&str] = &["token"];

/// Builds the identity portion of a token request
pub trait AuthPlugin: fmt::Debug + Send + Sync {
    /// Stable plugin name, as selected by configuration.
    fn name(&self) -> &'static str;
    /// The JSON body POSTed to the tokens endpoint.
    fn payload(&self) -> Value;
}

/// Password authentication
pub struct PasswordAuth {
    username: String,
    password: String,
    domain: Option<String>,
}

impl PasswordAuth {
    /// Authenticate as a user of the default domain.
    pub fn new(username: &str, password: &str) -> Self {
        PasswordAuth {
            username: username.to_string(),
            password: password.to_string(),
            domain: None,
        }
    }

    /// Scope the user to a named domain.
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }
}

impl fmt::Debug for PasswordAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

impl AuthPlugin for PasswordAuth {
    fn name(&self) -> &'static str {
        "password"
    }

    fn payload(&self) -> Value {
        json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": self.username,
                            "domain": {"name": self.domain.as_deref().unwrap_or("Default")},
                            "password": self.password,
                        }
                    }
                }
            }
        })
    }
}

/// Re-authentication with an existing token
#[derive(Debug)]
pub struct TokenAuth {
    token: String,
}

impl TokenAuth {
    /// Authenticate with a previously issued token id.
    pub fn new(token: &str) -> Self {
        TokenAuth {
            token: token.to_string(),
        }
    }
}

impl AuthPlugin for TokenAuth {
    fn name(&self) -> &'static str {
        "token"
    }

    fn payload(&self) -> Value {
        json!({
            "auth": {
                "identity": {
                    "methods": ["token"],
                    "token": {"id": self.token},
                }
            }
        })
    }
}

/// Instantiate a plugin by name from flat string options.
///
/// Unknown names are [`Error::NoMatchingPlugin`]; a known plugin with
/// missing or empty required options is [`Error::AuthPluginOptionsMissing`]
/// listing every missing option.
pub fn load_plugin(name: &str, options: &HashMap<String, String>) -> Result<Box<dyn AuthPlugin>> {
    match name {
        "password" => {
            require_options(options, PASSWORD_OPTIONS)?;
            let mut plugin = PasswordAuth::new(&options["username"], &options["password"]);
            if let Some(domain) = options.get("domain") {
                plugin = plugin.domain(domain);
            }
            Ok(Box::new(plugin))
        }
        "token" => {
            require_options(options, TOKEN_OPTIONS)?;
            Ok(Box::new(TokenAuth::new(&options["token"])))
        }
        other => Err(Error::NoMatchingPlugin {
            name: other.to_string(),
        }),
    }
}

/// Resolve a plugin through the legacy configuration path, where the
/// `auth_system` option names the system and defaults to "password".
///
/// Naming a system no plugin provides is [`Error::AuthSystemNotFound`]
/// carrying the configured name.
pub fn plugin_from_options(options: &HashMap<String, String>) -> Result<Box<dyn AuthPlugin>> {
    let system = options
        .get("auth_system")
        .map(String::as_str)
        .unwrap_or("password");
    if !is_registered(system) {
        return Err(Error::AuthSystemNotFound {
            auth_system: system.to_string(),
        });
    }
    load_plugin(system, options)
}

fn is_registered(name: &str) -> bool {
    matches!(name, "password" | "token")
}

fn require_options(options: &HashMap<String, String>, names: &[&str]) -> Result<()> {
    let missing: Vec<String> = names
        .iter()
        .filter(|name| options.get(**name).map_or(true, |value| value.is_empty()))
        .map(|name| (*name).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::AuthPluginOptionsMissing { opt_names: missing })
    }
}
