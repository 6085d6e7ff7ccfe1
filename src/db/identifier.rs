use std::fmt;

use crate::config::ConfigError;

// PostgreSQL truncates identifiers longer than NAMEDATALEN - 1 bytes
const MAX_IDENTIFIER_LEN: usize = 63;

/// A database name taken from local configuration.
///
/// `CREATE DATABASE` cannot take its name as a bound parameter, so the
/// provisioner has to splice it into the statement text. This type is the
/// only thing allowed into that position: it is constructed solely by the
/// config loader, restricted to plain identifier characters, and always
/// rendered quoted. Values that come from requests must never be turned
/// into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedIdentifier(String);

impl TrustedIdentifier {
    pub(crate) fn from_config(name: String) -> Result<Self, ConfigError> {
        let reject = |reason| ConfigError::DatabaseName {
            name: name.clone(),
            reason,
        };

        let mut chars = name.chars();
        match chars.next() {
            None => return Err(reject("must not be empty")),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(reject("must start with a letter or underscore"))
            }
            Some(_) => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(reject("may only contain ASCII letters, digits and underscores"));
        }
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(reject("longer than 63 bytes"));
        }

        Ok(TrustedIdentifier(name))
    }

    /// The bare name, for use as a bound parameter or connection option.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for TrustedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
