//! Validated locale codes.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Shape check only: a primary language subtag plus optional alphanumeric
/// subtags. No case folding and no BCP-47 canonicalization is performed;
/// locale equality is exact string equality.
static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]+)*$").unwrap());

/// An opaque, validated locale code (e.g. `en`, `es-419`, `zh-Hant`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn new(code: impl Into<String>) -> Result<Self, Error> {
        let code = code.into();
        if LOCALE_RE.is_match(&code) {
            Ok(Locale(code))
        } else {
            Err(Error::InvalidLocale(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(code: String) -> Result<Self, Error> {
        Locale::new(code)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> String {
        locale.0
    }
}
