//! Project configuration.
//!
//! Deserialized from the host build's JSON config with serde. Locale codes
//! are validated during deserialization through the [`Locale`] newtype, so a
//! successfully loaded `Config` never carries a malformed code.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::locale::Locale;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// The locale the program's own text is written in.
    pub source_locale: Locale,
    /// The locales to produce translated builds for. Must not contain the
    /// source locale.
    pub target_locales: Vec<Locale>,
    /// Root directory for the transformed per-locale output trees.
    pub output_dir: PathBuf,
    /// Where to write the generated locale-codes module, if anywhere.
    #[serde(default)]
    pub locales_module: Option<PathBuf>,
    /// Which interchange format the project's translation files use.
    pub interchange: InterchangeConfig,
}

/// The two supported interchange formats, selected by the `format` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "format", rename_all = "camelCase")]
pub enum InterchangeConfig {
    /// Self-contained bundle files, one `<bundle>` document per locale,
    /// discovered by glob.
    #[serde(rename_all = "camelCase")]
    Xlb {
        /// Where to write the source-locale bundle.
        output_file: PathBuf,
        /// Glob matching the translated bundle files.
        translations_glob: String,
    },
    /// XLIFF 1.2 documents, one file per target locale in one directory.
    #[serde(rename_all = "camelCase")]
    Xliff {
        /// Directory holding `<locale>.xlf`, both written and read.
        xliff_dir: PathBuf,
    },
}

impl Config {
    /// Loads and validates a config from its JSON file.
    pub fn load(path: &std::path::Path) -> Result<Config> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|e| Error::BadConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that individual field deserialization cannot see.
    pub fn validate(&self) -> Result<()> {
        if self.target_locales.contains(&self.source_locale) {
            return Err(Error::InvalidLocale(format!(
                "source locale {:?} must not appear in targetLocales",
                self.source_locale.as_str()
            )));
        }
        let mut seen: Vec<&Locale> = Vec::new();
        for locale in &self.target_locales {
            if seen.contains(&locale) {
                return Err(Error::InvalidLocale(format!(
                    "duplicate target locale {:?}",
                    locale.as_str()
                )));
            }
            seen.push(locale);
        }
        Ok(())
    }

    /// Every locale a transformed build is produced for: the source locale
    /// first, then the targets in configuration order.
    pub fn all_locales(&self) -> Vec<Locale> {
        let mut all = Vec::with_capacity(self.target_locales.len() + 1);
        all.push(self.source_locale.clone());
        all.extend(self.target_locales.iter().cloned());
        all
    }
}
