//! Top-level orchestration: ties the interchange codecs, the translation
//! index, and the per-locale transform together.
//!
//! Per-locale work fans out over a rayon pool. Writes are independent, so
//! every locale is attempted even when one fails and the first failure is
//! reported afterwards. Reads short-circuit on the first failure instead;
//! a partial set of translations is never returned.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::formats::formatter_for;
use crate::locale::Locale;
use crate::messages::{make_message_index, Bundle, MessageIndex, ProgramMessage};
use crate::output::ast::{ArrayLiteralExpr, Expression, SourceFile, Statement, VarDeclStmt};
use crate::output::emitter::emit_source_file;
use crate::transform::{transform_source_file, TransformContext};

/// Serializes the extracted program messages into the configured
/// interchange format's file(s).
pub fn write_interchange_files(config: &Config, messages: &[ProgramMessage]) -> Result<()> {
    formatter_for(config).write_output(messages)
}

/// Reads every available translation bundle for the configured format.
pub fn read_translation_bundles(config: &Config) -> Result<Vec<Bundle>> {
    formatter_for(config).read_bundles()
}

/// Collapses bundles into one message lookup per locale.
///
/// Both within one bundle and across bundles for the same locale, the first
/// occurrence of a message id wins and later ones are dropped with a
/// warning.
pub fn build_translation_index(bundles: Vec<Bundle>) -> Result<HashMap<Locale, MessageIndex>> {
    let mut index: HashMap<Locale, MessageIndex> = HashMap::new();
    for bundle in bundles {
        let locale = bundle.locale.clone();
        let messages = make_message_index(bundle.messages)?;
        let merged = index.entry(locale.clone()).or_default();
        for (id, message) in messages {
            if merged.contains_key(&id) {
                log::warn!(
                    "duplicate translation of message {id:?} for locale {locale}; \
                     keeping the earlier one"
                );
            } else {
                merged.insert(id, message);
            }
        }
    }
    Ok(index)
}

/// Rewrites one parsed source file for one locale and emits it as source
/// text. `translations` is `None` only for the source-locale pass.
pub fn transform_file_for_locale(
    file: &SourceFile,
    locale: &Locale,
    translations: Option<&MessageIndex>,
) -> Result<String> {
    let ctx = TransformContext {
        locale,
        translations,
        file_path: &file.path,
    };
    let transformed = transform_source_file(file, &ctx)?;
    Ok(emit_source_file(&transformed))
}

/// Produces every per-locale build of the program.
///
/// Each locale's tree lands under `<output_dir>/<locale>/`, mirroring the
/// input file paths. All locales are attempted; if any failed, the first
/// failure in locale order is returned.
pub fn transform_program(
    config: &Config,
    files: &[SourceFile],
    translations: &HashMap<Locale, MessageIndex>,
) -> Result<()> {
    let empty = MessageIndex::new();
    let results: Vec<Result<()>> = config
        .all_locales()
        .par_iter()
        .map(|locale| {
            let lookup = if *locale == config.source_locale {
                None
            } else {
                // An untranslated locale still gets a build; every message
                // falls back to source text with a warning.
                Some(translations.get(locale).unwrap_or(&empty))
            };
            for file in files {
                let source = transform_file_for_locale(file, locale, lookup)?;
                let out_path = config.output_dir.join(locale.as_str()).join(&file.path);
                write_source_file(&out_path, &source)?;
            }
            Ok(())
        })
        .collect();
    results.into_iter().collect()
}

fn write_source_file(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, source).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders the generated locale-codes module: the configured locales as
/// exported constants, so application code can enumerate them without
/// repeating the configuration.
pub fn generate_locale_module(config: &Config) -> String {
    let literal_list = |locales: &[Locale]| {
        Expression::ArrayLiteral(ArrayLiteralExpr {
            entries: locales
                .iter()
                .map(|l| Expression::literal(l.as_str()))
                .collect(),
        })
    };
    let export = |name: &str, value: Expression| {
        Statement::VarDecl(VarDeclStmt {
            name: name.to_string(),
            value,
            exported: true,
        })
    };
    let file = SourceFile {
        path: String::new(),
        statements: vec![
            Statement::Raw(
                "// Do not modify this file by hand; it is generated from the localization config."
                    .to_string(),
            ),
            export(
                "sourceLocale",
                Expression::literal(config.source_locale.as_str()),
            ),
            export("targetLocales", literal_list(&config.target_locales)),
            export("allLocales", literal_list(&config.all_locales())),
        ],
    };
    emit_source_file(&file)
}

/// Writes the generated locale-codes module if the config asks for one.
pub fn write_locale_module(config: &Config) -> Result<()> {
    let Some(path) = &config.locales_module else {
        return Ok(());
    };
    write_source_file(path, &generate_locale_module(config))
}
