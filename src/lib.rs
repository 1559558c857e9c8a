#![deny(clippy::all)]

//! Compile-time localization compiler.
//!
//! Extracted program messages flow out to translators through one of two
//! XML interchange formats, and finished translations flow back in and are
//! baked into per-locale builds by an AST rewrite that removes the
//! localization library entirely.

pub mod compiler;
pub mod config;
mod error;
pub mod formats;
pub mod locale;
pub mod messages;
pub mod output;
pub mod transform;

// Re-exports
pub use compiler::{
    build_translation_index, generate_locale_module, read_translation_bundles,
    transform_file_for_locale, transform_program, write_interchange_files, write_locale_module,
};
pub use config::{Config, InterchangeConfig};
pub use error::{Error, Result};
pub use locale::Locale;
pub use messages::{
    make_message_index, message_id, Bundle, Content, Message, MessageIndex, Placeholder,
    ProgramMessage,
};
