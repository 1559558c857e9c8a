//! The JavaScript output AST consumed and produced by the transform pass,
//! plus a deterministic source emitter for it.

pub mod ast;
pub mod emitter;
