//! JavaScript source emitter for the output AST.
//!
//! Deterministic: the same tree always renders to the same bytes. The
//! transform pass also uses [`emit_expression`] to recover the raw source
//! of an expression slot when it rebuilds a message's content shape.

use crate::output::ast::{Expression, SourceFile, Statement};

pub fn emit_source_file(file: &SourceFile) -> String {
    let mut out = String::new();
    for statement in &file.statements {
        out.push_str(&emit_statement(statement));
        out.push('\n');
    }
    out
}

pub fn emit_statement(statement: &Statement) -> String {
    match statement {
        Statement::Import(import) => {
            let symbols: Vec<&str> = import.symbols.iter().map(|s| s.name.as_str()).collect();
            format!(
                "import {{{}}} from '{}';",
                symbols.join(", "),
                escape_string(&import.module)
            )
        }
        Statement::VarDecl(decl) => {
            let prefix = if decl.exported { "export " } else { "" };
            format!(
                "{prefix}const {} = {};",
                decl.name,
                emit_expression(&decl.value)
            )
        }
        Statement::Expr(expr) => format!("{};", emit_expression(expr)),
        Statement::Raw(source) => source.clone(),
    }
}

pub fn emit_expression(expr: &Expression) -> String {
    match expr {
        Expression::Literal(lit) => format!("'{}'", escape_string(&lit.value)),
        Expression::Template(template) => {
            let mut out = match &template.tag {
                Some(tag) => emit_expression(tag),
                None => String::new(),
            };
            out.push('`');
            out.push_str(&escape_template_text(&template.quasis[0]));
            for (expr, quasi) in template.exprs.iter().zip(&template.quasis[1..]) {
                out.push_str("${");
                out.push_str(&emit_expression(expr));
                out.push('}');
                out.push_str(&escape_template_text(quasi));
            }
            out.push('`');
            out
        }
        Expression::Call(call) => {
            let args: Vec<String> = call.args.iter().map(emit_expression).collect();
            format!("{}({})", emit_expression(&call.callee), args.join(", "))
        }
        Expression::Ident(ident) => ident.name.clone(),
        Expression::PropAccess(prop) => {
            format!("{}.{}", emit_expression(&prop.receiver), prop.name)
        }
        Expression::ObjectLiteral(object) => {
            let entries: Vec<String> = object
                .entries
                .iter()
                .map(|(key, value)| format!("{key}: {}", emit_expression(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Expression::ArrayLiteral(array) => {
            let entries: Vec<String> = array.entries.iter().map(emit_expression).collect();
            format!("[{}]", entries.join(", "))
        }
        Expression::Arrow(arrow) => {
            format!(
                "({}) => {}",
                arrow.params.join(", "),
                emit_expression(&arrow.body)
            )
        }
        Expression::Raw(raw) => raw.source.clone(),
    }
}

/// Escaping for single-quoted string literals.
fn escape_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Escaping for the text runs of a template literal.
fn escape_template_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}
