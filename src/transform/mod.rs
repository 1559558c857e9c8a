//! The per-locale source transform.
//!
//! Given one parsed source file, a target locale, and (for locales other
//! than the source locale) that locale's translation lookup, this pass
//! rewrites every localization call site to locale-specific literal content
//! and strips the localization library's own API surface, so the emitted
//! file has no runtime dependency on it.
//!
//! The rewrite is a single recursive tree walk with no cross-node state
//! beyond the read-only [`TransformContext`]; everything is a pure
//! tree-in/tree-out function.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::messages::{message_id, Content, MessageIndex};
use crate::output::ast::{
    ArrayLiteralExpr, ArrowFnExpr, CallExpr, Expression, ObjectLiteralExpr, PropAccessExpr,
    ResolvedExport, SourceFile, Statement, TemplateExpr, VarDeclStmt,
};
use crate::output::emitter::emit_expression;

/// The literal value of the library's exported status-event name constant.
/// References to the constant are replaced by this string so the emitted
/// file needs no residual import to read it.
pub const LOCALE_STATUS_EVENT: &str = "localize-status";

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Read-only context threaded through the whole pass.
pub struct TransformContext<'a> {
    pub locale: &'a Locale,
    /// Absent for the source-locale pass, which emits original text
    /// verbatim.
    pub translations: Option<&'a MessageIndex>,
    pub file_path: &'a str,
}

/// Rewrites one source file for one locale.
pub fn transform_source_file(file: &SourceFile, ctx: &TransformContext<'_>) -> Result<SourceFile> {
    let mut statements = Vec::new();
    for statement in &file.statements {
        if let Some(transformed) = transform_statement(statement, ctx)? {
            statements.push(transformed);
        }
    }
    Ok(SourceFile {
        path: file.path.clone(),
        statements,
    })
}

fn transform_statement(statement: &Statement, ctx: &TransformContext<'_>) -> Result<Option<Statement>> {
    match statement {
        // The localization library import disappears entirely. The check
        // goes through the symbols' tagged exports, not the module path, so
        // re-exporting modules are stripped too.
        Statement::Import(import) if import.is_localize_import() => Ok(None),
        Statement::Import(import) => Ok(Some(Statement::Import(import.clone()))),
        Statement::VarDecl(decl) => Ok(Some(Statement::VarDecl(VarDeclStmt {
            name: decl.name.clone(),
            value: transform_expression(&decl.value, ctx)?,
            exported: decl.exported,
        }))),
        Statement::Expr(expr) => Ok(Some(Statement::Expr(transform_expression(expr, ctx)?))),
        Statement::Raw(source) => Ok(Some(Statement::Raw(source.clone()))),
    }
}

/// The recursive rewrite. Special cases are tested in priority order; the
/// default is to recurse into children unchanged.
pub fn transform_expression(expr: &Expression, ctx: &TransformContext<'_>) -> Result<Expression> {
    match expr {
        Expression::Call(call) => match expr.callee_resolution() {
            Some(ResolvedExport::Msg) => rewrite_msg_call(call, ctx),
            Some(ResolvedExport::ConfigureTransformLocalization) => {
                Ok(locale_accessor_object(ctx.locale))
            }
            Some(ResolvedExport::ConfigureLocalization) => {
                Err(Error::RuntimeConfigInTransformMode {
                    file: ctx.file_path.to_string(),
                })
            }
            Some(ResolvedExport::LocalizedMixin) => match call.args.as_slice() {
                [base] => transform_expression(base, ctx),
                args => Err(Error::internal(format!(
                    "Localized() mixin takes exactly one base class, got {} arguments",
                    args.len()
                ))),
            },
            _ => Ok(Expression::Call(CallExpr {
                callee: Box::new(transform_expression(&call.callee, ctx)?),
                args: transform_all(&call.args, ctx)?,
            })),
        },
        Expression::Template(template)
            if template.tag_resolution() == Some(ResolvedExport::HtmlTemplate) =>
        {
            let transformed = TemplateExpr {
                tag: template.tag.clone(),
                quasis: template.quasis.clone(),
                exprs: transform_all(&template.exprs, ctx)?,
            };
            Ok(Expression::Template(merge_static_slots(transformed)))
        }
        Expression::Ident(ident) if ident.resolved == Some(ResolvedExport::LocaleStatusEvent) => {
            Ok(Expression::literal(LOCALE_STATUS_EVENT))
        }
        Expression::Template(template) => Ok(Expression::Template(TemplateExpr {
            tag: template.tag.clone(),
            quasis: template.quasis.clone(),
            exprs: transform_all(&template.exprs, ctx)?,
        })),
        Expression::PropAccess(prop) => Ok(Expression::PropAccess(PropAccessExpr {
            receiver: Box::new(transform_expression(&prop.receiver, ctx)?),
            name: prop.name.clone(),
        })),
        Expression::ObjectLiteral(object) => {
            let entries = object
                .entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), transform_expression(value, ctx)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Expression::ObjectLiteral(ObjectLiteralExpr { entries }))
        }
        Expression::ArrayLiteral(array) => Ok(Expression::ArrayLiteral(ArrayLiteralExpr {
            entries: transform_all(&array.entries, ctx)?,
        })),
        Expression::Arrow(arrow) => Ok(Expression::Arrow(ArrowFnExpr {
            params: arrow.params.clone(),
            body: Box::new(transform_expression(&arrow.body, ctx)?),
        })),
        Expression::Literal(_) | Expression::Ident(_) | Expression::Raw(_) => Ok(expr.clone()),
    }
}

fn transform_all(exprs: &[Expression], ctx: &TransformContext<'_>) -> Result<Vec<Expression>> {
    exprs.iter().map(|e| transform_expression(e, ctx)).collect()
}

/// The compile-time configuration call becomes a runtime-free object
/// exposing the fixed locale.
fn locale_accessor_object(locale: &Locale) -> Expression {
    Expression::ObjectLiteral(ObjectLiteralExpr {
        entries: vec![(
            "getLocale".to_string(),
            Expression::arrow(Vec::new(), Expression::literal(locale.as_str())),
        )],
    })
}

/// The shape of a `msg()` call's template argument.
struct MsgTemplate {
    tag: Option<Expression>,
    quasis: Vec<String>,
    exprs: Vec<Expression>,
    is_rich: bool,
    params: Option<Vec<String>>,
}

#[derive(Default)]
struct MsgOptions {
    id: Option<String>,
    args: Vec<Expression>,
}

/// Implements the translatable call site rewrite.
fn rewrite_msg_call(call: &CallExpr, ctx: &TransformContext<'_>) -> Result<Expression> {
    let template_arg = call
        .args
        .first()
        .ok_or_else(|| Error::internal("msg() call has no template argument"))?;
    let options = parse_msg_options(call.args.get(1))?;
    let mut template = extract_template(template_arg)?;

    let source_contents = template_contents(&template);
    let id = options
        .id
        .unwrap_or_else(|| message_id(&source_contents, template.is_rich));

    let mut translated = false;
    if let Some(index) = ctx.translations {
        if let Some(translation) = index.get(&id) {
            check_placeholder_shape(&source_contents, &translation.contents, &id, ctx.locale)?;
            let (quasis, exprs) = contents_to_template(&translation.contents)?;
            template.quasis = quasis;
            template.exprs = exprs;
            translated = true;
        } else {
            log::warn!(
                "{}: no {} translation for message {:?}; falling back to source text",
                ctx.file_path,
                ctx.locale,
                id
            );
        }
    }

    template.exprs = match &template.params {
        Some(params) => substitute_params(template.exprs, params, &options.args, ctx)?,
        // A translated template's slots are opaque source recovered from
        // placeholders; only live source expressions get recursed into.
        None if translated => template.exprs,
        None => transform_all(&template.exprs, ctx)?,
    };

    if template.is_rich {
        let tag = template
            .tag
            .ok_or_else(|| Error::internal(format!("rich message {id:?} has no template tag")))?;
        Ok(Expression::Template(merge_static_slots(TemplateExpr {
            tag: Some(Box::new(tag)),
            quasis: template.quasis,
            exprs: template.exprs,
        })))
    } else {
        let merged = merge_static_slots(TemplateExpr {
            tag: None,
            quasis: template.quasis,
            exprs: template.exprs,
        });
        if merged.exprs.is_empty() {
            let mut quasis = merged.quasis;
            Ok(Expression::literal(quasis.pop().unwrap_or_default()))
        } else {
            Ok(Expression::Template(merged))
        }
    }
}

fn extract_template(arg: &Expression) -> Result<MsgTemplate> {
    match arg {
        Expression::Literal(lit) => Ok(MsgTemplate {
            tag: None,
            quasis: vec![lit.value.clone()],
            exprs: Vec::new(),
            is_rich: false,
            params: None,
        }),
        Expression::Template(template) => template_shape(template, None),
        Expression::Arrow(arrow) => {
            let params = Some(arrow.params.clone());
            match arrow.body.as_ref() {
                Expression::Literal(lit) => Ok(MsgTemplate {
                    tag: None,
                    quasis: vec![lit.value.clone()],
                    exprs: Vec::new(),
                    is_rich: false,
                    params,
                }),
                Expression::Template(template) => template_shape(template, params),
                _ => Err(Error::internal(
                    "msg() closure must return a string or template literal",
                )),
            }
        }
        _ => Err(Error::internal(
            "msg() template must be a string literal, a template literal, \
             or a closure returning one",
        )),
    }
}

fn template_shape(template: &TemplateExpr, params: Option<Vec<String>>) -> Result<MsgTemplate> {
    let is_rich = match template.tag_resolution() {
        Some(ResolvedExport::HtmlTemplate) => true,
        None if template.tag.is_none() => false,
        _ => {
            return Err(Error::internal(
                "msg() template has an unrecognized template tag",
            ))
        }
    };
    Ok(MsgTemplate {
        tag: template.tag.as_deref().cloned(),
        quasis: template.quasis.clone(),
        exprs: template.exprs.clone(),
        is_rich,
        params,
    })
}

fn parse_msg_options(arg: Option<&Expression>) -> Result<MsgOptions> {
    let Some(arg) = arg else {
        return Ok(MsgOptions::default());
    };
    let Expression::ObjectLiteral(object) = arg else {
        return Err(Error::internal("msg() options must be an object literal"));
    };
    let mut options = MsgOptions::default();
    if let Some(id) = object.get("id") {
        match id {
            Expression::Literal(lit) => options.id = Some(lit.value.clone()),
            _ => return Err(Error::internal("msg() id option must be a string literal")),
        }
    }
    if let Some(args) = object.get("args") {
        match args {
            Expression::ArrayLiteral(array) => options.args = array.entries.clone(),
            _ => return Err(Error::internal("msg() args option must be an array literal")),
        }
    }
    Ok(options)
}

/// Recovers the canonical content shape of a message template: text runs
/// from the quasis (empty runs dropped) and one placeholder per expression
/// slot, whose payload is the slot's raw `${…}` source.
fn template_contents(template: &MsgTemplate) -> Vec<Content> {
    let mut contents = Vec::new();
    push_text(&mut contents, &template.quasis[0]);
    for (expr, quasi) in template.exprs.iter().zip(&template.quasis[1..]) {
        contents.push(Content::placeholder(format!("${{{}}}", emit_expression(expr))));
        push_text(&mut contents, quasi);
    }
    contents
}

fn push_text(contents: &mut Vec<Content>, text: &str) {
    if !text.is_empty() {
        contents.push(Content::text(text));
    }
}

/// Placeholders may be reordered by translators but never invented,
/// dropped, or edited: the translation's placeholder payloads must be a
/// permutation of the source message's.
fn check_placeholder_shape(
    source: &[Content],
    translation: &[Content],
    id: &str,
    locale: &Locale,
) -> Result<()> {
    let mut source_payloads: Vec<&str> = placeholder_payloads(source);
    let mut translated_payloads: Vec<&str> = placeholder_payloads(translation);
    source_payloads.sort_unstable();
    translated_payloads.sort_unstable();
    if source_payloads == translated_payloads {
        Ok(())
    } else {
        Err(Error::PlaceholderMismatch {
            id: id.to_string(),
            locale: locale.as_str().to_string(),
        })
    }
}

fn placeholder_payloads(contents: &[Content]) -> Vec<&str> {
    contents
        .iter()
        .filter_map(|c| match c {
            Content::Placeholder(ph) => Some(ph.untranslatable.as_str()),
            Content::Text(_) => None,
        })
        .collect()
}

/// Converts translated content back into template form. Placeholder
/// payloads are raw template source: markup goes into the text runs
/// verbatim, `${…}` sections become expression slots again.
fn contents_to_template(contents: &[Content]) -> Result<(Vec<String>, Vec<Expression>)> {
    let mut quasis = vec![String::new()];
    let mut exprs = Vec::new();
    for content in contents {
        match content {
            Content::Text(text) => last_mut(&mut quasis).push_str(text),
            Content::Placeholder(ph) => {
                for part in split_placeholder(&ph.untranslatable)? {
                    match part {
                        PlaceholderPart::Text(text) => last_mut(&mut quasis).push_str(text),
                        PlaceholderPart::Expr(source) => {
                            exprs.push(slot_expression(source));
                            quasis.push(String::new());
                        }
                    }
                }
            }
        }
    }
    Ok((quasis, exprs))
}

fn last_mut(quasis: &mut Vec<String>) -> &mut String {
    if quasis.is_empty() {
        quasis.push(String::new());
    }
    let last = quasis.len() - 1;
    &mut quasis[last]
}

enum PlaceholderPart<'a> {
    Text(&'a str),
    Expr(&'a str),
}

/// Splits a placeholder payload into literal text and `${…}` expression
/// sections. Payloads come verbatim from extracted source, so an
/// unbalanced `${` is a violated contract, not a user error.
fn split_placeholder(payload: &str) -> Result<Vec<PlaceholderPart<'_>>> {
    let mut parts = Vec::new();
    let mut rest = payload;
    while let Some(start) = rest.find("${") {
        if start > 0 {
            parts.push(PlaceholderPart::Text(&rest[..start]));
        }
        let body = &rest[start + 2..];
        let end = matching_brace(body).ok_or_else(|| {
            Error::internal(format!("unbalanced ${{ in placeholder {payload:?}"))
        })?;
        parts.push(PlaceholderPart::Expr(&body[..end]));
        rest = &body[end + 1..];
    }
    if !rest.is_empty() {
        parts.push(PlaceholderPart::Text(rest));
    }
    Ok(parts)
}

fn matching_brace(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn slot_expression(source: &str) -> Expression {
    let trimmed = source.trim();
    if IDENT_RE.is_match(trimmed) {
        Expression::ident(trimmed)
    } else {
        Expression::raw(trimmed)
    }
}

/// Replaces each expression slot, which must be a bare reference to one of
/// the closure's parameter names, with the supplied argument expression for
/// that parameter.
fn substitute_params(
    exprs: Vec<Expression>,
    params: &[String],
    args: &[Expression],
    ctx: &TransformContext<'_>,
) -> Result<Vec<Expression>> {
    exprs
        .into_iter()
        .map(|slot| {
            let Expression::Ident(ident) = &slot else {
                return Err(Error::internal(
                    "parameterized message slot is not a bare parameter reference",
                ));
            };
            let position = params.iter().position(|p| *p == ident.name).ok_or_else(|| {
                Error::internal(format!(
                    "message slot refers to {:?}, which is not a parameter of the closure",
                    ident.name
                ))
            })?;
            let arg = args.get(position).ok_or_else(|| {
                Error::internal(format!("no argument supplied for parameter {:?}", ident.name))
            })?;
            transform_expression(arg, ctx)
        })
        .collect()
}

/// Flattens a template by inlining every statically-known slot: string
/// literals and same-kind nested templates collapse into the surrounding
/// text, leaving only genuinely dynamic slots live. Idempotent.
pub fn merge_static_slots(template: TemplateExpr) -> TemplateExpr {
    let outer_rich = template.tag_resolution() == Some(ResolvedExport::HtmlTemplate);
    let mut quasi_iter = template.quasis.into_iter();
    let mut quasis = vec![quasi_iter.next().unwrap_or_default()];
    let mut exprs = Vec::new();

    for (expr, next_quasi) in template.exprs.into_iter().zip(quasi_iter) {
        match expr {
            Expression::Literal(lit) => last_mut(&mut quasis).push_str(&lit.value),
            Expression::Template(inner) if inlinable(&inner, outer_rich) => {
                let inner = merge_static_slots(inner);
                let mut inner_quasis = inner.quasis.into_iter();
                last_mut(&mut quasis).push_str(&inner_quasis.next().unwrap_or_default());
                for (inner_expr, inner_quasi) in inner.exprs.into_iter().zip(inner_quasis) {
                    exprs.push(inner_expr);
                    quasis.push(inner_quasi);
                }
            }
            dynamic => {
                exprs.push(dynamic);
                quasis.push(String::new());
            }
        }
        last_mut(&mut quasis).push_str(&next_quasi);
    }

    TemplateExpr {
        tag: template.tag,
        quasis,
        exprs,
    }
}

/// A nested template can be inlined when it is untagged, or when both it
/// and its parent are markup templates.
fn inlinable(inner: &TemplateExpr, outer_rich: bool) -> bool {
    match inner.tag_resolution() {
        None => inner.tag.is_none(),
        Some(ResolvedExport::HtmlTemplate) => outer_rich,
        Some(_) => false,
    }
}
