//! A compact JavaScript AST.
//!
//! The parsing collaborator lowers each source file into this
//! representation before the per-locale transform runs. Only the node kinds
//! the localization rewrite has to recognize are modeled structurally;
//! everything else arrives as [`RawExpr`] / [`Statement::Raw`] passthrough.
//!
//! Identifiers carry the type layer's resolution of which library export
//! they refer to ([`ResolvedExport`]), so the rewrite recognizes the
//! localization API by its tagged exports rather than by names or import
//! paths. That keeps the pass robust against aliasing and re-exporting
//! modules.

/// A fixed, closed API surface the type layer can tag an identifier with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedExport {
    /// The translation request entry point, `msg()`.
    Msg,
    /// The run-time locale configuration entry point.
    ConfigureLocalization,
    /// The compile-time locale configuration entry point.
    ConfigureTransformLocalization,
    /// The localized base class composition helper.
    LocalizedMixin,
    /// The exported status-event name constant.
    LocaleStatusEvent,
    /// The markup-template constructor of the templating runtime. Not part
    /// of the localization library; its import survives the transform.
    HtmlTemplate,
}

impl ResolvedExport {
    /// Whether the export belongs to the localization library itself (as
    /// opposed to the templating runtime).
    pub fn is_localize_api(self) -> bool {
        !matches!(self, ResolvedExport::HtmlTemplate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(LiteralExpr),
    Template(TemplateExpr),
    Call(CallExpr),
    Ident(Ident),
    PropAccess(PropAccessExpr),
    ObjectLiteral(ObjectLiteralExpr),
    ArrayLiteral(ArrayLiteralExpr),
    Arrow(ArrowFnExpr),
    /// Opaque expression source, reproduced verbatim by the emitter.
    Raw(RawExpr),
}

/// A string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: String,
}

/// A (possibly tagged) template literal.
///
/// `quasis` holds the *cooked* text runs; the emitter re-applies template
/// escaping. Invariant: `quasis.len() == exprs.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExpr {
    pub tag: Option<Box<Expression>>,
    pub quasis: Vec<String>,
    pub exprs: Vec<Expression>,
}

impl TemplateExpr {
    pub fn new(tag: Option<Expression>, quasis: Vec<String>, exprs: Vec<Expression>) -> Self {
        debug_assert_eq!(quasis.len(), exprs.len() + 1);
        TemplateExpr {
            tag: tag.map(Box::new),
            quasis,
            exprs,
        }
    }

    /// A template holding a single text run and no expression slots.
    pub fn from_text(tag: Option<Expression>, text: impl Into<String>) -> Self {
        TemplateExpr::new(tag, vec![text.into()], Vec::new())
    }

    /// The resolution of the template's tag, when the tag is a plain
    /// identifier.
    pub fn tag_resolution(&self) -> Option<ResolvedExport> {
        match self.tag.as_deref() {
            Some(Expression::Ident(ident)) => ident.resolved,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub resolved: Option<ResolvedExport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropAccessExpr {
    pub receiver: Box<Expression>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLiteralExpr {
    pub entries: Vec<(String, Expression)>,
}

impl ObjectLiteralExpr {
    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteralExpr {
    pub entries: Vec<Expression>,
}

/// An arrow function with an expression body.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFnExpr {
    pub params: Vec<String>,
    pub body: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    pub source: String,
}

impl Expression {
    pub fn literal(value: impl Into<String>) -> Self {
        Expression::Literal(LiteralExpr {
            value: value.into(),
        })
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Ident(Ident {
            name: name.into(),
            resolved: None,
        })
    }

    pub fn resolved_ident(name: impl Into<String>, resolved: ResolvedExport) -> Self {
        Expression::Ident(Ident {
            name: name.into(),
            resolved: Some(resolved),
        })
    }

    pub fn call(callee: Expression, args: Vec<Expression>) -> Self {
        Expression::Call(CallExpr {
            callee: Box::new(callee),
            args,
        })
    }

    pub fn arrow(params: Vec<String>, body: Expression) -> Self {
        Expression::Arrow(ArrowFnExpr {
            params,
            body: Box::new(body),
        })
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Expression::Raw(RawExpr {
            source: source.into(),
        })
    }

    /// The resolution of a call's callee, when the callee is a plain
    /// identifier.
    pub fn callee_resolution(&self) -> Option<ResolvedExport> {
        match self {
            Expression::Call(call) => match call.callee.as_ref() {
                Expression::Ident(ident) => ident.resolved,
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Import(ImportStmt),
    VarDecl(VarDeclStmt),
    Expr(Expression),
    /// An opaque source line, reproduced verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub module: String,
    pub symbols: Vec<Ident>,
}

impl ImportStmt {
    /// Whether the imported module is the localization library, judged by
    /// the tagged exports the type layer attached to the imported symbols.
    pub fn is_localize_import(&self) -> bool {
        self.symbols
            .iter()
            .any(|s| s.resolved.is_some_and(ResolvedExport::is_localize_api))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub name: String,
    pub value: Expression,
    pub exported: bool,
}

/// The full parsed representation of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: String,
    pub statements: Vec<Statement>,
}
