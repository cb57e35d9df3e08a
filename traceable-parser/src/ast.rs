// traceable Go syntax tree
// Declaration-level AST with source positions preserved

/// Source position information for AST nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_line_col: Option<(usize, usize)>,
    pub end_line_col: Option<(usize, usize)>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            start_line_col: None,
            end_line_col: None,
        }
    }

    pub fn with_line_col(
        start: usize,
        end: usize,
        start_line_col: (usize, usize),
        end_line_col: (usize, usize),
    ) -> Self {
        Self {
            start,
            end,
            start_line_col: Some(start_line_col),
            end_line_col: Some(end_line_col),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `line:col` of the start of the span, when known
    pub fn position(&self) -> Option<String> {
        self.start_line_col
            .map(|(line, col)| format!("{line}:{col}"))
    }
}

/// A single identifier with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    /// Go exports identifiers that start with an upper case letter
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// Returns true when `name` is visible outside its package
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// A parsed Go compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub package: Identifier,
    pub imports: Vec<ImportSpec>,
    pub declarations: Vec<Declaration>,
    pub source_name: Option<String>,
    pub span: Span,
}

impl SourceFile {
    /// All type declarations in source order
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.declarations.iter().filter_map(|decl| match decl {
            Declaration::Type(spec) => Some(spec),
            _ => None,
        })
    }

    /// All constant declarations in source order
    pub fn const_specs(&self) -> impl Iterator<Item = &ConstSpec> {
        self.declarations.iter().filter_map(|decl| match decl {
            Declaration::Const(spec) => Some(spec),
            _ => None,
        })
    }

    /// Interface type declarations, by name, in source order
    pub fn interfaces(&self) -> impl Iterator<Item = (&Identifier, &[InterfaceElem])> {
        self.type_specs().filter_map(|spec| match &spec.ty {
            TypeExpr::Interface(elems) => Some((&spec.name, elems.as_slice())),
            _ => None,
        })
    }
}

/// `import name "path"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<ImportName>,
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// `import . "pkg"`
    Dot,
    /// `import _ "pkg"`
    Blank,
    /// `import alias "pkg"`
    Alias(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Type(TypeSpec),
    Const(ConstSpec),
    Var(VarSpec),
    Func(FuncDecl),
}

/// `type Name[T any] = Type`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub is_alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub names: Vec<Identifier>,
    pub constraint: Vec<TypeTerm>,
}

/// One line of a `const` declaration.
///
/// Initialisers are kept as trimmed source text; an empty `values` list means
/// the line repeats the previous expression list (the `iota` idiom).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSpec {
    pub names: Vec<Identifier>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<String>,
    pub span: Span,
}

impl ConstSpec {
    /// Initialiser text for the constant called `name`
    pub fn value_of(&self, name: &str) -> Option<&str> {
        let index = self.names.iter().position(|ident| ident.name == name)?;
        self.values.get(index).map(String::as_str)
    }
}

/// A `var` spec, kept as opaque source text
#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub receiver: Option<Vec<Field>>,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub signature: Signature,
    pub has_body: bool,
    pub span: Span,
}

/// Type expressions
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `Name`, `pkg.Name` or `Name[Args]`
    Name {
        package: Option<String>,
        name: String,
        type_args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array {
        length: ArrayLength,
        element: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        direction: ChanDir,
        element: Box<TypeExpr>,
    },
    Func(Signature),
    Interface(Vec<InterfaceElem>),
    Struct(Vec<Field>),
    Paren(Box<TypeExpr>),
    /// `...T` in the final parameter position
    Ellipsis(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name {
            package: None,
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Name {
            package: Some(package.into()),
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    /// Short description of the expression kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Name { .. } => "named type",
            Self::Pointer(_) => "pointer type",
            Self::Slice(_) => "slice type",
            Self::Array { .. } => "array type",
            Self::Map { .. } => "map type",
            Self::Chan { .. } => "channel type",
            Self::Func(_) => "function type",
            Self::Interface(_) => "interface type",
            Self::Struct(_) => "struct type",
            Self::Paren(_) => "parenthesized type",
            Self::Ellipsis(_) => "variadic type",
        }
    }
}

/// Length of an array type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayLength {
    /// `[16]T`
    Literal(u64),
    /// `[N]T` or `[pkg.N]T`
    Constant {
        package: Option<String>,
        name: String,
    },
    /// `[...]T`
    Ellipsis,
    /// Any other constant expression, as source text
    Expr(String),
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ChanDir {
    /// `chan T`
    #[default]
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// A parameter, result or struct field.
///
/// `names` is empty for anonymous parameters and embedded struct fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<Identifier>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub span: Span,
}

/// Interface element
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    /// `Name(params) results`
    Method {
        name: Identifier,
        signature: Signature,
        span: Span,
    },
    /// Embedded type or type set: `io.Reader`, `~int | ~string`
    Embed { terms: Vec<TypeTerm>, span: Span },
}

impl InterfaceElem {
    pub fn span(&self) -> &Span {
        match self {
            Self::Method { span, .. } | Self::Embed { span, .. } => span,
        }
    }
}

/// Term of a type union; `tilde` is set for `~T`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}
