//! Language-neutral code model
//!
//! Generators describe what to emit as a [`CodeUnit`]; a language provider
//! prints it. The model only covers the constructs the generators need.

/// Namespace / module import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Fully qualified namespace
    pub namespace: String,
    /// Alias bound to the namespace, if any
    pub alias: Option<String>,
}

/// A type reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// The language's string type
    String,
    /// A named (possibly alias-qualified) type
    Named(String),
}

impl TypeRef {
    /// Named type
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }
}

/// An expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Local variable or parameter
    Var(String),
    /// String literal
    Str(String),
    /// Boolean literal
    Bool(bool),
    /// A type used as the target of a static member access
    Type(TypeRef),
    /// Object creation
    New {
        /// Created type
        ty: TypeRef,
        /// Constructor arguments
        args: Vec<Expr>,
    },
    /// Method call
    Call {
        /// Call target; `None` for methods of the generated class
        target: Option<Box<Expr>>,
        /// Method name
        method: String,
        /// Generic type arguments
        generics: Vec<TypeRef>,
        /// Arguments
        args: Vec<Expr>,
    },
    /// Property or field access
    Property {
        /// Access target
        target: Box<Expr>,
        /// Member name
        name: String,
    },
}

impl Expr {
    /// Variable reference
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// String literal
    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    /// `new T(args)`
    pub fn new_object(ty: TypeRef, args: Vec<Expr>) -> Self {
        Expr::New { ty, args }
    }

    /// `method(args)` on the generated class
    pub fn invoke(method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            target: None,
            method: method.into(),
            generics: Vec::new(),
            args,
        }
    }

    /// `self.method(args)`
    pub fn call(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            target: Some(Box::new(self)),
            method: method.into(),
            generics: Vec::new(),
            args,
        }
    }

    /// `self.method<T>(args)`
    pub fn call_generic(self, method: impl Into<String>, generic: TypeRef, args: Vec<Expr>) -> Self {
        Expr::Call {
            target: Some(Box::new(self)),
            method: method.into(),
            generics: vec![generic],
            args,
        }
    }

    /// `self.name`
    pub fn property(self, name: impl Into<String>) -> Self {
        Expr::Property {
            target: Box::new(self),
            name: name.into(),
        }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `T name = init;`
    Declare {
        /// Variable name
        name: String,
        /// Declared type
        ty: TypeRef,
        /// Initializer
        init: Expr,
    },
    /// `target = value;`
    Assign {
        /// Assigned expression
        target: Expr,
        /// Value
        value: Expr,
    },
    /// Expression evaluated for its side effects
    Expr(Expr),
    /// `return value;`
    Return(Expr),
    /// Scoped disposable: `using (T name = init) { body }`
    Using {
        /// Variable name
        name: String,
        /// Declared type
        ty: TypeRef,
        /// Initializer
        init: Expr,
        /// Scoped statements
        body: Vec<Statement>,
    },
    /// Empty line between statement groups
    Blank,
}

/// Method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: TypeRef,
}

/// A method of the generated class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name
    pub name: String,
    /// `true` for public, `false` for private
    pub public: bool,
    /// Parameters
    pub params: Vec<Param>,
    /// Return type; `None` for no value
    pub returns: Option<TypeRef>,
    /// Body
    pub body: Vec<Statement>,
}

/// A complete generated source file: imports and one class in one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeUnit {
    /// Enclosing namespace
    pub namespace: String,
    /// Imports, in print order
    pub imports: Vec<Import>,
    /// Class name
    pub class_name: String,
    /// Methods, in print order
    pub methods: Vec<Method>,
}
