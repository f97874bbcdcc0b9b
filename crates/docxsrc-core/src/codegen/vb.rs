//! Visual Basic .NET printer

use super::dom::{CodeUnit, Expr, Method, Statement, TypeRef};
use super::{tidy_blanks, CodeProvider, SourceWriter};

/// Prints code units as Visual Basic .NET
#[derive(Debug, Clone, Copy, Default)]
pub struct VbProvider;

impl VbProvider {
    /// Display name
    pub const NAME: &'static str = "Visual Basic.Net";
    /// File extension, without dot
    pub const EXTENSION: &'static str = "vb";
}

impl CodeProvider for VbProvider {
    fn print(&self, unit: &CodeUnit) -> String {
        let mut w = SourceWriter::new("    ");

        for import in &unit.imports {
            match &import.alias {
                Some(alias) => w.line(&format!("Imports {} = {}", alias, import.namespace)),
                None => w.line(&format!("Imports {}", import.namespace)),
            }
        }
        if !unit.imports.is_empty() {
            w.blank();
        }

        w.line(&format!("Namespace {}", unit.namespace));
        w.indent();
        w.line(&format!("Public Class {}", unit.class_name));
        w.indent();
        for (i, method) in unit.methods.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            method_decl(&mut w, method);
        }
        w.dedent();
        w.line("End Class");
        w.dedent();
        w.line("End Namespace");

        w.finish()
    }
}

fn method_decl(w: &mut SourceWriter, method: &Method) {
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| format!("ByVal {} As {}", p.name, type_ref(&p.ty)))
        .collect();
    let visibility = if method.public { "Public" } else { "Private" };
    let keyword = match &method.returns {
        Some(ty) => {
            w.line(&format!(
                "{} Function {}({}) As {}",
                visibility,
                method.name,
                params.join(", "),
                type_ref(ty)
            ));
            "Function"
        }
        None => {
            w.line(&format!(
                "{} Sub {}({})",
                visibility,
                method.name,
                params.join(", ")
            ));
            "Sub"
        }
    };
    body(w, &method.body);
    w.line(&format!("End {}", keyword));
}

fn body(w: &mut SourceWriter, statements: &[Statement]) {
    w.indent();
    for statement in tidy_blanks(statements) {
        statement_line(w, statement);
    }
    w.dedent();
}

fn statement_line(w: &mut SourceWriter, statement: &Statement) {
    match statement {
        Statement::Declare { name, ty, init } => {
            w.line(&format!("Dim {} As {} = {}", name, type_ref(ty), expr(init)))
        }
        Statement::Assign { target, value } => {
            w.line(&format!("{} = {}", expr(target), expr(value)))
        }
        Statement::Expr(e) => w.line(&expr(e)),
        Statement::Return(e) => w.line(&format!("Return {}", expr(e))),
        Statement::Using {
            name,
            ty,
            init,
            body: inner,
        } => {
            w.line(&format!("Using {} As {} = {}", name, type_ref(ty), expr(init)));
            body(w, inner);
            w.line("End Using");
        }
        Statement::Blank => w.blank(),
    }
}

fn type_ref(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "String".to_string(),
        TypeRef::Named(name) => name.clone(),
    }
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::Var(name) => name.clone(),
        Expr::Str(value) => string_literal(value),
        Expr::Bool(true) => "True".to_string(),
        Expr::Bool(false) => "False".to_string(),
        Expr::Type(ty) => type_ref(ty),
        Expr::New { ty, args } => format!("New {}({})", type_ref(ty), args_list(args)),
        Expr::Call {
            target,
            method,
            generics,
            args,
        } => {
            let mut out = String::new();
            if let Some(target) = target {
                out.push_str(&expr(target));
                out.push('.');
            }
            out.push_str(method);
            if !generics.is_empty() {
                let generics: Vec<String> = generics.iter().map(type_ref).collect();
                out.push_str(&format!("(Of {})", generics.join(", ")));
            }
            out.push_str(&format!("({})", args_list(args)));
            out
        }
        Expr::Property { target, name } => format!("{}.{}", expr(target), name),
    }
}

fn args_list(args: &[Expr]) -> String {
    args.iter().map(expr).collect::<Vec<_>>().join(", ")
}

/// Quote a string; control characters are concatenated as `ChrW(n)`
fn string_literal(value: &str) -> String {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in value.chars() {
        if ch.is_control() {
            if !current.is_empty() {
                pieces.push(format!("\"{}\"", current));
                current.clear();
            }
            pieces.push(format!("ChrW({})", ch as u32));
        } else if ch == '"' {
            current.push_str("\"\"");
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() || pieces.is_empty() {
        pieces.push(format!("\"{}\"", current));
    }
    pieces.join(" & ")
}
