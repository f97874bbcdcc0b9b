//! C# printer

use super::dom::{CodeUnit, Expr, Method, Statement, TypeRef};
use super::{tidy_blanks, CodeProvider, SourceWriter};

/// Prints code units as C#
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpProvider;

impl CSharpProvider {
    /// Display name
    pub const NAME: &'static str = "C#";
    /// File extension, without dot
    pub const EXTENSION: &'static str = "cs";
}

impl CodeProvider for CSharpProvider {
    fn print(&self, unit: &CodeUnit) -> String {
        let mut w = SourceWriter::new("    ");

        for import in &unit.imports {
            match &import.alias {
                Some(alias) => w.line(&format!("using {} = {};", alias, import.namespace)),
                None => w.line(&format!("using {};", import.namespace)),
            }
        }
        if !unit.imports.is_empty() {
            w.blank();
        }

        w.line(&format!("namespace {}", unit.namespace));
        w.line("{");
        w.indent();
        w.line(&format!("public class {}", unit.class_name));
        w.line("{");
        w.indent();
        for (i, method) in unit.methods.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            method_decl(&mut w, method);
        }
        w.dedent();
        w.line("}");
        w.dedent();
        w.line("}");

        w.finish()
    }
}

fn method_decl(w: &mut SourceWriter, method: &Method) {
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| format!("{} {}", type_ref(&p.ty), p.name))
        .collect();
    let returns = method.returns.as_ref().map_or("void".to_string(), type_ref);
    w.line(&format!(
        "{} {} {}({})",
        if method.public { "public" } else { "private" },
        returns,
        method.name,
        params.join(", ")
    ));
    block(w, &method.body);
}

fn block(w: &mut SourceWriter, body: &[Statement]) {
    w.line("{");
    w.indent();
    for statement in tidy_blanks(body) {
        statement_line(w, statement);
    }
    w.dedent();
    w.line("}");
}

fn statement_line(w: &mut SourceWriter, statement: &Statement) {
    match statement {
        Statement::Declare { name, ty, init } => {
            w.line(&format!("{} {} = {};", type_ref(ty), name, expr(init)))
        }
        Statement::Assign { target, value } => {
            w.line(&format!("{} = {};", expr(target), expr(value)))
        }
        Statement::Expr(e) => w.line(&format!("{};", expr(e))),
        Statement::Return(e) => w.line(&format!("return {};", expr(e))),
        Statement::Using {
            name,
            ty,
            init,
            body,
        } => {
            w.line(&format!("using ({} {} = {})", type_ref(ty), name, expr(init)));
            block(w, body);
        }
        Statement::Blank => w.blank(),
    }
}

fn type_ref(ty: &TypeRef) -> String {
    match ty {
        TypeRef::String => "string".to_string(),
        TypeRef::Named(name) => name.clone(),
    }
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::Var(name) => name.clone(),
        Expr::Str(value) => string_literal(value),
        Expr::Bool(value) => value.to_string(),
        Expr::Type(ty) => type_ref(ty),
        Expr::New { ty, args } => format!("new {}({})", type_ref(ty), args_list(args)),
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
                out.push_str(&format!("<{}>", generics.join(", ")));
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

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
