//! Entity to code-unit translation
//!
//! Produces Open XML SDK style construction code: elements become object
//! initialization with attributes and appended children, parts become
//! `AddNewPart` chains with one content method per part, packages become a
//! `Create` call wrapping the part chain.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use docxsrc_opc::schema::{self, ElementClass, EXTENDED_PART_TYPE};
use docxsrc_opc::{
    Element, ExternalRelationship, OpenXmlPackage, Part, PartId, PartRelationship, Relationship,
};

use super::dom::{CodeUnit, Expr, Import, Method, Param, Statement, TypeRef};
use super::{AliasOrder, NamespaceAliasOptions};
use crate::node::Entity;

/// Namespace the generated class is placed in
pub const GENERATED_NAMESPACE: &str = "GeneratedCode";
/// Name of the generated class
pub const GENERATED_CLASS: &str = "GeneratedClass";

const OPENXML_NS: &str = "DocumentFormat.OpenXml";
const PACKAGING_NS: &str = "DocumentFormat.OpenXml.Packaging";

/// Build the code unit reconstructing `entity`
pub fn build_unit(entity: &Entity<'_>, options: &NamespaceAliasOptions) -> CodeUnit {
    let mut builder = UnitBuilder::new(options);
    match *entity {
        Entity::Element(element) => builder.element_unit(element),
        Entity::Part { package, part, .. } => builder.part_unit(package, part),
        Entity::Package(package) => builder.package_unit(package),
    }
    builder.finish()
}

struct UnitBuilder<'o> {
    options: &'o NamespaceAliasOptions,
    imports: Vec<Import>,
    counters: HashMap<String, usize>,
    methods: Vec<Method>,
}

impl<'o> UnitBuilder<'o> {
    fn new(options: &'o NamespaceAliasOptions) -> Self {
        Self {
            options,
            imports: Vec::new(),
            counters: HashMap::new(),
            methods: Vec::new(),
        }
    }

    fn finish(mut self) -> CodeUnit {
        match self.options.order {
            AliasOrder::None => {}
            AliasOrder::Ascending => self.imports.sort_by(|a, b| a.namespace.cmp(&b.namespace)),
            AliasOrder::Descending => self.imports.sort_by(|a, b| b.namespace.cmp(&a.namespace)),
        }
        CodeUnit {
            namespace: GENERATED_NAMESPACE.to_string(),
            imports: self.imports,
            class_name: GENERATED_CLASS.to_string(),
            methods: self.methods,
        }
    }

    fn import(&mut self, namespace: &str, alias: Option<&str>) {
        if self.imports.iter().any(|i| i.namespace == namespace) {
            return;
        }
        self.imports.push(Import {
            namespace: namespace.to_string(),
            alias: alias.map(str::to_string),
        });
    }

    fn sdk_type(&mut self, class: &ElementClass) -> TypeRef {
        let ns = class.sdk_namespace;
        if self.options.use_aliases {
            self.import(ns.name, Some(ns.alias));
            TypeRef::named(format!("{}.{}", ns.alias, class.name))
        } else {
            self.import(ns.name, None);
            TypeRef::named(class.name)
        }
    }

    fn element_type(&mut self, element: &Element) -> TypeRef {
        match element.class() {
            Some(class) => self.sdk_type(class),
            None => {
                self.import(OPENXML_NS, None);
                TypeRef::named(element.type_name())
            }
        }
    }

    fn packaging_type(&mut self, name: &str) -> TypeRef {
        self.import(PACKAGING_NS, None);
        TypeRef::named(name)
    }

    fn variable(&mut self, type_name: &str) -> String {
        let counter = self.counters.entry(type_name.to_string()).or_insert(0);
        *counter += 1;
        format!("{}{}", lower_first(type_name), counter)
    }

    fn element_unit(&mut self, element: &Element) {
        let ty = self.element_type(element);
        let mut body = Vec::new();
        let var = self.element_statements(element, &mut body);
        body.push(Statement::Return(Expr::var(var)));
        self.methods.push(Method {
            name: format!("Generate{}", element.type_name()),
            public: true,
            params: Vec::new(),
            returns: Some(ty),
            body,
        });
    }

    /// Emit statements creating `element`; returns its variable
    fn element_statements(&mut self, element: &Element, body: &mut Vec<Statement>) -> String {
        let ty = self.element_type(element);
        let var = self.variable(element.type_name());

        let args = match element.class() {
            Some(_) => Vec::new(),
            None => vec![
                Expr::str(element.prefix().unwrap_or_default()),
                Expr::str(element.local_name()),
                Expr::str(element.namespace_uri().unwrap_or_default()),
            ],
        };
        body.push(Statement::Declare {
            name: var.clone(),
            ty: ty.clone(),
            init: Expr::new_object(ty, args),
        });

        for (prefix, uri) in element.namespace_declarations() {
            body.push(Statement::Expr(Expr::var(&var).call(
                "AddNamespaceDeclaration",
                vec![Expr::str(prefix.unwrap_or_default()), Expr::str(uri)],
            )));
        }

        for attr in element.plain_attributes() {
            self.import(OPENXML_NS, None);
            let attribute = Expr::new_object(
                TypeRef::named("OpenXmlAttribute"),
                vec![
                    Expr::str(attr.name.prefix.as_deref().unwrap_or_default()),
                    Expr::str(&attr.name.local),
                    Expr::str(attr.namespace.as_deref().unwrap_or_default()),
                    Expr::str(&attr.value),
                ],
            );
            body.push(Statement::Expr(
                Expr::var(&var).call("SetAttribute", vec![attribute]),
            ));
        }

        let leaf_text = element.class().is_some_and(|c| c.leaf_text);
        if leaf_text && element.has_only_text() {
            body.push(Statement::Assign {
                target: Expr::var(&var).property("Text"),
                value: Expr::str(element.text()),
            });
        } else if element.has_text() {
            body.push(Statement::Assign {
                target: Expr::var(&var).property("InnerXml"),
                value: Expr::str(element.inner_xml()),
            });
        } else {
            for child in element.child_elements() {
                let child_var = self.element_statements(child, body);
                body.push(Statement::Expr(
                    Expr::var(&var).call("Append", vec![Expr::var(child_var)]),
                ));
            }
        }

        var
    }

    fn part_unit(&mut self, package: &OpenXmlPackage, part_id: PartId) {
        let part = package.part(part_id);
        let var = "part".to_string();
        let ty = self.packaging_type(part.type_name());

        let mut body = vec![Statement::Expr(Expr::invoke(
            content_method_name(&var),
            vec![Expr::var(&var)],
        ))];
        let mut created = HashMap::from([(part_id, var.clone())]);
        self.content_method(part, &var, ty.clone());
        self.add_parts(
            package,
            &var,
            part.relationships(),
            part.external_relationships(),
            &mut created,
            &mut body,
        );

        self.methods.insert(
            0,
            Method {
                name: "CreateParts".to_string(),
                public: true,
                params: vec![Param { name: var, ty }],
                returns: None,
                body,
            },
        );
    }

    fn package_unit(&mut self, package: &OpenXmlPackage) {
        let kind = package.kind();
        let document_ty = self.packaging_type(kind.type_name());
        let (enum_name, member) = kind.document_type();
        self.import(OPENXML_NS, None);

        let create = Expr::Type(document_ty.clone()).call(
            "Create",
            vec![
                Expr::var("filePath"),
                Expr::Type(TypeRef::named(enum_name)).property(member),
            ],
        );
        let create_package = Method {
            name: "CreatePackage".to_string(),
            public: true,
            params: vec![Param {
                name: "filePath".to_string(),
                ty: TypeRef::String,
            }],
            returns: None,
            body: vec![Statement::Using {
                name: "package".to_string(),
                ty: document_ty.clone(),
                init: create,
                body: vec![Statement::Expr(Expr::invoke(
                    "CreateParts",
                    vec![Expr::var("package")],
                ))],
            }],
        };

        let mut body = Vec::new();
        let mut created = HashMap::new();
        self.add_parts(
            package,
            "document",
            package.relationships(),
            package.external_relationships(),
            &mut created,
            &mut body,
        );

        let create_parts = Method {
            name: "CreateParts".to_string(),
            public: false,
            params: vec![Param {
                name: "document".to_string(),
                ty: document_ty,
            }],
            returns: None,
            body,
        };
        self.methods.insert(0, create_parts);
        self.methods.insert(0, create_package);
    }

    /// Emit the part chain below `container`, depth first in relationship order
    fn add_parts(
        &mut self,
        package: &OpenXmlPackage,
        container: &str,
        relationships: &[PartRelationship],
        external: &[ExternalRelationship],
        created: &mut HashMap<PartId, String>,
        body: &mut Vec<Statement>,
    ) {
        for rel in relationships {
            if let Some(existing) = created.get(&rel.part) {
                body.push(Statement::Expr(Expr::var(container).call(
                    "AddPart",
                    vec![Expr::var(existing), Expr::str(&rel.id)],
                )));
                continue;
            }

            let part = package.part(rel.part);
            let type_name = part.type_name();
            let ty = self.packaging_type(type_name);
            let var = self.variable(type_name);

            let init = if type_name == EXTENDED_PART_TYPE {
                Expr::var(container).call(
                    "AddExtendedPart",
                    vec![
                        Expr::str(&rel.rel_type),
                        Expr::str(part.content_type()),
                        Expr::str(part.extension().trim_start_matches('.')),
                        Expr::str(&rel.id),
                    ],
                )
            } else {
                let mut args = Vec::new();
                let fixed_type = schema::part_class(part.content_type())
                    .is_some_and(|c| !c.content_types.is_empty());
                if !fixed_type {
                    args.push(Expr::str(part.content_type()));
                }
                args.push(Expr::str(&rel.id));
                Expr::var(container).call_generic("AddNewPart", ty.clone(), args)
            };

            body.push(Statement::Blank);
            body.push(Statement::Declare {
                name: var.clone(),
                ty: ty.clone(),
                init,
            });
            body.push(Statement::Expr(Expr::invoke(
                content_method_name(&var),
                vec![Expr::var(&var)],
            )));
            created.insert(rel.part, var.clone());
            self.content_method(part, &var, ty);
            self.add_parts(
                package,
                &var,
                part.relationships(),
                part.external_relationships(),
                created,
                body,
            );
        }

        for rel in external {
            self.import("System", None);
            let uri = Expr::new_object(
                TypeRef::named("Uri"),
                vec![
                    Expr::str(&rel.target),
                    Expr::Type(TypeRef::named("UriKind")).property("RelativeOrAbsolute"),
                ],
            );
            let call = if rel.rel_type == Relationship::TYPE_HYPERLINK {
                Expr::var(container).call(
                    "AddHyperlinkRelationship",
                    vec![uri, Expr::Bool(true), Expr::str(&rel.id)],
                )
            } else {
                Expr::var(container).call(
                    "AddExternalRelationship",
                    vec![Expr::str(&rel.rel_type), uri, Expr::str(&rel.id)],
                )
            };
            body.push(Statement::Expr(call));
        }
    }

    /// Emit `Generate<Var>Content`, filling the part from its root element
    /// or, for binary and unknown markup, from its raw bytes
    fn content_method(&mut self, part: &Part, var: &str, ty: TypeRef) {
        let mut body = Vec::new();
        match part.root_element() {
            Some(root) if root.class().is_some() => {
                let root_var = self.element_statements(root, &mut body);
                body.push(Statement::Blank);
                body.push(Statement::Expr(
                    Expr::var(root_var).call("Save", vec![Expr::var(var)]),
                ));
            }
            _ => {
                self.import("System", None);
                self.import("System.IO", None);
                let bytes = Expr::Type(TypeRef::named("Convert"))
                    .call("FromBase64String", vec![Expr::str(STANDARD.encode(part.data()))]);
                body.push(Statement::Declare {
                    name: "data".to_string(),
                    ty: TypeRef::named("Stream"),
                    init: Expr::new_object(TypeRef::named("MemoryStream"), vec![bytes]),
                });
                body.push(Statement::Expr(
                    Expr::var(var).call("FeedData", vec![Expr::var("data")]),
                ));
                body.push(Statement::Expr(Expr::var("data").call("Close", Vec::new())));
            }
        }

        self.methods.push(Method {
            name: content_method_name(var),
            public: false,
            params: vec![Param {
                name: var.to_string(),
                ty,
            }],
            returns: None,
            body,
        });
    }
}

fn content_method_name(var: &str) -> String {
    format!("Generate{}Content", upper_first(var))
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
