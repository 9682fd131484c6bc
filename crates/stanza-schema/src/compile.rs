use stanza_store::collections::IndexMap;
use stanza_store::Value;

/// An error raised while compiling a schema from its store form.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A section, type or struct element does not have the expected shape.
    #[error("malformed schema at `{path}`: {reason}")]
    Malformed {
        /// Store path of the offending specification.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Named types that no compilation sweep could make progress on.
    #[error("unresolved schema types {names:?}")]
    Unresolved {
        /// The names left uncompiled when the sweeps stalled.
        names: Vec<String>,
    },
}

/// A compiled schema: named types plus the layout of the root array.
///
/// Compile one with [`Schema::compile`], then check stores against it
/// with [`validate()`](crate::validate()).
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub(crate) named_types: IndexMap<String, SchemaType>,
    pub(crate) layout: IndexMap<String, StructElement>,
}

/// One type in a schema, together with the name it reports in diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaType {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
}

/// What shape of value a [`SchemaType`] accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    /// A 32-bit integer value.
    Int,
    /// A floating point value.
    Float,
    /// A string value.
    Str,
    /// An array with a fixed set of keyed, flagged fields.
    Struct(IndexMap<String, StructElement>),
    /// An array whose every entry shares one subtype.
    Array(Box<SchemaType>),
    /// A list whose every element shares one subtype.
    Sequence(Box<SchemaType>),
    /// A list with fixed, positional subtypes.
    Tuple(Vec<SchemaType>),
    /// Any one of the listed subtypes.
    Variant(Vec<SchemaType>),
    /// A reference to a named type, resolved at validation time.
    Alias(String),
    /// A string drawn from a fixed set of constants.
    Enum(Vec<String>),
}

/// A single field of a struct type or of the root layout.
#[derive(Clone, Debug, PartialEq)]
pub struct StructElement {
    pub(crate) required: bool,
    pub(crate) ty: SchemaType,
}

impl Schema {
    /// Compiles a schema from its store representation.
    ///
    /// The root array may carry a `types` array of named type
    /// specifications and must carry a `layout` array describing the
    /// validated store's keys. `types` entries may reference each other
    /// in any declaration order: the compiler sweeps the section
    /// repeatedly, compiling whatever it can, until everything is
    /// compiled or a sweep makes no progress. Alias targets are not
    /// resolved here; a dangling alias surfaces as a warning during
    /// validation, not as a compile error.
    pub fn compile(store: &Value) -> Result<Schema, SchemaError> {
        let Some(root) = store.as_array() else {
            return Err(malformed("", "schema root is not an array"));
        };

        let mut schema = Schema {
            named_types: IndexMap::default(),
            layout: IndexMap::default(),
        };
        schema.insert_builtin("int", TypeKind::Int);
        schema.insert_builtin("float", TypeKind::Float);
        schema.insert_builtin("string", TypeKind::Str);

        if let Some(types) = root.get("types") {
            let Some(types) = types.as_array() else {
                return Err(malformed("/types", "`types` section is not an array"));
            };
            schema.compile_named_types(types)?;
        }

        let Some(layout) = root.get("layout") else {
            return Err(malformed("", "no `layout` section found"));
        };
        let Some(layout) = layout.as_array() else {
            return Err(malformed("/layout", "`layout` section is not an array"));
        };
        for (key, element_store) in layout {
            let path = format!("/layout/{key}");
            let element = compile_struct_element(&path, element_store)?;
            schema.layout.insert(key.clone(), element);
        }

        Ok(schema)
    }

    /// Looks up a named type, including the built-in `int`, `float` and
    /// `string`.
    pub fn named_type(&self, name: &str) -> Option<&SchemaType> {
        self.named_types.get(name)
    }

    /// The struct elements the root array of a validated store must match.
    pub fn layout(&self) -> &IndexMap<String, StructElement> {
        &self.layout
    }

    fn insert_builtin(&mut self, name: &str, kind: TypeKind) {
        self.named_types.insert(
            name.to_owned(),
            SchemaType {
                name: name.to_owned(),
                kind,
            },
        );
    }

    fn compile_named_types(&mut self, types: &IndexMap<String, Value>) -> Result<(), SchemaError> {
        loop {
            let mut progressed = 0;
            let mut failures: Vec<(String, SchemaError)> = Vec::new();

            for (name, type_store) in types {
                if self.named_types.contains_key(name) {
                    continue;
                }

                let path = format!("/types/{name}");
                match compile_type(&path, Some(name), type_store) {
                    Ok(ty) => {
                        log::debug!("compiled named schema type `{name}`");
                        self.named_types.insert(name.clone(), ty);
                        progressed += 1;
                    }
                    Err(error) => failures.push((name.clone(), error)),
                }
            }

            if failures.is_empty() {
                return Ok(());
            }

            if progressed == 0 {
                let structural = failures
                    .iter()
                    .position(|(_, error)| matches!(error, SchemaError::Malformed { .. }));
                return Err(match structural {
                    Some(i) => failures.swap_remove(i).1,
                    None => SchemaError::Unresolved {
                        names: failures.into_iter().map(|(name, _)| name).collect(),
                    },
                });
            }

            log::debug!(
                "schema type sweep compiled {progressed} types, {} still to go",
                failures.len()
            );
        }
    }
}

impl SchemaType {
    /// The type's name: its declaration key for named types, the inline
    /// serialization of the defining value for anonymous ones.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape of value this type accepts.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }
}

impl StructElement {
    /// Whether the field must be present.
    pub fn required(&self) -> bool {
        self.required
    }

    /// The field's type.
    pub fn ty(&self) -> &SchemaType {
        &self.ty
    }
}

/// Compiles one type specification. `name` is `Some` for entries of the
/// `types` section; sub-specifications compile anonymously and take the
/// inline serialization of their defining value as their name.
fn compile_type(path: &str, name: Option<&str>, type_store: &Value) -> Result<SchemaType, SchemaError> {
    let kind = match type_store {
        Value::String(alias) => TypeKind::Alias(alias.clone()),
        Value::Array(fields) => {
            let mut elements = IndexMap::default();
            for (key, element_store) in fields {
                let element_path = format!("{path}/{key}");
                let element = compile_struct_element(&element_path, element_store)?;
                elements.insert(key.clone(), element);
            }
            TypeKind::Struct(elements)
        }
        Value::List(spec) => compile_list_type(path, spec)?,
        other => {
            return Err(malformed(
                path,
                format!(
                    "a type must be a string, a list or an array, not {}",
                    other.type_name()
                ),
            ))
        }
    };

    let name = match name {
        Some(name) => name.to_owned(),
        None => {
            let name = type_store.to_inline_string();
            log::debug!("compiled anonymous schema type `{name}`");
            name
        }
    };

    Ok(SchemaType { name, kind })
}

/// Compiles a list-shaped type specification: a leading tag string
/// selecting the mode, followed by subtypes or constants.
fn compile_list_type(path: &str, spec: &[Value]) -> Result<TypeKind, SchemaError> {
    let Some((tag_value, rest)) = spec.split_first() else {
        return Err(malformed(path, "a list type needs a leading tag string"));
    };
    let Some(tag) = tag_value.as_str() else {
        return Err(malformed(
            path,
            format!(
                "a list type's tag must be a string, not {}",
                tag_value.type_name()
            ),
        ));
    };

    match tag {
        "array" | "sequence" => {
            let Some(subtype_store) = rest.first() else {
                return Err(malformed(path, format!("`{tag}` needs a subtype")));
            };
            let subtype = Box::new(compile_type(&format!("{path}/1"), None, subtype_store)?);
            if tag == "array" {
                Ok(TypeKind::Array(subtype))
            } else {
                Ok(TypeKind::Sequence(subtype))
            }
        }
        "tuple" | "variant" => {
            let mut subtypes = Vec::with_capacity(rest.len());
            for (i, subtype_store) in rest.iter().enumerate() {
                let subtype_path = format!("{path}/{}", i + 1);
                subtypes.push(compile_type(&subtype_path, None, subtype_store)?);
            }
            if tag == "tuple" {
                Ok(TypeKind::Tuple(subtypes))
            } else {
                Ok(TypeKind::Variant(subtypes))
            }
        }
        "enum" => {
            let mut constants = Vec::with_capacity(rest.len());
            for (i, constant) in rest.iter().enumerate() {
                let Some(constant) = constant.as_str() else {
                    return Err(malformed(
                        &format!("{path}/{}", i + 1),
                        format!(
                            "enum constants must be strings, not {}",
                            constant.type_name()
                        ),
                    ));
                };
                constants.push(constant.to_owned());
            }
            Ok(TypeKind::Enum(constants))
        }
        unknown => Err(malformed(path, format!("unknown type tag `{unknown}`"))),
    }
}

/// Compiles a struct element specification: a list of a flag string
/// (`required`, or anything else for optional) and a type.
fn compile_struct_element(path: &str, element_store: &Value) -> Result<StructElement, SchemaError> {
    let Some(spec) = element_store.as_list() else {
        return Err(malformed(
            path,
            format!(
                "a struct element must be a list, not {}",
                element_store.type_name()
            ),
        ));
    };
    let Some(flag_value) = spec.first() else {
        return Err(malformed(path, "a struct element needs a flag and a type"));
    };
    let Some(flag) = flag_value.as_str() else {
        return Err(malformed(
            path,
            format!(
                "a struct element's flag must be a string, not {}",
                flag_value.type_name()
            ),
        ));
    };
    let Some(type_store) = spec.get(1) else {
        return Err(malformed(path, "a struct element needs a type after its flag"));
    };

    let ty = compile_type(&format!("{path}/1"), None, type_store)?;

    Ok(StructElement {
        required: flag == "required",
        ty,
    })
}

fn malformed(path: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::Malformed {
        path: path.to_owned(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stanza_store::parse;

    #[test]
    fn compiles_named_types_in_any_declaration_order() {
        let forward = parse("types = {A = (\"tuple\", \"int\", B); B = \"string\"}\nlayout = {root = (required, A)}").unwrap();
        let backward = parse("types = {B = \"string\"; A = (\"tuple\", \"int\", B)}\nlayout = {root = (required, A)}").unwrap();

        let schema = Schema::compile(&forward).unwrap();
        assert!(Schema::compile(&backward).is_ok());

        let a = schema.named_type("A").unwrap();
        assert_eq!(a.name(), "A");
        match a.kind() {
            TypeKind::Tuple(subtypes) => {
                assert_eq!(subtypes.len(), 2);
                assert_eq!(subtypes[0].kind(), &TypeKind::Alias("int".into()));
                assert_eq!(subtypes[1].kind(), &TypeKind::Alias("B".into()));
            }
            other => panic!("expected a tuple, got {other:?}"),
        }
    }

    #[test]
    fn seeds_the_builtin_types() {
        let schema = Schema::compile(&parse("layout = {}").unwrap()).unwrap();
        assert_eq!(schema.named_type("int").map(SchemaType::kind), Some(&TypeKind::Int));
        assert_eq!(schema.named_type("float").map(SchemaType::kind), Some(&TypeKind::Float));
        assert_eq!(schema.named_type("string").map(SchemaType::kind), Some(&TypeKind::Str));
    }

    #[test]
    fn anonymous_types_are_named_by_their_spec() {
        let store = parse("layout = {xs = (required, (\"sequence\", \"int\"))}").unwrap();
        let schema = Schema::compile(&store).unwrap();

        let element = &schema.layout()["xs"];
        assert_eq!(element.ty().name(), "(\"sequence\", \"int\")");
        match element.ty().kind() {
            TypeKind::Sequence(subtype) => assert_eq!(subtype.name(), "\"int\""),
            other => panic!("expected a sequence, got {other:?}"),
        }
    }

    #[test]
    fn struct_types_and_flags() {
        let store = parse(
            "types = {S = {a = (required, \"int\"); b = (optional, \"string\")}}\nlayout = {s = (required, S)}",
        )
        .unwrap();
        let schema = Schema::compile(&store).unwrap();

        let TypeKind::Struct(elements) = schema.named_type("S").unwrap().kind() else {
            panic!("expected a struct");
        };
        assert!(elements["a"].required());
        assert!(!elements["b"].required());
    }

    #[test]
    fn enums_collect_their_constants() {
        let store = parse("layout = {c = (required, (\"enum\", \"on\", \"off\"))}").unwrap();
        let schema = Schema::compile(&store).unwrap();

        match schema.layout()["c"].ty().kind() {
            TypeKind::Enum(constants) => assert_eq!(constants, &["on", "off"]),
            other => panic!("expected an enum, got {other:?}"),
        }
    }

    #[test]
    fn layout_is_required() {
        let error = Schema::compile(&parse("types = {}").unwrap()).unwrap_err();
        assert_eq!(
            error,
            SchemaError::Malformed {
                path: "".into(),
                reason: "no `layout` section found".into(),
            }
        );
    }

    #[test]
    fn non_array_root_and_sections_are_malformed() {
        assert!(matches!(
            Schema::compile(&stanza_store::Value::from(1)),
            Err(SchemaError::Malformed { .. })
        ));
        assert!(matches!(
            Schema::compile(&parse("types = (1)\nlayout = {}").unwrap()),
            Err(SchemaError::Malformed { ref path, .. }) if path == "/types"
        ));
        assert!(matches!(
            Schema::compile(&parse("layout = 5").unwrap()),
            Err(SchemaError::Malformed { ref path, .. }) if path == "/layout"
        ));
    }

    #[test]
    fn malformed_type_specs_carry_their_path() {
        let unknown_tag = parse("types = {T = (\"maybe\", \"int\")}\nlayout = {}").unwrap();
        match Schema::compile(&unknown_tag).unwrap_err() {
            SchemaError::Malformed { path, reason } => {
                assert_eq!(path, "/types/T");
                assert_eq!(reason, "unknown type tag `maybe`");
            }
            other => panic!("expected a malformed error, got {other:?}"),
        }

        let headless = parse("types = {T = (13, \"int\")}\nlayout = {}").unwrap();
        assert!(matches!(
            Schema::compile(&headless).unwrap_err(),
            SchemaError::Malformed { ref path, .. } if path == "/types/T"
        ));

        let bad_element = parse("layout = {x = \"int\"}").unwrap();
        assert!(matches!(
            Schema::compile(&bad_element).unwrap_err(),
            SchemaError::Malformed { ref path, .. } if path == "/layout/x"
        ));

        let flagless = parse("layout = {x = ()}").unwrap();
        assert!(matches!(
            Schema::compile(&flagless).unwrap_err(),
            SchemaError::Malformed { ref path, .. } if path == "/layout/x"
        ));

        let missing_subtype = parse("types = {T = (\"array\")}\nlayout = {}").unwrap();
        assert!(matches!(
            Schema::compile(&missing_subtype).unwrap_err(),
            SchemaError::Malformed { ref reason, .. } if reason == "`array` needs a subtype"
        ));

        let bad_constant = parse("types = {T = (\"enum\", 13)}\nlayout = {}").unwrap();
        assert!(matches!(
            Schema::compile(&bad_constant).unwrap_err(),
            SchemaError::Malformed { ref path, .. } if path == "/types/T/1"
        ));
    }

    #[test]
    fn nested_anonymous_specs_report_their_position() {
        let store = parse("types = {T = (\"tuple\", \"int\", (\"weird\"))}\nlayout = {}").unwrap();
        assert!(matches!(
            Schema::compile(&store).unwrap_err(),
            SchemaError::Malformed { ref path, .. } if path == "/types/T/2"
        ));
    }
}
