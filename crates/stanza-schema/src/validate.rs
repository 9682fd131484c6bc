use stanza_store::collections::IndexMap;
use stanza_store::Value;

use crate::compile::{Schema, SchemaError, SchemaType, StructElement, TypeKind};
use crate::diagnostic::{Attempt, Diagnostic};

/// Checks `store` against a compiled `schema`.
///
/// The store's root is validated as an implicit struct whose fields are
/// the schema's layout. On failure the returned [`Diagnostic`] carries
/// every complaint that could be gathered independently: all fields of a
/// struct are visited even after one of them fails, while the chain
/// below a failing element stops at its first problem. Neither argument
/// is modified.
pub fn validate(store: &Value, schema: &Schema) -> Result<(), Diagnostic> {
    let mut report = Diagnostic::default();
    validate_struct(
        schema,
        "[schema root layout]",
        &schema.layout,
        store,
        "",
        &mut report,
    );

    if report.is_empty() {
        Ok(())
    } else {
        Err(report)
    }
}

/// Compiles `schema_store` into a [`Schema`] and validates `store`
/// against the result.
pub fn validate_store(store: &Value, schema_store: &Value) -> Result<(), SchemaValidationError> {
    let schema = Schema::compile(schema_store)?;
    validate(store, &schema)?;
    Ok(())
}

/// Failure of [`validate_store`]: either the schema store does not
/// describe a valid schema, or the validated store does not match it.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SchemaValidationError {
    /// The schema store itself failed to compile.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The store does not match the compiled schema.
    #[error("store does not match schema:\n{0}")]
    Validation(#[from] Diagnostic),
}

fn validate_type(
    schema: &Schema,
    ty: &SchemaType,
    store: &Value,
    path: &str,
    report: &mut Diagnostic,
) -> bool {
    match &ty.kind {
        TypeKind::Int => match store {
            Value::Int(_) => true,
            _ => {
                report.push(
                    path,
                    format!(
                        "is not an integer, but should be of integer type '{}'",
                        ty.name
                    ),
                );
                false
            }
        },
        TypeKind::Float => match store {
            Value::Float(_) => true,
            _ => {
                report.push(
                    path,
                    format!("is not a float, but should be of float type '{}'", ty.name),
                );
                false
            }
        },
        TypeKind::Str => match store {
            Value::String(_) => true,
            _ => {
                report.push(
                    path,
                    format!(
                        "is not a string, but should be of string type '{}'",
                        ty.name
                    ),
                );
                false
            }
        },
        TypeKind::Struct(elements) => {
            validate_struct(schema, &ty.name, elements, store, path, report)
        }
        TypeKind::Array(subtype) => {
            let Some(entries) = store.as_array() else {
                report.push(
                    path,
                    format!("is not an array, but should be of array type '{}'", ty.name),
                );
                return false;
            };
            for (key, child) in entries {
                let child_path = format!("{path}/{key}");
                if !validate_type(schema, subtype, child, &child_path, report) {
                    return false;
                }
            }
            true
        }
        TypeKind::Sequence(subtype) => {
            let Some(elements) = store.as_list() else {
                report.push(
                    path,
                    format!(
                        "is not a list, but should be of sequence type '{}'",
                        ty.name
                    ),
                );
                return false;
            };
            for (i, element) in elements.iter().enumerate() {
                let element_path = format!("{path}/{i}");
                if !validate_type(schema, subtype, element, &element_path, report) {
                    return false;
                }
            }
            true
        }
        TypeKind::Tuple(subtypes) => {
            let Some(elements) = store.as_list() else {
                report.push(
                    path,
                    format!("is not a list, but should be of tuple type '{}'", ty.name),
                );
                return false;
            };
            // excess elements beyond the declared subtypes are not validated
            for (i, subtype) in subtypes.iter().enumerate() {
                let element_path = format!("{path}/{i}");
                let Some(element) = elements.get(i) else {
                    report.push(
                        &element_path,
                        format!(
                            "not set, but should be of tuple type '{}' subtype '{}'",
                            ty.name, subtype.name
                        ),
                    );
                    return false;
                };
                if !validate_type(schema, subtype, element, &element_path, report) {
                    report.push(
                        &element_path,
                        format!(
                            "should be of tuple type '{}' subtype '{}'",
                            ty.name, subtype.name
                        ),
                    );
                    return false;
                }
            }
            true
        }
        TypeKind::Variant(subtypes) => {
            let mut attempts = Vec::with_capacity(subtypes.len());
            for subtype in subtypes {
                let mut attempt_report = Diagnostic::default();
                if validate_type(schema, subtype, store, path, &mut attempt_report) {
                    return true;
                }
                attempts.push(Attempt {
                    type_name: subtype.name.clone(),
                    report: attempt_report,
                });
            }
            report.push_variant(
                path,
                format!(
                    "does not match any of the variant subtypes of type '{}':",
                    ty.name
                ),
                attempts,
            );
            false
        }
        TypeKind::Alias(target) => match schema.named_types.get(target) {
            Some(aliased) => validate_type(schema, aliased, store, path, report),
            None => {
                log::warn!(
                    "validating alias type '{}' referring to non-existing type '{target}'",
                    ty.name
                );
                true
            }
        },
        TypeKind::Enum(constants) => match store.as_str() {
            None => {
                report.push(
                    path,
                    format!(
                        "should be an enum constant of type '{}', but is not a string",
                        ty.name
                    ),
                );
                false
            }
            Some(string) if constants.iter().any(|constant| constant == string) => true,
            Some(string) => {
                report.push(
                    path,
                    format!(
                        "should be an enum constant of type '{}', but is '{string}'",
                        ty.name
                    ),
                );
                false
            }
        },
    }
}

fn validate_struct(
    schema: &Schema,
    type_name: &str,
    elements: &IndexMap<String, StructElement>,
    store: &Value,
    path: &str,
    report: &mut Diagnostic,
) -> bool {
    let Some(entries) = store.as_array() else {
        report.push(
            path,
            format!("is not an array, but should be of struct type '{type_name}'"),
        );
        return false;
    };

    let mut ok = true;
    for (key, element) in elements {
        let field_path = format!("{path}/{key}");
        match entries.get(key) {
            None if element.required => {
                report.push(
                    &field_path,
                    format!("of struct type '{type_name}' is required, but was not found"),
                );
                ok = false;
            }
            None => {}
            Some(field) => {
                if !validate_type(schema, &element.ty, field, &field_path, report) {
                    ok = false;
                }
            }
        }
    }

    ok
}
