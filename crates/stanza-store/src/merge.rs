use crate::error::MergeError;
use crate::Value;

impl Value {
    /// Merges `import` into `self`.
    ///
    /// Both values must be the same container variant. Array entries
    /// absent from `self` are clone-inserted; entries present on both
    /// sides recurse when both are arrays or both are lists, and are
    /// otherwise replaced by a clone of the imported child. A list
    /// appends clones of all imported elements.
    pub fn merge(&mut self, import: &Value) -> Result<(), MergeError> {
        match (self, import) {
            (Value::Array(target), Value::Array(entries)) => {
                for (key, value) in entries {
                    match target.get_mut(key) {
                        None => {
                            target.insert(key.clone(), value.clone());
                        }
                        Some(candidate) if mergeable(candidate, value) => {
                            candidate.merge(value)?;
                        }
                        Some(candidate) => {
                            *candidate = value.clone();
                        }
                    }
                }
                Ok(())
            }
            (Value::List(target), Value::List(elements)) => {
                target.extend(elements.iter().cloned());
                Ok(())
            }
            (target, import) if target.type_name() == import.type_name() => {
                Err(MergeError::AtLeaf {
                    kind: target.type_name(),
                })
            }
            (target, import) => Err(MergeError::TypeMismatch {
                target: target.type_name(),
                import: import.type_name(),
            }),
        }
    }
}

fn mergeable(target: &Value, import: &Value) -> bool {
    matches!(
        (target, import),
        (Value::Array(_), Value::Array(_)) | (Value::List(_), Value::List(_))
    )
}
