//! Path-based addressing into a store tree.
//!
//! A path is a `/`-separated sequence of segments; `\` escapes, so `\\`
//! is a literal backslash and `\/` a literal slash inside a segment. The
//! empty path addresses the root. A segment into an array selects the
//! entry with that key; a segment into a list is a zero-based decimal
//! index.

use std::mem;

use crate::error::PathError;
use crate::Value;

/// Splits a path into its unescaped segments.
///
/// The empty path yields no segments. An empty segment (`a//b`, a
/// leading or trailing `/`), an escaped character other than `/` or
/// `\`, or an escape left hanging at the end of the path are all
/// malformed.
pub fn split_path(path: &str) -> Result<Vec<String>, PathError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let malformed = || PathError::Malformed {
        path: path.to_owned(),
    };

    let mut segments = Vec::new();
    let mut segment = String::new();
    let mut escaping = false;

    for c in path.chars() {
        if escaping {
            if c != '/' && c != '\\' {
                return Err(malformed());
            }
            escaping = false;
            segment.push(c);
        } else if c == '\\' {
            escaping = true;
        } else if c == '/' {
            if segment.is_empty() {
                return Err(malformed());
            }
            segments.push(mem::take(&mut segment));
        } else {
            segment.push(c);
        }
    }

    if escaping || segment.is_empty() {
        return Err(malformed());
    }
    segments.push(segment);

    Ok(segments)
}

impl Value {
    /// Fetches the value addressed by `path`.
    ///
    /// The empty path returns the value itself. A missing array key, a
    /// list index that is out of range or not a decimal number, and any
    /// segment that descends below a leaf all yield `Ok(None)`.
    pub fn get(&self, path: &str) -> Result<Option<&Value>, PathError> {
        let segments = split_path(path)?;
        let mut current = self;

        for segment in &segments {
            match current.child(segment) {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }

    /// Mutable variant of [`get`](Value::get).
    pub fn get_mut(&mut self, path: &str) -> Result<Option<&mut Value>, PathError> {
        let segments = split_path(path)?;
        let mut current = self;

        for segment in &segments {
            match current.child_mut(segment) {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }

    /// Sets the value at `path`, taking ownership of `value`.
    ///
    /// The parent of the final segment must exist. An array parent
    /// inserts or replaces the entry, dropping any replaced child; a
    /// list parent splices `value` in at the addressed index, which may
    /// be at most the list's length.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        let mut segments = split_path(path)?;
        let Some(last) = segments.pop() else {
            // The root itself is not assignable.
            return Err(PathError::Malformed {
                path: path.to_owned(),
            });
        };

        match self.resolve_parent(path, &segments)? {
            Value::Array(entries) => {
                entries.insert(last, value);
                Ok(())
            }
            Value::List(elements) => {
                let index = last.parse::<usize>().map_err(|_| PathError::Malformed {
                    path: path.to_owned(),
                })?;
                if index > elements.len() {
                    return Err(PathError::OutOfRange {
                        index,
                        len: elements.len(),
                    });
                }
                elements.insert(index, value);
                Ok(())
            }
            _ => Err(PathError::IntoLeaf {
                path: path.to_owned(),
            }),
        }
    }

    /// Removes the value at `path` from its parent container and drops it.
    pub fn delete(&mut self, path: &str) -> Result<(), PathError> {
        let mut segments = split_path(path)?;
        let Some(last) = segments.pop() else {
            return Err(PathError::Malformed {
                path: path.to_owned(),
            });
        };

        let not_found = || PathError::NotFound {
            path: path.to_owned(),
        };

        match self.resolve_parent(path, &segments)? {
            Value::Array(entries) => match entries.shift_remove(last.as_str()) {
                Some(_) => Ok(()),
                None => Err(not_found()),
            },
            Value::List(elements) => {
                match last.parse::<usize>().ok().filter(|&i| i < elements.len()) {
                    Some(index) => {
                        elements.remove(index);
                        Ok(())
                    }
                    None => Err(not_found()),
                }
            }
            _ => Err(not_found()),
        }
    }

    fn resolve_parent(
        &mut self,
        path: &str,
        segments: &[String],
    ) -> Result<&mut Value, PathError> {
        let mut parent = self;

        for segment in segments {
            parent = match parent.child_mut(segment) {
                Some(child) => child,
                None => {
                    return Err(PathError::NotFound {
                        path: path.to_owned(),
                    })
                }
            };
        }

        Ok(parent)
    }

    fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Array(entries) => entries.get(segment),
            Value::List(elements) => elements.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut Value> {
        match self {
            Value::Array(entries) => entries.get_mut(segment),
            Value::List(elements) => {
                let index = segment.parse::<usize>().ok()?;
                elements.get_mut(index)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_unescaped_slashes() {
        let segments = split_path("this/is a \"difficult\"/path\\\\to/split\\/:)").unwrap();
        assert_eq!(
            segments,
            vec!["this", "is a \"difficult\"", "path\\to", "split/:)"]
        );
    }

    #[test]
    fn empty_path_has_no_segments() {
        assert_eq!(split_path("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn malformed_paths() {
        assert!(matches!(split_path("a//b"), Err(PathError::Malformed { .. })));
        assert!(matches!(split_path("/a"), Err(PathError::Malformed { .. })));
        assert!(matches!(split_path("a/"), Err(PathError::Malformed { .. })));
        assert!(matches!(split_path("a\\"), Err(PathError::Malformed { .. })));
        assert!(matches!(split_path("a\\b"), Err(PathError::Malformed { .. })));
    }

    #[test]
    fn get_walks_arrays_and_lists() {
        let store =
            parse("somekey = (foo bar {foo = bar subarray = {bird = word answer = 42 emptylist = ()}} {} ())")
                .unwrap();

        assert!(matches!(store.get("").unwrap(), Some(Value::Array(_))));
        assert!(matches!(store.get("somekey").unwrap(), Some(Value::List(_))));
        assert!(matches!(store.get("somekey/2").unwrap(), Some(Value::Array(_))));
        assert_eq!(
            store.get("somekey/2/subarray/bird").unwrap(),
            Some(&Value::String("word".into()))
        );

        // out of range, non-numeric index, and descent below a leaf
        assert_eq!(store.get("somekey/1337").unwrap(), None);
        assert_eq!(store.get("somekey/bird").unwrap(), None);
        assert_eq!(store.get("somekey/0/deeper").unwrap(), None);
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn set_replaces_and_deletes_leave_the_rest_intact() {
        let mut store =
            parse("somekey = (foo bar {subarray = {bird = word answer = 42}})").unwrap();

        store
            .set("somekey/2/subarray/bird", Value::Float(13.37))
            .unwrap();
        assert_eq!(
            store.get("somekey/2/subarray/bird").unwrap(),
            Some(&Value::Float(13.37))
        );
        assert_eq!(
            store.get("somekey/2/subarray/answer").unwrap(),
            Some(&Value::Int(42))
        );

        store.delete("somekey/2/subarray/answer").unwrap();
        assert_eq!(store.get("somekey/2/subarray/answer").unwrap(), None);
    }

    #[test]
    fn set_builds_a_store_from_scratch() {
        let mut store = Value::new();

        store.set("string", Value::from("\"e = mc^2\"")).unwrap();
        store.set("integer", Value::from(1337)).unwrap();
        store.set("float number", Value::from(3.141)).unwrap();
        store.set("list", Value::list()).unwrap();
        store.set("list/0", Value::from("the bird is the word")).unwrap();
        store.set("array", Value::array()).unwrap();
        store.set("array/some\\/sub\\\\array", Value::array()).unwrap();

        assert_eq!(
            store.get("array/some\\/sub\\\\array").unwrap(),
            Some(&Value::array())
        );
        assert_eq!(
            store
                .as_array()
                .unwrap()
                .get("array")
                .and_then(Value::as_array)
                .and_then(|entries| entries.get("some/sub\\array")),
            Some(&Value::array())
        );
    }

    #[test]
    fn set_splices_into_lists() {
        let mut store = parse("list = (1, 3)").unwrap();
        store.set("list/1", Value::from(2)).unwrap();
        assert_eq!(
            store.get("list").unwrap(),
            Some(&Value::List(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3)
            ]))
        );

        // appending at the exact end is allowed, one past is not
        store.set("list/3", Value::from(4)).unwrap();
        assert!(matches!(
            store.set("list/5", Value::from(6)),
            Err(PathError::OutOfRange { index: 5, len: 4 })
        ));
    }

    #[test]
    fn set_rejects_leaves_and_missing_parents() {
        let mut store = parse("leaf = 1").unwrap();
        assert!(matches!(
            store.set("leaf/below", Value::from(2)),
            Err(PathError::IntoLeaf { .. })
        ));
        assert!(matches!(
            store.set("missing/below", Value::from(2)),
            Err(PathError::NotFound { .. })
        ));
        assert!(matches!(
            store.set("", Value::from(2)),
            Err(PathError::Malformed { .. })
        ));
    }

    #[test]
    fn delete_requires_the_target_to_exist() {
        let mut store = parse("list = (1) leaf = x").unwrap();
        assert!(matches!(
            store.delete("list/7"),
            Err(PathError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("missing"),
            Err(PathError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("leaf/below"),
            Err(PathError::NotFound { .. })
        ));
    }

    #[test]
    fn set_then_get_then_delete_round_trip() {
        let original = parse("x = (foo bar {bird = word})").unwrap();
        let mut store = original.clone();

        let existing = store.get("x/2/bird").unwrap().unwrap().clone();
        store.set("x/2/bird", existing).unwrap();
        assert_eq!(store, original);

        store.set("x/2/answer", Value::from(42)).unwrap();
        assert_eq!(store.get("x/2/answer").unwrap(), Some(&Value::Int(42)));
        store.delete("x/2/answer").unwrap();
        assert_eq!(store, original);
    }
}
