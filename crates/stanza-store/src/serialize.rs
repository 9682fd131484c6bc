use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::Path;

use crate::Value;

/// Writes `value` to a file in canonical store text form.
pub fn write_file(path: impl AsRef<Path>, value: &Value) -> io::Result<()> {
    fs::write(path, value.to_store_string())
}

impl Value {
    /// Renders the value as canonical store text.
    ///
    /// The root array's braces are omitted; every nested array indents
    /// its entries by one tab per level, keys are always quoted and
    /// escaped, and lists stay on a single line. Reparsing the output
    /// yields a structurally equal value, though the text need not match
    /// the input this value was parsed from byte for byte.
    pub fn to_store_string(&self) -> String {
        self.to_string()
    }

    /// Renders the value in its inline form: quoted for strings, `(…)`
    /// for lists, `{…}` with indented entries for arrays.
    ///
    /// This is the form a value takes on the right-hand side of an
    /// entry, and the form used when a single value needs a textual
    /// name in diagnostics.
    pub fn to_inline_string(&self) -> String {
        Inline(self).to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Array(entries) => {
                let mut state = State { output: f, level: 0 };
                for (key, value) in entries {
                    state.entry(key, value)?;
                }
                Ok(())
            }
            other => State { output: f, level: 0 }.value(other),
        }
    }
}

struct Inline<'a>(&'a Value);

impl fmt::Display for Inline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        State { output: f, level: 0 }.value(self.0)
    }
}

struct State<'a, 'b> {
    output: &'a mut fmt::Formatter<'b>,
    level: usize,
}

impl State<'_, '_> {
    fn entry(&mut self, key: &str, value: &Value) -> fmt::Result {
        self.indent()?;
        write!(self.output, "\"{}\" = ", escape(key))?;
        self.value(value)?;
        self.output.write_char('\n')
    }

    fn value(&mut self, value: &Value) -> fmt::Result {
        match value {
            Value::String(string) => write!(self.output, "\"{}\"", escape(string)),
            Value::Int(integer) => write!(self.output, "{integer}"),
            Value::Float(float) => write_float(self.output, *float),
            Value::List(elements) => {
                self.output.write_char('(')?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.output.write_str(", ")?;
                    }
                    self.value(element)?;
                }
                self.output.write_char(')')
            }
            Value::Array(entries) => {
                self.output.write_str("{\n")?;
                self.level += 1;
                for (key, value) in entries {
                    self.entry(key, value)?;
                }
                self.level -= 1;
                self.indent()?;
                self.output.write_char('}')
            }
        }
    }

    fn indent(&mut self) -> fmt::Result {
        for _ in 0..self.level {
            self.output.write_char('\t')?;
        }
        Ok(())
    }
}

/// Escapes a string for quoted output: `"` and `\` get a leading backslash.
fn escape(string: &str) -> String {
    let mut escaped = String::with_capacity(string.len());
    for c in string.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Floats print the shortest decimal that reparses to the same value,
/// with a forced decimal point so the reader cannot take them for
/// integers.
fn write_float(output: &mut fmt::Formatter<'_>, float: f64) -> fmt::Result {
    let repr = float.to_string();
    if repr.contains('.') {
        output.write_str(&repr)
    } else {
        write!(output, "{repr}.0")
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse, Value};
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_output() {
        let store = parse(
            "foo = \"//bar//\" // comment\nnums = (13, 18.34, {bird = word})\nnested = {inner = {deep = 1}}",
        )
        .unwrap();

        expect![[r#"
            "foo" = "//bar//"
            "nums" = (13, 18.34, {
            	"bird" = "word"
            })
            "nested" = {
            	"inner" = {
            		"deep" = 1
            	}
            }
        "#]]
        .assert_eq(&store.to_store_string());
    }

    #[test]
    fn keys_and_strings_are_escaped() {
        let mut store = Value::new();
        store.set("with \"quotes\"", Value::from("a \\ b")).unwrap();

        expect![[r#"
            "with \"quotes\"" = "a \\ b"
        "#]]
        .assert_eq(&store.to_store_string());
    }

    #[test]
    fn floats_always_carry_a_decimal_point() {
        let mut store = Value::new();
        store.set("whole", Value::Float(5.0)).unwrap();
        store.set("negzero", Value::Float(-0.0)).unwrap();

        expect![[r#"
            "whole" = 5.0
            "negzero" = -0.0
        "#]]
        .assert_eq(&store.to_store_string());

        let reparsed = parse(&store.to_store_string()).unwrap();
        assert!(matches!(reparsed.get("whole").unwrap(), Some(Value::Float(_))));
    }

    #[test]
    fn inline_form_braces_arrays() {
        let store = parse("a = {b = (1, 2)}").unwrap();
        let inner = store.get("a").unwrap().unwrap();
        expect![[r#"
            {
            	"b" = (1, 2)
            }"#]]
        .assert_eq(&inner.to_inline_string());

        assert_eq!(Value::from("word").to_inline_string(), "\"word\"");
        assert_eq!(Value::from(42).to_inline_string(), "42");
    }

    #[test]
    fn parse_serialize_round_trip_is_structural() {
        let inputs = [
            "",
            "a = 1",
            "foo = \"//bar//\"\nnums = (13, 18.34, {bird = word})",
            "deep = {a = {b = {c = (1, (2, 3), {d = e})}}}",
            "esc = \"quote \\\" and backslash \\\\\"",
            "f = -3.14159265\nn = -42",
        ];

        for input in inputs {
            let store = parse(input).unwrap();
            let reparsed = parse(&store.to_store_string()).unwrap();
            assert_eq!(reparsed, store, "round trip failed for {input:?}");
        }
    }

    #[test]
    fn serialized_clone_matches_original() {
        let store = parse("somevalue = (13, 18.34, {bird = word, foo = bar})").unwrap();
        let clone = store.clone();
        assert_eq!(clone.to_store_string(), store.to_store_string());
    }
}
