use std::fmt;

/// Everything the validator found wrong with a store.
///
/// A diagnostic is a sequence of failures, each anchored at a store
/// path. Failures at a variant type carry the report of every attempted
/// subtype. [`Display`](fmt::Display) flattens the tree into indented,
/// one-complaint-per-line text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) failures: Vec<Failure>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Failure {
    pub(crate) path: String,
    pub(crate) reason: String,
    pub(crate) attempts: Vec<Attempt>,
}

/// One attempted variant subtype, with the reasons it did not match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Attempt {
    pub(crate) type_name: String,
    pub(crate) report: Diagnostic,
}

impl Diagnostic {
    pub(crate) fn push(&mut self, path: &str, reason: impl Into<String>) {
        self.failures.push(Failure {
            path: path.to_owned(),
            reason: reason.into(),
            attempts: Vec::new(),
        });
    }

    pub(crate) fn push_variant(&mut self, path: &str, reason: String, attempts: Vec<Attempt>) {
        self.failures.push(Failure {
            path: path.to_owned(),
            reason,
            attempts,
        });
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        for failure in &self.failures {
            indent(f, level)?;
            writeln!(f, "store element at '{}' {}", failure.path, failure.reason)?;

            for attempt in &failure.attempts {
                indent(f, level + 1)?;
                writeln!(
                    f,
                    "attempting to validate as variant subtype '{}':",
                    attempt.type_name
                )?;
                attempt.report.write_indented(f, level + 2)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl std::error::Error for Diagnostic {}

fn indent(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str("\t")?;
    }
    Ok(())
}
