//! In-memory evaluation of filters, sorts, projections and updates.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use docket_core::error::{Error, InvalidInputError};
use docket_core::{Clause, Document, Filter, Projection, ProjectionMode, SortDirection, Update, Value};

/// A [`Filter`] with its regex patterns compiled, ready to test many
/// documents.
#[derive(Debug)]
pub(crate) struct Matcher {
    clauses: Vec<Compiled>,
    text_fields: Vec<String>,
}

#[derive(Debug)]
enum Compiled {
    Eq { field: String, value: Value },
    Regex { field: String, regex: Regex },
    Or(Vec<Compiled>),
    Text { terms: Vec<String> },
}

impl Matcher {
    /// Compile `filter`. `text_fields` are the fields covered by the
    /// collection's text index.
    ///
    /// # Errors
    ///
    /// [`InvalidInputError::Regex`] when a pattern does not compile.
    pub(crate) fn new(filter: &Filter, text_fields: Vec<String>) -> Result<Self, Error> {
        let clauses = filter
            .clauses()
            .iter()
            .map(compile)
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self {
            clauses,
            text_fields,
        })
    }

    /// Whether `doc` satisfies every clause.
    pub(crate) fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|clause| self.clause_matches(doc, clause))
    }

    fn clause_matches(&self, doc: &Document, clause: &Compiled) -> bool {
        match clause {
            Compiled::Eq { field, value } => {
                let found = resolve(doc, field);
                if found.is_empty() {
                    return value.is_null();
                }
                found.iter().any(|candidate| match candidate {
                    Value::Array(items) if !matches!(value, Value::Array(_)) => {
                        items.iter().any(|item| values_equal(item, value))
                    }
                    other => values_equal(other, value),
                })
            }
            Compiled::Regex { field, regex } => {
                resolve(doc, field).iter().any(|candidate| match candidate {
                    Value::String(s) => regex.is_match(s),
                    Value::Array(items) => items
                        .iter()
                        .any(|item| item.as_str().is_some_and(|s| regex.is_match(s))),
                    _ => false,
                })
            }
            Compiled::Or(branches) => branches
                .iter()
                .any(|branch| self.clause_matches(doc, branch)),
            Compiled::Text { terms } => text_matches(doc, terms, &self.text_fields),
        }
    }
}

fn compile(clause: &Clause) -> Result<Compiled, Error> {
    Ok(match clause {
        Clause::Eq { field, value } => Compiled::Eq {
            field: field.clone(),
            value: value.clone(),
        },
        Clause::Regex {
            field,
            pattern,
            case_insensitive,
        } => {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(*case_insensitive)
                .build()
                .map_err(|e| InvalidInputError::Regex {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            Compiled::Regex {
                field: field.clone(),
                regex,
            }
        }
        Clause::Or(branches) => {
            Compiled::Or(branches.iter().map(compile).collect::<Result<_, _>>()?)
        }
        Clause::Text { search } => Compiled::Text {
            terms: words(search).collect(),
        },
    })
}

/// Whether any clause (at any depth) is a `$text` search.
pub(crate) fn needs_text_index(filter: &Filter) -> bool {
    fn walk(clause: &Clause) -> bool {
        match clause {
            Clause::Text { .. } => true,
            Clause::Or(branches) => branches.iter().any(walk),
            _ => false,
        }
    }
    filter.clauses().iter().any(walk)
}

/// Every value reachable by a dotted path, fanning out over arrays of
/// documents.
fn resolve<'a>(doc: &'a Document, path: &str) -> Vec<&'a Value> {
    let mut parts = path.split('.');
    let Some(first) = parts.next() else {
        return Vec::new();
    };
    let mut current: Vec<&Value> = doc.get(first).into_iter().collect();

    for part in parts {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Document(child) => next.extend(child.get(part)),
                Value::Array(items) => match part.parse::<usize>() {
                    Ok(i) => next.extend(items.get(i)),
                    Err(_) => next.extend(
                        items
                            .iter()
                            .filter_map(Value::as_document)
                            .filter_map(|child| child.get(part)),
                    ),
                },
                _ => {}
            }
        }
        current = next;
    }

    current
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Equality with ints and floats compared by numeric value.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        _ => match (number(a), number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

fn text_matches(doc: &Document, terms: &[String], text_fields: &[String]) -> bool {
    if terms.is_empty() {
        return false;
    }

    text_fields.iter().any(|field| {
        resolve(doc, field).iter().any(|value| {
            let mut strings: Vec<&str> = Vec::new();
            match value {
                Value::String(s) => strings.push(s),
                Value::Array(items) => strings.extend(items.iter().filter_map(Value::as_str)),
                _ => {}
            }
            strings
                .iter()
                .any(|s| words(s).any(|word| terms.contains(&word)))
        })
    })
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Stable sort by the given keys; missing fields sort as null.
pub(crate) fn sort_documents(docs: &mut [Document], keys: &[(String, SortDirection)]) {
    if keys.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for (field, direction) in keys {
            let ordering = compare_values(a.get_path(field), b.get_path(field));
            let ordering = match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Int(_) | Value::Float(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Document(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::ObjectId(_)) => 5,
        Some(Value::Bool(_)) => 6,
        Some(Value::DateTime(_)) => 7,
    }
}

/// Cross-type ordering: null, numbers, strings, documents, arrays,
/// object ids, booleans, timestamps.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }

    match (a, b) {
        (Some(Value::Int(x)), Some(Value::Int(y))) => x.cmp(y),
        (Some(x @ (Value::Int(_) | Value::Float(_))), Some(y)) => {
            let (x, y) = (number(x).unwrap_or(0.0), number(y).unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Document(x)), Some(Value::Document(y))) => {
            x.to_json().to_string().cmp(&y.to_json().to_string())
        }
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            for (left, right) in x.iter().zip(y) {
                let ordering = compare_values(Some(left), Some(right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        (Some(Value::ObjectId(x)), Some(Value::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::DateTime(x)), Some(Value::DateTime(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Shape a document by a projection. Inclusion always keeps `_id`.
pub(crate) fn project(doc: &Document, projection: &Projection) -> Document {
    match projection.mode() {
        ProjectionMode::Include => {
            let mut shaped = Document::new();
            if let Some(id) = doc.get("_id") {
                shaped.insert("_id", id.clone());
            }
            for field in projection.fields() {
                if let Some(value) = doc.get_path(field) {
                    shaped.set_path(field, value.clone());
                }
            }
            shaped
        }
        ProjectionMode::Exclude => {
            let mut shaped = doc.clone();
            for field in projection.fields() {
                shaped.remove_path(field);
            }
            shaped
        }
    }
}

fn invalid_update(reason: impl Into<String>) -> Error {
    Error::InvalidInput(InvalidInputError::Update {
        reason: reason.into(),
    })
}

/// Check an update before touching any document.
pub(crate) fn validate_update(update: &Update) -> Result<(), Error> {
    if update.is_empty() {
        return Err(invalid_update("update cannot be empty"));
    }

    let paths = update
        .sets()
        .iter()
        .map(|(p, _)| p)
        .chain(update.unsets())
        .chain(update.incs().iter().map(|(p, _)| p));
    for path in paths {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(invalid_update(format!("invalid field path '{path}'")));
        }
        if path == "_id" || path.starts_with("_id.") {
            return Err(invalid_update("_id is immutable"));
        }
    }

    for (path, by) in update.incs() {
        if number(by).is_none() {
            return Err(invalid_update(format!(
                "cannot increment '{path}' by a non-numeric {}",
                by.type_name()
            )));
        }
    }
    Ok(())
}

/// Apply `$set`, then `$inc`, then `$unset`.
///
/// On error the document may be partially updated; callers work on a copy.
pub(crate) fn apply_update(doc: &mut Document, update: &Update) -> Result<(), Error> {
    validate_update(update)?;

    for (path, value) in update.sets() {
        doc.set_path(path, value.clone());
    }

    for (path, by) in update.incs() {
        let next = match (doc.get_path(path), by) {
            (None, by) => by.clone(),
            (Some(Value::Int(current)), Value::Int(by)) => current
                .checked_add(*by)
                .map(Value::Int)
                .unwrap_or(Value::Float(*current as f64 + *by as f64)),
            (Some(current), by) => match (number(current), number(by)) {
                (Some(x), Some(y)) => Value::Float(x + y),
                _ => {
                    return Err(invalid_update(format!(
                        "cannot increment non-numeric field '{path}' of type {}",
                        current.type_name()
                    )));
                }
            },
        };
        doc.set_path(path, next);
    }

    for path in update.unsets() {
        doc.remove_path(path);
    }

    Ok(())
}
