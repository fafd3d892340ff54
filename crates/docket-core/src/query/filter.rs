//! Filter construction.
//!
//! A [`Filter`] is an ordered list of top-level clauses that the store ANDs
//! together. The `append_*` helpers read one query-string parameter and add
//! a clause only when the parameter is non-blank; they return the raw value
//! they matched, or `""` when nothing was added.

use serde_json::{Map, Value as JsonValue, json};

use crate::context::QueryParams;
use crate::document::Value;
use crate::types::DocumentId;

const TITLE_FIELDS: [&str; 2] = ["title.en", "title.mm"];
const TITLE_KEYWORD_FIELDS: [&str; 4] = ["title.en", "title.mm", "keywords.en", "keywords.mm"];
const NAME_FIELDS: [&str; 2] = ["name.en", "name.mm"];
const NAME_KEYWORD_FIELDS: [&str; 4] = ["name.en", "name.mm", "keywords.en", "keywords.mm"];

/// One filter predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// `{field: value}`
    Eq { field: String, value: Value },
    /// `{field: {$regex: pattern, $options: "i"}}` when case insensitive.
    Regex {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    /// `{$or: [...]}`; matches when any branch matches.
    Or(Vec<Clause>),
    /// `{$text: {$search: search}}`; requires a text index.
    Text { search: String },
}

impl Clause {
    /// The top-level key this clause renders under.
    pub fn key(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::Regex { field, .. } => field,
            Self::Or(_) => "$or",
            Self::Text { .. } => "$text",
        }
    }

    /// Store-level shape of the clause's value (the part under [`Clause::key`]).
    pub fn value_json(&self) -> JsonValue {
        match self {
            Self::Eq { value, .. } => value.to_json(),
            Self::Regex {
                pattern,
                case_insensitive,
                ..
            } => {
                let mut map = Map::new();
                map.insert("$regex".to_string(), JsonValue::String(pattern.clone()));
                if *case_insensitive {
                    map.insert("$options".to_string(), JsonValue::String("i".to_string()));
                }
                JsonValue::Object(map)
            }
            Self::Or(branches) => JsonValue::Array(branches.iter().map(Self::to_json).collect()),
            Self::Text { search } => json!({ "$search": search }),
        }
    }

    /// The clause as a single-key filter document.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert(self.key().to_string(), self.value_json());
        JsonValue::Object(map)
    }
}

/// An ordered conjunction of clauses.
///
/// # Example
///
/// ```
/// use docket_core::{Filter, QueryParams};
///
/// let params = QueryParams::parse("title=love&published=true");
/// let mut filter = Filter::new();
///
/// let title = filter.append_find_by_title(&params);
/// filter.append_bool_filter(&params, "published");
///
/// assert_eq!(title, "love");
/// assert_eq!(filter.len(), 2);
/// assert_eq!(filter.clauses()[0].key(), "$or");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// An empty filter; matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single equality clause.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and_eq(field, value)
    }

    /// Match on `_id`.
    pub fn by_id(id: &DocumentId) -> Self {
        Self::eq("_id", id.to_value())
    }

    /// Builder form of [`Filter::push`] for equality.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Clause::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Store-level filter document.
    ///
    /// Clauses render side by side under their keys. When a key repeats
    /// (two `$or` searches, say) the clauses are wrapped in a single `$and`
    /// instead, so none is lost.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        for clause in &self.clauses {
            if map.contains_key(clause.key()) {
                let all: Vec<JsonValue> = self.clauses.iter().map(Clause::to_json).collect();
                return json!({ "$and": all });
            }
            map.insert(clause.key().to_string(), clause.value_json());
        }
        JsonValue::Object(map)
    }

    /// `{key: value}` string equality from the query parameter `key`.
    pub fn append_filter(&mut self, params: &QueryParams, key: &str) -> String {
        let Some(val) = non_blank(params.get(key)) else {
            return String::new();
        };

        self.push(Clause::Eq {
            field: key.to_string(),
            value: Value::from(val),
        });
        val.to_string()
    }

    /// `{key: bool}` from the query parameter `key`; unparseable values are
    /// `false`.
    pub fn append_bool_filter(&mut self, params: &QueryParams, key: &str) -> String {
        let Some(val) = non_blank(params.get(key)) else {
            return String::new();
        };

        self.push(Clause::Eq {
            field: key.to_string(),
            value: Value::Bool(parse_bool(val)),
        });
        val.to_string()
    }

    /// Case-insensitive regex on each of `fields`, OR-ed together.
    pub fn append_regex_or<S: AsRef<str>>(&mut self, fields: &[S], value: &str) -> String {
        let Some(val) = non_blank(value) else {
            return String::new();
        };
        if fields.is_empty() {
            return String::new();
        }

        let branches = fields
            .iter()
            .map(|field| Clause::Regex {
                field: field.as_ref().to_string(),
                pattern: val.to_string(),
                case_insensitive: true,
            })
            .collect();

        self.push(Clause::Or(branches));
        val.to_string()
    }

    /// Regex search of the `title` parameter over both title languages.
    pub fn append_find_by_title(&mut self, params: &QueryParams) -> String {
        self.append_regex_or(&TITLE_FIELDS, params.get("title"))
    }

    /// Regex search of the `title` parameter over titles and keywords.
    pub fn append_find_by_title_and_keywords(&mut self, params: &QueryParams) -> String {
        self.append_regex_or(&TITLE_KEYWORD_FIELDS, params.get("title"))
    }

    /// Regex search of the `name` parameter over both name languages.
    pub fn append_find_by_name(&mut self, params: &QueryParams) -> String {
        self.append_regex_or(&NAME_FIELDS, params.get("name"))
    }

    /// Regex search of the `name` parameter over names and keywords.
    pub fn append_find_by_name_and_keywords(&mut self, params: &QueryParams) -> String {
        self.append_regex_or(&NAME_KEYWORD_FIELDS, params.get("name"))
    }

    /// Full-text search of the `title` parameter.
    pub fn append_text_search_title(&mut self, params: &QueryParams) -> String {
        self.append_text_search(params.get("title"))
    }

    /// Full-text search of the `name` parameter.
    pub fn append_text_search_name(&mut self, params: &QueryParams) -> String {
        self.append_text_search(params.get("name"))
    }

    fn append_text_search(&mut self, value: &str) -> String {
        let Some(val) = non_blank(value) else {
            return String::new();
        };

        self.push(Clause::Text {
            search: val.to_string(),
        });
        val.to_string()
    }
}

impl FromIterator<Clause> for Filter {
    fn from_iter<I: IntoIterator<Item = Clause>>(iter: I) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Lenient boolean parsing: `1 t T TRUE true True` are true, `0 f F FALSE
/// false False` and anything else are false.
pub fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "TRUE" | "true" | "True")
}
