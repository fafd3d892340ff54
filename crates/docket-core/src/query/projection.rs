//! Field selection.

use std::str::FromStr;

use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, InvalidInputError};

/// Whether listed fields are kept or removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Return only the listed fields (`1`).
    Include,
    /// Return everything except the listed fields (`0`).
    Exclude,
}

impl ProjectionMode {
    /// Store-level marker: `1` for inclusion, `0` for exclusion.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Include => 1,
            Self::Exclude => 0,
        }
    }
}

/// A validated projection: an ordered list of fields sharing one mode.
///
/// Built with [`Projection::parse`] from strings such as `"title,artist"` or
/// `"-lyrics,-raw"`. A leading `-` marks exclusion; mixing both kinds in one
/// projection is rejected.
///
/// # Example
///
/// ```
/// use docket_core::{Projection, ProjectionMode};
///
/// let p = Projection::parse(" title, artist ,").unwrap();
/// assert_eq!(p.mode(), ProjectionMode::Include);
/// assert_eq!(p.fields(), ["title", "artist"]);
///
/// assert!(Projection::parse("title,-lyrics").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    mode: ProjectionMode,
    fields: Vec<String>,
}

impl Projection {
    /// Parse a comma separated field list.
    ///
    /// # Errors
    ///
    /// - [`InvalidInputError::EmptyProjection`] when no field is named.
    /// - [`InvalidInputError::MixedProjection`] at the first field whose mode
    ///   differs from the first field's.
    /// - [`InvalidInputError::Projection`] for a bare `-`.
    pub fn parse(fields: &str) -> Result<Self, Error> {
        let mut mode = None;
        let mut names: Vec<String> = Vec::new();

        for part in fields.trim_matches(',').split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (part_mode, name) = match part.strip_prefix('-') {
                Some(rest) => (ProjectionMode::Exclude, rest.trim()),
                None => (ProjectionMode::Include, part),
            };

            if name.is_empty() {
                return Err(InvalidInputError::Projection {
                    value: fields.to_string(),
                    reason: "'-' must be followed by a field name".to_string(),
                }
                .into());
            }

            match mode {
                None => mode = Some(part_mode),
                Some(m) if m != part_mode => {
                    return Err(InvalidInputError::MixedProjection {
                        field: part.to_string(),
                    }
                    .into());
                }
                Some(_) => {}
            }

            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        match mode {
            Some(mode) => Ok(Self {
                mode,
                fields: names,
            }),
            None => Err(InvalidInputError::EmptyProjection.into()),
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// `(field, mode)` pairs in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, ProjectionMode)> {
        self.fields.iter().map(move |f| (f.as_str(), self.mode))
    }

    /// Store-level shape, e.g. `{"title": 1, "artist": 1}`.
    pub fn to_json(&self) -> JsonValue {
        let marker = self.mode.as_i32();
        JsonValue::Object(
            self.fields
                .iter()
                .map(|f| (f.clone(), JsonValue::from(marker)))
                .collect::<Map<_, _>>(),
        )
    }
}

impl FromStr for Projection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
