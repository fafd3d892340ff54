//! Find options: projection, sort and pagination.

use serde_json::{Map, Value as JsonValue, json};
use tracing::{debug, trace};

use super::Projection;
use crate::Result;
use crate::error::{Error, InvalidInputError};
use crate::context::{RequestContext, keys};

/// Sort direction for one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `"desc"` sorts descending; any other order sorts ascending.
    pub fn from_order(order: &str) -> Self {
        if order == "desc" {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    /// Store-level marker: `1` or `-1`.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Skip/limit pair. Both are always set together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Pagination {
    /// Used whenever the caller's values are unusable.
    pub const DEFAULT: Self = Self { skip: 0, limit: 10 };

    /// Accept `skip >= 0 && limit > 0`; otherwise fall back to
    /// [`Pagination::DEFAULT`].
    pub fn from_raw(skip: i64, limit: i64) -> Self {
        match (u64::try_from(skip), u64::try_from(limit)) {
            (Ok(skip), Ok(limit)) if limit > 0 => Self { skip, limit },
            _ => Self::DEFAULT,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which version of a document a find-and-modify call returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReturnDocument {
    Before,
    #[default]
    After,
}

/// Options descriptor handed to [`Collection::find`](crate::Collection::find).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    projection: Option<Projection>,
    sort: Vec<(String, SortDirection)>,
    pagination: Pagination,
}

impl FindOptions {
    /// No projection, no sort, default pagination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from request parameters.
    ///
    /// 1. `fields` (merged with `addon_fields`) becomes the projection when
    ///    non-blank. When only the addons make the list mixed, no projection
    ///    is applied.
    /// 2. `order_by` + `order` become a single sort key when both are set.
    /// 3. `skip` + `limit` become the pagination, or the default pair.
    ///
    /// # Errors
    ///
    /// Returns the projection error when `fields` is malformed.
    pub fn from_context(ctx: &RequestContext, addon_fields: &str) -> Result<Self> {
        let mut options = Self::new();

        let requested = ctx.get_str(keys::FIELDS);
        if !requested.trim().is_empty() {
            Projection::parse(requested)?;
        }

        let fields = merge_addon_fields(requested, addon_fields);
        if !fields.trim().is_empty() {
            options.projection = match Projection::parse(&fields) {
                Ok(projection) => Some(projection),
                Err(Error::InvalidInput(InvalidInputError::MixedProjection { field })) => {
                    debug!(%field, "addon fields mix projection modes, returning every field");
                    None
                }
                Err(e) => return Err(e),
            };
        }

        let order_by = ctx.get_str(keys::ORDER_BY);
        let order = ctx.get_str(keys::ORDER);
        if !order_by.trim().is_empty() && !order.trim().is_empty() {
            options
                .sort
                .push((order_by.to_string(), SortDirection::from_order(order)));
        }

        options.pagination =
            Pagination::from_raw(ctx.get_int(keys::SKIP), ctx.get_int(keys::LIMIT));

        trace!(?options, "built find options");
        Ok(options)
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Replace the sort with a single key.
    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = vec![(field.into(), direction)];
        self
    }

    pub fn with_pagination(mut self, skip: u64, limit: u64) -> Self {
        self.pagination = Pagination::from_raw(
            i64::try_from(skip).unwrap_or(-1),
            i64::try_from(limit).unwrap_or(-1),
        );
        self
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn sort(&self) -> &[(String, SortDirection)] {
        &self.sort
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn skip(&self) -> u64 {
        self.pagination.skip
    }

    pub fn limit(&self) -> u64 {
        self.pagination.limit
    }

    /// Store-level shape: `{projection?, sort?, skip, limit}`.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        if let Some(projection) = &self.projection {
            map.insert("projection".to_string(), projection.to_json());
        }
        if !self.sort.is_empty() {
            let sort: Map<String, JsonValue> = self
                .sort
                .iter()
                .map(|(field, dir)| (field.clone(), json!(dir.as_i32())))
                .collect();
            map.insert("sort".to_string(), JsonValue::Object(sort));
        }
        map.insert("skip".to_string(), json!(self.pagination.skip));
        map.insert("limit".to_string(), json!(self.pagination.limit));
        JsonValue::Object(map)
    }
}

/// Append the fields a caller always needs to a requested field list.
///
/// An addon already listed in `fields` is not repeated. A blank `fields`
/// yields just the addons. Addons are appended as given, so adding them to
/// an exclusion list produces a mixed list.
pub fn merge_addon_fields(fields: &str, addon_fields: &str) -> String {
    let mut merged = field_list(fields);
    let requested = merged.len();

    for addon in field_list(addon_fields) {
        if !merged.contains(&addon) {
            merged.push(addon);
        }
    }

    if merged.len() == requested {
        return fields.to_string();
    }
    merged.join(",")
}

fn field_list(fields: &str) -> Vec<&str> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

/// Deterministic key describing a request's sort, paging and projection.
///
/// Suitable for keying cached result pages.
pub fn sort_key(ctx: &RequestContext) -> String {
    format!(
        "order_by={}&order={}&page_index={}&count_per_page={}&fields={}",
        ctx.get_str(keys::ORDER_BY),
        ctx.get_str(keys::ORDER),
        ctx.get_str(keys::PAGE_INDEX),
        ctx.get_str(keys::COUNT_PER_PAGE),
        ctx.get_str(keys::PROJECTION).replace(' ', ""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ProjectionMode;

    fn paging(skip: i64, limit: i64) -> RequestContext {
        RequestContext::new()
            .with_int(keys::SKIP, skip)
            .with_int(keys::LIMIT, limit)
    }

    #[test]
    fn negative_skip_falls_back() {
        let options = FindOptions::from_context(&paging(-1, 5), "").unwrap();
        assert_eq!(options.pagination(), Pagination { skip: 0, limit: 10 });
    }

    #[test]
    fn zero_limit_falls_back() {
        let options = FindOptions::from_context(&paging(0, 0), "").unwrap();
        assert_eq!(options.pagination(), Pagination { skip: 0, limit: 10 });
    }

    #[test]
    fn valid_paging_is_verbatim() {
        let options = FindOptions::from_context(&paging(2, 5), "").unwrap();
        assert_eq!(options.skip(), 2);
        assert_eq!(options.limit(), 5);
    }

    #[test]
    fn missing_paging_uses_default() {
        let options = FindOptions::from_context(&RequestContext::new(), "").unwrap();
        assert_eq!(options.pagination(), Pagination::DEFAULT);
        assert!(options.projection().is_none());
        assert!(options.sort().is_empty());
    }

    #[test]
    fn string_paging_values_are_ignored() {
        let ctx = RequestContext::new()
            .with_str(keys::SKIP, "2")
            .with_str(keys::LIMIT, "5");
        let options = FindOptions::from_context(&ctx, "").unwrap();
        assert_eq!(options.pagination(), Pagination::DEFAULT);
    }

    #[test]
    fn sort_requires_both_keys() {
        let only_field = RequestContext::new().with_str(keys::ORDER_BY, "plays");
        assert!(FindOptions::from_context(&only_field, "").unwrap().sort().is_empty());

        let only_order = RequestContext::new().with_str(keys::ORDER, "desc");
        assert!(FindOptions::from_context(&only_order, "").unwrap().sort().is_empty());
    }

    #[test]
    fn sort_direction() {
        let desc = RequestContext::new()
            .with_str(keys::ORDER_BY, "plays")
            .with_str(keys::ORDER, "desc");
        let options = FindOptions::from_context(&desc, "").unwrap();
        assert_eq!(
            options.sort(),
            [("plays".to_string(), SortDirection::Descending)]
        );

        let other = RequestContext::new()
            .with_str(keys::ORDER_BY, "plays")
            .with_str(keys::ORDER, "whatever");
        let options = FindOptions::from_context(&other, "").unwrap();
        assert_eq!(options.sort()[0].1, SortDirection::Ascending);
    }

    #[test]
    fn projection_from_fields() {
        let ctx = RequestContext::new().with_str(keys::FIELDS, "title,artist");
        let options = FindOptions::from_context(&ctx, "").unwrap();
        let projection = options.projection().unwrap();
        assert_eq!(projection.mode(), ProjectionMode::Include);
        assert_eq!(projection.fields(), ["title", "artist"]);
    }

    #[test]
    fn mixed_projection_is_rejected() {
        let ctx = RequestContext::new().with_str(keys::FIELDS, "title,-lyrics");
        let err = FindOptions::from_context(&ctx, "").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput(InvalidInputError::MixedProjection { .. })
        ));
    }

    #[test]
    fn addon_fields_are_appended_once() {
        assert_eq!(merge_addon_fields("title,artist", "artist,cover"), "title,artist,cover");
        assert_eq!(merge_addon_fields("title", ""), "title");
        assert_eq!(merge_addon_fields("title", "cover,cover"), "title,cover");
        assert_eq!(merge_addon_fields("", "cover"), "cover");
        assert_eq!(merge_addon_fields("  ", "slug, cover"), "slug,cover");
    }

    #[test]
    fn addon_fields_append_to_exclusions() {
        assert_eq!(merge_addon_fields("-lyrics", "cover"), "-lyrics,cover");
        assert_eq!(merge_addon_fields("-lyrics", "-lyrics"), "-lyrics");
    }

    #[test]
    fn addon_fields_reach_projection() {
        let ctx = RequestContext::new().with_str(keys::FIELDS, "title");
        let options = FindOptions::from_context(&ctx, "slug").unwrap();
        assert_eq!(options.projection().unwrap().fields(), ["title", "slug"]);

        let options = FindOptions::from_context(&RequestContext::new(), "slug,cover").unwrap();
        assert_eq!(options.projection().unwrap().fields(), ["slug", "cover"]);

        let ctx = RequestContext::new().with_str(keys::FIELDS, "-lyrics");
        let options = FindOptions::from_context(&ctx, "slug").unwrap();
        assert!(options.projection().is_none());

        let ctx = RequestContext::new().with_str(keys::FIELDS, "title,-lyrics");
        let err = FindOptions::from_context(&ctx, "slug").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput(InvalidInputError::MixedProjection { .. })
        ));
    }

    #[test]
    fn to_json_shape() {
        let ctx = RequestContext::new()
            .with_str(keys::FIELDS, "title")
            .with_str(keys::ORDER_BY, "plays")
            .with_str(keys::ORDER, "desc")
            .with_int(keys::SKIP, 20)
            .with_int(keys::LIMIT, 10);
        let options = FindOptions::from_context(&ctx, "").unwrap();
        assert_eq!(
            options.to_json(),
            json!({"projection": {"title": 1}, "sort": {"plays": -1}, "skip": 20, "limit": 10})
        );
    }

    #[test]
    fn rendering_keeps_field_order() {
        let ctx = RequestContext::new()
            .with_str(keys::FIELDS, "title,artist,album")
            .with_str(keys::ORDER_BY, "plays")
            .with_str(keys::ORDER, "asc");
        let options = FindOptions::from_context(&ctx, "cover").unwrap();
        assert_eq!(
            serde_json::to_string(&options.to_json()).unwrap(),
            r#"{"projection":{"title":1,"artist":1,"album":1,"cover":1},"sort":{"plays":1},"skip":0,"limit":10}"#
        );
    }

    #[test]
    fn sort_key_format() {
        let ctx = RequestContext::new()
            .with_str(keys::ORDER_BY, "plays")
            .with_str(keys::ORDER, "asc")
            .with_str(keys::PAGE_INDEX, "2")
            .with_str(keys::COUNT_PER_PAGE, "20")
            .with_str(keys::PROJECTION, "title, artist");
        assert_eq!(
            sort_key(&ctx),
            "order_by=plays&order=asc&page_index=2&count_per_page=20&fields=title,artist"
        );
    }
}
