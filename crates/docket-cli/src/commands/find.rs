//! Find command implementation.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::debug;

use docket::context::keys;
use docket::query::sort_key;
use docket::{Filter, QueryParams, RequestContext};

use crate::cli::StoreArgs;
use crate::{output, store};

/// Which search appender interprets `--query`.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Search {
    /// Regex on the `title` parameter over both title languages
    Title,
    /// Regex on `title` over titles and keywords
    TitleKeywords,
    /// Regex on the `name` parameter over both name languages
    Name,
    /// Regex on `name` over names and keywords
    NameKeywords,
    /// Full-text search of `title` (needs a text index)
    TextTitle,
    /// Full-text search of `name` (needs a text index)
    TextName,
}

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Collection name
    pub collection: String,

    /// URL query string supplying filter values, e.g. "title=rain&published=true"
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Match a query parameter by string equality (repeatable)
    #[arg(long = "filter", value_name = "KEY")]
    pub filters: Vec<String>,

    /// Match a query parameter as a boolean (repeatable)
    #[arg(long = "bool-filter", value_name = "KEY")]
    pub bool_filters: Vec<String>,

    /// Search over titles or names using the query string
    #[arg(long, value_enum)]
    pub search: Option<Search>,

    /// Comma-separated fields to return; prefix with - to exclude
    #[arg(long, default_value = "")]
    pub fields: String,

    /// Fields always returned alongside --fields
    #[arg(long, default_value = "")]
    pub addon_fields: String,

    /// Field to sort by
    #[arg(long, default_value = "")]
    pub order_by: String,

    /// Sort order: asc or desc
    #[arg(long, default_value = "asc")]
    pub order: String,

    /// Documents to skip
    #[arg(long, default_value_t = 0)]
    pub skip: i64,

    /// Maximum documents to return
    #[arg(long, default_value_t = 10)]
    pub limit: i64,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

fn build_filter(args: &FindArgs) -> Filter {
    let params = QueryParams::parse(&args.query);
    let mut filter = Filter::new();

    for key in &args.filters {
        filter.append_filter(&params, key);
    }
    for key in &args.bool_filters {
        filter.append_bool_filter(&params, key);
    }

    if let Some(search) = args.search {
        let term = match search {
            Search::Title => filter.append_find_by_title(&params),
            Search::TitleKeywords => filter.append_find_by_title_and_keywords(&params),
            Search::Name => filter.append_find_by_name(&params),
            Search::NameKeywords => filter.append_find_by_name_and_keywords(&params),
            Search::TextTitle => filter.append_text_search_title(&params),
            Search::TextName => filter.append_text_search_name(&params),
        };
        if term.is_empty() {
            debug!(?search, "search term missing from query, not filtering");
        }
    }

    filter
}

fn build_context(args: &FindArgs) -> RequestContext {
    RequestContext::new()
        .with_str(keys::ORDER_BY, args.order_by.as_str())
        .with_str(keys::ORDER, args.order.as_str())
        .with_str(keys::FIELDS, args.fields.as_str())
        .with_str(keys::PROJECTION, args.fields.as_str())
        .with_int(keys::SKIP, args.skip)
        .with_int(keys::LIMIT, args.limit)
}

pub async fn run(args: FindArgs, store_args: &StoreArgs) -> Result<()> {
    let repo = store::open(store_args, &args.collection)?;
    let filter = build_filter(&args);
    let ctx = build_context(&args);

    debug!(filter = %filter.to_json(), sort_key = %sort_key(&ctx), "running find");

    let documents = repo
        .find_with_addon_fields(&ctx, &filter, &args.addon_fields)
        .await
        .with_context(|| format!("Failed to query '{}'", args.collection))?;

    for document in &documents {
        output::document(document, args.pretty)?;
    }

    Ok(())
}
