//! Update command implementation.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::Value as JsonValue;

use docket::{Update, Value};

use crate::cli::StoreArgs;
use crate::{output, store};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Collection name
    pub collection: String,

    /// Object id (24 hex characters) or slug
    pub id: String,

    /// Set a field: PATH=JSON (bare words are strings)
    #[arg(long = "set", value_name = "PATH=JSON")]
    pub set: Vec<String>,

    /// Remove a field
    #[arg(long = "unset", value_name = "PATH")]
    pub unset: Vec<String>,

    /// Add a number to a field: PATH=NUMBER
    #[arg(long = "inc", value_name = "PATH=NUMBER")]
    pub inc: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(path, _)| !path.trim().is_empty())
        .ok_or_else(|| anyhow!("Expected PATH=VALUE, got '{}'", raw))
}

fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(json) => Value::from_json(json),
        Err(_) => Value::from(raw),
    }
}

fn build_update(args: &UpdateArgs) -> Result<Update> {
    let mut update = Update::new();

    for raw in &args.set {
        let (path, value) = split_assignment(raw)?;
        update = update.set(path, parse_value(value));
    }
    for raw in &args.inc {
        let (path, value) = split_assignment(raw)?;
        let by = match parse_value(value) {
            number @ (Value::Int(_) | Value::Float(_)) => number,
            _ => return Err(anyhow!("--inc {} needs a number", path)),
        };
        update = update.inc(path, by);
    }
    for path in &args.unset {
        update = update.unset(path.as_str());
    }

    Ok(update)
}

pub async fn run(args: UpdateArgs, store_args: &StoreArgs) -> Result<()> {
    let update = build_update(&args)?;
    let repo = store::open(store_args, &args.collection)?;
    let filter = super::id_or_slug_filter(&args.id);

    let document = repo
        .find_one_and_update(&filter, &update)
        .await
        .with_context(|| format!("Failed to update '{}'", args.id))?;

    output::document(&document, args.pretty)
}
