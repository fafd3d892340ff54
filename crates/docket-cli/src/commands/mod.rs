//! Subcommand implementations.

mod delete;
mod find;
mod get;
mod index;
mod insert;
mod update;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value as JsonValue;

use docket::{Document, DocumentId, Filter, ObjectId};

use crate::cli::StoreArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Insert a document
    Insert(insert::InsertArgs),

    /// Fetch one document by object id or slug
    Get(get::GetArgs),

    /// Query a collection
    Find(find::FindArgs),

    /// Update one document by object id or slug
    Update(update::UpdateArgs),

    /// Delete one document by object id or slug
    Delete(delete::DeleteArgs),

    /// Index administration
    #[command(subcommand)]
    Index(index::IndexCommand),
}

pub async fn handle(command: Command, store: &StoreArgs) -> Result<()> {
    match command {
        Command::Insert(args) => insert::run(args, store).await,
        Command::Get(args) => get::run(args, store).await,
        Command::Find(args) => find::run(args, store).await,
        Command::Update(args) => update::run(args, store).await,
        Command::Delete(args) => delete::run(args, store).await,
        Command::Index(cmd) => index::run(cmd, store).await,
    }
}

/// Read JSON from a literal, `@path`, or `-` for stdin.
fn read_json(source: &str) -> Result<JsonValue> {
    let content = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else if let Some(path) = source.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
    } else {
        source.to_string()
    };

    serde_json::from_str(&content).context("Invalid JSON")
}

/// Read a document argument.
fn read_document(source: &str) -> Result<Document> {
    Document::from_json(read_json(source)?).context("Document must be a JSON object")
}

/// `_id` match for an object id, `slug` match otherwise.
fn id_or_slug_filter(id: &str) -> Filter {
    match ObjectId::parse_str(id) {
        Ok(oid) => Filter::by_id(&DocumentId::Object(oid)),
        Err(_) => Filter::eq("slug", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_match_on_id() {
        let filter = id_or_slug_filter("507f1f77bcf86cd799439011");
        assert_eq!(filter.clauses()[0].key(), "_id");

        let filter = id_or_slug_filter("purple-rain");
        assert_eq!(
            filter.to_json(),
            serde_json::json!({"slug": "purple-rain"})
        );
    }

    #[test]
    fn literal_json_documents() {
        let doc = read_document(r#"{"title": "A", "plays": 2}"#).unwrap();
        assert_eq!(doc.get_int("plays"), 2);
        assert!(read_document("[1, 2]").is_err());
        assert!(read_document("{oops").is_err());
    }
}
