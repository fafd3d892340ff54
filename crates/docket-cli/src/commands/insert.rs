//! Insert command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::cli::StoreArgs;
use crate::{output, store};

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// Collection name
    pub collection: String,

    /// Document JSON, @file, or - for stdin
    #[arg(default_value = "-")]
    pub document: String,
}

pub async fn run(args: InsertArgs, store_args: &StoreArgs) -> Result<()> {
    let repo = store::open(store_args, &args.collection)?;
    let document = super::read_document(&args.document)?;

    let id = repo
        .insert_one(&document)
        .await
        .context("Failed to insert document")?;

    output::document(&json!({ "_id": id.to_value().to_json() }), false)
}
