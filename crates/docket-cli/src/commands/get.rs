//! Get command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::StoreArgs;
use crate::{output, store};

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Collection name
    pub collection: String,

    /// Object id (24 hex characters) or slug
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: GetArgs, store_args: &StoreArgs) -> Result<()> {
    let repo = store::open(store_args, &args.collection)?;

    let document = repo
        .find_by_id_or_slug(&args.id)
        .await
        .with_context(|| format!("Failed to get '{}'", args.id))?;

    output::document(&document, args.pretty)
}
