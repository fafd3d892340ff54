//! Delete command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::cli::StoreArgs;
use crate::{output, store};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Collection name
    pub collection: String,

    /// Object id (24 hex characters) or slug
    pub id: String,

    /// Print the deleted document
    #[arg(long)]
    pub print: bool,
}

pub async fn run(args: DeleteArgs, store_args: &StoreArgs) -> Result<()> {
    let repo = store::open(store_args, &args.collection)?;
    let filter = super::id_or_slug_filter(&args.id);

    if args.print {
        let document = repo
            .find_one_and_delete(&filter)
            .await
            .with_context(|| format!("Failed to delete '{}'", args.id))?;
        return output::document(&document, false);
    }

    let deleted = repo
        .delete_one(&filter)
        .await
        .with_context(|| format!("Failed to delete '{}'", args.id))?;
    if !deleted {
        bail!("No document matched '{}'", args.id);
    }

    output::success(&format!("Deleted {}", args.id));
    Ok(())
}
