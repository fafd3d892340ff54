//! Index command implementation.

use anyhow::{Context, Result, anyhow, bail};
use clap::Subcommand;

use docket::IndexKind;

use crate::cli::StoreArgs;
use crate::{output, store};

#[derive(Subcommand, Debug)]
pub enum IndexCommand {
    /// List index definitions
    List {
        /// Collection name
        collection: String,
    },

    /// Create (or redefine) a named index
    Create {
        /// Collection name
        collection: String,

        /// Index name
        name: String,

        /// Keys as FIELD[:KIND], KIND one of asc, desc, 1, -1, hashed, text
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Create one single-field index per field, named after the field
    Single {
        /// Collection name
        collection: String,

        /// Use hashed keys instead of ascending
        #[arg(long)]
        hashed: bool,

        /// Field names
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Drop an index if it exists
    Drop {
        /// Collection name
        collection: String,

        /// Index name
        name: String,
    },
}

fn parse_key(raw: &str) -> Result<(String, IndexKind)> {
    let (field, kind) = match raw.split_once(':') {
        Some((field, kind)) => {
            let kind =
                IndexKind::parse(kind).ok_or_else(|| anyhow!("Unknown index kind '{}'", kind))?;
            (field, kind)
        }
        None => (raw, IndexKind::Ascending),
    };
    if field.trim().is_empty() {
        bail!("Index key '{}' has no field", raw);
    }
    Ok((field.to_string(), kind))
}

pub async fn run(cmd: IndexCommand, store_args: &StoreArgs) -> Result<()> {
    match cmd {
        IndexCommand::List { collection } => {
            let manager = store::open(store_args, &collection)?.indexes();
            let indexes = manager.list().await.context("Failed to list indexes")?;
            for index in &indexes {
                output::document(index, false)?;
            }
            Ok(())
        }

        IndexCommand::Create {
            collection,
            name,
            keys,
        } => {
            let keys = keys
                .iter()
                .map(|k| parse_key(k))
                .collect::<Result<Vec<_>>>()?;
            let manager = store::open(store_args, &collection)?.indexes();
            let created = manager
                .create_index_with_fields(&name, keys)
                .await
                .with_context(|| format!("Failed to create index '{}'", name))?;
            output::success(&format!("Created index {}", created));
            Ok(())
        }

        IndexCommand::Single {
            collection,
            hashed,
            fields,
        } => {
            let manager = store::open(store_args, &collection)?.indexes();
            let report = if hashed {
                manager.create_single_hash_indexes(&fields).await
            } else {
                manager.create_single_indexes(&fields).await
            };

            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(_) => output::success(&format!("Created index {}", outcome.name)),
                    Err(e) => output::error(&format!("{}: {}", outcome.name, e)),
                }
            }
            output::field(
                "Created",
                &format!("{}/{}", report.created().count(), report.outcomes.len()),
            );

            if !report.is_complete() {
                bail!("{} index(es) failed", report.failures().count());
            }
            Ok(())
        }

        IndexCommand::Drop { collection, name } => {
            let manager = store::open(store_args, &collection)?.indexes();
            let dropped = manager
                .drop_index(&name)
                .await
                .with_context(|| format!("Failed to drop index '{}'", name))?;
            if dropped {
                output::success(&format!("Dropped index {}", name));
            } else {
                output::field("Not found", &name);
            }
            Ok(())
        }
    }
}
