use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::Args;
use opsdesk_core::time::now_iso;
use opsdesk_store::error::StoreError;
use opsdesk_store::repo::ContactNew;
use opsdesk_store::Store;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct AddContactArgs {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub first: Option<String>,
    #[arg(long)]
    pub last: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddedContact {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    date_added: Option<String>,
}

pub fn add_contact(ctx: &Context<'_>, args: AddContactArgs) -> Result<()> {
    let Some(db_path) = ctx.db_path.as_deref() else {
        return Err(invalid_input(
            "no primary store configured (set store.path or pass --db-path)",
        ));
    };
    let store = Store::open(db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let input = ContactNew {
        id: args.id,
        first_name: args.first,
        last_name: args.last,
        phone: args.phone,
    };
    let row = match store.contacts().create(&now_iso(), input) {
        Ok(row) => row,
        Err(StoreError::InvalidContact(message)) => return Err(invalid_input(message)),
        Err(err) => return Err(err).with_context(|| "create contact"),
    };

    if ctx.json {
        return print_json(&AddedContact {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            date_added: row.date_added,
        });
    }

    println!("Added contact {}", row.id);
    Ok(())
}
