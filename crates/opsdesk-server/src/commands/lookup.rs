use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::lookup::{LookupError, LookupService};
use anyhow::{Context as _, Result};
use clap::Args;
use opsdesk_core::dto::DegradedSource;

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Last four digits of the customer's phone number
    pub digits: String,
    /// Maximum number of directory pages to scan (1-20)
    #[arg(long)]
    pub pages: Option<String>,
}

pub fn lookup(ctx: &Context<'_>, args: LookupArgs) -> Result<()> {
    let service = LookupService::from_config(ctx.db_path.clone(), ctx.config.directory.as_ref())
        .with_context(|| "configure directory client")?;
    let outcome = match service.lookup(Some(&args.digits), args.pages.as_deref()) {
        Ok(outcome) => outcome,
        Err(LookupError::Invalid(err)) => return Err(invalid_input(err.to_string())),
        Err(err) => return Err(err).with_context(|| "customer lookup"),
    };

    if ctx.json {
        return print_json(&outcome);
    }

    if outcome.contacts.is_empty() {
        println!("No customers found.");
    }
    for contact in &outcome.contacts {
        println!(
            "{}  {}  {}  {}",
            contact.id,
            contact.contact_name,
            contact.phone.as_deref().unwrap_or("-"),
            contact.date_added
        );
    }
    for source in &outcome.degraded {
        if let Some(warning) = degraded_warning(source) {
            println!("warning: {warning}");
        }
    }
    Ok(())
}

fn degraded_warning(source: &DegradedSource) -> Option<String> {
    match source {
        DegradedSource::PrimaryStoreUnconfigured | DegradedSource::DirectoryUnconfigured => None,
        DegradedSource::PrimaryStoreFailed { reason } => {
            Some(format!("primary store skipped: {reason}"))
        }
        DegradedSource::DirectoryPageFailed { page, reason } => Some(format!(
            "directory scan stopped at page {page}: {reason}"
        )),
    }
}
