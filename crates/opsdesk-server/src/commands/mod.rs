use anyhow::Result;
use opsdesk_config::AppConfig;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod contacts;
pub mod lookup;
pub mod serve;

pub struct Context<'a> {
    pub config: &'a AppConfig,
    pub db_path: Option<PathBuf>,
    pub json: bool,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
