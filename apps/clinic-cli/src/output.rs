use anyhow::{Context, Result};
use serde::Serialize;

/// Results go to stdout as pretty JSON; logs stay on stderr.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{text}");
    Ok(())
}

pub fn print_deleted(what: &str, id: i64) {
    println!("Deleted {what} {id}");
}
