//! `config` command.

use shopfront_prerender::PrerenderConfig;

use crate::error::CliError;

/// Validate and print the configuration table.
pub fn run() -> Result<(), CliError> {
    let config = PrerenderConfig::default();
    config.validate()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
