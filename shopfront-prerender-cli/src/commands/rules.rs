//! `rules` command.

use shopfront_prerender::StaticRuleCompiler;

use crate::error::CliError;

pub fn run(pretty: bool) -> Result<(), CliError> {
    let document = StaticRuleCompiler::new().compile();
    let json = if pretty {
        document.to_json_pretty()?
    } else {
        document.to_json()?
    };
    println!("{}", json);
    Ok(())
}
