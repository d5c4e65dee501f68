//! `match` command: evaluate the static rules locally.
//!
//! The browser is the authority on rule matching; this is a preview using
//! the same predicates, without element context.

use shopfront_prerender::{Eagerness, RuleDocument, StaticRuleCompiler};
use url::Url;

use super::resolve_all;
use crate::error::CliError;

pub fn run(origin: &Url, urls: &[String]) -> Result<(), CliError> {
    let document = StaticRuleCompiler::new().compile();
    for url in resolve_all(origin, urls)? {
        let tier = eagerness_for(&document, &url)?;
        println!("{:<12}  {}", tier.map_or("none", |e| e.as_str()), url);
    }
    Ok(())
}

fn eagerness_for(document: &RuleDocument, url: &str) -> Result<Option<Eagerness>, CliError> {
    Ok(StaticRuleCompiler::matching_eagerness(document, url, None)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eagerness_tiers() {
        let document = StaticRuleCompiler::new().compile();
        assert_eq!(
            eagerness_for(&document, "https://shop.example/collections/summer").unwrap(),
            Some(Eagerness::Conservative)
        );
        assert_eq!(
            eagerness_for(&document, "https://shop.example/products/tee").unwrap(),
            Some(Eagerness::Moderate)
        );
        assert_eq!(
            eagerness_for(&document, "https://shop.example/pages/about").unwrap(),
            None
        );
    }
}
