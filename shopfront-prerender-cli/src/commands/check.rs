//! `check` command: exclusion filter verdicts.

use shopfront_prerender::{ExclusionFilter, PrerenderConfig};
use url::Url;

use super::resolve_all;
use crate::error::CliError;

pub fn run(origin: &Url, urls: &[String]) -> Result<(), CliError> {
    let filter = ExclusionFilter::new(&PrerenderConfig::default());
    for url in resolve_all(origin, urls)? {
        println!("{}", verdict(&filter, &url));
    }
    Ok(())
}

/// One output line for `url`.
fn verdict(filter: &ExclusionFilter, url: &str) -> String {
    match filter.check_url(url) {
        Ok(()) => format!("eligible  {}", url),
        Err(reason) => format!("excluded  {}  ({})", url, reason),
    }
}
