//! `batch` command: preview a dynamic batch.

use shopfront_prerender::injector::build_batch;
use shopfront_prerender::{ExclusionFilter, PrerenderConfig, RuleDocument};
use tracing::info;
use url::Url;

use super::resolve_all;
use crate::error::CliError;

pub fn run(origin: &Url, urls: &[String]) -> Result<(), CliError> {
    let config = PrerenderConfig::default();
    let document = preview(&config, origin, urls)?;
    println!("{}", document.to_json_pretty()?);
    Ok(())
}

/// Resolve and filter `urls`, then build the fragment the injector would
/// append.
fn preview(
    config: &PrerenderConfig,
    origin: &Url,
    urls: &[String],
) -> Result<RuleDocument, CliError> {
    let filter = ExclusionFilter::new(config);
    let eligible: Vec<String> = resolve_all(origin, urls)?
        .into_iter()
        .filter(|url| match filter.check_url(url) {
            Ok(()) => true,
            Err(reason) => {
                info!(url = %url, reason = %reason, "Dropped from batch");
                false
            }
        })
        .collect();

    build_batch(&eligible, config.max_dynamic_urls).ok_or(CliError::NoEligibleUrls(urls.len()))
}
