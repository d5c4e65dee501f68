//! CLI command implementations.

pub mod batch;
pub mod check;
pub mod config;
pub mod matching;
pub mod rules;

use url::Url;

use crate::error::CliError;

/// Resolve URL arguments against the storefront origin.
///
/// Absolute arguments pass through unchanged apart from normalization.
pub fn resolve_all(origin: &Url, inputs: &[String]) -> Result<Vec<String>, CliError> {
    inputs
        .iter()
        .map(|input| -> Result<String, CliError> { Ok(origin.join(input.trim())?.to_string()) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_all() {
        let origin = Url::parse("https://shop.example").unwrap();
        let inputs = vec![
            "/products/tee".to_string(),
            "collections/summer".to_string(),
            "https://other.example/products/hat".to_string(),
        ];

        assert_eq!(
            resolve_all(&origin, &inputs).unwrap(),
            vec![
                "https://shop.example/products/tee".to_string(),
                "https://shop.example/collections/summer".to_string(),
                "https://other.example/products/hat".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_all_rejects_unparseable_input() {
        let origin = Url::parse("https://shop.example").unwrap();
        let err = resolve_all(&origin, &["http://[::1".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::InvalidUrl(_)));
    }
}
