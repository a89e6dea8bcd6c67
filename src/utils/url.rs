//! URL utilities for consistent endpoint construction

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use gemchat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://example.com/v1beta/"), "https://example.com/v1beta");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without doubling slashes
///
/// # Examples
///
/// ```
/// use gemchat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://example.com/v1beta/", "/models/m:generateContent"),
///     "https://example.com/v1beta/models/m:generateContent"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Endpoint for a `generateContent` call against `model`.
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    construct_api_url(base_url, &format!("models/{model}:generateContent"))
}
