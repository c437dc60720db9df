use std::collections::HashMap;

const DOMAIN_KEY: &str = "DOMAIN";
const LOCAL_DOMAIN_PREFIXES: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];
const PREDICT_PATH: &str = "/api/predict";
const HEALTH_PATH: &str = "/health";

fn is_local_domain(value: &str) -> bool {
    let lower = value.to_lowercase();
    LOCAL_DOMAIN_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Accepts a bare host name (optionally with a port), nothing else.
pub fn normalize_domain(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains("://")
        || trimmed.contains('/')
        || trimmed.contains('?')
        || trimmed.contains('#')
    {
        return None;
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// Accepts an absolute http(s) URL and strips query, fragment and trailing slashes.
pub fn normalize_base_url(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    let lower = trimmed.to_ascii_lowercase();
    let scheme_len = if lower.starts_with("https://") {
        "https://".len()
    } else if lower.starts_with("http://") {
        "http://".len()
    } else {
        return None;
    };

    let without_suffix = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed)
        .trim_end_matches('/');
    let host = without_suffix.get(scheme_len..)?;
    let host_only = host.split('/').next().unwrap_or(host);
    normalize_domain(Some(host_only))?;
    Some(without_suffix.to_string())
}

pub fn resolve_app_domain(settings: &HashMap<String, String>) -> Option<String> {
    settings
        .get(DOMAIN_KEY)
        .and_then(|value| normalize_domain(Some(value.as_str())))
}

pub fn resolve_app_base_url(settings: &HashMap<String, String>) -> Option<String> {
    let domain = resolve_app_domain(settings)?;
    let scheme = if is_local_domain(&domain) {
        "http"
    } else {
        "https"
    };
    Some(format!("{}://{}", scheme, domain))
}

pub fn predict_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), PREDICT_PATH)
}

pub fn health_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH)
}
