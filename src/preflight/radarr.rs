//! Radarr preflight check.

use super::CheckResult;
use crate::models::config::RadarrConfig;
use crate::services::radarr::RadarrClient;

/// Check that Radarr answers with the configured credentials.
pub async fn check(config: &RadarrConfig) -> CheckResult {
    let client = match RadarrClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            return CheckResult::fail(
                "Radarr",
                &e.to_string(),
                "Set radarr.url and radarr.api_key, or radarr.config_xml",
            )
        }
    };

    match client.version().await {
        Ok(version) => CheckResult::ok("Radarr", &format!("connected (v{})", version)),
        Err(e) => CheckResult::fail("Radarr", &e.to_string(), "Check radarr.url and radarr.api_key"),
    }
}
