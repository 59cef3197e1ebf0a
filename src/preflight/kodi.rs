//! Kodi preflight check.

use super::CheckResult;
use crate::core::path_map::PathSyntax;
use crate::models::config::KodiConfig;
use crate::services::kodi::KodiClient;
use crate::services::LibraryHost;

/// Check that Kodi answers JSON-RPC pings.
pub async fn check(config: &KodiConfig) -> CheckResult {
    let name = format!("Kodi ({})", config.name);
    let client = match KodiClient::new(config) {
        Ok(client) => client,
        Err(e) => return CheckResult::fail(&name, &e.to_string(), "Check the kodi section"),
    };

    match client.ping().await {
        Ok(true) => {
            let syntax = match client.path_syntax().await {
                PathSyntax::Posix => "posix paths",
                PathSyntax::Windows => "windows paths",
            };
            CheckResult::ok(&name, &format!("connected, {}", syntax))
        }
        Ok(false) => CheckResult::fail(&name, "unexpected ping reply", "Is this a Kodi host?"),
        Err(e) => CheckResult::fail(
            &name,
            &e.to_string(),
            "Enable Kodi's web server and check kodi.host, kodi.port and credentials",
        ),
    }
}
