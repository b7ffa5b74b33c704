use mirror_store::{MirrorStore, ReportLevel};
use serde_json::Value;
use tracing::info;

use super::Event;
use crate::json;

/// Body type `version`: report the software and API versions of the remote.
pub fn handle<S>(store: &mut S, event: &Event<'_>, body: &Value)
where
    S: MirrorStore + ?Sized,
{
    let version = json::get_str(body, "weechat_version").unwrap_or("?");
    let git = json::get_str(body, "weechat_version_git").unwrap_or("?");
    let api = json::get_str(body, "relay_api_version").unwrap_or("?");

    let message = format!(
        "remote[{}]: WeeChat: {version} ({git}), API: {api}",
        event.remote.name
    );
    store.report(ReportLevel::Info, &message);

    info!(
        remote = %event.remote.name,
        version,
        git,
        api,
        "remote version"
    );
}
