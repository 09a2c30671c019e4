pub const APP_NAME: &str = "workshop-planner";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Release tag when built from a tagged checkout, otherwise the crate
/// version with the commit it was built from, if known.
pub fn version_label() -> String {
    match (GIT_TAG, GIT_COMMIT) {
        (Some(tag), _) => tag.to_string(),
        (None, Some(commit)) => format!("v{APP_VERSION}+{commit}"),
        (None, None) => format!("v{APP_VERSION}"),
    }
}

/// User agent sent to the market API.
pub fn user_agent() -> String {
    format!("{APP_NAME}/{}", version_label())
}
