//! Host bind-path normalization.
//!
//! Catalogs written for Portainer or Synology hosts carry their own appdata
//! roots; both are rebased onto `/opt/appdata/` and lowercased.

use crate::catalog::Volume;

/// Portainer's appdata root, matched against the bind as written.
pub const PORTAINER_APPDATA_ROOT: &str = "/portainer/Files/AppData/Config/";
/// Synology's docker share, matched after lowercasing so any casing of it
/// is rebased.
pub const SYNOLOGY_APPDATA_ROOT: &str = "/volume1/docker/";
pub const APPDATA_ROOT: &str = "/opt/appdata/";
const CONFIG_SUFFIX: &str = "/config";

/// Rebase a single bind path and lowercase it.
pub fn rewrite_bind(bind: &str) -> String {
    let lowered = match bind.strip_prefix(PORTAINER_APPDATA_ROOT) {
        Some(rest) => format!("{APPDATA_ROOT}{rest}").to_lowercase(),
        None => bind.to_lowercase(),
    };
    match lowered.strip_prefix(SYNOLOGY_APPDATA_ROOT) {
        Some(rest) => format!("{APPDATA_ROOT}{rest}"),
        None => lowered,
    }
}

/// Rewrite every bind path in place.
pub fn rewrite_binds(volumes: &mut [Volume]) {
    for volume in volumes {
        if let Some(bind) = volume.bind.as_mut() {
            *bind = rewrite_bind(bind);
        }
    }
}

/// A lone `<app>/config` mount becomes a mount of `<app>` itself. Templates
/// with several volumes are left alone.
pub fn collapse_single_config_volume(volumes: &mut [Volume]) {
    let [volume] = volumes else {
        return;
    };
    if let Some(bind) = volume.bind.as_mut() {
        if bind.ends_with(CONFIG_SUFFIX) {
            bind.truncate(bind.len() - CONFIG_SUFFIX.len());
        }
    }
}
