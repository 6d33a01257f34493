//! Sample settings documents and template directories.

use std::fs;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Base template shipped with the repository for Varnish 6.
pub const VARNISH6_TEMPLATE: &str = include_str!("../../../templates/varnish6.vcl");

/// Settings document exercising every variable the generator produces.
pub const SAMPLE_SETTINGS: &str = r##"{
    "default": {
        "system/full_page_cache/varnish/backend_host": "web",
        "system/full_page_cache/varnish/backend_port": "8080",
        "system/full_page_cache/varnish/access_list": "127.0.0.1, 10.0.0.0/8,,",
        "system/full_page_cache/varnish/grace_period": "300",
        "web/secure/offloader_header": "X-Forwarded-Proto",
        "system/full_page_cache/varnish/enable_bfcache": "1",
        "system/full_page_cache/varnish/enable_media_cache": "0",
        "system/full_page_cache/varnish/enable_static_cache": "1",
        "system/full_page_cache/varnish/enable_404_cache": "1",
        "system/full_page_cache/varnish/use_xkey_vmod": "1",
        "system/full_page_cache/varnish/use_soft_purging": "1",
        "system/full_page_cache/varnish/tracking_parameters": "{\"_1\":{\"param\":\"utm_source\"},\"_2\":{\"param\":\"gclid\"}}",
        "system/full_page_cache/varnish/pass_on_cookie_presence": "{\"_1\":{\"cookie_name\":\"PHPSESSID\"}}",
        "design/theme/ua_regexp": "{\"_1\":{\"regexp\":\"/iPhone|Android/i\",\"value\":\"mobile\"},\"_2\":{\"regexp\":\"#MSIE [5-8]#\",\"value\":\"legacy\"}}"
    },
    "stores": {
        "nl": {
            "design/theme/ua_regexp": "[{\"regexp\":\"/Kindle/\",\"value\":\"reader\"}]"
        }
    }
}"##;

/// Write `body` as `varnish<version>.vcl` into a fresh temporary directory.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn template_dir(version: u8, body: &str) -> Result<TempDir> {
    let dir = tempfile::tempdir().context("failed to create template directory")?;
    let path = dir.path().join(format!("varnish{version}.vcl"));
    fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(dir)
}
