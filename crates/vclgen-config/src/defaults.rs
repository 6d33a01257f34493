//! Configuration paths and fallback values for stored settings.
//!
//! # Design
//! - Paths mirror the keys used by the settings table the generator reads from.
//! - Fallbacks apply only when a path is absent or null in every scope.

/// Backend host the generated VCL proxies to.
pub const BACKEND_HOST_PATH: &str = "system/full_page_cache/varnish/backend_host";
/// Backend port the generated VCL proxies to.
pub const BACKEND_PORT_PATH: &str = "system/full_page_cache/varnish/backend_port";
/// Comma-separated list of addresses allowed to purge.
pub const ACCESS_LIST_PATH: &str = "system/full_page_cache/varnish/access_list";
/// Grace period in seconds.
pub const GRACE_PERIOD_PATH: &str = "system/full_page_cache/varnish/grace_period";
/// Header set by the TLS terminator in front of the cache.
pub const OFFLOADER_HEADER_PATH: &str = "web/secure/offloader_header";
/// Serialized user-agent design exception rules (store scoped).
pub const DESIGN_EXCEPTIONS_PATH: &str = "design/theme/ua_regexp";
/// Back/forward cache toggle.
pub const ENABLE_BFCACHE_PATH: &str = "system/full_page_cache/varnish/enable_bfcache";
/// Media caching toggle.
pub const ENABLE_MEDIA_CACHE_PATH: &str = "system/full_page_cache/varnish/enable_media_cache";
/// Static file caching toggle.
pub const ENABLE_STATIC_CACHE_PATH: &str = "system/full_page_cache/varnish/enable_static_cache";
/// 404 response caching toggle.
pub const ENABLE_404_CACHE_PATH: &str = "system/full_page_cache/varnish/enable_404_cache";
/// Tracking parameters stripped from request URLs.
pub const TRACKING_PARAMETERS_PATH: &str = "system/full_page_cache/varnish/tracking_parameters";
/// Use the xkey vmod for tag based purging.
pub const USE_XKEY_VMOD_PATH: &str = "system/full_page_cache/varnish/use_xkey_vmod";
/// Use soft purging instead of hard bans.
pub const USE_SOFT_PURGING_PATH: &str = "system/full_page_cache/varnish/use_soft_purging";
/// Cookies whose presence bypasses the cache.
pub const PASS_ON_COOKIE_PRESENCE_PATH: &str =
    "system/full_page_cache/varnish/pass_on_cookie_presence";

/// Fallback backend host.
pub const DEFAULT_BACKEND_HOST: &str = "localhost";
/// Fallback backend port.
pub const DEFAULT_BACKEND_PORT: i64 = 8080;
/// Fallback purge access list.
pub const DEFAULT_ACCESS_LIST: &str = "localhost";
/// Fallback grace period in seconds.
pub const DEFAULT_GRACE_PERIOD: i64 = 300;
/// Fallback SSL offload header.
pub const DEFAULT_OFFLOADER_HEADER: &str = "X-Forwarded-Proto";
