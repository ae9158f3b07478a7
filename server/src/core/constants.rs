// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Kush Gateway";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "kush_gateway";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".kush-gateway";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "kush-gateway.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "KUSH_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "KUSH_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "KUSH_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "KUSH_LOG";

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "KUSH_DEBUG";

// =============================================================================
// Environment Variables - Worker Bindings
// =============================================================================

/// Identity provider base URL
pub const ENV_AUTH_API_URL: &str = "AUTH_API_URL";

/// Deployment environment (development, staging, production)
pub const ENV_API_ENV: &str = "API_ENV";

/// Confidential client credential sent on token requests
pub const ENV_API_TOKEN: &str = "API_TOKEN";

/// HMAC key for signing OAuth state tokens
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";

/// OAuth client identifier
pub const ENV_CLIENT_ID: &str = "KUSH_CLIENT_ID";

/// OAuth redirect URI registered with the provider
pub const ENV_REDIRECT_URI: &str = "KUSH_REDIRECT_URI";

/// Legacy fallback endpoint URL
pub const ENV_FALLBACK_URL: &str = "KUSH_FALLBACK_URL";

/// Enable or disable the emergency fallback
pub const ENV_FALLBACK_ENABLED: &str = "KUSH_FALLBACK_ENABLED";

// =============================================================================
// Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8787;

/// Default identity provider
pub const DEFAULT_AUTH_API_URL: &str = "https://kush.observer";

/// Default OAuth client identifier
pub const DEFAULT_CLIENT_ID: &str = "kush-wellness";

/// Timeout for calls to the identity provider
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Timeout for calls to the fallback endpoint
pub const DEFAULT_FALLBACK_TIMEOUT_SECS: u64 = 10;

/// Minimum JWT secret length accepted in production
pub const MIN_JWT_SECRET_BYTES: usize = 32;

// =============================================================================
// Session Cookies
// =============================================================================

/// Access token cookie
pub const ACCESS_COOKIE_NAME: &str = "kush_access";

/// Refresh token cookie
pub const REFRESH_COOKIE_NAME: &str = "kush_refresh";

/// ID token cookie
pub const ID_COOKIE_NAME: &str = "kush_id";

/// OAuth state cookie (login round trip only)
pub const OAUTH_STATE_COOKIE_NAME: &str = "kush_oauth_state";

/// Refresh cookie lifetime
pub const REFRESH_COOKIE_TTL_DAYS: i64 = 30;

/// OAuth state token lifetime
pub const OAUTH_STATE_TTL_SECS: i64 = 600;

/// Header carrying a refresh token for bearer-authenticated clients
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

// =============================================================================
// Auth Failures and Fallback
// =============================================================================

/// Machine-readable code carried by every authentication failure
pub const AUTH_FAILURE_CODE: &str = "AUTH_FAILURE";

/// Header marking requests forwarded to the legacy fallback endpoint
pub const FALLBACK_HEADER: &str = "x-emergency-fallback";

// =============================================================================
// Body Limits
// =============================================================================

/// Default request body limit
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for auth endpoints
pub const AUTH_BODY_LIMIT: usize = 64 * 1024;

/// Largest body the fallback middleware buffers for replay
pub const FALLBACK_BODY_LIMIT: usize = 1024 * 1024;
