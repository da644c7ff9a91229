//! Provider constants
//!
//! Defaults for the first-party account provider. Every value can be
//! overridden through [`crate::config::ProviderConfig`].

pub const DEFAULT_CLIENT_ID: &str = "71b963c1b7b6d119";
pub const DEFAULT_REDIRECT_SCHEME: &str = "npf71b963c1b7b6d119";
pub const REDIRECT_HOST: &str = "auth";

pub const AUTHORIZE_URL: &str = "https://accounts.nintendo.com/connect/1.0.0/authorize";
pub const SESSION_TOKEN_URL: &str = "https://accounts.nintendo.com/connect/1.0.0/api/session_token";
pub const ACCESS_TOKEN_URL: &str = "https://api-lp1.znc.srv.nintendo.net/v3/Account/Login";
pub const WEB_SERVICE_TOKEN_URL: &str =
    "https://api-lp1.znc.srv.nintendo.net/v2/Game/GetWebServiceToken";

pub const DEFAULT_SCOPE: &str = "openid user user.birthday user.mii user.screenName";
pub const RESPONSE_TYPE: &str = "session_token_code";
pub const CHALLENGE_PARAM: &str = "session_token_code_challenge";
pub const CHALLENGE_METHOD_PARAM: &str = "session_token_code_challenge_method";
pub const CODE_PARAM: &str = "session_token_code";
pub const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer-session-token";

/// Game id passed to the web-service token exchange.
pub const DEFAULT_GAME_ID: i64 = 5_741_031_244_955_648;

/// Provider envelope status for success.
pub const PROVIDER_STATUS_OK: i64 = 0;
/// Provider envelope status for an account without linked game data.
pub const PROVIDER_STATUS_MISSING_GAME_DATA: i64 = 9403;

/// Domain whose cookies are dropped on logout.
pub const DEFAULT_COOKIE_DOMAIN: &str = "nintendo.net";

pub const DEFAULT_KEYCHAIN_SERVICE: &str = "dev.inkstat.credentials";
pub const DEFAULT_KEYCHAIN_ACCOUNT: &str = "session";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("inkstat/", env!("CARGO_PKG_VERSION"));

/// Capacity of the process-wide event channels.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;
