// ─────────────────────────────────────────────────────────────────────────────
// Sampling
// ─────────────────────────────────────────────────────────────────────────────

/// Combinations kept per restaurant after shuffling.
pub const DEFAULT_SAMPLE_CAP: usize = 5;

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Per-request timeout for backend calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Cookie the backend sets from `users/csrf/`.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header that echoes the anti-forgery cookie on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Cookie carrying an authenticated session.
pub const SESSION_COOKIE: &str = "sessionid";

// ─────────────────────────────────────────────────────────────────────────────
// Location
// ─────────────────────────────────────────────────────────────────────────────

/// How long a single location fix may take.
pub const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 10;

/// Public IP geolocation endpoint used by `--locate-ip`.
pub const DEFAULT_IP_LOCATION_URL: &str = "http://ip-api.com/json";

// ─────────────────────────────────────────────────────────────────────────────
// Presentation
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum Jaro-Winkler score for a "did you mean" restaurant suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.8;
