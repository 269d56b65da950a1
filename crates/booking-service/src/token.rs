//! Lookup token generation for reservations and sessions.

/// Prefix of reservation tokens.
pub const RESERVATION_TOKEN_PREFIX: &str = "rsv_";

/// Prefix of booking session tokens.
pub const SESSION_TOKEN_PREFIX: &str = "bks_";

/// Generates unguessable caller-facing tokens.
///
/// A token is a type prefix followed by 128 random bits, hex-encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Creates a new token generator.
    pub fn new() -> Self {
        Self
    }

    /// Token for a new seat reservation.
    pub fn reservation_token(&self) -> String {
        generate(RESERVATION_TOKEN_PREFIX)
    }

    /// Token for a new booking session.
    pub fn session_token(&self) -> String {
        generate(SESSION_TOKEN_PREFIX)
    }
}

fn generate(prefix: &str) -> String {
    let bytes: [u8; 16] = rand::random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{prefix}{hex}")
}
