//! NATS subject names.
//!
//! Each client listens on its own inbox and publishes to a single shared
//! server subject.

/// Root prefix for all runtime subjects.
pub const PREFIX: &str = "rtb";

/// Messages from clients to the session server.
pub const SERVER: &str = "rtb.server";

/// Build the inbox subject for a player.
///
/// `rtb.client.<player>`
#[must_use]
pub fn client_inbox(player: &str) -> String {
    format!("{PREFIX}.client.{player}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_inbox() {
        assert_eq!(client_inbox("abc"), "rtb.client.abc");
    }

    #[test]
    fn test_server_is_prefixed() {
        assert!(SERVER.starts_with(PREFIX));
    }
}
