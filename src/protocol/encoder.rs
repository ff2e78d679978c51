//! Intent helpers layered over a send primitive.
//!
//! [`CommandEncoder`] is a stateless mapping from intents to wire strings.
//! Implementors only supply [`CommandEncoder::send_line`]; every helper
//! encodes its intent and hands the string over verbatim. The encoder never
//! inspects transport state, so gating and reconnection stay the business of
//! whatever sits behind `send_line`.
//!
//! # Example
//!
//! ```ignore
//! use remote_control::{Client, CommandEncoder, NavDirection};
//!
//! let mut client = Client::builder().host("192.168.1.20:8000").spawn()?;
//! client.nav(NavDirection::Left);
//! client.volume(-3); // "VOL down 3"
//! ```

// ============================================================================
// Imports
// ============================================================================

use super::command::{Command, ExtraAction, MediaAction, NavDirection};

// ============================================================================
// CommandEncoder
// ============================================================================

/// Encodes intents and routes them through a send primitive.
pub trait CommandEncoder {
    /// Hands one encoded command line to the channel.
    ///
    /// Fire-and-forget: implementors drop the line silently when the channel
    /// is unusable.
    fn send_line(&mut self, line: &str);

    /// Encodes and sends any [`Command`].
    fn dispatch(&mut self, command: &Command) {
        self.send_line(&command.encode());
    }

    /// Sends a heartbeat (`PING`).
    fn ping(&mut self) {
        self.dispatch(&Command::Ping);
    }

    /// Presses a key by name (`PRESS <key>`).
    fn press(&mut self, key: &str) {
        self.dispatch(&Command::Press(key.to_string()));
    }

    /// Types literal text (`TYPE <text>`).
    fn type_text(&mut self, text: &str) {
        self.dispatch(&Command::Type(text.to_string()));
    }

    /// Adjusts volume by `delta`; zero toggles mute.
    fn volume(&mut self, delta: i32) {
        self.dispatch(&Command::Volume(delta));
    }

    /// Sends a navigation key (`NAV <dir>`).
    fn nav(&mut self, direction: NavDirection) {
        self.dispatch(&Command::Nav(direction));
    }

    /// Sends a media control (`MEDIA <action>`).
    fn media(&mut self, action: MediaAction) {
        self.dispatch(&Command::Media(action));
    }

    /// Sends a window/shell action (`EXTRA <action>`).
    fn extra(&mut self, action: ExtraAction) {
        self.dispatch(&Command::Extra(action));
    }

    /// Powers off the remote host (`SHUTDOWN`).
    fn shutdown_host(&mut self) {
        self.dispatch(&Command::Shutdown);
    }
}

impl CommandEncoder for Vec<String> {
    fn send_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_route_encoded_lines() {
        let mut sink: Vec<String> = Vec::new();

        sink.ping();
        sink.press("F5");
        sink.type_text("hello");
        sink.volume(-7);
        sink.volume(0);
        sink.nav(NavDirection::Left);
        sink.media(MediaAction::Play);
        sink.extra(ExtraAction::Maximize);
        sink.shutdown_host();

        assert_eq!(
            sink,
            [
                "PING",
                "PRESS F5",
                "TYPE hello",
                "VOL down 7",
                "VOL mute",
                "NAV left",
                "MEDIA play",
                "EXTRA maximize",
                "SHUTDOWN",
            ]
        );
    }

    #[test]
    fn test_press_passes_key_unchecked() {
        let mut sink: Vec<String> = Vec::new();
        sink.press("ctrl+alt+whatever");
        assert_eq!(sink, ["PRESS ctrl+alt+whatever"]);
    }
}
