//! Remote command intents and their wire encoding.
//!
//! Commands are space-delimited ASCII lines with a case-sensitive keyword
//! first. Each command travels as one discrete text frame.
//!
//! # Wire Forms
//!
//! | Intent | Wire form |
//! |--------|-----------|
//! | [`Command::Ping`] | `PING` |
//! | [`Command::Press`] | `PRESS <key>` |
//! | [`Command::Type`] | `TYPE <text>` |
//! | [`Command::Volume`] | `VOL up <n>` / `VOL down <n>` / `VOL mute` |
//! | [`Command::Nav`] | `NAV <dir>` |
//! | [`Command::Media`] | `MEDIA <action>` |
//! | [`Command::Extra`] | `EXTRA <action>` |
//! | [`Command::Shutdown`] | `SHUTDOWN` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Command
// ============================================================================

/// A user intent, prior to wire encoding.
///
/// Enumerated arguments are typed, so every value of this enum encodes to a
/// line the remote host understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Heartbeat.
    Ping,
    /// Press a key by name. Passed through unchecked.
    Press(String),
    /// Type literal text. Passed through unchecked.
    Type(String),
    /// Change volume by a signed delta; zero toggles mute.
    Volume(i32),
    /// Navigation key.
    Nav(NavDirection),
    /// Media transport control.
    Media(MediaAction),
    /// Window and shell actions.
    Extra(ExtraAction),
    /// Power off the remote host.
    Shutdown,
}

impl Command {
    /// Returns the wire keyword for this command.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Press(_) => "PRESS",
            Self::Type(_) => "TYPE",
            Self::Volume(_) => "VOL",
            Self::Nav(_) => "NAV",
            Self::Media(_) => "MEDIA",
            Self::Extra(_) => "EXTRA",
            Self::Shutdown => "SHUTDOWN",
        }
    }

    /// Encodes the command into its wire string.
    #[must_use]
    pub fn encode(&self) -> String {
        let keyword = self.keyword();
        match self {
            Self::Ping | Self::Shutdown => keyword.to_string(),
            Self::Press(key) => format!("{keyword} {key}"),
            Self::Type(text) => format!("{keyword} {text}"),
            Self::Volume(delta) => format!("{keyword} {}", encode_volume(*delta)),
            Self::Nav(dir) => format!("{keyword} {}", dir.as_str()),
            Self::Media(action) => format!("{keyword} {}", action.as_str()),
            Self::Extra(action) => format!("{keyword} {}", action.as_str()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Volume arguments. `unsigned_abs` keeps `i32::MIN` representable.
fn encode_volume(delta: i32) -> String {
    match delta {
        0 => "mute".to_string(),
        d if d > 0 => format!("up {d}"),
        d => format!("down {}", d.unsigned_abs()),
    }
}

// ============================================================================
// Parsing
// ============================================================================

impl FromStr for Command {
    type Err = Error;

    /// Parses a wire-form line.
    ///
    /// The keyword is case-sensitive. `PRESS` and `TYPE` take the rest of
    /// the line verbatim (after the single separating space).
    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (keyword, rest) = match line.split_once(' ') {
            Some((keyword, rest)) => (keyword, Some(rest)),
            None => (line, None),
        };

        match (keyword, rest) {
            ("PING", None) => Ok(Self::Ping),
            ("SHUTDOWN", None) => Ok(Self::Shutdown),
            ("PRESS", Some(key)) if !key.is_empty() => Ok(Self::Press(key.to_string())),
            ("TYPE", Some(text)) => Ok(Self::Type(text.to_string())),
            ("VOL", Some(args)) => parse_volume(args).map(Self::Volume),
            ("NAV", Some(dir)) => dir.parse().map(Self::Nav),
            ("MEDIA", Some(action)) => action.parse().map(Self::Media),
            ("EXTRA", Some(action)) => action.parse().map(Self::Extra),
            ("PING" | "SHUTDOWN", Some(_)) => Err(Error::invalid_argument(format!(
                "{keyword} takes no arguments"
            ))),
            ("PRESS" | "TYPE" | "VOL" | "NAV" | "MEDIA" | "EXTRA", _) => Err(
                Error::invalid_argument(format!("{keyword} requires an argument")),
            ),
            _ => Err(Error::unknown_command(keyword)),
        }
    }
}

fn parse_volume(args: &str) -> Result<i32> {
    let mut parts = args.split(' ');
    let direction = parts.next().unwrap_or_default();
    let magnitude = parts.next();

    if parts.next().is_some() {
        return Err(Error::invalid_argument(format!("VOL: trailing input in '{args}'")));
    }

    let delta = match (direction, magnitude) {
        ("mute", None) => return Ok(0),
        ("up", Some(n)) => i64::from(parse_magnitude(n)?),
        ("down", Some(n)) => -i64::from(parse_magnitude(n)?),
        _ => {
            return Err(Error::invalid_argument(format!(
                "VOL expects 'up <n>', 'down <n>' or 'mute', got '{args}'"
            )));
        }
    };

    // `down 2147483648` is the encoding of `i32::MIN`.
    i32::try_from(delta)
        .map_err(|_| Error::invalid_argument(format!("volume delta out of range in '{args}'")))
}

/// Magnitudes are strictly positive; zero is spelled `mute`.
fn parse_magnitude(raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::invalid_argument(format!(
            "volume magnitude must be a positive integer, got '{raw}'"
        ))),
    }
}

// ============================================================================
// NavDirection
// ============================================================================

/// Navigation keys accepted by `NAV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavDirection {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Enter/Return.
    Enter,
    /// Space bar.
    Space,
    /// Browser/app back.
    Back,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Shift+Tab.
    ShiftTab,
}

impl NavDirection {
    /// Every direction, in wire-table order.
    pub const ALL: [Self; 10] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Enter,
        Self::Space,
        Self::Back,
        Self::Backspace,
        Self::Tab,
        Self::ShiftTab,
    ];

    /// Returns the wire argument.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Enter => "enter",
            Self::Space => "space",
            Self::Back => "back",
            Self::Backspace => "backspace",
            Self::Tab => "tab",
            Self::ShiftTab => "s-tab",
        }
    }
}

impl FromStr for NavDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|dir| dir.as_str() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown NAV direction '{s}'")))
    }
}

// ============================================================================
// MediaAction
// ============================================================================

/// Media controls accepted by `MEDIA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaAction {
    /// Play/pause toggle.
    Play,
    /// Skip forward.
    Forward,
    /// Skip backward.
    Backward,
}

impl MediaAction {
    /// Every action, in wire-table order.
    pub const ALL: [Self; 3] = [Self::Play, Self::Forward, Self::Backward];

    /// Returns the wire argument.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl FromStr for MediaAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown MEDIA action '{s}'")))
    }
}

// ============================================================================
// ExtraAction
// ============================================================================

/// Window and shell actions accepted by `EXTRA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtraAction {
    /// Maximize the focused window.
    Maximize,
    /// Reload the focused page.
    Reload,
    /// Windows/Super key.
    Windows,
    /// Open search.
    Search,
}

impl ExtraAction {
    /// Every action, in wire-table order.
    pub const ALL: [Self; 4] = [Self::Maximize, Self::Reload, Self::Windows, Self::Search];

    /// Returns the wire argument.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maximize => "maximize",
            Self::Reload => "reload",
            Self::Windows => "windows",
            Self::Search => "search",
        }
    }
}

impl FromStr for ExtraAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown EXTRA action '{s}'")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::Ping.encode(), "PING");
        assert_eq!(Command::Shutdown.encode(), "SHUTDOWN");
        assert_eq!(Command::Press("a".into()).encode(), "PRESS a");
        assert_eq!(Command::Type("hello world".into()).encode(), "TYPE hello world");
    }

    #[test]
    fn test_volume_encoding() {
        assert_eq!(Command::Volume(3).encode(), "VOL up 3");
        assert_eq!(Command::Volume(-7).encode(), "VOL down 7");
        assert_eq!(Command::Volume(0).encode(), "VOL mute");
    }

    #[test]
    fn test_volume_extremes() {
        assert_eq!(Command::Volume(i32::MIN).encode(), "VOL down 2147483648");
        assert_eq!(Command::Volume(i32::MAX).encode(), "VOL up 2147483647");
    }

    #[test]
    fn test_enumerated_encoding() {
        assert_eq!(Command::Nav(NavDirection::Left).encode(), "NAV left");
        assert_eq!(Command::Nav(NavDirection::ShiftTab).encode(), "NAV s-tab");
        assert_eq!(Command::Media(MediaAction::Backward).encode(), "MEDIA backward");
        assert_eq!(Command::Extra(ExtraAction::Windows).encode(), "EXTRA windows");
    }

    #[test]
    fn test_every_nav_direction() {
        let wire: Vec<String> = NavDirection::ALL
            .into_iter()
            .map(|dir| Command::Nav(dir).encode())
            .collect();
        assert_eq!(
            wire,
            [
                "NAV up",
                "NAV down",
                "NAV left",
                "NAV right",
                "NAV enter",
                "NAV space",
                "NAV back",
                "NAV backspace",
                "NAV tab",
                "NAV s-tab",
            ]
        );
    }

    #[test]
    fn test_display_matches_encode() {
        let cmd = Command::Media(MediaAction::Play);
        assert_eq!(cmd.to_string(), cmd.encode());
    }

    #[test]
    fn test_volume_extremes_parse_back() {
        assert_eq!(
            "VOL down 2147483648".parse::<Command>().unwrap(),
            Command::Volume(i32::MIN)
        );
        assert_eq!(
            "VOL up 2147483647".parse::<Command>().unwrap(),
            Command::Volume(i32::MAX)
        );

        let err = "VOL up 2147483648".parse::<Command>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!("VOL down 2147483649".parse::<Command>().is_err());
        assert!("VOL up 4294967296".parse::<Command>().is_err());
    }

    #[test]
    fn test_keyword() {
        assert_eq!(Command::Volume(-1).keyword(), "VOL");
        assert_eq!(Command::Type(String::new()).keyword(), "TYPE");
    }

    #[test]
    fn test_parse_wire_forms() {
        assert_eq!("PING".parse::<Command>().unwrap(), Command::Ping);
        assert_eq!("VOL down 7".parse::<Command>().unwrap(), Command::Volume(-7));
        assert_eq!("VOL mute".parse::<Command>().unwrap(), Command::Volume(0));
        assert_eq!(
            "NAV s-tab".parse::<Command>().unwrap(),
            Command::Nav(NavDirection::ShiftTab)
        );
        assert_eq!(
            "TYPE  two spaces".parse::<Command>().unwrap(),
            Command::Type(" two spaces".into())
        );
    }

    #[test]
    fn test_parse_strips_line_ending() {
        assert_eq!("SHUTDOWN\r\n".parse::<Command>().unwrap(), Command::Shutdown);
    }

    #[test]
    fn test_parse_rejects_out_of_domain() {
        let err = "NAV sideways".parse::<Command>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        assert!("MEDIA stop".parse::<Command>().is_err());
        assert!("EXTRA explode".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_volume() {
        assert!("VOL up 0".parse::<Command>().is_err());
        assert!("VOL down -3".parse::<Command>().is_err());
        assert!("VOL up".parse::<Command>().is_err());
        assert!("VOL mute 2".parse::<Command>().is_err());
        assert!("VOL up 3 4".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "ping".parse::<Command>().unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
        assert!("NAV Left".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_argument_arity() {
        assert!("PING now".parse::<Command>().is_err());
        assert!("PRESS".parse::<Command>().is_err());
        assert!("PRESS ".parse::<Command>().is_err());
    }

    proptest! {
        #[test]
        fn prop_volume_magnitude_is_abs_delta(delta in any::<i32>().prop_filter("non-zero", |d| *d != 0)) {
            let wire = Command::Volume(delta).encode();
            let expected_dir = if delta > 0 { "up" } else { "down" };
            prop_assert_eq!(wire, format!("VOL {} {}", expected_dir, delta.unsigned_abs()));
        }

        #[test]
        fn prop_volume_parses_back(delta in any::<i32>()) {
            let wire = Command::Volume(delta).encode();
            prop_assert_eq!(wire.parse::<Command>().unwrap(), Command::Volume(delta));
        }
    }
}
