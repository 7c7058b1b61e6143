//! Fan-out scope for location updates.

use std::fmt;
use std::str::FromStr;

/// Who receives `updateLocationResponse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationScope {
    /// Every connected session, whatever room it is in.
    #[default]
    Global,

    /// Members of the sender's room. An unaffiliated sender only gets its
    /// own echo.
    Room,
}

impl fmt::Display for LocationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Room => f.write_str("room"),
        }
    }
}

impl FromStr for LocationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "room" => Ok(Self::Room),
            other => Err(format!(
                "unknown location scope '{other}' (expected 'global' or 'room')"
            )),
        }
    }
}
