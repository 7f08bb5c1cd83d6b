//! Actions and the command wire format.
//!
//! [`Action`] names every layout the dispatcher can perform.  [`Command`] is
//! what a [`CommandSource`](crate::traits::CommandSource) delivers: an action
//! *name* (validated only when the dispatcher handles it, so unknown names
//! can be reported as "not handled") and an optional anchor window.

use crate::window::WindowId;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every layout the dispatcher can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    /// Grid-tile every eligible window on the screen.
    TileAll,
    /// Cascade every eligible window from the screen's top-left corner.
    CascadeAll,
    /// Cascade only the windows of the active application.
    CascadeActiveApp,
    /// Grid-tile only the windows of the active application.
    TileActiveApp,
    /// Give the next owner the primary column of the focus layout.
    FocusNext,
    /// Give the previous owner the primary column of the focus layout.
    FocusPrev,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::TileAll,
        Action::CascadeAll,
        Action::CascadeActiveApp,
        Action::TileActiveApp,
        Action::FocusNext,
        Action::FocusPrev,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::TileAll => write!(f, "tile-all"),
            Action::CascadeAll => write!(f, "cascade-all"),
            Action::CascadeActiveApp => write!(f, "cascade-active-app"),
            Action::TileActiveApp => write!(f, "tile-active-app"),
            Action::FocusNext => write!(f, "focus-next"),
            Action::FocusPrev => write!(f, "focus-prev"),
        }
    }
}

/// Parse an action name (case-insensitive; accepts "tile-all", "tile_all",
/// "TileAll", "tileAll", …).
fn parse_action(s: &str) -> Option<Action> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "tileall" => Some(Action::TileAll),
        "cascadeall" => Some(Action::CascadeAll),
        "cascadeactiveapp" => Some(Action::CascadeActiveApp),
        "tileactiveapp" => Some(Action::TileActiveApp),
        "focusnext" => Some(Action::FocusNext),
        "focusprev" | "focusprevious" => Some(Action::FocusPrev),
        _ => None,
    }
}

/// Error for an unrecognised action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0:?} (expected one of {known})", known = known_actions())]
pub struct UnknownAction(pub String);

fn known_actions() -> String {
    Action::ALL.map(|a| a.to_string()).join(", ")
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_action(s).ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_action(&s).ok_or_else(|| DeError::custom(format!("invalid action: {:?}", s)))
    }
}

/// One user-triggered request.
///
/// Wire format: `{"action":"focus-next"}`,
/// `{"action":"tile-all","window":"0x55d0"}`, or a bare string
/// `"cascade-all"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// Action name as sent by the client.
    pub action: String,
    /// Optional anchor window; the frontmost window is used otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowId>,
}

impl Command {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            window: None,
        }
    }

    pub fn with_window(mut self, window: WindowId) -> Self {
        self.window = Some(window);
        self
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Command;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "object {{action, window?}} or an action name string")
            }
            fn visit_map<A>(self, mut map: A) -> Result<Command, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut action = None;
                let mut window: Option<Option<String>> = None;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "action" => action = Some(map.next_value::<String>()?),
                        "window" => window = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                Ok(Command {
                    action: action.ok_or_else(|| DeError::missing_field("action"))?,
                    window: window.flatten().map(WindowId),
                })
            }
            fn visit_str<E>(self, s: &str) -> Result<Command, E>
            where
                E: DeError,
            {
                Ok(Command::new(s))
            }
        }
        deserializer.deserialize_any(V)
    }
}
