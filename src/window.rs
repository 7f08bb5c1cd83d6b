//! Window vocabulary shared by every component.
//!
//! The same physical window is reported twice: once by the
//! [`AccessibilityProvider`](crate::traits::AccessibilityProvider) as a
//! [`WindowDescriptor`] and once by the
//! [`CompositorSource`](crate::traits::CompositorSource) as a
//! [`CompositorWindowInfo`].  The [`WindowId`] is the join key between the
//! two views; reconciliation produces [`EligibleWindow`]s.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque window identifier (on Hyprland, the client address `0x…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The process that owns a window.  Windows are grouped by owner for the
/// cascade and focus layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.0)
    }
}

/// One window as seen by the accessibility layer.
///
/// The frame may be stale relative to what the compositor draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub id: WindowId,
    pub owner: OwnerId,
    /// Application name (on Hyprland, the window class).
    pub app: String,
    pub frame: Rect,
    pub is_window: bool,
    pub is_sheet: bool,
    pub is_minimized: bool,
    pub is_hidden: bool,
    pub is_system_dialog: bool,
}

impl WindowDescriptor {
    /// A plain, visible top-level window.
    pub fn new(id: impl Into<String>, owner: i64, frame: Rect) -> Self {
        Self {
            id: WindowId::new(id),
            owner: OwnerId(owner),
            app: String::new(),
            frame,
            is_window: true,
            is_sheet: false,
            is_minimized: false,
            is_hidden: false,
            is_system_dialog: false,
        }
    }

    /// Whether any flag rules this window out of layouts regardless of
    /// what the compositor reports.
    pub fn is_special(&self) -> bool {
        !self.is_window
            || self.is_sheet
            || self.is_minimized
            || self.is_hidden
            || self.is_system_dialog
    }
}

/// The same window as seen by the compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositorWindowInfo {
    pub id: WindowId,
    /// Stacking layer.  `0` is the normal application layer.
    pub layer: i32,
    pub frame: Rect,
    pub owner: OwnerId,
    pub alpha: f64,
    pub process_name: String,
}

/// A window that survived reconciliation and may be arranged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleWindow {
    pub id: WindowId,
    pub owner: OwnerId,
    pub frame: Rect,
}

impl From<&WindowDescriptor> for EligibleWindow {
    fn from(d: &WindowDescriptor) -> Self {
        Self {
            id: d.id.clone(),
            owner: d.owner,
            frame: d.frame,
        }
    }
}

/// A screen and its usable frame (reserved areas already removed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub name: String,
    pub frame: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_descriptor_is_not_special() {
        let d = WindowDescriptor::new("0x1", 10, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(!d.is_special());
    }

    #[test]
    fn each_flag_makes_descriptor_special() {
        let base = WindowDescriptor::new("0x1", 10, Rect::new(0.0, 0.0, 10.0, 10.0));
        let variants = [
            WindowDescriptor { is_window: false, ..base.clone() },
            WindowDescriptor { is_sheet: true, ..base.clone() },
            WindowDescriptor { is_minimized: true, ..base.clone() },
            WindowDescriptor { is_hidden: true, ..base.clone() },
            WindowDescriptor { is_system_dialog: true, ..base.clone() },
        ];
        for d in variants {
            assert!(d.is_special(), "{:?}", d);
        }
    }

    #[test]
    fn window_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&WindowId::new("0xdead")).unwrap();
        assert_eq!(json, r#""0xdead""#);
    }
}
