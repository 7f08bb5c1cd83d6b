//! Hyprland-specific implementations.
//!
//! This module provides a concrete backend for the collaborator traits in
//! [`traits`](crate::traits), powered by Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod wm;
