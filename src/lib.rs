//! **hyprarrange**: named window arrangements on demand.
//!
//! A command (typically bound to a key) asks for one of a handful of
//! layouts: grid-tile every window, cascade them, or the *focus* layout
//! where one application's main window takes 70% of the screen and repeated
//! commands cycle which application that is.
//!
//! # Architecture
//!
//! * [`resolver`] joins the accessibility view of the windows with a cached
//!   ([`cache`]) compositor snapshot to find the windows worth arranging.
//! * [`layout`] holds the pure geometry; [`focus`] the focus-cycle state.
//! * [`dispatcher`] maps an [`action::Action`] to the pieces above and
//!   applies the result.
//!
//! Everything that touches the desktop goes through the collaborator traits
//! in [`traits`], so the engine is not coupled to a specific compositor.
//! The concrete implementations live in [`hyprland`] (Hyprland IPC) and
//! [`ipc`] (Unix-socket command listener).

pub mod action;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod focus;
pub mod geometry;
pub mod hyprland;
pub mod ipc;
pub mod layout;
pub mod resolver;
pub mod traits;
pub mod window;
