//! Core traits that decouple hyprarrange from any specific compositor,
//! clock, or transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements some of these traits.  The
//! [`LayoutDispatcher`](crate::dispatcher::LayoutDispatcher) only depends on
//! these abstractions.

use crate::action::Command;
use crate::geometry::Rect;
use crate::window::{CompositorWindowInfo, Screen, WindowDescriptor, WindowId};
use std::sync::mpsc;
use std::time::Instant;

/// Accessibility-level view of the windows: every window the desktop
/// reports, including ones the compositor would never draw.
pub trait AccessibilityProvider {
    /// The error type produced by this provider.
    type Error: std::error::Error + Send + 'static;

    /// Every window the provider knows about, in traversal order.
    fn list_windows(&self) -> Result<Vec<WindowDescriptor>, Self::Error>;

    /// The window that currently has keyboard focus, if any.
    fn frontmost_window(&self) -> Result<Option<WindowDescriptor>, Self::Error>;
}

/// Compositor-level window enumeration.
///
/// Wrapped by [`WindowInfoCache`](crate::cache::WindowInfoCache); callers
/// should rarely need to invoke it directly.
pub trait CompositorSource {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Return on-screen, non-desktop windows.  With `ids` set, only windows
    /// whose identifier is in the slice are returned.
    fn compositor_windows(
        &self,
        ids: Option<&[WindowId]>,
    ) -> Result<Vec<CompositorWindowInfo>, Self::Error>;
}

/// Maps a window to the screen it is on.
pub trait ScreenDetector {
    /// The error type produced by this detector.
    type Error: std::error::Error + Send + 'static;

    /// The screen containing `window`, with its usable frame, or `None` if
    /// the window is on no known screen.
    fn screen_for(&self, window: &WindowDescriptor) -> Result<Option<Screen>, Self::Error>;

    /// [`screen_for`](Self::screen_for) for many windows at once, one entry
    /// per window in input order.
    ///
    /// The default queries window by window.  Backends where a query is a
    /// round trip should override it.
    fn screens_for(
        &self,
        windows: &[WindowDescriptor],
    ) -> Result<Vec<Option<Screen>>, Self::Error> {
        windows.iter().map(|w| self.screen_for(w)).collect()
    }
}

/// Applies geometry to real windows.
///
/// All operations are best effort: the dispatcher logs failures and moves
/// on to the next window.
pub trait WindowMover {
    /// The error type produced by this mover.
    type Error: std::error::Error + Send + 'static;

    /// Move and resize `window` to `frame`.
    fn set_frame(&self, window: &WindowId, frame: Rect) -> Result<(), Self::Error>;

    /// Raise `window` above its siblings.
    fn bring_to_front(&self, window: &WindowId) -> Result<(), Self::Error>;

    /// Tell the user an action could not run (a beep, a notification, …).
    ///
    /// The default does nothing.
    fn alert(&self, _message: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Source of monotonic time, injectable so expiry logic can be tested
/// without sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Decides whether a window is opted out of layouts entirely, independent of
/// its visibility.
pub trait ExclusionPolicy {
    fn excludes(&self, window: &WindowDescriptor) -> bool;
}

/// Excludes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusions;

impl ExclusionPolicy for NoExclusions {
    fn excludes(&self, _window: &WindowDescriptor) -> bool {
        false
    }
}

impl<F> ExclusionPolicy for F
where
    F: Fn(&WindowDescriptor) -> bool,
{
    fn excludes(&self, window: &WindowDescriptor) -> bool {
        self(window)
    }
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel) and forward parsed commands into the provided
/// [`mpsc::Sender`].  The receiving end is drained by a single consumer,
/// which is what serialises layout actions.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
