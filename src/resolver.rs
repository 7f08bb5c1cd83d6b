//! Eligible-window resolution.
//!
//! The accessibility layer reports windows the compositor never draws:
//! minimized windows that still report a frame, hidden helpers, stale
//! geometry.  [`WindowSetResolver`] joins every [`WindowDescriptor`] against
//! a fresh compositor snapshot by [`WindowId`] and keeps only windows that
//! are really visible on the anchor's screen.

use crate::cache::WindowInfoCache;
use crate::config::TodoConfig;
use crate::traits::{
    AccessibilityProvider, Clock, CompositorSource, ExclusionPolicy, NoExclusions,
    ScreenDetector, SystemClock,
};
use crate::window::{CompositorWindowInfo, EligibleWindow, Screen, WindowDescriptor, WindowId};
use log::{debug, warn};
use std::collections::HashSet;

/// The screen to arrange and the windows on it, in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindows {
    /// The window the action was anchored on (the frontmost one unless the
    /// caller named one).  It is not necessarily eligible itself.
    pub anchor: WindowDescriptor,
    pub screen: Screen,
    pub windows: Vec<EligibleWindow>,
}

/// Whether the compositor actually draws this window: normal layer, not
/// fully transparent, and with a positive size.
pub fn is_visible_compositor_window(info: &CompositorWindowInfo) -> bool {
    info.layer == 0 && info.alpha > 0.0 && !info.frame.is_empty()
}

/// Identifiers of every compositor window passing
/// [`is_visible_compositor_window`].
pub fn visible_ids(infos: &[CompositorWindowInfo]) -> HashSet<&WindowId> {
    infos
        .iter()
        .filter(|info| is_visible_compositor_window(info))
        .map(|info| &info.id)
        .collect()
}

/// Anything that can answer every query the resolver needs.
pub trait WindowSource: AccessibilityProvider + CompositorSource + ScreenDetector {}

impl<T> WindowSource for T where T: AccessibilityProvider + CompositorSource + ScreenDetector {}

/// Builds the list of eligible windows for one action.
///
/// Owns the compositor cache, so repeated actions within the cache timeout
/// reuse one compositor snapshot.
pub struct WindowSetResolver<P = NoExclusions, C: Clock = SystemClock> {
    cache: WindowInfoCache<C>,
    policy: P,
}

impl WindowSetResolver {
    pub fn new() -> Self {
        Self::with_parts(WindowInfoCache::new(), NoExclusions)
    }
}

impl Default for WindowSetResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ExclusionPolicy, C: Clock> WindowSetResolver<P, C> {
    pub fn with_parts(cache: WindowInfoCache<C>, policy: P) -> Self {
        Self { cache, policy }
    }

    pub fn cache_mut(&mut self) -> &mut WindowInfoCache<C> {
        &mut self.cache
    }

    /// Resolve the screen and eligible windows around `anchor` (the
    /// frontmost window when `None`).
    ///
    /// Returns `None` when there is no anchor window or it is on no known
    /// screen.  Backend failures are logged and treated the same way.
    /// With `order_by_owner`, windows are grouped by owner id before
    /// filtering; windows of one owner keep their traversal order.
    ///
    /// Screens are looked up once for the anchor and once, in a single
    /// batch, for every listed window.  A failed batch leaves no window
    /// eligible.
    pub fn resolve<B: WindowSource>(
        &mut self,
        backend: &B,
        anchor: Option<&WindowDescriptor>,
        order_by_owner: bool,
    ) -> Option<ResolvedWindows> {
        let frontmost;
        let anchor = match anchor {
            Some(anchor) => anchor,
            None => {
                frontmost = match backend.frontmost_window() {
                    Ok(w) => w,
                    Err(e) => {
                        warn!("frontmost window query failed: {}", e);
                        None
                    }
                };
                frontmost.as_ref()?
            }
        };

        let screen = screen_of(backend, anchor)?;
        debug!("anchor {} on screen {} ({})", anchor.id, screen.name, screen.frame);

        let mut descriptors = match backend.list_windows() {
            Ok(d) => d,
            Err(e) => {
                warn!("window enumeration failed: {}", e);
                return None;
            }
        };
        if order_by_owner {
            descriptors.sort_by_key(|d| d.owner);
        }

        let snapshot = self.cache.get(backend, None);
        let visible = visible_ids(&snapshot);
        let screens = match backend.screens_for(&descriptors) {
            Ok(screens) => screens,
            Err(e) => {
                warn!("screen detection failed: {}", e);
                Vec::new()
            }
        };

        let mut seen = HashSet::new();
        let mut windows = Vec::new();
        for (d, on) in descriptors.iter().zip(&screens) {
            if self.policy.excludes(d) {
                debug!("{} excluded by policy", d.id);
                continue;
            }
            if d.frame.is_empty() || d.is_special() {
                continue;
            }
            if !visible.contains(&d.id) {
                debug!("{} not drawn by the compositor", d.id);
                continue;
            }
            if on.as_ref().map_or(true, |s| s.name != screen.name) {
                continue;
            }
            if !seen.insert(&d.id) {
                continue;
            }
            windows.push(EligibleWindow::from(d));
        }

        debug!(
            "{} of {} windows eligible on {}",
            windows.len(),
            descriptors.len(),
            screen.name
        );
        Some(ResolvedWindows {
            anchor: anchor.clone(),
            screen,
            windows,
        })
    }
}

/// Opt-out for a dedicated to-do window: every window of the configured app
/// is left where it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoWindowPolicy {
    app: Option<String>,
}

impl TodoWindowPolicy {
    /// A disabled config, or one without an app, excludes nothing.
    pub fn from_config(config: &TodoConfig) -> Self {
        Self {
            app: config.app.clone().filter(|_| config.enabled),
        }
    }
}

impl ExclusionPolicy for TodoWindowPolicy {
    fn excludes(&self, window: &WindowDescriptor) -> bool {
        self.app
            .as_deref()
            .is_some_and(|app| window.app.eq_ignore_ascii_case(app))
    }
}

fn screen_of<B: ScreenDetector>(backend: &B, window: &WindowDescriptor) -> Option<Screen> {
    match backend.screen_for(window) {
        Ok(screen) => screen,
        Err(e) => {
            warn!("screen detection failed for {}: {}", window.id, e);
            None
        }
    }
}
