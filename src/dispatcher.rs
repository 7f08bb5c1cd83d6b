//! The orchestrator that ties resolution, layout and the window mover
//! together.
//!
//! [`LayoutDispatcher`] owns the [`WindowSetResolver`] (and with it the
//! compositor cache) and the [`FocusCycleState`], and reacts to named
//! actions by resolving the eligible windows, computing a
//! [`LayoutAssignment`] and applying it through the
//! [`WindowMover`] trait.

use crate::action::{Action, Command};
use crate::cache::WindowInfoCache;
use crate::config::{Config, LayoutConfig};
use crate::focus::{candidate_owners, CycleDirection, FocusCycleState};
use crate::geometry::Rect;
use crate::layout::{cascade, focus_split, grid_tile, LayoutAssignment};
use crate::resolver::{ResolvedWindows, TodoWindowPolicy, WindowSetResolver, WindowSource};
use crate::traits::{Clock, ExclusionPolicy, NoExclusions, SystemClock, WindowMover};
use crate::window::{EligibleWindow, OwnerId, WindowDescriptor, WindowId};
use log::{debug, info, warn};

/// Reasons an action could not run.  Never surfaced to the caller of
/// [`LayoutDispatcher::handle`]; they end up in the log and as an alert.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No anchor window, or the anchor is on no known screen.
    #[error("no target window or screen")]
    NoTarget,

    /// The requested anchor window does not exist.
    #[error("unknown window {0}")]
    UnknownWindow(WindowId),

    /// The backend returned an error.
    #[error("window manager error: {0}")]
    Backend(String),
}

/// What a successfully handled action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `windows` frames were applied.
    Applied { windows: usize },
    /// Nothing eligible to arrange; no window was touched.
    NothingToArrange,
}

/// Maps actions to layouts and applies them.
///
/// The dispatcher is generic over any backend implementing
/// [`WindowSource`] and [`WindowMover`], making it independent of
/// Hyprland or any other compositor.
///
/// # Typical usage
///
/// ```ignore
/// let mut dispatcher = LayoutDispatcher::new(HyprlandWm::new(), LayoutConfig::default());
/// dispatcher.handle("focus-next", None);
/// ```
pub struct LayoutDispatcher<W, P = NoExclusions, C: Clock = SystemClock> {
    wm: W,
    resolver: WindowSetResolver<P, C>,
    focus: FocusCycleState,
    layout: LayoutConfig,
}

impl<W: WindowSource + WindowMover> LayoutDispatcher<W> {
    /// A dispatcher without exclusions, on the system clock.
    pub fn new(wm: W, layout: LayoutConfig) -> Self {
        Self::with_resolver(wm, WindowSetResolver::new(), layout)
    }
}

impl<W: WindowSource + WindowMover> LayoutDispatcher<W, TodoWindowPolicy> {
    /// A dispatcher set up from the full application config.
    pub fn from_config(wm: W, config: &Config) -> Self {
        let cache = WindowInfoCache::with_clock(SystemClock, config.cache.timeout());
        let policy = TodoWindowPolicy::from_config(&config.todo);
        Self::with_resolver(
            wm,
            WindowSetResolver::with_parts(cache, policy),
            config.layout.clone(),
        )
    }
}

impl<W, P, C> LayoutDispatcher<W, P, C>
where
    W: WindowSource + WindowMover,
    P: ExclusionPolicy,
    C: Clock,
{
    pub fn with_resolver(wm: W, resolver: WindowSetResolver<P, C>, layout: LayoutConfig) -> Self {
        Self {
            wm,
            resolver,
            focus: FocusCycleState::new(),
            layout,
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &W {
        &self.wm
    }

    /// Current focus-cycle state.
    pub fn focus_state(&self) -> FocusCycleState {
        self.focus
    }

    /// Handle one user-triggered action by name.
    ///
    /// Returns `false` only for an unrecognised action name.  Every other
    /// failure is absorbed: it is logged, the user is alerted when there was
    /// no target, and `true` is returned.
    pub fn handle(&mut self, action: &str, anchor: Option<&WindowDescriptor>) -> bool {
        let Some(action) = self.parse(action) else {
            return false;
        };
        self.run(action, anchor);
        true
    }

    /// Handle a [`Command`] from a command source, resolving its anchor
    /// window id first.
    pub fn handle_command(&mut self, cmd: &Command) -> bool {
        let Some(action) = self.parse(&cmd.action) else {
            return false;
        };
        let anchor = match &cmd.window {
            None => None,
            Some(id) => match self.find_window(id) {
                Ok(anchor) => Some(anchor),
                Err(e) => {
                    self.report(action, &e);
                    return true;
                }
            },
        };
        self.run(action, anchor.as_ref());
        true
    }

    /// Perform `action`, returning what happened.
    ///
    /// The whole assignment is computed before the first frame is applied,
    /// so a failed resolution never leaves a layout half-applied.
    pub fn perform(
        &mut self,
        action: Action,
        anchor: Option<&WindowDescriptor>,
    ) -> Result<Outcome, DispatchError> {
        let order_by_owner = action == Action::TileAll;
        let ResolvedWindows {
            anchor,
            screen,
            windows,
        } = self
            .resolver
            .resolve(&self.wm, anchor, order_by_owner)
            .ok_or(DispatchError::NoTarget)?;

        if windows.is_empty() {
            return Ok(Outcome::NothingToArrange);
        }

        let frame = screen.frame;
        let assignment = match action {
            Action::TileAll => grid_tile(&windows, frame),
            Action::TileActiveApp => grid_tile(&owned_by(&windows, anchor.owner), frame),
            Action::CascadeAll => cascade(&windows, frame, self.layout.cascade_delta, None),
            Action::CascadeActiveApp => cascade(
                &windows,
                frame,
                self.layout.cascade_delta,
                Some(anchor.owner),
            ),
            Action::FocusNext => self.focus_layout(CycleDirection::Next, &windows, &anchor, frame),
            Action::FocusPrev => self.focus_layout(CycleDirection::Prev, &windows, &anchor, frame),
        };

        if assignment.is_empty() {
            return Ok(Outcome::NothingToArrange);
        }
        debug!("{} on {}: {:?}", action, screen.name, assignment.frames);
        self.apply(&assignment);
        Ok(Outcome::Applied {
            windows: assignment.frames.len(),
        })
    }

    //  Helpers

    fn parse(&self, name: &str) -> Option<Action> {
        match name.parse::<Action>() {
            Ok(action) => Some(action),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn run(&mut self, action: Action, anchor: Option<&WindowDescriptor>) {
        info!("{}", action);
        match self.perform(action, anchor) {
            Ok(Outcome::Applied { windows }) => info!("{}: arranged {} window(s)", action, windows),
            Ok(Outcome::NothingToArrange) => debug!("{}: nothing to arrange", action),
            Err(e) => self.report(action, &e),
        }
    }

    fn report(&self, action: Action, error: &DispatchError) {
        warn!("{}: {}", action, error);
        if let Err(e) = self.wm.alert(&format!("{}: {}", action, error)) {
            debug!("alert failed: {}", e);
        }
    }

    fn find_window(&self, id: &WindowId) -> Result<WindowDescriptor, DispatchError> {
        self.wm
            .list_windows()
            .map_err(|e| DispatchError::Backend(e.to_string()))?
            .into_iter()
            .find(|w| &w.id == id)
            .ok_or_else(|| DispatchError::UnknownWindow(id.clone()))
    }

    /// Advance the focus cycle and compute the focus layout.  The anchor
    /// stands in for the frontmost window when the cycle resets.
    fn focus_layout(
        &mut self,
        direction: CycleDirection,
        windows: &[EligibleWindow],
        anchor: &WindowDescriptor,
        frame: Rect,
    ) -> LayoutAssignment {
        let candidates = candidate_owners(windows);
        let previous = self.focus;
        let Some(owner) = self.focus.advance(direction, &candidates, Some(anchor.owner)) else {
            return LayoutAssignment::default();
        };
        debug!("focus {}: {:?} -> {}", direction, previous.owner(), owner);
        focus_split(windows, frame, owner, &self.layout.focus_split())
    }

    fn apply(&self, assignment: &LayoutAssignment) {
        for (id, frame) in &assignment.frames {
            if let Err(e) = self.wm.set_frame(id, *frame) {
                warn!("could not move {} to {}: {}", id, frame, e);
            }
        }
        for id in &assignment.raise {
            if let Err(e) = self.wm.bring_to_front(id) {
                warn!("could not raise {}: {}", id, e);
            }
        }
    }
}

fn owned_by(windows: &[EligibleWindow], owner: OwnerId) -> Vec<EligibleWindow> {
    windows.iter().filter(|w| w.owner == owner).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::OthersLayout;
    use crate::resolver::tests::FakeDesktop;

    fn r(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, w, h)
    }

    /// Three single-window owners on the left 1000×1000 screen, A frontmost.
    fn three_owners() -> FakeDesktop {
        let mut desktop = FakeDesktop::default();
        desktop.add("a", 1, r(100.0, 100.0, 400.0, 300.0));
        desktop.add("b", 2, r(200.0, 200.0, 400.0, 300.0));
        desktop.add("c", 3, r(300.0, 300.0, 400.0, 300.0));
        desktop.focus("a");
        desktop
    }

    fn dispatcher(desktop: FakeDesktop) -> LayoutDispatcher<FakeDesktop> {
        LayoutDispatcher::new(desktop, LayoutConfig::default())
    }

    fn frame(d: &LayoutDispatcher<FakeDesktop>, id: &str) -> Rect {
        d.backend().frame_of(id).expect("window was not moved")
    }

    #[test]
    fn unknown_action_is_not_handled() {
        let mut d = dispatcher(three_owners());
        assert!(!d.handle("maximize", None));
        assert!(d.backend().frames.borrow().is_empty());
        assert!(d.backend().alerts.borrow().is_empty());
    }

    #[test]
    fn no_target_is_handled_with_alert() {
        let mut desktop = three_owners();
        desktop.frontmost = None;
        let mut d = dispatcher(desktop);
        assert!(d.handle("tile-all", None));
        assert!(d.backend().frames.borrow().is_empty());
        assert_eq!(d.backend().alerts.borrow().len(), 1);
    }

    #[test]
    fn empty_eligible_set_is_silent() {
        let mut desktop = three_owners();
        desktop.compositor.clear();
        let mut d = dispatcher(desktop);
        assert_eq!(
            d.perform(Action::TileAll, None).unwrap(),
            Outcome::NothingToArrange
        );
        assert!(d.handle("tile-all", None));
        assert!(d.backend().frames.borrow().is_empty());
        assert!(d.backend().alerts.borrow().is_empty());
    }

    #[test]
    fn tile_all_orders_by_owner() {
        let mut desktop = FakeDesktop::default();
        desktop.add("c", 3, r(10.0, 10.0, 100.0, 100.0));
        desktop.add("a", 1, r(10.0, 10.0, 100.0, 100.0));
        desktop.add("b", 2, r(10.0, 10.0, 100.0, 100.0));
        desktop.focus("c");
        let mut d = dispatcher(desktop);
        assert!(d.handle("tile-all", None));
        assert_eq!(frame(&d, "a"), r(0.0, 0.0, 500.0, 500.0));
        assert_eq!(frame(&d, "b"), r(500.0, 0.0, 500.0, 500.0));
        assert_eq!(frame(&d, "c"), r(0.0, 500.0, 500.0, 500.0));
        assert!(d.backend().raised.borrow().is_empty());
    }

    #[test]
    fn tile_active_app_only_moves_anchor_owner() {
        let mut desktop = three_owners();
        desktop.add("a2", 1, r(0.0, 0.0, 100.0, 100.0));
        let mut d = dispatcher(desktop);
        assert!(d.handle("tile-active-app", None));
        assert_eq!(frame(&d, "a"), r(0.0, 0.0, 500.0, 1000.0));
        assert_eq!(frame(&d, "a2"), r(500.0, 0.0, 500.0, 1000.0));
        assert_eq!(d.backend().frames.borrow().len(), 2);
    }

    #[test]
    fn cascade_all_moves_and_raises_everything() {
        let mut d = dispatcher(three_owners());
        assert!(d.handle("cascade-all", None));
        assert_eq!(frame(&d, "a"), r(0.0, 0.0, 400.0, 300.0));
        assert_eq!(frame(&d, "b"), r(30.0, 30.0, 400.0, 300.0));
        assert_eq!(frame(&d, "c"), r(60.0, 60.0, 400.0, 300.0));
        let raised: Vec<String> = d.backend().raised.borrow().iter().map(|w| w.0.clone()).collect();
        assert_eq!(raised, vec!["a", "b", "c"]);
    }

    #[test]
    fn cascade_active_app_uses_explicit_anchor() {
        let mut desktop = three_owners();
        desktop.add("b2", 2, r(0.0, 0.0, 100.0, 100.0));
        let anchor = desktop.descriptor("b");
        let mut d = dispatcher(desktop);
        assert!(d.handle("cascade-active-app", Some(&anchor)));
        let moved: Vec<String> = d.backend().frames.borrow().iter().map(|(w, _)| w.0.clone()).collect();
        assert_eq!(moved, vec!["b2", "b"]);
        assert_eq!(d.backend().raised.borrow().last(), Some(&WindowId::new("b")));
    }

    #[test]
    fn focus_next_end_to_end() {
        let mut d = dispatcher(three_owners());

        assert!(d.handle("focus-next", None));
        assert_eq!(d.focus_state(), FocusCycleState::Focused(OwnerId(1)));
        assert_eq!(frame(&d, "a"), r(0.0, 0.0, 700.0, 1000.0));
        assert_eq!(frame(&d, "b"), r(700.0, 0.0, 300.0, 1000.0));
        assert_eq!(frame(&d, "c"), r(700.0, 0.0, 300.0, 1000.0));

        assert!(d.handle("focus-next", None));
        assert_eq!(d.focus_state(), FocusCycleState::Focused(OwnerId(2)));
        assert_eq!(frame(&d, "b"), r(0.0, 0.0, 700.0, 1000.0));
        assert_eq!(frame(&d, "a"), r(700.0, 0.0, 300.0, 1000.0));
        assert_eq!(frame(&d, "c"), r(700.0, 0.0, 300.0, 1000.0));
        assert_eq!(d.backend().raised.borrow().last(), Some(&WindowId::new("b")));
    }

    #[test]
    fn focus_prev_wraps_around() {
        let mut d = dispatcher(three_owners());
        d.handle("focus-prev", None);
        assert_eq!(d.focus_state(), FocusCycleState::Focused(OwnerId(1)));
        d.handle("focus-prev", None);
        assert_eq!(d.focus_state(), FocusCycleState::Focused(OwnerId(3)));
        assert_eq!(frame(&d, "c"), r(0.0, 0.0, 700.0, 1000.0));
    }

    #[test]
    fn stale_focus_resets_to_frontmost() {
        let mut d = dispatcher(three_owners());
        d.handle("focus-next", None);
        d.handle("focus-next", None);
        assert_eq!(d.focus_state(), FocusCycleState::Focused(OwnerId(2)));

        // B's window disappears from the compositor.
        d.wm.compositor.retain(|c| c.id.as_str() != "b");
        d.resolver.cache_mut().invalidate();
        d.handle("focus-next", None);
        assert_eq!(d.focus_state(), FocusCycleState::Focused(OwnerId(1)));
    }

    #[test]
    fn non_focus_actions_leave_focus_state_alone() {
        let mut d = dispatcher(three_owners());
        for action in ["tile-all", "cascade-all", "cascade-active-app", "tile-active-app"] {
            d.handle(action, None);
        }
        assert_eq!(d.focus_state(), FocusCycleState::Unset);
    }

    #[test]
    fn independent_dispatchers_have_independent_focus() {
        let mut first = dispatcher(three_owners());
        let mut second = dispatcher(three_owners());
        first.handle("focus-next", None);
        first.handle("focus-next", None);
        second.handle("focus-next", None);
        assert_eq!(first.focus_state(), FocusCycleState::Focused(OwnerId(2)));
        assert_eq!(second.focus_state(), FocusCycleState::Focused(OwnerId(1)));
    }

    #[test]
    fn focus_layout_honours_config() {
        let layout = LayoutConfig {
            gap: 10.0,
            others: OthersLayout::Split,
            ..LayoutConfig::default()
        };
        let mut d = LayoutDispatcher::new(three_owners(), layout);
        d.handle("focus-next", None);
        let b = frame(&d, "b");
        let c = frame(&d, "c");
        assert_eq!(b.y, 10.0);
        assert!(c.y > b.max_y());
        assert!((c.max_y() - 990.0).abs() < 1e-6);
    }

    #[test]
    fn mover_failures_do_not_stop_the_layout() {
        let mut desktop = three_owners();
        desktop.fail_moves = true;
        let mut d = dispatcher(desktop);
        assert!(d.handle("cascade-all", None));
        assert_eq!(d.backend().frames.borrow().len(), 3);
        assert_eq!(d.backend().raised.borrow().len(), 3);
    }

    #[test]
    fn command_with_window_anchors_on_it() {
        let mut desktop = three_owners();
        desktop.add("r", 9, r(1200.0, 100.0, 400.0, 300.0));
        let mut d = dispatcher(desktop);
        let cmd = Command::new("tile-all").with_window(WindowId::new("r"));
        assert!(d.handle_command(&cmd));
        assert_eq!(frame(&d, "r"), r(1000.0, 0.0, 1000.0, 1000.0));
        assert_eq!(d.backend().frames.borrow().len(), 1);
    }

    #[test]
    fn command_with_unknown_window_alerts() {
        let mut d = dispatcher(three_owners());
        let cmd = Command::new("tile-all").with_window(WindowId::new("0xgone"));
        assert!(d.handle_command(&cmd));
        assert!(d.backend().frames.borrow().is_empty());
        assert_eq!(d.backend().alerts.borrow().len(), 1);
    }

    #[test]
    fn command_with_unknown_action_is_not_handled() {
        let mut d = dispatcher(three_owners());
        assert!(!d.handle_command(&Command::new("shuffle")));
    }

    #[test]
    fn todo_window_is_left_alone() {
        let mut desktop = three_owners();
        for w in desktop.windows.iter_mut() {
            if w.id.as_str() == "c" {
                w.app = "Todo".into();
            }
        }
        let config: Config =
            serde_json::from_str(r#"{ "todo": { "enabled": true, "app": "todo" } }"#).unwrap();
        let mut d = LayoutDispatcher::from_config(desktop, &config);
        assert!(d.handle("tile-all", None));
        assert!(d.backend().frame_of("c").is_none());
        assert_eq!(d.backend().frames.borrow().len(), 2);
    }

    #[test]
    fn explicit_resolver_without_exclusions() {
        let resolver = WindowSetResolver::with_parts(WindowInfoCache::new(), NoExclusions);
        let mut d = LayoutDispatcher::with_resolver(three_owners(), resolver, LayoutConfig::default());
        assert_eq!(
            d.perform(Action::CascadeAll, None).unwrap(),
            Outcome::Applied { windows: 3 }
        );
    }
}
