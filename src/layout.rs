//! Layout engine.
//!
//! Pure geometry: every function takes the ordered eligible windows and the
//! usable screen frame and returns a [`LayoutAssignment`].  Nothing here
//! talks to a backend; the
//! [`LayoutDispatcher`](crate::dispatcher::LayoutDispatcher) applies the
//! result.

use crate::geometry::Rect;
use crate::window::{EligibleWindow, OwnerId, WindowId};
use serde::{Deserialize, Serialize};

/// Share of the (inset) screen width given to the primary window of the
/// focus layout.
pub const FOCUS_RATIO: f64 = 0.7;

/// Result of one layout computation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutAssignment {
    /// Target frames, in the order they should be applied.
    pub frames: Vec<(WindowId, Rect)>,
    /// Windows to raise after all frames are applied, bottom-most first.
    pub raise: Vec<WindowId>,
}

impl LayoutAssignment {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The frame assigned to `id`, if any.
    pub fn frame_of(&self, id: &WindowId) -> Option<Rect> {
        self.frames
            .iter()
            .find(|(w, _)| w == id)
            .map(|(_, r)| *r)
    }
}

/// How the focus layout arranges the windows that are not primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OthersLayout {
    /// Every other window gets the whole right column; natural stacking
    /// order decides what is visible.
    #[default]
    Stack,
    /// The right column is divided into equal horizontal slices, one per
    /// window, top to bottom in input order.
    Split,
}

/// Parameters of [`focus_split`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusSplit {
    pub ratio: f64,
    pub gap: f64,
    pub others: OthersLayout,
}

impl Default for FocusSplit {
    fn default() -> Self {
        Self {
            ratio: FOCUS_RATIO,
            gap: 0.0,
            others: OthersLayout::Stack,
        }
    }
}

/// Tile `windows` in a near-square grid covering `screen`.
///
/// `columns = ceil(sqrt(n))`, `rows = ceil(n / columns)`.  Window `i` takes
/// cell `(i % columns, i / columns)`; trailing cells of the last row stay
/// empty.
pub fn grid_tile(windows: &[EligibleWindow], screen: Rect) -> LayoutAssignment {
    let n = windows.len();
    if n == 0 {
        return LayoutAssignment::default();
    }
    let columns = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(columns);
    let cell_width = screen.width / columns as f64;
    let cell_height = screen.height / rows as f64;

    let frames = windows
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            let frame = Rect::new(
                screen.x + col * cell_width,
                screen.y + row * cell_height,
                cell_width,
                cell_height,
            );
            (w.id.clone(), frame)
        })
        .collect();

    LayoutAssignment {
        frames,
        raise: Vec::new(),
    }
}

/// Cascade windows diagonally by `delta` points.
///
/// Without `owner`, window `i` is moved to `screen.origin + delta * i` and
/// keeps its size; frames are not clamped to the screen.
///
/// With `owner`, only that owner's windows take part.  The first of them is
/// rotated to the end so it lands on top of the stack.  All windows share
/// one size, the first window's size capped so the whole cascade fits.  The
/// cascade starts in the screen corner nearest the first window's center
/// and fans out towards the opposite corner.  When `delta` would push the
/// cascade past half the screen it is shortened to fit.
///
/// Either way, every placed window is raised in placement order.
pub fn cascade(
    windows: &[EligibleWindow],
    screen: Rect,
    delta: f64,
    owner: Option<OwnerId>,
) -> LayoutAssignment {
    match owner {
        None => cascade_all(windows, screen, delta),
        Some(owner) => cascade_owner(windows, screen, delta, owner),
    }
}

fn cascade_all(windows: &[EligibleWindow], screen: Rect, delta: f64) -> LayoutAssignment {
    let frames: Vec<(WindowId, Rect)> = windows
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let offset = delta * i as f64;
            let frame = Rect::new(
                screen.x + offset,
                screen.y + offset,
                w.frame.width,
                w.frame.height,
            );
            (w.id.clone(), frame)
        })
        .collect();
    let raise = frames.iter().map(|(id, _)| id.clone()).collect();
    LayoutAssignment { frames, raise }
}

fn cascade_owner(
    windows: &[EligibleWindow],
    screen: Rect,
    delta: f64,
    owner: OwnerId,
) -> LayoutAssignment {
    let mut group: Vec<&EligibleWindow> = windows.iter().filter(|w| w.owner == owner).collect();
    let Some(&first) = group.first() else {
        return LayoutAssignment::default();
    };
    group.rotate_left(1);

    // The cascade may span at most half the screen, so every window keeps
    // at least half the screen's size.
    let steps = (group.len() - 1) as f64;
    let delta = if steps > 0.0 {
        delta.min(screen.width.min(screen.height) / (2.0 * steps))
    } else {
        delta
    };
    let spread = delta * steps;
    let width = first.frame.width.min(screen.width - spread).max(0.0);
    let height = first.frame.height.min(screen.height - spread).max(0.0);
    let from_right = first.frame.mid_x() > screen.mid_x();
    let from_bottom = first.frame.mid_y() > screen.mid_y();

    let frames: Vec<(WindowId, Rect)> = group
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let offset = delta * i as f64;
            let x = if from_right {
                screen.max_x() - width - offset
            } else {
                screen.x + offset
            };
            let y = if from_bottom {
                screen.max_y() - height - offset
            } else {
                screen.y + offset
            };
            (w.id.clone(), Rect::new(x, y, width, height))
        })
        .collect();
    let raise = frames.iter().map(|(id, _)| id.clone()).collect();
    LayoutAssignment { frames, raise }
}

/// The largest window of `owner`; the first one wins a tie.
pub fn primary_window(windows: &[EligibleWindow], owner: OwnerId) -> Option<&EligibleWindow> {
    let mut best: Option<&EligibleWindow> = None;
    for w in windows.iter().filter(|w| w.owner == owner) {
        if best.map_or(true, |b| w.frame.area() > b.frame.area()) {
            best = Some(w);
        }
    }
    best
}

/// Focus layout: the primary window of `owner` takes a `ratio` share of
/// the screen on the left, everything else goes to the right column.
///
/// The screen is inset by `gap` on every side and the columns are separated
/// by `gap`.  Secondary windows of `owner` are treated like any other
/// window.  When there are no other windows the right column stays
/// unarranged.  Only the primary window is raised.
pub fn focus_split(
    windows: &[EligibleWindow],
    screen: Rect,
    owner: OwnerId,
    params: &FocusSplit,
) -> LayoutAssignment {
    if windows.is_empty() {
        return LayoutAssignment::default();
    }
    let gap = params.gap;
    let area = screen.inset(gap);
    let left_width = area.width * params.ratio - gap / 2.0;

    let mut assignment = LayoutAssignment::default();
    let primary = primary_window(windows, owner);
    if let Some(primary) = primary {
        assignment.frames.push((
            primary.id.clone(),
            Rect::new(area.x, area.y, left_width, area.height),
        ));
        assignment.raise.push(primary.id.clone());
    }

    let others: Vec<&EligibleWindow> = windows
        .iter()
        .filter(|w| primary.map_or(true, |p| p.id != w.id))
        .collect();
    if others.is_empty() {
        return assignment;
    }

    let column = Rect::new(
        area.x + left_width + gap,
        area.y,
        area.width - left_width - gap,
        area.height,
    );
    match params.others {
        OthersLayout::Stack => {
            for w in others {
                assignment.frames.push((w.id.clone(), column));
            }
        }
        OthersLayout::Split => {
            let count = others.len() as f64;
            // Slices that no longer fit between gaps are packed without them.
            let (slice, spacing) = match (column.height - gap * (count - 1.0)) / count {
                slice if slice > 0.0 => (slice, gap),
                _ => (column.height / count, 0.0),
            };
            for (i, w) in others.into_iter().enumerate() {
                let y = column.y + i as f64 * (slice + spacing);
                assignment
                    .frames
                    .push((w.id.clone(), Rect::new(column.x, y, column.width, slice)));
            }
        }
    }
    assignment
}
