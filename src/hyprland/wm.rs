//! Collaborator implementations backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Both window views come from `j/clients`: every client is an
//! accessibility-level [`WindowDescriptor`], and clients on a workspace some
//! monitor is currently showing make up the compositor view.

use crate::geometry::{Point, Rect};
use crate::traits::{AccessibilityProvider, CompositorSource, ScreenDetector, WindowMover};
use crate::window::{CompositorWindowInfo, OwnerId, Screen, WindowDescriptor, WindowId};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Window classes of desktop-provided dialogs that should never be arranged.
const SYSTEM_DIALOG_CLASSES: &[&str] = &[
    "xdg-desktop-portal-gtk",
    "xdg-desktop-portal-kde",
    "xdg-desktop-portal-hyprland",
    "polkit-gnome-authentication-agent-1",
    "org.kde.polkit-kde-authentication-agent-1",
];

/// Hyprland-backed window source and mover.
///
/// All communication happens over Hyprland's IPC socket.  No connection is
/// held open; each call is a short-lived request.
#[derive(Debug, Default)]
pub struct HyprlandWm;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl HyprlandWm {
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandWmError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandWmError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandWmError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw request to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(request: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(request.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and parse the response.
fn ipc_json<T: for<'de> Deserialize<'de>>(data_command: &str) -> Result<T, HyprlandWmError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    serde_json::from_str(&json)
        .map_err(|e| HyprlandWmError(format!("parse {}: {}", data_command, e)))
}

/// Send a request that answers `"ok"` on success.
fn ipc_expect_ok(request: &str) -> Result<(), HyprlandWmError> {
    let response = ipc_request(request)?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("{}: {}", request, response.trim())))
    }
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandWmError> {
    ipc_expect_ok(&format!("/dispatch {}", args))
}

//  Minimal serde structs for the JSON we care about

#[derive(Debug, Clone, Deserialize)]
struct WorkspaceRef {
    id: i64,
}

/// Subset of one object returned by `j/clients` (and `j/activewindow`).
#[derive(Debug, Clone, Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default = "yes")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    at: [f64; 2],
    size: [f64; 2],
    workspace: WorkspaceRef,
    #[serde(default)]
    class: String,
    #[serde(default)]
    pid: i64,
}

fn yes() -> bool {
    true
}

/// Subset of one object returned by `j/monitors`.
#[derive(Debug, Clone, Deserialize)]
struct MonitorJson {
    name: String,
    width: f64,
    height: f64,
    x: f64,
    y: f64,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    transform: i64,
    /// Reserved space as `[left, top, right, bottom]`.
    #[serde(default)]
    reserved: [f64; 4],
    #[serde(rename = "activeWorkspace")]
    active_workspace: WorkspaceRef,
    #[serde(rename = "specialWorkspace")]
    special_workspace: Option<WorkspaceRef>,
}

fn unit_scale() -> f64 {
    1.0
}

impl ClientJson {
    fn frame(&self) -> Rect {
        Rect::new(self.at[0], self.at[1], self.size[0], self.size[1])
    }

    fn descriptor(&self) -> WindowDescriptor {
        WindowDescriptor {
            id: WindowId::new(self.address.clone()),
            owner: OwnerId(self.pid),
            app: self.class.clone(),
            frame: self.frame(),
            is_window: self.mapped && !self.address.is_empty(),
            is_sheet: false,
            is_minimized: false,
            is_hidden: self.hidden,
            is_system_dialog: SYSTEM_DIALOG_CLASSES.contains(&self.class.as_str()),
        }
    }

    fn compositor_info(&self) -> CompositorWindowInfo {
        CompositorWindowInfo {
            id: WindowId::new(self.address.clone()),
            layer: 0,
            frame: self.frame(),
            owner: OwnerId(self.pid),
            alpha: if self.mapped && !self.hidden { 1.0 } else { 0.0 },
            process_name: self.class.clone(),
        }
    }
}

impl MonitorJson {
    /// Geometry in the global layout space, which Hyprland expresses in
    /// logical (scaled) pixels.
    fn logical_frame(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let (width, height) = if self.transform % 2 == 1 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        Rect::new(self.x, self.y, width / scale, height / scale)
    }

    /// Logical frame minus bars and other reserved space.
    fn usable_frame(&self) -> Rect {
        let full = self.logical_frame();
        let [left, top, right, bottom] = self.reserved;
        Rect::new(
            full.x + left,
            full.y + top,
            (full.width - left - right).max(0.0),
            (full.height - top - bottom).max(0.0),
        )
    }

    fn screen(&self) -> Screen {
        Screen {
            name: self.name.clone(),
            frame: self.usable_frame(),
        }
    }
}

/// Workspaces currently shown on any monitor.
fn visible_workspaces(monitors: &[MonitorJson]) -> HashSet<i64> {
    monitors
        .iter()
        .flat_map(|m| {
            std::iter::once(m.active_workspace.id)
                .chain(m.special_workspace.as_ref().map(|w| w.id).filter(|id| *id != 0))
        })
        .collect()
}

/// Compositor view: clients on a visible workspace, optionally restricted
/// to `ids`.
fn on_screen(
    clients: &[ClientJson],
    monitors: &[MonitorJson],
    ids: Option<&[WindowId]>,
) -> Vec<CompositorWindowInfo> {
    let visible = visible_workspaces(monitors);
    clients
        .iter()
        .filter(|c| visible.contains(&c.workspace.id))
        .map(ClientJson::compositor_info)
        .filter(|info| ids.map_or(true, |ids| ids.contains(&info.id)))
        .collect()
}

/// The monitor containing `point`.
fn monitor_at<'a>(monitors: &'a [MonitorJson], point: Point) -> Option<&'a MonitorJson> {
    monitors.iter().find(|m| m.logical_frame().contains(point))
}

/// The screen of each window, from one monitor listing.
fn screens_of(monitors: &[MonitorJson], windows: &[WindowDescriptor]) -> Vec<Option<Screen>> {
    windows
        .iter()
        .map(|w| monitor_at(monitors, w.frame.center()).map(MonitorJson::screen))
        .collect()
}

//  Trait implementations

impl AccessibilityProvider for HyprlandWm {
    type Error = HyprlandWmError;

    fn list_windows(&self) -> Result<Vec<WindowDescriptor>, Self::Error> {
        let clients: Vec<ClientJson> = ipc_json("clients")?;
        Ok(clients.iter().map(ClientJson::descriptor).collect())
    }

    fn frontmost_window(&self) -> Result<Option<WindowDescriptor>, Self::Error> {
        let json = ipc_request("j/activewindow")?;
        // Hyprland returns an empty object `{}` when no window is focused.
        if json.trim() == "{}" {
            return Ok(None);
        }
        let client: ClientJson = serde_json::from_str(&json)
            .map_err(|e| HyprlandWmError(format!("parse activewindow: {}", e)))?;
        Ok(Some(client.descriptor()))
    }
}

impl CompositorSource for HyprlandWm {
    type Error = HyprlandWmError;

    fn compositor_windows(
        &self,
        ids: Option<&[WindowId]>,
    ) -> Result<Vec<CompositorWindowInfo>, Self::Error> {
        let clients: Vec<ClientJson> = ipc_json("clients")?;
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        Ok(on_screen(&clients, &monitors, ids))
    }
}

impl ScreenDetector for HyprlandWm {
    type Error = HyprlandWmError;

    fn screen_for(&self, window: &WindowDescriptor) -> Result<Option<Screen>, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        Ok(monitor_at(&monitors, window.frame.center()).map(MonitorJson::screen))
    }

    fn screens_for(
        &self,
        windows: &[WindowDescriptor],
    ) -> Result<Vec<Option<Screen>>, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        Ok(screens_of(&monitors, windows))
    }
}

impl WindowMover for HyprlandWm {
    type Error = HyprlandWmError;

    fn set_frame(&self, window: &WindowId, frame: Rect) -> Result<(), Self::Error> {
        // Tiled windows ignore pixel moves; float them first.
        ipc_dispatch(&format!("setfloating address:{}", window))?;
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},address:{}",
            frame.width.round() as i64,
            frame.height.round() as i64,
            window
        ))?;
        ipc_dispatch(&format!(
            "movewindowpixel exact {} {},address:{}",
            frame.x.round() as i64,
            frame.y.round() as i64,
            window
        ))
    }

    fn bring_to_front(&self, window: &WindowId) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("focuswindow address:{}", window))?;
        ipc_dispatch(&format!("alterzorder top,address:{}", window))
    }

    fn alert(&self, message: &str) -> Result<(), Self::Error> {
        // icon 0 (warning), 2 s, default colour.
        ipc_expect_ok(&format!("/notify 0 2000 0 hyprarrange: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENTS: &str = r#"[
        {
            "address": "0x55d0a1",
            "mapped": true,
            "hidden": false,
            "at": [10, 40],
            "size": [800, 600],
            "workspace": { "id": 1, "name": "1" },
            "floating": false,
            "monitor": 0,
            "class": "foot",
            "title": "~",
            "pid": 4242,
            "xwayland": false,
            "pinned": false,
            "fullscreen": 0
        },
        {
            "address": "0x55d0b2",
            "mapped": true,
            "hidden": true,
            "at": [2000, 40],
            "size": [800, 600],
            "workspace": { "id": 2, "name": "2" },
            "class": "xdg-desktop-portal-gtk",
            "pid": 77
        },
        {
            "address": "0x55d0c3",
            "mapped": true,
            "hidden": false,
            "at": [100, 100],
            "size": [300, 300],
            "workspace": { "id": 5, "name": "5" },
            "class": "firefox",
            "pid": 900
        }
    ]"#;

    const MONITORS: &str = r#"[
        {
            "id": 0,
            "name": "DP-1",
            "width": 2560,
            "height": 1440,
            "x": 0,
            "y": 0,
            "scale": 1.25,
            "transform": 0,
            "reserved": [0, 30, 0, 0],
            "activeWorkspace": { "id": 1, "name": "1" },
            "specialWorkspace": { "id": 0, "name": "" },
            "focused": true
        },
        {
            "id": 1,
            "name": "HDMI-A-1",
            "width": 1920,
            "height": 1080,
            "x": 2048,
            "y": 0,
            "scale": 1.0,
            "transform": 1,
            "reserved": [0, 0, 0, 0],
            "activeWorkspace": { "id": 2, "name": "2" }
        }
    ]"#;

    fn clients() -> Vec<ClientJson> {
        serde_json::from_str(CLIENTS).unwrap()
    }

    fn monitors() -> Vec<MonitorJson> {
        serde_json::from_str(MONITORS).unwrap()
    }

    #[test]
    fn client_becomes_descriptor() {
        let d = clients()[0].descriptor();
        assert_eq!(d.id, WindowId::new("0x55d0a1"));
        assert_eq!(d.owner, OwnerId(4242));
        assert_eq!(d.app, "foot");
        assert_eq!(d.frame, Rect::new(10.0, 40.0, 800.0, 600.0));
        assert!(!d.is_special());
    }

    #[test]
    fn hidden_portal_window_is_special() {
        let d = clients()[1].descriptor();
        assert!(d.is_hidden);
        assert!(d.is_system_dialog);
    }

    #[test]
    fn compositor_view_only_covers_visible_workspaces() {
        let infos = on_screen(&clients(), &monitors(), None);
        let ids: Vec<&str> = infos.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["0x55d0a1", "0x55d0b2"]);
        assert_eq!(infos[0].alpha, 1.0);
        // Hidden clients are reported fully transparent.
        assert_eq!(infos[1].alpha, 0.0);
    }

    #[test]
    fn compositor_view_honours_id_filter() {
        let ids = [WindowId::new("0x55d0b2")];
        let infos = on_screen(&clients(), &monitors(), Some(&ids));
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, ids[0]);
    }

    #[test]
    fn usable_frame_is_scaled_and_reserved() {
        let m = &monitors()[0];
        assert_eq!(m.logical_frame(), Rect::new(0.0, 0.0, 2048.0, 1152.0));
        assert_eq!(m.usable_frame(), Rect::new(0.0, 30.0, 2048.0, 1122.0));
    }

    #[test]
    fn rotated_monitor_swaps_axes() {
        let m = &monitors()[1];
        assert_eq!(m.logical_frame(), Rect::new(2048.0, 0.0, 1080.0, 1920.0));
    }

    #[test]
    fn window_center_selects_monitor() {
        let monitors = monitors();
        let left = monitor_at(&monitors, Point { x: 410.0, y: 340.0 });
        assert_eq!(left.map(|m| m.name.as_str()), Some("DP-1"));
        let right = monitor_at(&monitors, Point { x: 2400.0, y: 340.0 });
        assert_eq!(right.map(|m| m.name.as_str()), Some("HDMI-A-1"));
        assert!(monitor_at(&monitors, Point { x: -5.0, y: 0.0 }).is_none());
    }

    #[test]
    fn one_monitor_listing_places_every_window() {
        let windows: Vec<WindowDescriptor> = clients().iter().map(ClientJson::descriptor).collect();
        let names: Vec<Option<String>> = screens_of(&monitors(), &windows)
            .into_iter()
            .map(|s| s.map(|s| s.name))
            .collect();
        assert_eq!(
            names,
            vec![
                Some("DP-1".to_string()),
                Some("HDMI-A-1".to_string()),
                Some("DP-1".to_string()),
            ]
        );
    }

    #[test]
    fn special_workspace_zero_is_ignored() {
        let visible = visible_workspaces(&monitors());
        assert_eq!(visible, HashSet::from([1, 2]));
    }
}
