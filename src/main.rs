//! Entry point for the **hyprarrange** daemon.
//!
//! Spawns the Unix-socket [`CommandSource`](hyprarrange::traits::CommandSource)
//! on a background thread and handles every incoming command on the main
//! thread, one at a time.

use hyprarrange::action::Command;
use hyprarrange::config::Config;
use hyprarrange::dispatcher::LayoutDispatcher;
use hyprarrange::hyprland::wm::HyprlandWm;
use hyprarrange::ipc::listener::UnixSocketListener;
use hyprarrange::traits::CommandSource;
use log::{error, info, warn};
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/hyprarrange.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprarrange`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("hyprarrange")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprarrange/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();
    let mut dispatcher = LayoutDispatcher::from_config(HyprlandWm::new(), &config);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    // Commands are handled strictly one after another, so the focus cycle
    // and the compositor cache never see concurrent access.
    info!("hyprarrange running");
    for cmd in cmd_rx {
        if !dispatcher.handle_command(&cmd) {
            warn!("unhandled command: {:?}", cmd);
        }
    }
    info!("all command sources closed, exiting");
}

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
