use std::path::Path;

use clap::{ArgAction, Parser};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

mod config;
mod draw;
mod input;
mod remote;
mod util;

use config::Config;
use draw::Canvas;
use input::InputRouter;
use remote::{GrabTarget, RemoteCommand, RemoteServer};

#[derive(Parser, Debug)]
#[command(name = "multimark")]
#[command(version, about = "Multi-device screen annotation with pressure pens and undo")]
struct Cli {
    /// Run the annotation instance in the foreground
    #[arg(long, short = 's', action = ArgAction::SetTrue)]
    serve: bool,

    /// Canvas width in pixels (with --serve)
    #[arg(long, value_name = "PX", default_value_t = 1920)]
    width: i32,

    /// Canvas height in pixels (with --serve)
    #[arg(long, value_name = "PX", default_value_t = 1080)]
    height: i32,

    /// Toggle annotation visibility on the running instance
    #[arg(long, action = ArgAction::SetTrue)]
    toggle_visibility: bool,

    /// Wipe the canvas of the running instance (undoable)
    #[arg(long, action = ArgAction::SetTrue)]
    clear: bool,

    /// Rescan input devices on the running instance
    #[arg(long, action = ArgAction::SetTrue)]
    reload_devices: bool,

    /// Undo the last stroke on the running instance
    #[arg(long, short = 'z', action = ArgAction::SetTrue)]
    undo: bool,

    /// Redo the last undone stroke on the running instance
    #[arg(long, short = 'y', action = ArgAction::SetTrue)]
    redo: bool,

    /// Toggle the pointer grab: a device index, or "all"
    #[arg(long, value_name = "DEVICE")]
    toggle_grab: Option<String>,

    /// Ask the running instance to quit
    #[arg(long, short = 'q', action = ArgAction::SetTrue)]
    quit: bool,
}

impl Cli {
    /// Picks the remote command encoded by the client flags, if any.
    fn remote_command(&self) -> anyhow::Result<Option<RemoteCommand>> {
        if self.toggle_visibility {
            return Ok(Some(RemoteCommand::ToggleVisibility));
        }
        if self.clear {
            return Ok(Some(RemoteCommand::Clear));
        }
        if self.reload_devices {
            return Ok(Some(RemoteCommand::ReloadDevices));
        }
        if self.undo {
            return Ok(Some(RemoteCommand::Undo));
        }
        if self.redo {
            return Ok(Some(RemoteCommand::Redo));
        }
        if self.quit {
            return Ok(Some(RemoteCommand::Quit));
        }
        if let Some(device) = &self.toggle_grab {
            let target = match device.as_str() {
                "all" => GrabTarget::All,
                index => GrabTarget::Index(index.parse().map_err(|_| {
                    anyhow::anyhow!("--toggle-grab expects a device index or 'all', got '{index}'")
                })?),
            };
            return Ok(Some(RemoteCommand::ToggleGrab(target)));
        }
        Ok(None)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let socket = remote::socket_path(&config.remote.socket_name);

    if cli.serve {
        serve(&config, &socket, cli.width, cli.height)
    } else if let Some(command) = cli.remote_command()? {
        remote::send_command(&socket, command, remote::DEFAULT_TIMEOUT)?;
        Ok(())
    } else {
        // No flags: show usage
        println!("multimark: Multi-device screen annotation");
        println!();
        println!("Usage:");
        println!("  multimark --serve                Run the annotation instance");
        println!("  multimark --toggle-visibility    Show or hide the annotations");
        println!("  multimark --clear                Wipe the canvas (undoable)");
        println!("  multimark --undo / --redo        Step through the stroke history");
        println!("  multimark --toggle-grab <DEV>    Toggle grabbing for a device index, or 'all'");
        println!("  multimark --reload-devices       Rescan input devices");
        println!("  multimark --quit                 Stop the running instance");
        println!("  multimark --help                 Show help");
        println!();
        println!("Tool presets live in ~/.config/multimark/config.toml; each pointer");
        println!("button of each grabbed device can carry its own pen, eraser, line,");
        println!("or rectangle tool.");
        Ok(())
    }
}

/// Foreground instance: owns the canvas and router, applies remote commands
/// until `quit` arrives or a termination signal fires.
fn serve(config: &Config, socket: &Path, width: i32, height: i32) -> anyhow::Result<()> {
    log::info!(
        "multimark {} ({}) serving a {width}x{height} canvas",
        env!("CARGO_PKG_VERSION"),
        env!("MULTIMARK_GIT_HASH")
    );

    let mut canvas = Canvas::new(width, height)?;
    let mut router = InputRouter::new(Box::new(config.build_tool_table()));
    let server = RemoteServer::bind(socket)?;

    // Signals funnel through the remote socket so the accept loop stays the
    // single shutdown path.
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let signal_socket = socket.to_path_buf();
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            log::info!("Termination signal received, shutting down");
            let _ = remote::send_command(
                &signal_socket,
                RemoteCommand::Quit,
                remote::DEFAULT_TIMEOUT,
            );
        }
    });

    let mut visible = true;
    server.run(|command| match command {
        RemoteCommand::ToggleVisibility => {
            visible = !visible;
            log::info!("Annotations {}", if visible { "shown" } else { "hidden" });
            true
        }
        RemoteCommand::Clear => applied(router.clear_canvas(&mut canvas)),
        RemoteCommand::ReloadDevices => {
            // Devices re-register lazily from their next event.
            router.reload_devices(&[]);
            true
        }
        RemoteCommand::Undo => applied(router.undo(&mut canvas)),
        RemoteCommand::Redo => applied(router.redo(&mut canvas)),
        RemoteCommand::ToggleGrab(GrabTarget::All) => {
            router.toggle_grab(None);
            true
        }
        RemoteCommand::ToggleGrab(GrabTarget::Index(index)) => router.toggle_grab_index(index),
        RemoteCommand::Quit => true,
    })
}

fn applied<T>(result: anyhow::Result<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            log::warn!("Remote command failed: {err}");
            false
        }
    }
}
