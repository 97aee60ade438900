use anyhow::{Context, Result};
use log::{debug, info};

pub mod args;
pub mod child;
pub mod config;
pub mod connections;
pub mod daemon;
pub mod desktop_window;
pub mod error;
pub mod shape;
pub mod utils;
pub mod visual;
pub mod window;
#[cfg(test)]
mod fake;

pub use error::{WrapError, WrapRes};

use args::Invocation;
use child::{forward_signals, substitute, supervise, Child, Outcome, ATTACH_POLL};
use connections::{Conn, WindowSystem};
use desktop_window::find_desktop_window;
use visual::select_visual;
use window::create_wrapper;

/// Connects, builds the wrapper window, runs the child in it and tears down
/// once the child is gone. `wm_command` is recorded as the window's WM_COMMAND.
pub fn run(inv: &Invocation, wm_command: &[String]) -> Result<()> {
    if inv.command.is_empty() {
        return Err(WrapError::NoCommand.into());
    }
    let config = &inv.config;

    let conn = Conn::connect()?;
    debug!("connected, screen {} is {:?}", conn.screen, conn.screen_size());

    let desktop = find_desktop_window(&conn).context(WrapError::NoDesktop)?;
    let visual = select_visual(&conn, config.flags.argb).context(crate::code_loc!())?;
    let mut wrapper =
        create_wrapper(&conn, desktop, visual, config, wm_command).context(crate::code_loc!())?;

    let argv = substitute(&inv.command, &inv.placeholder, &wrapper.id_string());
    let child = Child::spawn(argv).context("fork failed")?;
    forward_signals(&child).context(crate::code_loc!())?;

    let outcome = supervise(
        &conn,
        &mut wrapper,
        &child,
        config.flags.force_attach,
        ATTACH_POLL,
        std::thread::sleep,
    )
    .context(crate::code_loc!())?;
    match outcome {
        Outcome::Exited(_) => (),
        Outcome::Terminated(status) => info!("{} terminated ({:?})", child.program(), status),
        Outcome::Detached => debug!("leaving pid {} running", child.pid),
    }

    wrapper.destroy(&conn).context(crate::code_loc!())?;
    Ok(())
}

#[macro_export]
macro_rules! code_loc {
    () => {
        format!("{}:{}", file!(), line!())
    };
}
