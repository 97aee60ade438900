use log::{debug, error, info};
use nix::{
    errno::Errno,
    libc,
    sys::{
        signal::{kill, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal},
        wait::{waitpid, WaitStatus},
    },
    unistd::{execvp, fork, ForkResult, Pid},
};
use std::convert::TryFrom;
use std::ffi::CString;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;
use x11rb::protocol::xproto::*;

use crate::connections::WindowSystem;
use crate::error::{WrapError, WrapRes};
use crate::utils::Poll;
use crate::window::WrapperWindow;

/// 100 probes, 100ms apart.
pub const ATTACH_POLL: Poll = Poll::new(100, Duration::from_millis(100));

/// Read by the signal handler, which cannot be handed any context.
static CHILD_PID: AtomicI32 = AtomicI32::new(0);

/// Replaces every occurrence of `placeholder` in every argument with `wid`.
pub fn substitute(args: &[String], placeholder: &str, wid: &str) -> Vec<String> {
    args.iter()
        .map(|arg| {
            if !placeholder.is_empty() && arg.contains(placeholder) {
                arg.replace(placeholder, wid)
            } else {
                arg.clone()
            }
        })
        .collect()
}

#[derive(Debug)]
pub enum Outcome {
    Exited(i32),
    Terminated(WaitStatus),
    /// Force-attach gave up; the child was left running.
    Detached,
}

#[derive(Debug)]
pub struct Child {
    pub pid: Pid,
    pub argv: Vec<String>,
}

impl Child {
    pub fn spawn(argv: Vec<String>) -> WrapRes<Self> {
        if argv.is_empty() {
            return Err(WrapError::NoCommand);
        }
        let c_argv = argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()).map_err(|_| WrapError::Sys(Errno::EINVAL)))
            .collect::<WrapRes<Vec<_>>>()?;

        match unsafe { fork() }? {
            ForkResult::Parent { child } => {
                debug!("spawned {} as pid {}", argv[0], child);
                Ok(Self { pid: child, argv })
            }
            ForkResult::Child => {
                let Err(e) = execvp(&c_argv[0], &c_argv);
                eprintln!("{}: {}", argv[0], e);
                unsafe { libc::_exit(2) }
            }
        }
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }

    /// Top-level window whose `_NET_WM_PID` is this child's pid.
    pub fn find_window<X: WindowSystem>(&self, ws: &X) -> WrapRes<Option<Window>> {
        let net_wm_pid = match ws.atom("_NET_WM_PID")? {
            Some(atom) => atom,
            None => return Ok(None),
        };
        for win in ws.children(ws.root())?.unwrap_or_default() {
            let pid = ws.property32(win, net_wm_pid, AtomEnum::CARDINAL.into())?;
            if pid == Some(self.pid.as_raw() as u32) {
                debug!("found child window ({:#x})", win);
                return Ok(Some(win));
            }
        }
        Ok(None)
    }

    /// Blocks until the child terminates.
    pub fn wait(&self) -> WrapRes<WaitStatus> {
        loop {
            match waitpid(self.pid, None) {
                Ok(WaitStatus::Exited(pid, code)) => {
                    info!("{} died, exit status {}", self.program(), code);
                    return Ok(WaitStatus::Exited(pid, code));
                }
                Ok(status @ WaitStatus::Signaled(..)) => {
                    debug!("{} terminated: {:?}", self.program(), status);
                    return Ok(status);
                }
                Ok(_) => continue,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

extern "C" fn forward_signal(sig: libc::c_int) {
    let pid = CHILD_PID.load(Ordering::SeqCst);
    if pid > 0 {
        if let Ok(sig) = Signal::try_from(sig) {
            let _ = kill(Pid::from_raw(pid), sig);
        }
    }
}

/// Forwards the next SIGTERM/SIGINT to `child`; after that the default action applies again.
pub fn forward_signals(child: &Child) -> WrapRes<()> {
    CHILD_PID.store(child.pid.as_raw(), Ordering::SeqCst);
    let action = SigAction::new(
        SigHandler::Handler(forward_signal),
        SaFlags::SA_RESETHAND | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in [Signal::SIGTERM, Signal::SIGINT].iter() {
        unsafe { sigaction(*signal, &action) }?;
    }
    Ok(())
}

/// Optionally attaches the child's window, then reaps the child.
pub fn supervise<X, S>(
    ws: &X,
    wrapper: &mut WrapperWindow,
    child: &Child,
    force_attach: bool,
    poll: Poll,
    sleep: S,
) -> WrapRes<Outcome>
where
    X: WindowSystem,
    S: FnMut(Duration),
{
    if force_attach {
        match poll.run(sleep, || child.find_window(ws))? {
            Some(win) => wrapper.attach(ws, win)?,
            None => {
                error!("could not find any child window");
                return Ok(Outcome::Detached);
            }
        }
    }
    Ok(match child.wait()? {
        WaitStatus::Exited(_, code) => Outcome::Exited(code),
        status => Outcome::Terminated(status),
    })
}
