use nix::{
    fcntl::{open, OFlag},
    sys::stat::{umask, Mode},
    unistd::{chdir, close, dup2, fork, setsid, ForkResult},
};

use crate::error::WrapRes;

/// Detaches from the terminal. Only the forked child returns.
pub fn daemonize() -> WrapRes<()> {
    match unsafe { fork() }? {
        ForkResult::Parent { child } => {
            eprintln!("pid of child process: {}", child);
            std::process::exit(0);
        }
        ForkResult::Child => (),
    }
    umask(Mode::empty());
    setsid()?;
    chdir("/")?;

    // fds 0-2 stay occupied so the X socket never lands on stderr
    let null = open("/dev/null", OFlag::O_RDWR, Mode::empty())?;
    for fd in 0..=2 {
        dup2(null, fd)?;
    }
    if null > 2 {
        close(null)?;
    }
    Ok(())
}
