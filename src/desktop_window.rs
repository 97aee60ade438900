use log::debug;
use x11rb::protocol::xproto::*;

use crate::connections::WindowSystem;
use crate::error::WrapRes;

const MAX_DEPTH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DesktopWindow {
    pub root: Window,
    pub desktop: Window,
}

/// Descends through mapped children that cover the whole display (or `target`),
/// at most `MAX_DEPTH` levels. Returns `win` if nothing qualifies.
pub fn find_subwindow<X: WindowSystem>(
    ws: &X,
    mut win: Window,
    target: Option<(u16, u16)>,
) -> WrapRes<Window> {
    let display = ws.screen_size();
    for _ in 0..MAX_DEPTH {
        let children = match ws.children(win)? {
            Some(children) => children,
            None => {
                debug!("window {:#x} vanished during search", win);
                break;
            }
        };
        let mut next = None;
        for child in children {
            if let Some(state) = ws.window_state(child)? {
                let size = (state.width, state.height);
                if state.mapped && (size == display || Some(size) == target) {
                    next = Some(child);
                    break;
                }
            }
        }
        match next {
            Some(child) => win = child,
            None => break,
        }
    }
    Ok(win)
}

fn find_virtual_root<X: WindowSystem>(ws: &X) -> WrapRes<Option<Window>> {
    let vroot = match ws.atom("__SWM_VROOT")? {
        Some(atom) => atom,
        None => return Ok(None),
    };
    for child in ws.children(ws.root())?.unwrap_or_default() {
        if let Some(win) = ws.property32(child, vroot, AtomEnum::WINDOW.into())? {
            return Ok(Some(win));
        }
    }
    Ok(None)
}

pub fn find_desktop_window<X: WindowSystem>(ws: &X) -> WrapRes<DesktopWindow> {
    if let Some(win) = find_virtual_root(ws)? {
        debug!("desktop window ({:#x}) found from __SWM_VROOT property", win);
        return Ok(DesktopWindow {
            root: win,
            desktop: win,
        });
    }

    let root = ws.root();
    let win = find_subwindow(ws, root, None)?;
    let desktop = find_subwindow(ws, win, Some(ws.screen_size()))?;

    if desktop != root {
        debug!(
            "desktop window ({:#x}) is subwindow of root window ({:#x})",
            desktop, root
        );
    } else {
        debug!("desktop window ({:#x}) is root window", desktop);
    }
    Ok(DesktopWindow { root, desktop })
}
