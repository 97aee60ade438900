use log::{debug, info, warn};
use x11rb::protocol::xproto::*;

use crate::config::WindowConfig;
use crate::connections::{WindowRequest, WindowSystem};
use crate::desktop_window::DesktopWindow;
use crate::error::WrapRes;
use crate::shape::ShapeMask;
use crate::utils::Rect;
use crate::visual::VisualChoice;

const MOTIF_NO_DECORATIONS: [u32; 5] = [2, 0, 0, 0, 0];
const WIN_LAYER_BELOW: u32 = 0;
const WIN_LAYER_ABOVE: u32 = 6;
const ALL_DESKTOPS: u32 = 0xffff_ffff;

#[derive(Debug, PartialEq)]
pub struct WrapperWindow {
    pub root: Window,
    pub desktop: Window,
    pub window: Window,
    pub child: Option<Window>,
    pub visual: VisualChoice,
    pub rect: Rect,
}

impl WrapperWindow {
    pub fn id_string(&self) -> String {
        format!("{:#x}", self.window)
    }

    /// Embeds `child` at the wrapper's origin, sized to fill it, and shows the wrapper.
    pub fn attach<X: WindowSystem>(&mut self, ws: &X, child: Window) -> WrapRes<()> {
        ws.reparent(child, self.window)?;
        ws.resize(child, &self.rect)?;
        ws.map(self.window)?;
        ws.sync()?;
        self.child = Some(child);
        Ok(())
    }

    pub fn destroy<X: WindowSystem>(self, ws: &X) -> WrapRes<()> {
        ws.destroy(self.window, self.visual.colormap)
    }
}

fn event_mask(masks: &[EventMask]) -> u32 {
    masks.iter().fold(0, |acc, mask| acc | u32::from(*mask))
}

pub fn create_wrapper<X: WindowSystem>(
    ws: &X,
    desktop: DesktopWindow,
    visual: VisualChoice,
    config: &WindowConfig,
    wm_command: &[String],
) -> WrapRes<WrapperWindow> {
    let flags = &config.flags;
    let rect = if flags.fullscreen {
        Rect::full_screen(ws.screen_size())
    } else {
        config.geometry.clone()
    };

    let mut request = WindowRequest {
        parent: desktop.root,
        rect: rect.clone(),
        depth: visual.depth,
        visual: visual.visual,
        colormap: visual.colormap,
        override_redirect: flags.override_redirect,
        event_mask: event_mask(&[EventMask::STRUCTURE_NOTIFY, EventMask::EXPOSURE]),
    };

    let window = if flags.override_redirect {
        request.parent = desktop.desktop;
        let window = ws.create_window(&request)?;
        ws.lower(window)?;
        info!("window type - override");
        window
    } else {
        request.event_mask |= event_mask(&[EventMask::BUTTON_PRESS, EventMask::BUTTON_RELEASE]);
        let window = ws.create_window(&request)?;
        set_wm_properties(ws, window, config, &rect, wm_command)?;
        set_ewmh_hints(ws, window, config)?;
        window
    };
    debug!("created wrapper window {:#x} ({:?})", window, rect);

    if !config.is_opaque() {
        let opacity = ws.intern("_NET_WM_WINDOW_OPACITY")?;
        ws.change_property32(
            PropMode::REPLACE,
            window,
            opacity,
            AtomEnum::CARDINAL.into(),
            &[config.opacity],
        )?;
    }

    if flags.no_input {
        ws.clear_input_shape(window)?;
    }

    if let Some(mask) = ShapeMask::new(config.shape, rect.width, rect.height) {
        ws.set_bounding_mask(window, &mask)?;
    }

    if !flags.force_attach {
        ws.map(window)?;
        ws.sync()?;
    }

    Ok(WrapperWindow {
        root: desktop.root,
        desktop: desktop.desktop,
        window,
        child: None,
        visual,
        rect,
    })
}

fn set_wm_properties<X: WindowSystem>(
    ws: &X,
    window: Window,
    config: &WindowConfig,
    rect: &Rect,
    wm_command: &[String],
) -> WrapRes<()> {
    ws.set_wm_hints(window, !config.flags.no_focus)?;
    ws.set_normal_hints(window, rect)?;

    let mut command = Vec::new();
    for arg in wm_command {
        command.extend_from_slice(arg.as_bytes());
        command.push(0);
    }
    ws.change_property8(
        window,
        AtomEnum::WM_COMMAND.into(),
        AtomEnum::STRING.into(),
        &command,
    )?;
    match whoami::fallible::hostname() {
        Ok(host) => ws.change_property8(
            window,
            AtomEnum::WM_CLIENT_MACHINE.into(),
            AtomEnum::STRING.into(),
            host.as_bytes(),
        )?,
        Err(e) => warn!("no WM_CLIENT_MACHINE: {}", e),
    }
    Ok(())
}

fn append_state<X: WindowSystem>(ws: &X, window: Window, state: &str) -> WrapRes<()> {
    if let (Some(net_state), Some(value)) = (ws.atom("_NET_WM_STATE")?, ws.atom(state)?) {
        ws.change_property32(
            PropMode::APPEND,
            window,
            net_state,
            AtomEnum::ATOM.into(),
            &[value],
        )?;
    }
    Ok(())
}

fn append_cardinal<X: WindowSystem>(ws: &X, window: Window, name: &str, value: u32) -> WrapRes<()> {
    if let Some(property) = ws.atom(name)? {
        ws.change_property32(
            PropMode::APPEND,
            window,
            property,
            AtomEnum::CARDINAL.into(),
            &[value],
        )?;
    }
    Ok(())
}

fn set_ewmh_hints<X: WindowSystem>(ws: &X, window: Window, config: &WindowConfig) -> WrapRes<()> {
    let flags = &config.flags;

    let window_type = ws.intern("_NET_WM_WINDOW_TYPE")?;
    let kind = ws.intern(if flags.desktop_type {
        "_NET_WM_WINDOW_TYPE_DESKTOP"
    } else {
        "_NET_WM_WINDOW_TYPE_NORMAL"
    })?;
    ws.change_property32(
        PropMode::REPLACE,
        window,
        window_type,
        AtomEnum::ATOM.into(),
        &[kind],
    )?;

    if flags.undecorated {
        if let Some(motif) = ws.atom("_MOTIF_WM_HINTS")? {
            ws.change_property32(PropMode::REPLACE, window, motif, motif, &MOTIF_NO_DECORATIONS)?;
        }
    }

    // -a and -b together: above wins
    if flags.above {
        if flags.below {
            warn!("both above and below requested, keeping above");
        }
        append_cardinal(ws, window, "_WIN_LAYER", WIN_LAYER_ABOVE)?;
        append_state(ws, window, "_NET_WM_STATE_ABOVE")?;
    } else if flags.below {
        append_cardinal(ws, window, "_WIN_LAYER", WIN_LAYER_BELOW)?;
        append_state(ws, window, "_NET_WM_STATE_BELOW")?;
    }

    if flags.sticky {
        append_cardinal(ws, window, "_NET_WM_DESKTOP", ALL_DESKTOPS)?;
        append_state(ws, window, "_NET_WM_STATE_STICKY")?;
    }
    if flags.skip_taskbar {
        append_state(ws, window, "_NET_WM_STATE_SKIP_TASKBAR")?;
    }
    if flags.skip_pager {
        append_state(ws, window, "_NET_WM_STATE_SKIP_PAGER")?;
    }
    Ok(())
}
