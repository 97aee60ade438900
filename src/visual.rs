use log::debug;
use x11rb::{protocol::xproto::*, COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT};

use crate::connections::{VisualInfo, WindowSystem};
use crate::error::WrapRes;

pub const ARGB_DEPTH: u8 = 32;

/// What the wrapper window is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualChoice {
    /// Passed to CreateWindow; `COPY_FROM_PARENT` unless ARGB was found.
    pub visual: Visualid,
    pub depth: u8,
    /// Created for the ARGB visual and owned by the wrapper.
    pub colormap: Option<Colormap>,
    /// The effective visual/colormap pair, for bookkeeping.
    pub effective: (Visualid, Colormap),
}

impl VisualChoice {
    pub fn is_argb(&self) -> bool {
        self.colormap.is_some()
    }
}

pub fn is_argb(info: &VisualInfo) -> bool {
    info.depth == ARGB_DEPTH
        && info.red_mask == 0xff0000
        && info.green_mask == 0x00ff00
        && info.blue_mask == 0x0000ff
}

pub fn get_argb_visual(visuals: &[VisualInfo]) -> Option<VisualInfo> {
    visuals.iter().find(|info| is_argb(info)).copied()
}

pub fn select_visual<X: WindowSystem>(ws: &X, argb: bool) -> WrapRes<VisualChoice> {
    if argb {
        if let Some(info) = get_argb_visual(&ws.visuals()) {
            debug!("Found ARGB Visual ({:#x})", info.id);
            let colormap = ws.create_colormap(info.id)?;
            return Ok(VisualChoice {
                visual: info.id,
                depth: info.depth,
                colormap: Some(colormap),
                effective: (info.id, colormap),
            });
        }
        debug!("No ARGB Visual found");
    }
    Ok(VisualChoice {
        visual: COPY_FROM_PARENT,
        depth: COPY_DEPTH_FROM_PARENT,
        colormap: None,
        effective: ws.default_visual(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeServer, Op};

    fn visual(id: Visualid, depth: u8, masks: (u32, u32, u32)) -> VisualInfo {
        VisualInfo {
            id,
            depth,
            red_mask: masks.0,
            green_mask: masks.1,
            blue_mask: masks.2,
        }
    }

    #[test]
    fn argb_requires_depth_and_exact_masks() {
        let rgb = (0xff0000, 0x00ff00, 0x0000ff);
        assert!(is_argb(&visual(1, 32, rgb)));
        assert!(!is_argb(&visual(2, 24, rgb)));
        assert!(!is_argb(&visual(3, 32, (0x0000ff, 0x00ff00, 0xff0000))));
        assert!(!is_argb(&visual(4, 32, (0xf800, 0x07e0, 0x001f))));

        let list = [visual(2, 24, rgb), visual(3, 32, (0, 0, 0)), visual(7, 32, rgb)];
        assert_eq!(get_argb_visual(&list).map(|v| v.id), Some(7));
        assert_eq!(get_argb_visual(&list[..2]), None);
    }

    #[test]
    fn argb_selection_creates_colormap() {
        let mut ws = FakeServer::new(800, 600);
        ws.visuals.push(visual(0x55, 32, (0xff0000, 0x00ff00, 0x0000ff)));
        let choice = select_visual(&ws, true).unwrap();
        assert!(choice.is_argb());
        assert_eq!(choice.visual, 0x55);
        assert_eq!(choice.depth, 32);
        assert_eq!(ws.ops(), vec![Op::CreateColormap(0x55)]);
    }

    #[test]
    fn falls_back_to_parent_visual() {
        let ws = FakeServer::new(800, 600);
        let choice = select_visual(&ws, true).unwrap();
        assert!(!choice.is_argb());
        assert_eq!(choice.visual, COPY_FROM_PARENT);
        assert_eq!(choice.depth, COPY_DEPTH_FROM_PARENT);
        assert_eq!(choice.effective, ws.default_visual());
        assert!(ws.ops().is_empty());
    }

    #[test]
    fn argb_not_requested() {
        let mut ws = FakeServer::new(800, 600);
        ws.visuals.push(visual(0x55, 32, (0xff0000, 0x00ff00, 0x0000ff)));
        assert!(!select_visual(&ws, false).unwrap().is_argb());
    }
}
