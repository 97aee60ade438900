//! In-memory `WindowSystem` for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use x11rb::protocol::xproto::*;

use crate::connections::{VisualInfo, WindowRequest, WindowState, WindowSystem};
use crate::error::WrapRes;
use crate::shape::ShapeMask;
use crate::utils::Rect;

pub const ROOT: Window = 1;

#[derive(Clone, Debug, Default)]
pub struct FakeWindow {
    pub children: Vec<Window>,
    pub mapped: bool,
    pub width: u16,
    pub height: u16,
    pub props: HashMap<Atom, (Atom, Vec<u32>)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    CreateColormap(Visualid),
    CreateWindow(WindowRequest),
    Property32(PropMode, Window, Atom, Atom, Vec<u32>),
    Property8(Window, Atom, Atom, Vec<u8>),
    WmHints(Window, bool),
    NormalHints(Window, Rect),
    Lower(Window),
    ClearInputShape(Window),
    BoundingMask(Window, ShapeMask),
    Map(Window),
    Reparent(Window, Window),
    Resize(Window, Rect),
    Destroy(Window, Option<Colormap>),
    Sync,
}

pub struct FakeServer {
    pub size: (u16, u16),
    pub windows: RefCell<HashMap<Window, FakeWindow>>,
    pub atoms: RefCell<HashMap<String, Atom>>,
    pub visuals: Vec<VisualInfo>,
    pub ops: RefCell<Vec<Op>>,
    destroyed: RefCell<Vec<Window>>,
    next_id: Cell<u32>,
}

impl FakeServer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut windows = HashMap::new();
        windows.insert(
            ROOT,
            FakeWindow {
                mapped: true,
                width,
                height,
                ..FakeWindow::default()
            },
        );
        Self {
            size: (width, height),
            windows: RefCell::new(windows),
            atoms: RefCell::new(HashMap::new()),
            visuals: vec![VisualInfo {
                id: 0x21,
                depth: 24,
                red_mask: 0xff0000,
                green_mask: 0x00ff00,
                blue_mask: 0x0000ff,
            }],
            ops: RefCell::new(Vec::new()),
            destroyed: RefCell::new(Vec::new()),
            next_id: Cell::new(0x2a0_0001),
        }
    }

    /// Registers atoms as if some client had already interned them.
    pub fn with_atoms(self, names: &[&str]) -> Self {
        for name in names {
            self.intern(name).unwrap();
        }
        self
    }

    pub fn add_window(&self, parent: Window, win: Window, mapped: bool, size: (u16, u16)) {
        let mut windows = self.windows.borrow_mut();
        windows.entry(parent).or_default().children.push(win);
        windows.insert(
            win,
            FakeWindow {
                mapped,
                width: size.0,
                height: size.1,
                ..FakeWindow::default()
            },
        );
    }

    /// Attributes stay readable but QueryTree on `win` now fails.
    pub fn mark_destroyed(&self, win: Window) {
        self.destroyed.borrow_mut().push(win);
    }

    pub fn set_prop(&self, win: Window, name: &str, type_: Atom, value: u32) {
        let atom = self.intern(name).unwrap();
        self.windows
            .borrow_mut()
            .entry(win)
            .or_default()
            .props
            .insert(atom, (type_, vec![value]));
    }

    pub fn atom_id(&self, name: &str) -> Option<Atom> {
        self.atoms.borrow().get(name).copied()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    fn record(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }

    fn fresh_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl WindowSystem for FakeServer {
    fn root(&self) -> Window {
        ROOT
    }

    fn screen_size(&self) -> (u16, u16) {
        self.size
    }

    fn default_visual(&self) -> (Visualid, Colormap) {
        (0x21, 0x20)
    }

    fn visuals(&self) -> Vec<VisualInfo> {
        self.visuals.clone()
    }

    fn atom(&self, name: &str) -> WrapRes<Option<Atom>> {
        Ok(self.atom_id(name))
    }

    fn intern(&self, name: &str) -> WrapRes<Atom> {
        let mut atoms = self.atoms.borrow_mut();
        let next = 100 + atoms.len() as Atom;
        Ok(*atoms.entry(name.to_string()).or_insert(next))
    }

    fn children(&self, win: Window) -> WrapRes<Option<Vec<Window>>> {
        if self.destroyed.borrow().contains(&win) {
            return Ok(None);
        }
        Ok(Some(
            self.windows
                .borrow()
                .get(&win)
                .map(|w| w.children.clone())
                .unwrap_or_default(),
        ))
    }

    fn window_state(&self, win: Window) -> WrapRes<Option<WindowState>> {
        Ok(self.windows.borrow().get(&win).map(|w| WindowState {
            mapped: w.mapped,
            width: w.width,
            height: w.height,
        }))
    }

    fn property32(&self, win: Window, property: Atom, type_: Atom) -> WrapRes<Option<u32>> {
        Ok(self
            .windows
            .borrow()
            .get(&win)
            .and_then(|w| w.props.get(&property))
            .filter(|(t, _)| *t == type_)
            .and_then(|(_, values)| values.first().copied()))
    }

    fn create_colormap(&self, visual: Visualid) -> WrapRes<Colormap> {
        self.record(Op::CreateColormap(visual));
        Ok(self.fresh_id())
    }

    fn create_window(&self, request: &WindowRequest) -> WrapRes<Window> {
        self.record(Op::CreateWindow(request.clone()));
        let win = self.fresh_id();
        self.add_window(
            request.parent,
            win,
            false,
            (request.rect.width, request.rect.height),
        );
        Ok(win)
    }

    fn change_property32(
        &self,
        mode: PropMode,
        win: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> WrapRes<()> {
        self.record(Op::Property32(mode, win, property, type_, data.to_vec()));
        Ok(())
    }

    fn change_property8(&self, win: Window, property: Atom, type_: Atom, data: &[u8]) -> WrapRes<()> {
        self.record(Op::Property8(win, property, type_, data.to_vec()));
        Ok(())
    }

    fn set_wm_hints(&self, win: Window, input: bool) -> WrapRes<()> {
        self.record(Op::WmHints(win, input));
        Ok(())
    }

    fn set_normal_hints(&self, win: Window, rect: &Rect) -> WrapRes<()> {
        self.record(Op::NormalHints(win, rect.clone()));
        Ok(())
    }

    fn lower(&self, win: Window) -> WrapRes<()> {
        self.record(Op::Lower(win));
        Ok(())
    }

    fn clear_input_shape(&self, win: Window) -> WrapRes<()> {
        self.record(Op::ClearInputShape(win));
        Ok(())
    }

    fn set_bounding_mask(&self, win: Window, mask: &ShapeMask) -> WrapRes<()> {
        self.record(Op::BoundingMask(win, mask.clone()));
        Ok(())
    }

    fn map(&self, win: Window) -> WrapRes<()> {
        self.record(Op::Map(win));
        Ok(())
    }

    fn reparent(&self, win: Window, parent: Window) -> WrapRes<()> {
        self.record(Op::Reparent(win, parent));
        Ok(())
    }

    fn resize(&self, win: Window, rect: &Rect) -> WrapRes<()> {
        self.record(Op::Resize(win, rect.clone()));
        Ok(())
    }

    fn destroy(&self, win: Window, colormap: Option<Colormap>) -> WrapRes<()> {
        self.record(Op::Destroy(win, colormap));
        Ok(())
    }

    fn sync(&self) -> WrapRes<()> {
        self.record(Op::Sync);
        Ok(())
    }
}
