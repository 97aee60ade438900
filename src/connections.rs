use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use x11rb::{
    connection::Connection,
    errors::ReplyError,
    properties::{WmHints, WmHintsState, WmSizeHints, WmSizeHintsSpecification},
    protocol::{
        shape::{ConnectionExt as _, SK, SO},
        xproto::*,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    NONE,
};

use crate::error::WrapRes;
use crate::shape::{ShapeMask, Silhouette};
use crate::utils::Rect;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowState {
    pub mapped: bool,
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualInfo {
    pub id: Visualid,
    pub depth: u8,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowRequest {
    pub parent: Window,
    pub rect: Rect,
    pub depth: u8,
    pub visual: Visualid,
    pub colormap: Option<Colormap>,
    pub override_redirect: bool,
    pub event_mask: u32,
}

/// The slice of the X protocol the wrapper needs.
pub trait WindowSystem {
    fn root(&self) -> Window;
    fn screen_size(&self) -> (u16, u16);
    fn default_visual(&self) -> (Visualid, Colormap);
    fn visuals(&self) -> Vec<VisualInfo>;

    /// Only-if-exists lookup; `None` means the server has never heard of `name`.
    fn atom(&self, name: &str) -> WrapRes<Option<Atom>>;
    fn intern(&self, name: &str) -> WrapRes<Atom>;

    /// `None` when the window was destroyed before it could be queried.
    fn children(&self, win: Window) -> WrapRes<Option<Vec<Window>>>;
    /// `None` when the window vanished before it could be inspected.
    fn window_state(&self, win: Window) -> WrapRes<Option<WindowState>>;
    fn property32(&self, win: Window, property: Atom, type_: Atom) -> WrapRes<Option<u32>>;

    fn create_colormap(&self, visual: Visualid) -> WrapRes<Colormap>;
    fn create_window(&self, request: &WindowRequest) -> WrapRes<Window>;
    fn change_property32(
        &self,
        mode: PropMode,
        win: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> WrapRes<()>;
    fn change_property8(&self, win: Window, property: Atom, type_: Atom, data: &[u8]) -> WrapRes<()>;
    fn set_wm_hints(&self, win: Window, input: bool) -> WrapRes<()>;
    fn set_normal_hints(&self, win: Window, rect: &Rect) -> WrapRes<()>;
    fn lower(&self, win: Window) -> WrapRes<()>;
    fn clear_input_shape(&self, win: Window) -> WrapRes<()>;
    fn set_bounding_mask(&self, win: Window, mask: &ShapeMask) -> WrapRes<()>;
    fn map(&self, win: Window) -> WrapRes<()>;
    fn reparent(&self, win: Window, parent: Window) -> WrapRes<()>;
    fn resize(&self, win: Window, rect: &Rect) -> WrapRes<()>;
    fn destroy(&self, win: Window, colormap: Option<Colormap>) -> WrapRes<()>;
    fn sync(&self) -> WrapRes<()>;
}

/// Name to atom cache; absence is cached as well as presence.
#[derive(Default)]
pub struct AtomCache {
    atoms: RefCell<HashMap<String, Option<Atom>>>,
}

impl AtomCache {
    pub fn resolve<F>(&self, name: &str, lookup: F) -> WrapRes<Option<Atom>>
    where
        F: FnOnce(&str) -> WrapRes<Option<Atom>>,
    {
        if let Some(atom) = self.atoms.borrow().get(name) {
            return Ok(*atom);
        }
        let atom = lookup(name)?;
        if atom.is_none() {
            debug!("atom {} is not supported", name);
        }
        self.atoms.borrow_mut().insert(name.to_string(), atom);
        Ok(atom)
    }

    /// Records an atom created on the server, replacing a cached absence.
    pub fn insert(&self, name: &str, atom: Atom) {
        self.atoms.borrow_mut().insert(name.to_string(), Some(atom));
    }
}

pub struct Conn {
    pub dpy: RustConnection,
    pub screen: usize,
    atoms: AtomCache,
}

impl Conn {
    pub fn connect() -> WrapRes<Self> {
        let (dpy, screen) = RustConnection::connect(None)?;
        Ok(Self {
            dpy,
            screen,
            atoms: AtomCache::default(),
        })
    }

    fn setup_screen(&self) -> &Screen {
        &self.dpy.setup().roots[self.screen]
    }

    fn intern_atom(&self, name: &str, only_if_exists: bool) -> WrapRes<Atom> {
        Ok(self
            .dpy
            .intern_atom(only_if_exists, name.as_bytes())?
            .reply()?
            .atom)
    }
}

fn absent_on_x_error<T>(reply: Result<T, ReplyError>) -> WrapRes<Option<T>> {
    match reply {
        Ok(value) => Ok(Some(value)),
        Err(ReplyError::X11Error(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl WindowSystem for Conn {
    fn root(&self) -> Window {
        self.setup_screen().root
    }

    fn screen_size(&self) -> (u16, u16) {
        let screen = self.setup_screen();
        (screen.width_in_pixels, screen.height_in_pixels)
    }

    fn default_visual(&self) -> (Visualid, Colormap) {
        let screen = self.setup_screen();
        (screen.root_visual, screen.default_colormap)
    }

    fn visuals(&self) -> Vec<VisualInfo> {
        self.setup_screen()
            .allowed_depths
            .iter()
            .flat_map(|depth| {
                depth.visuals.iter().map(move |visual| VisualInfo {
                    id: visual.visual_id,
                    depth: depth.depth,
                    red_mask: visual.red_mask,
                    green_mask: visual.green_mask,
                    blue_mask: visual.blue_mask,
                })
            })
            .collect()
    }

    fn atom(&self, name: &str) -> WrapRes<Option<Atom>> {
        self.atoms.resolve(name, |name| {
            let atom = self.intern_atom(name, true)?;
            Ok(if atom == NONE { None } else { Some(atom) })
        })
    }

    fn intern(&self, name: &str) -> WrapRes<Atom> {
        if let Some(atom) = self.atom(name)? {
            return Ok(atom);
        }
        let atom = self.intern_atom(name, false)?;
        self.atoms.insert(name, atom);
        Ok(atom)
    }

    fn children(&self, win: Window) -> WrapRes<Option<Vec<Window>>> {
        let reply = self.dpy.query_tree(win)?.reply();
        Ok(absent_on_x_error(reply)?.map(|tree| tree.children))
    }

    fn window_state(&self, win: Window) -> WrapRes<Option<WindowState>> {
        let attrs_cookie = self.dpy.get_window_attributes(win)?;
        let geom_cookie = self.dpy.get_geometry(win)?;
        let attrs = absent_on_x_error(attrs_cookie.reply())?;
        let geom = absent_on_x_error(geom_cookie.reply())?;
        Ok(attrs.zip(geom).map(|(attrs, geom)| WindowState {
            mapped: attrs.map_state != MapState::UNMAPPED,
            width: geom.width,
            height: geom.height,
        }))
    }

    fn property32(&self, win: Window, property: Atom, type_: Atom) -> WrapRes<Option<u32>> {
        let reply = self
            .dpy
            .get_property(false, win, property, type_, 0, 1)?
            .reply();
        Ok(absent_on_x_error(reply)?.and_then(|reply| {
            if reply.type_ != type_ {
                return None;
            }
            reply.value32().and_then(|mut values| values.next())
        }))
    }

    fn create_colormap(&self, visual: Visualid) -> WrapRes<Colormap> {
        let cmap = self.dpy.generate_id()?;
        self.dpy
            .create_colormap(ColormapAlloc::NONE, cmap, self.root(), visual)?;
        Ok(cmap)
    }

    fn create_window(&self, request: &WindowRequest) -> WrapRes<Window> {
        let win = self.dpy.generate_id()?;
        let mut aux = CreateWindowAux::new()
            .backing_store(BackingStore::ALWAYS)
            .override_redirect(u32::from(request.override_redirect))
            .event_mask(request.event_mask);
        aux = match request.colormap {
            Some(cmap) => aux.border_pixel(0).colormap(cmap),
            None => aux.background_pixel(0),
        };
        let rect = &request.rect;
        self.dpy.create_window(
            request.depth,
            win,
            request.parent,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            0,
            WindowClass::INPUT_OUTPUT,
            request.visual,
            &aux,
        )?;
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
        self.dpy
            .change_property32(mode, win, property, type_, data)?;
        Ok(())
    }

    fn change_property8(&self, win: Window, property: Atom, type_: Atom, data: &[u8]) -> WrapRes<()> {
        self.dpy
            .change_property8(PropMode::REPLACE, win, property, type_, data)?;
        Ok(())
    }

    fn set_wm_hints(&self, win: Window, input: bool) -> WrapRes<()> {
        let mut hints = WmHints::new();
        hints.input = Some(input);
        hints.initial_state = Some(WmHintsState::Normal);
        hints.set(&self.dpy, win)?;
        Ok(())
    }

    fn set_normal_hints(&self, win: Window, rect: &Rect) -> WrapRes<()> {
        let mut hints = WmSizeHints::new();
        hints.position = Some((
            WmSizeHintsSpecification::UserSpecified,
            rect.x as i32,
            rect.y as i32,
        ));
        hints.size = Some((
            WmSizeHintsSpecification::UserSpecified,
            rect.width as i32,
            rect.height as i32,
        ));
        hints.set_normal_hints(&self.dpy, win)?;
        Ok(())
    }

    fn lower(&self, win: Window) -> WrapRes<()> {
        self.dpy.configure_window(
            win,
            &ConfigureWindowAux::new().stack_mode(StackMode::BELOW),
        )?;
        Ok(())
    }

    fn clear_input_shape(&self, win: Window) -> WrapRes<()> {
        self.dpy
            .shape_rectangles(SO::SET, SK::INPUT, ClipOrdering::UNSORTED, win, 0, 0, &[])?;
        Ok(())
    }

    fn set_bounding_mask(&self, win: Window, mask: &ShapeMask) -> WrapRes<()> {
        let pixmap = self.dpy.generate_id()?;
        let gc = self.dpy.generate_id()?;
        self.dpy
            .create_pixmap(1, pixmap, win, mask.width, mask.height)?;
        self.dpy
            .create_gc(gc, pixmap, &CreateGCAux::new().foreground(0))?;
        self.dpy.poly_fill_rectangle(pixmap, gc, &[mask.clear])?;
        self.dpy
            .change_gc(gc, &ChangeGCAux::new().foreground(1))?;
        match &mask.silhouette {
            Silhouette::Ellipse(arc) => {
                self.dpy.poly_fill_arc(pixmap, gc, &[*arc])?;
            }
            Silhouette::Polygon(points) => {
                self.dpy
                    .fill_poly(pixmap, gc, PolyShape::COMPLEX, CoordMode::ORIGIN, points)?;
            }
        }
        self.dpy
            .shape_mask(SO::SET, SK::BOUNDING, win, 0, 0, pixmap)?;
        self.dpy.free_gc(gc)?;
        self.dpy.free_pixmap(pixmap)?;
        Ok(())
    }

    fn map(&self, win: Window) -> WrapRes<()> {
        map_window(&self.dpy, win)?;
        Ok(())
    }

    fn reparent(&self, win: Window, parent: Window) -> WrapRes<()> {
        self.dpy.reparent_window(win, parent, 0, 0)?;
        Ok(())
    }

    fn resize(&self, win: Window, rect: &Rect) -> WrapRes<()> {
        configure_window(&self.dpy, win, &rect.resize_aux())?;
        Ok(())
    }

    fn destroy(&self, win: Window, colormap: Option<Colormap>) -> WrapRes<()> {
        destroy_window(&self.dpy, win)?;
        if let Some(cmap) = colormap {
            free_colormap(&self.dpy, cmap)?;
        }
        self.dpy.flush()?;
        Ok(())
    }

    fn sync(&self) -> WrapRes<()> {
        self.dpy.get_input_focus()?.reply()?;
        Ok(())
    }
}
