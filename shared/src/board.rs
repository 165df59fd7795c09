//! A [`Session`] bound to its [`RenderLoop`].
//!
//! Input handlers call into the board and it decides when a frame is drawn
//! and published: after every change to the element list or the brush
//! width. Tool and colour changes only affect the next gesture, and
//! pointer-up commits an element that is already on screen.

use crate::render::{redraw, Publisher, RenderLoop, Surface};
use crate::{Point, Session, Tool};

pub struct Board<S, P> {
    session: Session,
    render: RenderLoop<S, P>,
}

impl<S: Surface, P: Publisher> Board<S, P> {
    pub fn new(session: Session, surface: S, publisher: P) -> Self {
        Self {
            session,
            render: RenderLoop::new(surface, publisher),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &S {
        self.render.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.render.surface_mut()
    }

    pub fn frames(&self) -> u64 {
        self.render.frames()
    }

    fn render_if(&mut self, changed: bool) -> bool {
        if changed {
            if let Err(err) = self.render.render(self.session.elements()) {
                log::error!("Render failed: {err}");
            }
        }
        changed
    }

    /// Redraws without publishing, for view-only changes such as resizes.
    pub fn repaint(&mut self) {
        redraw(self.render.surface_mut(), self.session.elements());
    }

    pub fn pointer_down(&mut self, point: Point) -> bool {
        let changed = self.session.pointer_down(point);
        self.render_if(changed)
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        let changed = self.session.pointer_move(point);
        self.render_if(changed)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.session.pointer_up()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.session.set_tool(tool);
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.session.set_color(color);
    }

    pub fn grow_brush(&mut self) -> bool {
        let changed = self.session.grow_brush();
        self.render_if(changed)
    }

    pub fn shrink_brush(&mut self) -> bool {
        let changed = self.session.shrink_brush();
        self.render_if(changed)
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.session.undo();
        self.render_if(changed)
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.session.redo();
        self.render_if(changed)
    }

    pub fn clear(&mut self) -> bool {
        let changed = self.session.clear();
        self.render_if(changed)
    }
}
