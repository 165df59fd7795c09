//! Session-level drawing state: tool settings, history and the active gesture.
//!
//! Every mutating method returns `true` when the canvas needs a redraw, so
//! the shell can run the render loop synchronously after each event.

use crate::element::{sanitize_color, sanitize_width, DEFAULT_BRUSH_WIDTH, DEFAULT_COLOR};
use crate::{ClearPolicy, Controller, Element, History, Point, StrokeStyle, Tool};

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub tool: Tool,
    pub color: String,
    pub brush_width: u32,
    pub clear_policy: ClearPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            color: DEFAULT_COLOR.to_string(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            clear_policy: ClearPolicy::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    tool: Tool,
    color: String,
    brush_width: u32,
    history: History,
    controller: Controller,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            tool: config.tool,
            color: sanitize_color(config.color),
            brush_width: sanitize_width(config.brush_width),
            history: History::new(config.clear_policy),
            controller: Controller::new(),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn brush_width(&self) -> u32 {
        self.brush_width
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_drawing(&self) -> bool {
        self.controller.is_drawing()
    }

    /// Committed elements followed by the in-progress one, in paint order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.history
            .elements()
            .iter()
            .chain(self.controller.in_progress())
    }

    pub fn style(&self) -> StrokeStyle {
        StrokeStyle::new(self.color.clone(), self.brush_width)
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = sanitize_color(color.into());
    }

    pub fn set_brush_width(&mut self, width: u32) -> bool {
        let width = sanitize_width(width);
        let changed = width != self.brush_width;
        self.brush_width = width;
        changed
    }

    pub fn grow_brush(&mut self) -> bool {
        self.set_brush_width(self.brush_width.saturating_add(1))
    }

    pub fn shrink_brush(&mut self) -> bool {
        self.set_brush_width(self.brush_width.saturating_sub(1))
    }

    pub fn pointer_down(&mut self, point: Point) -> bool {
        let style = self.style();
        self.controller.pointer_down(self.tool, point, style)
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        self.controller.pointer_move(point)
    }

    /// Commits the active gesture's element. Returns `true` if a gesture was
    /// finished; the element is already on screen, so no redraw is needed.
    pub fn pointer_up(&mut self) -> bool {
        match self.controller.pointer_up() {
            Some(element) => {
                self.history.push(element);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.is_drawing() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_drawing() && self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.can_undo() && self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.can_redo() && self.history.redo()
    }

    pub fn clear(&mut self) -> bool {
        self.controller.cancel();
        self.history.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(session: &mut Session, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        session.pointer_down(Point::new(first.0, first.1));
        for (x, y) in rest {
            session.pointer_move(Point::new(*x, *y));
        }
        session.pointer_up();
    }

    #[test]
    fn pencil_scenario() {
        let mut session = Session::default();
        gesture(&mut session, &[(10.0, 10.0), (12.0, 11.0), (15.0, 9.0)]);

        let elements = session.history().elements();
        assert_eq!(elements.len(), 1);
        match &elements[0] {
            Element::Pencil { path, .. } => assert_eq!(
                path,
                &vec![
                    Point::new(10.0, 10.0),
                    Point::new(12.0, 11.0),
                    Point::new(15.0, 9.0)
                ]
            ),
            other => panic!("expected pencil, got {other:?}"),
        }
    }

    #[test]
    fn rectangle_scenario() {
        let mut session = Session::default();
        session.set_tool(Tool::Rectangle);
        gesture(&mut session, &[(0.0, 0.0), (50.0, 40.0)]);

        match &session.history().elements()[0] {
            Element::Rectangle {
                origin,
                width,
                height,
                ..
            } => {
                assert_eq!(*origin, Point::new(0.0, 0.0));
                assert_eq!(*width, 50.0);
                assert_eq!(*height, 40.0);
            }
            other => panic!("expected rectangle, got {other:?}"),
        }
    }

    #[test]
    fn committed_count_matches_completed_gestures() {
        let mut session = Session::default();
        session.pointer_move(Point::new(1.0, 1.0));
        session.pointer_up();
        gesture(&mut session, &[(0.0, 0.0), (1.0, 1.0)]);
        session.set_tool(Tool::Line);
        gesture(&mut session, &[(2.0, 2.0)]);

        session.pointer_down(Point::new(5.0, 5.0));
        session.pointer_down(Point::new(6.0, 6.0));
        session.pointer_move(Point::new(7.0, 7.0));
        assert_eq!(session.history().elements().len(), 2);
        assert_eq!(session.elements().count(), 3);

        session.pointer_up();
        session.pointer_up();
        assert_eq!(session.history().elements().len(), 3);
    }

    #[test]
    fn brush_changes_do_not_restyle_committed_elements() {
        let mut session = Session::default();
        session.set_brush_width(4);
        gesture(&mut session, &[(0.0, 0.0), (1.0, 1.0)]);
        session.set_brush_width(9);
        session.set_color("#ff0000");
        gesture(&mut session, &[(3.0, 3.0), (4.0, 4.0)]);

        let widths: Vec<u32> = session.elements().map(|e| e.style().width).collect();
        assert_eq!(widths, vec![4, 9]);
        assert_eq!(session.history().elements()[0].style().color, "#000000");
    }

    #[test]
    fn brush_width_floors_at_one() {
        let mut session = Session::default();
        assert!(session.shrink_brush());
        assert_eq!(session.brush_width(), 1);
        assert!(!session.shrink_brush());
        assert_eq!(session.brush_width(), 1);
        assert!(session.grow_brush());
        assert_eq!(session.brush_width(), 2);
        session.set_brush_width(0);
        assert_eq!(session.brush_width(), 1);
    }

    #[test]
    fn undo_redo_scenario() {
        let mut session = Session::default();
        gesture(&mut session, &[(0.0, 0.0), (1.0, 1.0)]);
        session.set_tool(Tool::Rectangle);
        gesture(&mut session, &[(5.0, 5.0), (8.0, 9.0)]);
        let before = session.history().elements().to_vec();

        assert!(session.undo());
        assert_eq!(session.history().elements().len(), 1);
        assert_eq!(session.history().undone().len(), 1);

        assert!(session.redo());
        assert_eq!(session.history().elements(), before.as_slice());
        assert!(session.history().undone().is_empty());
    }

    #[test]
    fn undo_after_clear_is_disabled() {
        let mut session = Session::default();
        gesture(&mut session, &[(0.0, 0.0), (1.0, 1.0)]);
        session.clear();
        assert_eq!(session.elements().count(), 0);
        assert!(!session.can_undo());
        assert!(!session.undo());
    }

    #[test]
    fn clear_drops_active_gesture() {
        let mut session = Session::default();
        session.pointer_down(Point::new(0.0, 0.0));
        session.clear();
        assert!(!session.is_drawing());
        assert!(!session.pointer_up());
        assert_eq!(session.elements().count(), 0);
    }

    #[test]
    fn history_is_locked_while_drawing() {
        let mut session = Session::default();
        gesture(&mut session, &[(0.0, 0.0), (1.0, 1.0)]);
        session.pointer_down(Point::new(2.0, 2.0));
        assert!(!session.can_undo());
        assert!(!session.undo());
        session.pointer_up();
        assert!(session.undo());
    }
}
