//! Pointer gesture state machine.

use crate::{Element, Point, StrokeStyle, Tool};

#[derive(Clone, Debug, Default)]
pub enum DrawMode {
    #[default]
    Idle,
    Drawing { element: Element },
}

#[derive(Clone, Debug, Default)]
pub struct Controller {
    mode: DrawMode,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &DrawMode {
        &self.mode
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, DrawMode::Drawing { .. })
    }

    /// The element receiving updates from the active gesture.
    pub fn in_progress(&self) -> Option<&Element> {
        match &self.mode {
            DrawMode::Drawing { element } => Some(element),
            DrawMode::Idle => None,
        }
    }

    /// Starts a gesture. Returns `false` and leaves the current gesture
    /// alone if one is already running.
    pub fn pointer_down(&mut self, tool: Tool, point: Point, style: StrokeStyle) -> bool {
        if self.is_drawing() {
            log::debug!("pointer down at {point:?} ignored: gesture already active");
            return false;
        }
        self.mode = DrawMode::Drawing {
            element: Element::begin(tool, point, style),
        };
        true
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        match std::mem::take(&mut self.mode) {
            DrawMode::Drawing { element } => {
                self.mode = DrawMode::Drawing {
                    element: element.extend(point),
                };
                true
            }
            DrawMode::Idle => false,
        }
    }

    /// Ends the gesture and hands back the finished element.
    pub fn pointer_up(&mut self) -> Option<Element> {
        match std::mem::take(&mut self.mode) {
            DrawMode::Drawing { element } => Some(element),
            DrawMode::Idle => None,
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.pointer_up().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let controller = Controller::new();
        assert!(!controller.is_drawing());
        assert!(controller.in_progress().is_none());
    }

    #[test]
    fn move_while_idle_is_a_noop() {
        let mut controller = Controller::new();
        assert!(!controller.pointer_move(Point::new(1.0, 1.0)));
        assert!(matches!(controller.mode(), DrawMode::Idle));
    }

    #[test]
    fn full_gesture_yields_element() {
        let mut controller = Controller::new();
        assert!(controller.pointer_down(Tool::Line, Point::new(0.0, 0.0), StrokeStyle::default()));
        assert!(controller.pointer_move(Point::new(3.0, 4.0)));
        assert!(controller.in_progress().is_some());

        let element = controller.pointer_up().unwrap();
        assert_eq!(element.tool(), Tool::Line);
        assert!(!controller.is_drawing());
    }

    #[test]
    fn pointer_up_is_idempotent() {
        let mut controller = Controller::new();
        controller.pointer_down(Tool::Pencil, Point::new(0.0, 0.0), StrokeStyle::default());
        assert!(controller.pointer_up().is_some());
        assert!(controller.pointer_up().is_none());
        assert!(controller.pointer_up().is_none());
    }

    #[test]
    fn second_pointer_down_is_ignored() {
        let mut controller = Controller::new();
        controller.pointer_down(Tool::Pencil, Point::new(1.0, 1.0), StrokeStyle::default());
        assert!(!controller.pointer_down(
            Tool::Rectangle,
            Point::new(9.0, 9.0),
            StrokeStyle::default()
        ));
        let element = controller.in_progress().unwrap();
        assert_eq!(element.tool(), Tool::Pencil);
        assert_eq!(element.origin(), Point::new(1.0, 1.0));
    }

    #[test]
    fn cancel_drops_in_progress_element() {
        let mut controller = Controller::new();
        assert!(!controller.cancel());
        controller.pointer_down(Tool::Pencil, Point::new(1.0, 1.0), StrokeStyle::default());
        assert!(controller.cancel());
        assert!(controller.in_progress().is_none());
    }
}
