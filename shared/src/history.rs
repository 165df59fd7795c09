use crate::Element;

/// What `clear` does with the redo stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClearPolicy {
    /// Leave `undone` untouched, so `redo` can bring back elements undone
    /// before the clear.
    #[default]
    KeepRedo,
    /// Empty `undone` together with `elements`.
    DiscardRedo,
}

/// Committed elements in z-order plus the elements moved out by undo.
#[derive(Clone, Debug, Default)]
pub struct History {
    elements: Vec<Element>,
    undone: Vec<Element>,
    clear_policy: ClearPolicy,
}

impl History {
    pub fn new(clear_policy: ClearPolicy) -> Self {
        Self {
            elements: Vec::new(),
            undone: Vec::new(),
            clear_policy,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn undone(&self) -> &[Element] {
        &self.undone
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn can_undo(&self) -> bool {
        !self.elements.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        match self.elements.pop() {
            Some(element) => {
                self.undone.push(element);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(element) => {
                self.elements.push(element);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        if self.clear_policy == ClearPolicy::DiscardRedo {
            self.undone.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, StrokeStyle, Tool};

    fn rect(x: f64) -> Element {
        Element::begin(Tool::Rectangle, Point::new(x, x), StrokeStyle::default())
            .extend(Point::new(x + 10.0, x + 5.0))
    }

    #[test]
    fn undo_then_redo_restores_order_and_content() {
        let mut history = History::default();
        history.push(rect(0.0));
        history.push(rect(1.0));
        let before = history.elements().to_vec();

        assert!(history.undo());
        assert_eq!(history.elements().len(), 1);
        assert_eq!(history.undone().len(), 1);

        assert!(history.redo());
        assert_eq!(history.elements(), before.as_slice());
        assert!(history.undone().is_empty());
    }

    #[test]
    fn undo_and_redo_are_noops_when_empty() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(!history.undo());
        assert!(!history.can_redo());
        assert!(!history.redo());
    }

    #[test]
    fn clear_keeps_redo_by_default() {
        let mut history = History::default();
        history.push(rect(0.0));
        history.push(rect(1.0));
        history.undo();
        history.clear();

        assert!(history.elements().is_empty());
        assert!(!history.can_undo());
        assert!(history.can_redo());
        assert!(history.redo());
        assert_eq!(history.elements(), &[rect(1.0)]);
    }

    #[test]
    fn clear_can_discard_redo() {
        let mut history = History::new(ClearPolicy::DiscardRedo);
        history.push(rect(0.0));
        history.undo();
        history.clear();
        assert!(!history.can_redo());
    }
}
