//! Full-redraw render loop.
//!
//! The loop owns a drawing [`Surface`] and a [`Publisher`]. Each call to
//! [`RenderLoop::render`] clears the surface, paints every element with its
//! own stored style, snapshots the result and hands it to the publisher.

use std::rc::Rc;

use thiserror::Error;

use crate::{Element, Point, StrokeStyle};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Snapshot failed: {0}")]
    Snapshot(String),
}

pub trait Surface {
    fn clear(&mut self);
    fn stroke_path(&mut self, points: &[Point], style: &StrokeStyle);
    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle);
    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, style: &StrokeStyle);
    /// Encodes the current bitmap as a transportable image string.
    fn snapshot(&self) -> Result<String, RenderError>;
}

/// Fire-and-forget sink for rendered frames.
pub trait Publisher {
    fn publish(&self, image: String);
}

impl<P: Publisher + ?Sized> Publisher for Rc<P> {
    fn publish(&self, image: String) {
        (**self).publish(image)
    }
}

pub fn draw_element<S: Surface + ?Sized>(surface: &mut S, element: &Element) {
    match element {
        Element::Pencil { path, style, .. } => surface.stroke_path(path, style),
        Element::Line {
            origin,
            delta_x,
            delta_y,
            style,
        } => surface.stroke_line(*origin, origin.offset(*delta_x, *delta_y), style),
        Element::Rectangle {
            origin,
            width,
            height,
            style,
        } => surface.stroke_rect(*origin, *width, *height, style),
    }
}

pub fn redraw<'a, S: Surface + ?Sized>(
    surface: &mut S,
    elements: impl IntoIterator<Item = &'a Element>,
) {
    surface.clear();
    for element in elements {
        draw_element(surface, element);
    }
}

pub struct RenderLoop<S, P> {
    surface: S,
    publisher: P,
    frames: u64,
}

impl<S: Surface, P: Publisher> RenderLoop<S, P> {
    pub fn new(surface: S, publisher: P) -> Self {
        Self {
            surface,
            publisher,
            frames: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of frames published so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render<'a>(
        &mut self,
        elements: impl IntoIterator<Item = &'a Element>,
    ) -> Result<(), RenderError> {
        redraw(&mut self.surface, elements);
        let image = self.surface.snapshot()?;
        self.publisher.publish(image);
        self.frames += 1;
        Ok(())
    }
}
