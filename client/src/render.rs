use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlImageElement};

use inkroom_shared::{Point, RenderError, StrokeStyle, Surface};

/// Counter shared with pending remote-frame loads. Every remote frame and
/// every local clear advances it; a decoded image is only painted if no newer
/// frame has started since.
#[derive(Clone, Debug, Default)]
struct FrameGeneration(Rc<Cell<u64>>);

impl FrameGeneration {
    fn advance(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    fn is_current(&self, frame: u64) -> bool {
        self.0.get() == frame
    }
}

/// Canvas-backed drawing surface. Coordinates are CSS pixels; the backing
/// store is scaled by the device pixel ratio in [`CanvasSurface::resize`].
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    generation: FrameGeneration,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut surface = Self {
            canvas,
            ctx,
            width: 0.0,
            height: 0.0,
            generation: FrameGeneration::default(),
        };
        surface.apply_pen_defaults();
        Ok(surface)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Matches the backing store to the element's layout size.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        self.canvas.set_width((css_width * dpr) as u32);
        self.canvas.set_height((css_height * dpr) as u32);
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        self.width = css_width;
        self.height = css_height;
        self.apply_pen_defaults();
        log::debug!("Canvas resized to {css_width}x{css_height} @ {dpr}");
    }

    fn apply_pen_defaults(&mut self) {
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }

    fn apply_style(&self, style: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&style.color);
        self.ctx.set_line_width(f64::from(style.width));
    }

    /// Replaces the view with a frame received from a peer. The image
    /// decodes asynchronously; it is dropped if a newer remote frame or a
    /// local render started before it finished loading.
    pub fn paint_remote_frame(&self, image: &str) -> Result<(), JsValue> {
        let frame = self.generation.advance();
        let generation = self.generation.clone();
        let ctx = self.ctx.clone();
        let (width, height) = (self.width, self.height);
        let onload = Closure::once_into_js(move |event: Event| {
            if !generation.is_current(frame) {
                log::debug!("Dropping stale remote frame {frame}");
                return;
            }
            let Some(img) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlImageElement>().ok())
            else {
                return;
            };
            ctx.clear_rect(0.0, 0.0, width, height);
            if let Err(err) =
                ctx.draw_image_with_html_image_element_and_dw_and_dh(&img, 0.0, 0.0, width, height)
            {
                log::error!("Failed to paint remote frame: {err:?}");
            }
        });
        let img = HtmlImageElement::new()?;
        img.set_onload(Some(onload.unchecked_ref()));
        img.set_src(image);
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.generation.advance();
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn stroke_path(&mut self, points: &[Point], style: &StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.apply_style(style);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        if rest.is_empty() {
            self.ctx.line_to(first.x, first.y);
        }
        for point in rest {
            self.ctx.line_to(point.x, point.y);
        }
        self.ctx.stroke();
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.apply_style(style);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, style: &StrokeStyle) {
        self.apply_style(style);
        self.ctx.stroke_rect(origin.x, origin.y, width, height);
    }

    fn snapshot(&self) -> Result<String, RenderError> {
        self.canvas
            .to_data_url()
            .map_err(|err| RenderError::Snapshot(format!("{err:?}")))
    }
}
