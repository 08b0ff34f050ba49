//! Zoom, fit and pan arithmetic for the single displayed image.
//!
//! The zoom factor counts content pixels per display pixel, so `1.0` is full
//! resolution and larger values shrink the image. It never drops below `1.0`:
//! the viewer scales down to fit but never magnifies.

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn fits_within(&self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Top-left corner of the displayed image, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Zoom factor that makes `content` fit inside `available`.
///
/// The larger of the two axis ratios wins so the whole image is visible.
/// Content that already fits gives `1.0`.
pub fn fit_factor(content: Size, available: Size) -> f64 {
    if content.fits_within(available) {
        return 1.0;
    }
    let ratio_h = content.height as f64 / available.height.max(1) as f64;
    let ratio_w = content.width as f64 / available.width.max(1) as f64;
    ratio_h.max(ratio_w).max(1.0)
}

/// Displayed size for `content` at `zoom`, and whether the clamp kicked in.
///
/// Each axis is `content / zoom` rounded to the nearest pixel. A result
/// outside `[0, content]` snaps both axes back to the native size.
pub fn scaled_size(content: Size, zoom: f64) -> (Size, bool) {
    let w = (content.width as f64 / zoom).round();
    let h = (content.height as f64 / zoom).round();

    let in_range = |v: f64, max: u32| v.is_finite() && v >= 0.0 && v <= max as f64;
    if in_range(w, content.width) && in_range(h, content.height) {
        (Size::new(w as u32, h as u32), false)
    } else {
        (content, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanGesture {
    pointer_start: (f64, f64),
    origin_start: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    content: Size,
    available: Size,
    zoom: f64,
    step: Option<f64>,
    origin: Point,
    pan: Option<PanGesture>,
}

impl Viewport {
    /// Fit `content` to `available` and center it.
    pub fn fit(content: Size, available: Size) -> Self {
        let zoom = fit_factor(content, available);
        let step = (zoom > 1.0).then(|| zoom / 10.0);
        let mut vp = Self {
            content,
            available,
            zoom,
            step,
            origin: Point::default(),
            pan: None,
        };
        vp.relayout();
        vp
    }

    pub fn content(&self) -> Size {
        self.content
    }

    pub fn available(&self) -> Size {
        self.available
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn step(&self) -> Option<f64> {
        self.step
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn display_size(&self) -> Size {
        scaled_size(self.content, self.zoom).0
    }

    /// Zoom as shown to the user: `1.0` when the display size was clamped.
    pub fn effective_zoom(&self) -> f64 {
        match scaled_size(self.content, self.zoom) {
            (_, true) => 1.0,
            (_, false) => self.zoom,
        }
    }

    pub fn percentage(&self) -> u32 {
        (100.0 / self.effective_zoom()).round() as u32
    }

    pub fn is_full_resolution(&self) -> bool {
        self.zoom == 1.0
    }

    /// Still at the fit factor for the current available size.
    pub fn is_fitted(&self) -> bool {
        self.zoom == fit_factor(self.content, self.available)
    }

    /// Step toward full resolution, or jump there with `to_max`.
    pub fn zoom_in(&mut self, to_max: bool) -> f64 {
        if to_max {
            self.zoom = 1.0;
        } else if let Some(step) = self.step {
            self.zoom = (self.zoom - step).max(1.0);
        } else {
            return self.zoom;
        }
        log::debug!("zoom in -> {:.3}", self.zoom);
        self.relayout();
        self.zoom
    }

    /// Step away from full resolution, or jump to fit with `to_fit`.
    ///
    /// The ceiling is the fit factor for the current available size, so a
    /// window that grew since the image was shown lowers it.
    pub fn zoom_out(&mut self, to_fit: bool) -> f64 {
        let fit = fit_factor(self.content, self.available);
        if to_fit {
            self.zoom = fit;
            if self.step.is_none() && fit > 1.0 {
                self.step = Some(fit / 10.0);
            }
        } else if let Some(step) = self.step {
            self.zoom = (self.zoom + step).min(fit);
        } else {
            return self.zoom;
        }
        log::debug!("zoom out -> {:.3} (fit {:.3})", self.zoom, fit);
        self.relayout();
        self.zoom
    }

    /// Double-click behaviour: full resolution <-> fit.
    pub fn toggle_full_resolution(&mut self) -> f64 {
        if self.is_full_resolution() {
            self.zoom_out(true)
        } else {
            self.zoom_in(true)
        }
    }

    /// The display area changed size; keep the zoom, recenter.
    pub fn resize(&mut self, available: Size) {
        self.available = available;
        self.relayout();
    }

    /// The display area changed and the image should be fitted again.
    pub fn refit(&mut self, available: Size) {
        let step = self.step;
        *self = Self::fit(self.content, available);
        if self.step.is_none() {
            self.step = step;
        }
    }

    pub fn contains(&self, pointer: (f64, f64)) -> bool {
        let size = self.display_size();
        let (x, y) = pointer;
        x >= self.origin.x as f64
            && y >= self.origin.y as f64
            && x < self.origin.x as f64 + size.width as f64
            && y < self.origin.y as f64 + size.height as f64
    }

    /// Start a drag gesture. Ignored unless the pointer is over the image.
    pub fn begin_pan(&mut self, pointer: (f64, f64)) -> bool {
        if !self.contains(pointer) {
            return false;
        }
        self.pan = Some(PanGesture {
            pointer_start: pointer,
            origin_start: self.origin,
        });
        true
    }

    /// Move the image 1:1 with the pointer. No clamping.
    pub fn pan_to(&mut self, pointer: (f64, f64)) -> bool {
        let Some(gesture) = self.pan else {
            return false;
        };
        let dx = (pointer.0 - gesture.pointer_start.0).round() as i32;
        let dy = (pointer.1 - gesture.pointer_start.1).round() as i32;
        self.origin = Point::new(gesture.origin_start.x + dx, gesture.origin_start.y + dy);
        true
    }

    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// `"name - 25% - 4000x3000 (1000x750)"`, dropping the scaled size when
    /// it matches the native one.
    pub fn label(&self, filename: &str) -> String {
        let display = self.display_size();
        if display == self.content {
            format!("{} - {}% - {}", filename, self.percentage(), self.content)
        } else {
            format!(
                "{} - {}% - {} ({})",
                filename,
                self.percentage(),
                self.content,
                display
            )
        }
    }

    fn relayout(&mut self) {
        let display = self.display_size();
        let x = (self.available.width as i64 - display.width as i64) / 2;
        let y = (self.available.height as i64 - display.height as i64) / 2;
        self.origin = Point::new(x as i32, y as i32);
        self.pan = None;
    }
}
