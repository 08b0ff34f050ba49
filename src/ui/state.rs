use std::time::{Duration, Instant};
use winit::keyboard::{Key, NamedKey};

use crate::catalog::{Direction, FileCatalog};
use crate::cli::{AppInfo, HELP_KEYS, Options};
use crate::error::CatalogError;
use crate::loader::decode_image;
use crate::slideshow::Slideshow;
use crate::ui::render::{ERROR_RED, Frame, WHITE};
use crate::viewport::{Size, Viewport};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const DOUBLE_CLICK_SLOP: f64 = 4.0;
const TEXT_SCALE: u32 = 2;

// ---------------------------------------------------------------------------
// Input translation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Navigate(Direction),
    ZoomIn { to_max: bool },
    ZoomOut { to_fit: bool },
    ToggleFullscreen,
    ToggleSlideshow,
    ToggleHelp,
    ToggleInfo,
    Escape,
}

/// What the window layer has to do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    Redraw,
    SetFullscreen(bool),
    Quit,
}

pub fn action_for_key(key: &Key, ctrl: bool) -> Option<Action> {
    match key {
        Key::Named(named) => match named {
            NamedKey::Escape => Some(Action::Escape),
            NamedKey::ArrowRight | NamedKey::ArrowDown => Some(Action::Navigate(Direction::Next)),
            NamedKey::ArrowLeft | NamedKey::ArrowUp => Some(Action::Navigate(Direction::Previous)),
            NamedKey::Home => Some(Action::Navigate(Direction::First)),
            NamedKey::End => Some(Action::Navigate(Direction::Last)),
            NamedKey::F11 => Some(Action::ToggleFullscreen),
            NamedKey::F5 => Some(Action::ToggleSlideshow),
            _ => None,
        },
        Key::Character(s) => match s.as_str() {
            "+" | "=" => Some(Action::ZoomIn { to_max: ctrl }),
            "-" => Some(Action::ZoomOut { to_fit: ctrl }),
            "f" | "F" => Some(Action::ToggleFullscreen),
            "s" | "S" => Some(Action::ToggleSlideshow),
            "?" => Some(Action::ToggleHelp),
            "i" | "I" => Some(Action::ToggleInfo),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

pub struct ViewerState {
    info: AppInfo,
    catalog: FileCatalog,
    /// Layout of the current entry's image; `None` while nothing is shown.
    viewport: Option<Viewport>,
    slideshow: Slideshow,
    surface: Size,
    /// Shown in the title until the first image is up.
    target: String,
    /// Catalog problems drawn over the first screen until the user navigates.
    notices: Vec<String>,

    pub is_fullscreen: bool,
    /// Set by a fullscreen toggle so the resize it causes refits the image.
    refit_on_resize: bool,
    pub show_help: bool,
    pub show_info: bool,

    pub mouse_pos: (f64, f64),
    last_press: Option<(Instant, (f64, f64))>,
}

impl ViewerState {
    pub fn new(
        info: AppInfo,
        catalog: FileCatalog,
        issues: &[CatalogError],
        options: &Options,
    ) -> Self {
        Self {
            info,
            catalog,
            viewport: None,
            slideshow: Slideshow::new(options.interval),
            surface: Size::new(1, 1),
            target: options.target().display().to_string(),
            notices: issues.iter().map(ToString::to_string).collect(),
            is_fullscreen: false,
            refit_on_resize: false,
            show_help: false,
            show_info: false,
            mouse_pos: (0.0, 0.0),
            last_press: None,
        }
    }

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn slideshow(&self) -> &Slideshow {
        &self.slideshow
    }

    pub fn surface(&self) -> Size {
        self.surface
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Make sure the current entry is decoded, lay it out, then free the
    /// entry we navigated away from.
    pub fn show_current(&mut self) {
        self.viewport = None;
        let surface = self.surface;

        if let Some(entry) = self.catalog.current_mut() {
            if entry.image.is_none() {
                match decode_image(entry.full_path()) {
                    Ok(img) => {
                        entry.image = Some(img);
                        entry.load_error = None;
                    }
                    Err(e) => {
                        log::error!("Could not load {:?}: {}", entry.full_path(), e);
                        entry.load_error = Some(e.to_string());
                    }
                }
            }
            self.viewport = entry
                .image
                .as_ref()
                .map(|img| Viewport::fit(img.size(), surface));
        }

        if let Some(stale) = self.catalog.take_pending_release() {
            self.catalog.release(stale);
        }
    }

    pub fn go(&mut self, direction: Direction) -> bool {
        if self.catalog.advance(direction).is_none() {
            return false;
        }
        self.notices.clear();
        self.show_current();
        true
    }

    pub fn apply(&mut self, action: Action, now: Instant) -> Command {
        match action {
            Action::Navigate(direction) => {
                if self.go(direction) {
                    Command::Redraw
                } else {
                    Command::None
                }
            }
            Action::ZoomIn { to_max } => self.with_viewport(|vp| {
                vp.zoom_in(to_max);
            }),
            Action::ZoomOut { to_fit } => self.with_viewport(|vp| {
                vp.zoom_out(to_fit);
            }),
            Action::ToggleFullscreen => Command::SetFullscreen(self.toggle_fullscreen()),
            Action::ToggleSlideshow => {
                self.slideshow.toggle(now);
                Command::Redraw
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                Command::Redraw
            }
            Action::ToggleInfo => {
                self.show_info = !self.show_info;
                Command::Redraw
            }
            Action::Escape => {
                if self.slideshow.is_running() {
                    self.slideshow.stop();
                    Command::Redraw
                } else if self.is_fullscreen {
                    Command::SetFullscreen(self.toggle_fullscreen())
                } else {
                    Command::Quit
                }
            }
        }
    }

    fn with_viewport(&mut self, f: impl FnOnce(&mut Viewport)) -> Command {
        match self.viewport.as_mut() {
            Some(vp) => {
                f(vp);
                // an explicit zoom outranks a pending fullscreen refit
                self.refit_on_resize = false;
                Command::Redraw
            }
            None => Command::None,
        }
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.is_fullscreen = !self.is_fullscreen;
        self.refit_on_resize = true;
        self.is_fullscreen
    }

    pub fn start_slideshow(&mut self, now: Instant) {
        self.slideshow.start(now);
    }

    /// Advance when the slideshow interval elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.slideshow.poll(now) && self.go(Direction::Next)
    }

    /// The surface changed size. Minimized (zero) sizes are ignored.
    ///
    /// An image the user has not zoomed stays fitted, so a window that is
    /// maximized after the first image went up still fills the new area.
    pub fn resize(&mut self, size: Size) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface = size;
        let refit = std::mem::take(&mut self.refit_on_resize);
        if let Some(vp) = self.viewport.as_mut() {
            if refit || vp.is_fitted() {
                vp.refit(size);
            } else {
                vp.resize(size);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pointer
    // -----------------------------------------------------------------------

    /// Left button down: a second press in quick succession toggles full
    /// resolution, otherwise a drag starts if the pointer is on the image.
    pub fn pointer_pressed(&mut self, now: Instant) -> bool {
        let pos = self.mouse_pos;
        let Some(vp) = self.viewport.as_mut() else {
            return false;
        };
        if !vp.contains(pos) {
            self.last_press = None;
            return false;
        }

        let double = self.last_press.is_some_and(|(at, p)| {
            now.duration_since(at) <= DOUBLE_CLICK
                && (p.0 - pos.0).abs() <= DOUBLE_CLICK_SLOP
                && (p.1 - pos.1).abs() <= DOUBLE_CLICK_SLOP
        });
        if double {
            self.last_press = None;
            self.refit_on_resize = false;
            vp.toggle_full_resolution();
        } else {
            self.last_press = Some((now, pos));
            vp.begin_pan(pos);
        }
        true
    }

    pub fn pointer_moved(&mut self, pos: (f64, f64)) -> bool {
        self.mouse_pos = pos;
        self.viewport.as_mut().is_some_and(|vp| vp.pan_to(pos))
    }

    pub fn pointer_released(&mut self) {
        if let Some(vp) = self.viewport.as_mut() {
            vp.end_pan();
        }
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    pub fn title(&self) -> String {
        let name = self.info.name;
        match (self.catalog.current(), &self.viewport) {
            (Some(entry), Some(vp)) => format!("{} - {}", vp.label(entry.filename()), name),
            (Some(entry), None) if entry.load_error.is_some() => {
                format!("{} - {}", entry.filename(), name)
            }
            _ => format!("{} - {}", self.target, name),
        }
    }

    pub fn backdrop(&self) -> [u8; 3] {
        self.catalog
            .current()
            .and_then(|e| e.image.as_ref())
            .map(|img| img.backdrop)
            .unwrap_or([0, 0, 0])
    }

    pub fn render(&self, frame: &mut Frame) {
        frame.clear(self.backdrop());

        match self.catalog.current() {
            Some(entry) => match (&entry.image, &self.viewport) {
                (Some(img), Some(vp)) => frame.blit_scaled(img, vp.origin(), vp.display_size()),
                _ if entry.load_error.is_some() => {
                    let msg = format!("Error loading {}", entry.filename());
                    frame.draw_text_centered(&msg, TEXT_SCALE, ERROR_RED);
                }
                _ => {}
            },
            None => frame.draw_text_centered("No files", TEXT_SCALE, WHITE),
        }

        if !self.notices.is_empty() {
            self.render_notices(frame);
        }

        if self.show_info {
            self.render_info(frame);
        }

        if self.show_help {
            let size = frame.size();
            frame.fill_rect(0, 0, size.width, size.height, (0, 0, 0, 200));
            let line_h = (Frame::text_height(TEXT_SCALE) + 10) as i32;
            for (i, line) in HELP_KEYS.lines().enumerate() {
                frame.draw_text(line, 20, 20 + i as i32 * line_h, TEXT_SCALE, WHITE);
            }
        }
    }
}

impl ViewerState {
    /// Position, path and format line drawn across the top.
    pub fn info_lines(&self) -> Option<[String; 2]> {
        let entry = self.catalog.current()?;
        let position = format!(
            "[{}/{}] {}",
            self.catalog.current_index().map_or(0, |i| i + 1),
            self.catalog.len(),
            entry.full_path().display()
        );
        let details = match (&entry.image, &self.viewport) {
            (Some(img), Some(vp)) => format!(
                "{} | {} | {:.1} KB | zoom {}%",
                img.size(),
                img.format_name,
                img.file_size as f64 / 1024.0,
                vp.percentage()
            ),
            _ => entry.load_error.clone().unwrap_or_default(),
        };
        Some([position, details])
    }

    /// One red line per catalog problem, stacked at the bottom.
    fn render_notices(&self, frame: &mut Frame) {
        let size = frame.size();
        let line_h = (Frame::text_height(TEXT_SCALE) + 4) as i32;
        let band_h = line_h * self.notices.len() as i32 + 8;
        let top = size.height as i32 - band_h;
        frame.fill_rect(0, top, size.width, band_h as u32, (0, 0, 0, 178));
        for (i, line) in self.notices.iter().enumerate() {
            frame.draw_text(line, 10, top + 4 + i as i32 * line_h, TEXT_SCALE, ERROR_RED);
        }
    }

    fn render_info(&self, frame: &mut Frame) {
        let Some(lines) = self.info_lines() else {
            return;
        };
        let line_h = (Frame::text_height(TEXT_SCALE) + 4) as i32;
        let width = frame.size().width;
        frame.fill_rect(0, 0, width, (line_h * 2 + 8) as u32, (0, 0, 0, 178));
        for (i, line) in lines.iter().enumerate() {
            frame.draw_text(line, 10, 4 + i as i32 * line_h, TEXT_SCALE, WHITE);
        }
    }
}
