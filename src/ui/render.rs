use crate::loader::DecodedImage;
use crate::viewport::{Point, Size};

pub type Rgba = (u8, u8, u8, u8);

pub const WHITE: Rgba = (255, 255, 255, 255);
pub const ERROR_RED: Rgba = (255, 80, 80, 255);

/// 5x7 glyphs for ASCII 32..=127, one byte per column, LSB is the top row.
const GLYPHS: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14],
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00],
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08],
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02],
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31],
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03],
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00],
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06],
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], [0x7E, 0x11, 0x11, 0x11, 0x7E], [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22],
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A],
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41],
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31],
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F],
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00],
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40],
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20],
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E],
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00],
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38],
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20],
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C],
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00],
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], [0x10, 0x08, 0x08, 0x10, 0x08], [0x00, 0x00, 0x00, 0x00, 0x00],
];

const GLYPH_ADVANCE: u32 = 6;
const GLYPH_HEIGHT: u32 = 7;

/// Pack RGB into softbuffer's 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn blend(dst: u32, (r, g, b, a): Rgba) -> u32 {
    if a == 255 {
        return rgb(r, g, b);
    }
    let a = a as u32;
    let mix = |src: u8, shift: u32| {
        let d = (dst >> shift) & 0xFF;
        ((src as u32 * a + d * (255 - a)) / 255) as u8
    };
    rgb(mix(r, 16), mix(g, 8), mix(b, 0))
}

/// Borrowed softbuffer frame with clipped drawing primitives.
pub struct Frame<'a> {
    buf: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(buf: &'a mut [u32], width: u32, height: u32) -> Self {
        debug_assert!(buf.len() >= (width * height) as usize);
        Self { buf, width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn clear(&mut self, color: [u8; 3]) {
        self.buf.fill(rgb(color[0], color[1], color[2]));
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let off = y as usize * self.width as usize + x as usize;
        self.buf[off] = blend(self.buf[off], color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba) {
        let x0 = (x as i64).max(0);
        let y0 = (y as i64).max(0);
        let x1 = (x as i64 + w as i64).min(self.width as i64);
        let y1 = (y as i64 + h as i64).min(self.height as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color);
            }
        }
    }

    /// Draw `text` with its top-left at (x, y). Returns the x after the last glyph.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: u32, color: Rgba) -> i32 {
        let mut cx = x as i64;
        for ch in text.chars() {
            let idx = (ch as u32).wrapping_sub(32) as usize;
            if let Some(glyph) = GLYPHS.get(idx) {
                for (col, bits) in glyph.iter().enumerate() {
                    for row in 0..GLYPH_HEIGHT {
                        if bits & (1 << row) == 0 {
                            continue;
                        }
                        let gx = cx + (col as u32 * scale) as i64;
                        let gy = y as i64 + (row * scale) as i64;
                        for sy in 0..scale as i64 {
                            for sx in 0..scale as i64 {
                                self.put(gx + sx, gy + sy, color);
                            }
                        }
                    }
                }
            }
            cx += (GLYPH_ADVANCE * scale) as i64;
        }
        cx as i32
    }

    pub fn text_width(text: &str, scale: u32) -> u32 {
        text.chars().count() as u32 * GLYPH_ADVANCE * scale
    }

    pub fn text_height(scale: u32) -> u32 {
        GLYPH_HEIGHT * scale
    }

    /// Draw `text` centered on the frame.
    pub fn draw_text_centered(&mut self, text: &str, scale: u32, color: Rgba) {
        let x = (self.width as i64 - Self::text_width(text, scale) as i64) / 2;
        let y = (self.height as i64 - Self::text_height(scale) as i64) / 2;
        self.draw_text(text, x as i32, y as i32, scale, color);
    }

    /// Nearest-neighbour scale of `img` into the rectangle at `origin` with
    /// `size`. Parts outside the frame are skipped.
    pub fn blit_scaled(&mut self, img: &DecodedImage, origin: Point, size: Size) {
        if size.width == 0 || size.height == 0 || img.width == 0 || img.height == 0 {
            return;
        }
        let (ox, oy) = (origin.x as i64, origin.y as i64);
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + size.width as i64).min(self.width as i64);
        let y1 = (oy + size.height as i64).min(self.height as i64);

        for dy in y0..y1 {
            let sy = ((dy - oy) as u64 * img.height as u64 / size.height as u64) as usize;
            let row = sy * img.width as usize;
            for dx in x0..x1 {
                let sx = ((dx - ox) as u64 * img.width as u64 / size.width as u64) as usize;
                let si = (row + sx) * 4;
                let px = &img.rgba_bytes[si..si + 4];
                if px[3] == 0 {
                    continue;
                }
                self.put(dx, dy, (px[0], px[1], px[2], px[3]));
            }
        }
    }
}
