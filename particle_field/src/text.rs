//! Text formation target: rasterize a string, sample lit pixels, and lift
//! them into a centered 3-D point cloud.

use glam::Vec3;
use rand::Rng;

use crate::math::noise;

/// Off-screen raster size the text is drawn into.
pub const RASTER_W: usize = 1000;
pub const RASTER_H: usize = 250;

/// Sample every Nth pixel on both axes.
const SAMPLE_STRIDE: usize = 2;
/// Raster pixel → world unit scale.
const WORLD_SCALE:   f32 = 0.9;
/// Half-width of the random depth band.
const DEPTH_JITTER:  f32 = 10.0;
const ALPHA_CUTOFF:  u8 = 128;

// ════════════════════════════════════════════════════════════════════════════
// TextRaster: "draw string S into a pixel buffer"
// ════════════════════════════════════════════════════════════════════════════

/// Renders a string into an 8-bit alpha buffer (`width * height`, row-major).
pub trait TextRaster {
    fn rasterize(&self, text: &str, width: usize, height: usize) -> Vec<u8>;
}

/// Built-in 3×5 bitmap font, scaled up and centered.
///
/// Characters past the raster edges are clipped, the way a canvas would.
#[derive(Clone, Copy, Debug)]
pub struct BitmapFont {
    /// Pixels per font cell; glyphs are `3*scale` × `5*scale`.
    pub scale: usize,
}

impl Default for BitmapFont {
    fn default() -> Self {
        // 5 rows × 14 px ≈ a 70 px bold face
        BitmapFont { scale: 14 }
    }
}

impl BitmapFont {
    fn advance(&self) -> usize { 4 * self.scale }
}

impl TextRaster for BitmapFont {
    fn rasterize(&self, text: &str, width: usize, height: usize) -> Vec<u8> {
        let mut buf = vec![0u8; width * height];
        let n = text.chars().count();
        if n == 0 {
            return buf;
        }

        let s = self.scale as isize;
        let text_w = (n * self.advance() - self.scale) as isize;
        let x0 = (width as isize - text_w) / 2;
        let y0 = (height as isize - 5 * s) / 2;

        for (ci, ch) in text.chars().enumerate() {
            let gx = x0 + (ci * self.advance()) as isize;
            for (row, &bits) in glyph(ch).iter().enumerate() {
                for col in 0..3isize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    for py in 0..s {
                        for px in 0..s {
                            let x = gx + col * s + px;
                            let y = y0 + row as isize * s + py;
                            if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                                buf[y as usize * width + x as usize] = 0xFF;
                            }
                        }
                    }
                }
            }
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TextCloud
// ════════════════════════════════════════════════════════════════════════════

/// Ordered point cloud sampled from rasterized text.  Rebuilt wholesale on
/// every text change.
#[derive(Clone, Debug, Default)]
pub struct TextCloud {
    text:   String,
    points: Vec<Vec3>,
}

impl TextCloud {
    pub fn generate<R: Rng + ?Sized>(text: &str, raster: &dyn TextRaster, rng: &mut R) -> Self {
        let alpha = raster.rasterize(text, RASTER_W, RASTER_H);
        let salt: f32 = rng.random_range(0.0..1000.0);

        let mut points = Vec::new();
        for y in (0..RASTER_H).step_by(SAMPLE_STRIDE) {
            for x in (0..RASTER_W).step_by(SAMPLE_STRIDE) {
                if alpha[y * RASTER_W + x] <= ALPHA_CUTOFF { continue; }
                let px = (x as f32 - RASTER_W as f32 / 2.0) * WORLD_SCALE;
                let py = -(y as f32 - RASTER_H as f32 / 2.0) * WORLD_SCALE;
                let pz = noise(px, py, salt) * DEPTH_JITTER;
                points.push(Vec3::new(px, py, pz));
            }
        }
        log::debug!("text cloud for {:?}: {} points", text, points.len());
        TextCloud { text: text.to_string(), points }
    }

    /// A cloud over explicit points, bypassing rasterization.
    pub fn from_points(text: &str, points: Vec<Vec3>) -> Self {
        TextCloud { text: text.to_string(), points }
    }

    pub fn text(&self)     -> &str   { &self.text }
    pub fn points(&self)   -> &[Vec3] { &self.points }
    pub fn len(&self)      -> usize  { self.points.len() }
    pub fn is_empty(&self) -> bool   { self.points.is_empty() }

    /// Target for particle `index`; particles wrap around the cloud.
    pub fn point_for(&self, index: usize) -> Option<Vec3> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.points[index % self.points.len()])
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Glyph rows, top to bottom, 3 bits each (MSB = left column).
pub fn glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
