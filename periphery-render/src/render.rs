use crate::metrics::ScreenMetrics;
use ab_glyph::{point, Font, FontVec, GlyphId, Point, PxScale, ScaleFont};
use anyhow::{anyhow, bail, Result};
use periphery_core::{Rgba, Scene, TextItem};
use periphery_timing::Timer;
use std::collections::HashMap;
use std::time::Duration;
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

#[derive(Clone)]
struct CachedGlyph {
    bitmap: Vec<u8>,
    width: u32,
    height: u32,
    bearing_x: i32,
    bearing_y: i32,
}

#[derive(Hash, Eq, PartialEq, Clone, Copy)]
struct GlyphCacheKey {
    glyph_id: u16,
    scale_bits: u32, // f32 bits for exact scale matching
}

#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub glyphs: usize,
}

/// Software renderer for text scenes laid out in screen centimeters.
pub struct SkiaRenderer {
    metrics: ScreenMetrics,
    monitor_width_cm: f64,
    font: FontVec,
    glyph_cache: HashMap<GlyphCacheKey, CachedGlyph>,
    canvas: Pixmap,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, monitor_width_cm: f64, font_bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(font_bytes).map_err(|e| anyhow!("invalid font: {e}"))?;
        let canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate a {width}×{height} canvas"))?;
        Ok(Self {
            metrics: ScreenMetrics::new(width, height, monitor_width_cm),
            monitor_width_cm,
            font,
            glyph_cache: HashMap::with_capacity(256),
            canvas,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate a {width}×{height} canvas"))?;
        self.metrics = ScreenMetrics::new(width, height, self.monitor_width_cm);
        Ok(())
    }

    /// Draws `scene` on the offscreen canvas and copies it into
    /// `frame_buffer`, which must be RGBA8 at canvas size.
    pub fn render_scene<T: Timer>(
        &mut self,
        scene: &Scene,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats> {
        let t_draw = timer.now();
        let [r, g, b, a] = scene.background;
        self.canvas.fill(Color::from_rgba8(r, g, b, a));
        let mut glyphs = 0;
        for item in &scene.items {
            glyphs += self.draw_text(item);
        }
        let draw = timer.elapsed(t_draw);

        let t_copy = timer.now();
        let data = self.canvas.data();
        if frame_buffer.len() != data.len() {
            bail!(
                "frame buffer holds {} bytes but the canvas has {}",
                frame_buffer.len(),
                data.len()
            );
        }
        frame_buffer.copy_from_slice(data);
        let copy = timer.elapsed(t_copy);

        let total = draw + copy;
        timer.record_frame(total);
        Ok(FrameStats {
            draw,
            copy,
            total,
            glyphs,
        })
    }

    /// Returns the number of glyphs laid out.
    fn draw_text(&mut self, item: &TextItem) -> usize {
        let size_px = self.metrics.length_px(item.height_cm);
        if !(size_px >= 1.0) {
            return 0;
        }
        let scale = PxScale::from(size_px);
        let (cx, cy) = self.metrics.to_pixels(item.position_cm);
        let lines: Vec<&str> = item.content.split('\n').collect();

        // Stage 1: layout, centered line by line around the anchor.
        let (glyphs, misses) = {
            let sf = self.font.as_scaled(scale);
            let line_height = sf.height() + sf.line_gap();
            let top = cy - line_height * lines.len() as f32 / 2.0;
            let mut glyphs: Vec<(Point, GlyphCacheKey)> = Vec::with_capacity(item.content.len());
            let mut misses: Vec<(GlyphId, GlyphCacheKey)> = Vec::new();

            for (row, line) in lines.iter().enumerate() {
                let mut pen_x = cx - line_width(&sf, line) / 2.0;
                let baseline = top + row as f32 * line_height + sf.ascent();
                let mut prev = None;
                for ch in line.chars() {
                    let id = sf.glyph_id(ch);
                    if let Some(prev_id) = prev {
                        pen_x += sf.kern(prev_id, id);
                    }
                    let key = GlyphCacheKey {
                        glyph_id: id.0,
                        scale_bits: size_px.to_bits(),
                    };
                    if !self.glyph_cache.contains_key(&key) && !misses.iter().any(|(_, k)| *k == key)
                    {
                        misses.push((id, key));
                    }
                    glyphs.push((point(pen_x, baseline), key));
                    pen_x += sf.h_advance(id);
                    prev = Some(id);
                }
            }
            (glyphs, misses)
        };

        // Stage 2: rasterize cache misses.
        for (id, key) in misses {
            Self::cache_glyph_impl(&mut self.glyph_cache, &self.font, id, scale, key);
        }

        // Stage 3: blit.
        let (w, h) = (self.canvas.width(), self.canvas.height());
        let pixels = self.canvas.pixels_mut();
        for (position, key) in &glyphs {
            if let Some(cached) = self.glyph_cache.get(key) {
                Self::blit_cached_glyph(pixels, w, h, *position, cached, item.color);
            }
        }
        glyphs.len()
    }

    fn cache_glyph_impl(
        cache: &mut HashMap<GlyphCacheKey, CachedGlyph>,
        font: &FontVec,
        id: GlyphId,
        scale: PxScale,
        key: GlyphCacheKey,
    ) {
        let glyph = id.with_scale_and_position(scale, point(0.0, 0.0));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let w = bounds.width().ceil() as u32;
            let h = bounds.height().ceil() as u32;
            if w == 0 || h == 0 {
                return;
            }
            let mut bitmap = vec![0u8; (w * h) as usize];
            outlined.draw(|x, y, cov| {
                if x < w && y < h {
                    bitmap[(y * w + x) as usize] = (cov.clamp(0.0, 1.0) * 255.0) as u8;
                }
            });
            cache.insert(
                key,
                CachedGlyph {
                    bitmap,
                    width: w,
                    height: h,
                    bearing_x: bounds.min.x.floor() as i32,
                    bearing_y: bounds.min.y.floor() as i32,
                },
            );
        }
    }

    /// Source-over blend of one cached coverage mask in premultiplied space.
    #[inline]
    fn blit_cached_glyph(
        pixels: &mut [PremultipliedColorU8],
        w: u32,
        h: u32,
        position: Point,
        cached: &CachedGlyph,
        color: Rgba,
    ) {
        let glyph_x = position.x.round() as i32 + cached.bearing_x;
        let glyph_y = position.y.round() as i32 + cached.bearing_y;
        let (wi, hi) = (w as i32, h as i32);
        let ca = color[3] as f32 / 255.0;

        for gy in 0..cached.height as i32 {
            let py = glyph_y + gy;
            if py < 0 || py >= hi {
                continue;
            }
            let src_row = (gy as u32 * cached.width) as usize;
            let dst_row = py as usize * w as usize;

            for gx in 0..cached.width as i32 {
                let px = glyph_x + gx;
                if px < 0 || px >= wi {
                    continue;
                }
                let coverage = cached.bitmap[src_row + gx as usize];
                if coverage == 0 {
                    continue;
                }

                let alpha = ca * coverage as f32 / 255.0;
                let inv = 1.0 - alpha;
                let idx = dst_row + px as usize;
                let dst = pixels[idx];
                let over = |src: u8, dst: u8| (src as f32 * alpha + dst as f32 * inv).round().min(255.0) as u8;

                let out_a = over(255, dst.alpha());
                let out = PremultipliedColorU8::from_rgba(
                    over(color[0], dst.red()).min(out_a),
                    over(color[1], dst.green()).min(out_a),
                    over(color[2], dst.blue()).min(out_a),
                    out_a,
                );
                if let Some(out) = out {
                    pixels[idx] = out;
                }
            }
        }
    }
}

fn line_width<F: Font, SF: ScaleFont<F>>(sf: &SF, line: &str) -> f32 {
    let mut width = 0.0;
    let mut prev = None;
    for ch in line.chars() {
        let id = sf.glyph_id(ch);
        if let Some(prev_id) = prev {
            width += sf.kern(prev_id, id);
        }
        width += sf.h_advance(id);
        prev = Some(id);
    }
    width
}
