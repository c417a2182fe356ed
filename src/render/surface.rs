// surface.rs - Owned RGBA output buffer
//
// Straight-alpha RGBA8, row-major, laid out exactly like canvas ImageData so
// the host can blit it without conversion. All primitives clip to the
// surface and silently ignore non-finite coordinates.

use crate::config::Rgba;

pub struct Surface {
    px: Vec<u8>,
    w: u32,
    h: u32,
}

impl Surface {
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            px: vec![0; (w as usize) * (h as usize) * 4],
            w,
            h,
        }
    }

    pub fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
        self.px.clear();
        self.px.resize((w as usize) * (h as usize) * 4, 0);
    }

    /// Transparent black.
    pub fn clear(&mut self) {
        self.px.fill(0);
    }

    /// Opaque fill, ignoring the color's alpha.
    pub fn fill(&mut self, c: Rgba) {
        for p in self.px.chunks_exact_mut(4) {
            p.copy_from_slice(&[c.r, c.g, c.b, 255]);
        }
    }

    pub fn as_bytes(&self) -> &[u8] { &self.px }
    pub fn is_empty(&self) -> bool { self.px.is_empty() }
    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }

    /// Pixel at (x, y) as `[r, g, b, a]`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.w || y >= self.h { return None; }
        let i = (y as usize * self.w as usize + x as usize) * 4;
        Some([self.px[i], self.px[i + 1], self.px[i + 2], self.px[i + 3]])
    }

    /// Source-over composite of `c` at `alpha * c.a` onto one pixel.
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, c: Rgba, alpha: f32) {
        if (x as u32) >= self.w || (y as u32) >= self.h { return; }
        let sa = (alpha * c.a).clamp(0.0, 1.0);
        if !(sa > 0.0) { return; }

        let i = (y as usize * self.w as usize + x as usize) * 4;
        let da = self.px[i + 3] as f32 / 255.0;
        let oa = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / oa;
            (v + 0.5).min(255.0) as u8
        };

        self.px[i] = mix(c.r, self.px[i]);
        self.px[i + 1] = mix(c.g, self.px[i + 1]);
        self.px[i + 2] = mix(c.b, self.px[i + 2]);
        self.px[i + 3] = (oa * 255.0 + 0.5) as u8;
    }

    /// Anti-aliased filled disc.
    pub fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, c: Rgba, alpha: f32) {
        if !(cx.is_finite() && cy.is_finite() && r > 0.0) { return; }
        let (x0, x1, y0, y1) = self.bounds(cx, cy, r + 1.0);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, c, alpha * coverage);
                }
            }
        }
    }

    /// Soft halo around a disc of radius `r`, fading out over `blur` pixels.
    pub fn glow(&mut self, cx: f32, cy: f32, r: f32, blur: f32, c: Rgba, alpha: f32) {
        if !(cx.is_finite() && cy.is_finite() && blur > 0.0) { return; }
        let (x0, x1, y0, y1) = self.bounds(cx, cy, r + blur);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
                let falloff = 1.0 - ((d - r) / blur).clamp(0.0, 1.0);
                if falloff > 0.0 {
                    self.blend(x, y, c, alpha * falloff * falloff);
                }
            }
        }
    }

    /// Anti-aliased line (Wu). `width` below 1 scales coverage down.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, c: Rgba, alpha: f32) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) { return; }
        let weight = alpha * width.clamp(0.0, 1.0);

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        let (mut ax, mut ay, mut bx, mut by) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
        if ax > bx {
            std::mem::swap(&mut ax, &mut bx);
            std::mem::swap(&mut ay, &mut by);
        }

        let dx = bx - ax;
        let gradient = if dx > 0.0 { (by - ay) / dx } else { 0.0 };

        // Pixel centers sit at +0.5
        let start = (ax - 0.5).round() as i32;
        let end = (bx - 0.5).round() as i32;
        let mut plot = |major: i32, minor: i32, cov: f32| {
            if cov <= 0.0 { return; }
            if steep {
                self.blend(minor, major, c, weight * cov);
            } else {
                self.blend(major, minor, c, weight * cov);
            }
        };

        for m in start..=end {
            let along = m as f32 + 0.5;
            let cross = ay + gradient * (along - ax) - 0.5;
            let base = cross.floor();
            let frac = cross - base;
            plot(m, base as i32, 1.0 - frac);
            plot(m, base as i32 + 1, frac);
        }
    }

    /// Clipped integer bounding box around a circle.
    fn bounds(&self, cx: f32, cy: f32, r: f32) -> (i32, i32, i32, i32) {
        let max_x = self.w as i32 - 1;
        let max_y = self.h as i32 - 1;
        (
            ((cx - r).floor() as i32).max(0),
            ((cx + r).ceil() as i32).min(max_x),
            ((cy - r).floor() as i32).max(0),
            ((cy + r).ceil() as i32).min(max_y),
        )
    }
}
