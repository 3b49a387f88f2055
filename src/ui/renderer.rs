//! Selection overlay rendering
//!
//! Draws the dimmed desktop, the selection frame and its text labels with
//! tiny-skia. Layout calculation is kept separate from rasterization so the
//! geometry can be tested without a font or a window.

use std::path::Path;

use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use tiny_skia::{
    BlendMode, Color, ColorU8, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect as SkiaRect,
    Stroke, Transform,
};

use crate::domain::core::Rect;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create {width}x{height} pixmap for rendering")]
    PixmapCreationFailed { width: i32, height: i32 },

    #[error("Font data could not be parsed")]
    InvalidFont,
}

/// Text shown while no drag is in progress
pub const INSTRUCTION_TEXT: &str = "Click and drag to select an area. Press ESC to cancel.";

/// Fonts tried, in order, when the renderer loads a system font
const SYSTEM_FONT_PATHS: &[&str] = &[
    r"C:\Windows\Fonts\segoeui.ttf",
    r"C:\Windows\Fonts\arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Colours and sizes of the selection overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Wash over the whole desktop
    pub dim: ColorU8,
    /// Frame and corner handles
    pub accent: ColorU8,
    pub text: ColorU8,
    pub label_background: ColorU8,
    pub instruction_background: ColorU8,
    pub border_width: i32,
    pub handle_size: i32,
    pub label_font_px: f32,
    pub instruction_font_px: f32,
}

impl OverlayStyle {
    /// Style scaled for a display at `dpi_scale` (1.0 = 96 DPI)
    pub fn scaled(dpi_scale: f32) -> Self {
        let base = Self::default();
        let scale = dpi_scale.max(1.0);
        let px = |value: i32| ((value as f32) * scale).round() as i32;

        Self {
            border_width: px(base.border_width),
            handle_size: px(base.handle_size),
            label_font_px: base.label_font_px * scale,
            instruction_font_px: base.instruction_font_px * scale,
            ..base
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            // 30% black
            dim: ColorU8::from_rgba(0, 0, 0, 76),
            accent: ColorU8::from_rgba(0, 120, 215, 200),
            text: ColorU8::from_rgba(255, 255, 255, 255),
            label_background: ColorU8::from_rgba(0, 0, 0, 180),
            instruction_background: ColorU8::from_rgba(0, 0, 0, 200),
            border_width: 2,
            handle_size: 8,
            label_font_px: 13.0,
            instruction_font_px: 16.0,
        }
    }
}

/// How a label is positioned relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Anchor is the top-left corner of the text
    TopLeft { x: f32, y: f32 },
    /// Anchor is the centre of the text
    Center { x: f32, y: f32 },
}

/// A line of text with a filled background box
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub anchor: Anchor,
    pub font_px: f32,
    /// Horizontal and vertical padding of the background box
    pub padding: (f32, f32),
    pub color: ColorU8,
    pub background: ColorU8,
}

/// Pre-calculated geometry for one overlay frame, in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionLayout {
    pub width: i32,
    pub height: i32,
    /// Selection rectangle, already translated into the surface
    pub selection: Option<Rect>,
    pub handles: Vec<Rect>,
    pub labels: Vec<TextLabel>,
}

impl SelectionLayout {
    /// Lays out a frame for a surface covering `surface` (global coordinates)
    ///
    /// `selection` is the dragged rectangle in global coordinates, or None
    /// while waiting for the first click.
    pub fn compute(surface: Rect, selection: Option<Rect>, style: &OverlayStyle) -> Self {
        let mut layout = Self {
            width: surface.w,
            height: surface.h,
            selection: None,
            handles: Vec::new(),
            labels: Vec::new(),
        };

        match selection {
            Some(rect) => {
                let local = rect.translate(-surface.x, -surface.y);
                layout.selection = Some(local);
                layout.handles = corner_handles(&local, style.handle_size);
                layout.labels.push(size_label(&local, style));
            }
            None => layout.labels.push(TextLabel {
                text: INSTRUCTION_TEXT.to_string(),
                anchor: Anchor::Center {
                    x: (surface.w / 2) as f32,
                    y: 50.0,
                },
                font_px: style.instruction_font_px,
                padding: (20.0, 10.0),
                color: style.text,
                background: style.instruction_background,
            }),
        }

        layout
    }
}

fn corner_handles(rect: &Rect, size: i32) -> Vec<Rect> {
    let half = size / 2;
    [
        (rect.x, rect.y),
        (rect.right(), rect.y),
        (rect.x, rect.bottom()),
        (rect.right(), rect.bottom()),
    ]
    .into_iter()
    .map(|(cx, cy)| Rect::new(cx - half, cy - half, size, size))
    .collect()
}

/// "W x H" above the selection, or below it near the top edge
fn size_label(rect: &Rect, style: &OverlayStyle) -> TextLabel {
    let above = rect.y - 25;
    let y = if above < 30 { rect.bottom() + 20 } else { above };

    TextLabel {
        text: format!("{} x {}", rect.w, rect.h),
        anchor: Anchor::TopLeft {
            x: rect.x as f32,
            y: y as f32,
        },
        font_px: style.label_font_px,
        padding: (5.0, 2.0),
        color: style.text,
        background: style.label_background,
    }
}

/// Overlay renderer using tiny-skia for shapes and ab_glyph for text
pub struct SelectionRenderer {
    style: OverlayStyle,
    font: Option<FontVec>,
}

impl SelectionRenderer {
    /// Creates a renderer with the first system font that loads
    pub fn new(style: OverlayStyle) -> Self {
        let font = SYSTEM_FONT_PATHS
            .iter()
            .map(Path::new)
            .filter(|path| path.is_file())
            .find_map(|path| {
                let data = std::fs::read(path).ok()?;
                FontVec::try_from_vec(data).ok()
            });

        if font.is_none() {
            log::warn!("No system font found, overlay labels are disabled");
        }

        Self { style, font }
    }

    /// Creates a renderer that draws shapes only
    pub fn without_font(style: OverlayStyle) -> Self {
        Self { style, font: None }
    }

    pub fn with_font_data(style: OverlayStyle, data: Vec<u8>) -> Result<Self, RendererError> {
        let font = FontVec::try_from_vec(data).map_err(|_| RendererError::InvalidFont)?;
        Ok(Self {
            style,
            font: Some(font),
        })
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render a layout to a premultiplied RGBA pixmap
    pub fn render_layout(&self, layout: &SelectionLayout) -> Result<Pixmap, RendererError> {
        let mut pixmap = Pixmap::new(layout.width.max(0) as u32, layout.height.max(0) as u32)
            .ok_or(RendererError::PixmapCreationFailed {
                width: layout.width,
                height: layout.height,
            })?;

        pixmap.fill(to_color(self.style.dim));

        if let Some(selection) = layout.selection {
            self.render_selection(&mut pixmap, &selection);
            for handle in &layout.handles {
                fill_rect(&mut pixmap, handle, self.style.accent, BlendMode::SourceOver);
            }
        }

        for label in &layout.labels {
            self.render_label(&mut pixmap, label);
        }

        Ok(pixmap)
    }

    fn render_selection(&self, pixmap: &mut Pixmap, selection: &Rect) {
        // Alpha 1 rather than 0: fully transparent pixels of a layered
        // window do not receive mouse input
        fill_rect(
            pixmap,
            selection,
            ColorU8::from_rgba(0, 0, 0, 1),
            BlendMode::Source,
        );

        let Some(rect) = to_skia_rect(selection) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);

        let mut paint = Paint::default();
        paint.set_color(to_color(self.style.accent));

        let stroke = Stroke {
            width: self.style.border_width as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn render_label(&self, pixmap: &mut Pixmap, label: &TextLabel) {
        let Some(font) = &self.font else {
            return;
        };

        let scaled = font.as_scaled(PxScale::from(label.font_px));
        let text_width = measure(font, label.font_px, &label.text);
        let text_height = scaled.ascent() - scaled.descent();

        let (left, top) = match label.anchor {
            Anchor::TopLeft { x, y } => (x, y),
            Anchor::Center { x, y } => (x - text_width / 2.0, y - text_height / 2.0),
        };

        let (pad_x, pad_y) = label.padding;
        if let Some(background) = SkiaRect::from_xywh(
            left - pad_x,
            top - pad_y,
            text_width + pad_x * 2.0,
            text_height + pad_y * 2.0,
        ) {
            let mut paint = Paint::default();
            paint.set_color(to_color(label.background));
            pixmap.fill_rect(background, &paint, Transform::identity(), None);
        }

        for glyph in layout_glyphs(font, label.font_px, &label.text, left, top + scaled.ascent()) {
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                blend_pixel(
                    pixmap,
                    bounds.min.x as i32 + gx as i32,
                    bounds.min.y as i32 + gy as i32,
                    label.color,
                    coverage,
                );
            });
        }
    }
}

/// Converts a premultiplied RGBA pixmap into the BGRA byte order GDI expects
pub fn pixmap_to_bgra(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = pixmap.data().to_vec();
    for pixel in data.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
    data
}

fn layout_glyphs(font: &FontVec, font_px: f32, text: &str, x: f32, baseline: f32) -> Vec<Glyph> {
    let scaled = font.as_scaled(PxScale::from(font_px));
    let mut caret = x;
    let mut previous = None;
    let mut glyphs = Vec::with_capacity(text.len());

    for c in text.chars() {
        let mut glyph = scaled.scaled_glyph(c);
        if let Some(previous) = previous {
            caret += scaled.kern(previous, glyph.id);
        }
        glyph.position = point(caret, baseline);
        caret += scaled.h_advance(glyph.id);
        previous = Some(glyph.id);
        glyphs.push(glyph);
    }

    glyphs
}

fn measure(font: &FontVec, font_px: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(PxScale::from(font_px));
    let mut width = 0.0;
    let mut previous = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(previous) = previous {
            width += scaled.kern(previous, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Source-over blend of one text pixel
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: ColorU8, coverage: f32) {
    let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
    if x < 0 || y < 0 || x >= width || y >= height {
        return;
    }

    let alpha = f32::from(color.alpha()) / 255.0 * coverage.clamp(0.0, 1.0);
    let index = (y * width + x) as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[index];

    let mix = |src: u8, dst: u8| -> u8 {
        (f32::from(src) * alpha + f32::from(dst) * (1.0 - alpha)).round() as u8
    };
    let blended = PremultipliedColorU8::from_rgba(
        mix(color.red(), dst.red()),
        mix(color.green(), dst.green()),
        mix(color.blue(), dst.blue()),
        mix(255, dst.alpha()),
    );

    if let Some(blended) = blended {
        pixels[index] = blended;
    }
}

fn fill_rect(pixmap: &mut Pixmap, rect: &Rect, color: ColorU8, blend_mode: BlendMode) {
    let Some(rect) = to_skia_rect(rect) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(to_color(color));
    paint.blend_mode = blend_mode;
    paint.anti_alias = false;
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

fn to_skia_rect(rect: &Rect) -> Option<SkiaRect> {
    SkiaRect::from_xywh(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32)
}

fn to_color(color: ColorU8) -> Color {
    Color::from_rgba8(color.red(), color.green(), color.blue(), color.alpha())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Rect {
        Rect::new(-1920, 0, 3840, 1080)
    }

    fn alpha_at(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).map(|p| p.alpha()).unwrap_or_default()
    }

    #[test]
    fn idle_layout_shows_instructions() {
        let layout = SelectionLayout::compute(surface(), None, &OverlayStyle::default());

        assert_eq!((layout.width, layout.height), (3840, 1080));
        assert_eq!(layout.selection, None);
        assert!(layout.handles.is_empty());
        assert_eq!(layout.labels.len(), 1);
        assert_eq!(layout.labels[0].text, INSTRUCTION_TEXT);
        assert_eq!(layout.labels[0].anchor, Anchor::Center { x: 1920.0, y: 50.0 });
    }

    #[test]
    fn selection_is_translated_into_surface() {
        let selection = Rect::new(-1000, 300, 200, 100);
        let layout = SelectionLayout::compute(surface(), Some(selection), &OverlayStyle::default());

        assert_eq!(layout.selection, Some(Rect::new(920, 300, 200, 100)));
        assert_eq!(layout.labels[0].text, "200 x 100");
        assert_eq!(layout.labels[0].anchor, Anchor::TopLeft { x: 920.0, y: 275.0 });
    }

    #[test]
    fn handles_sit_on_corners() {
        let layout = SelectionLayout::compute(
            Rect::new(0, 0, 1920, 1080),
            Some(Rect::new(100, 100, 50, 40)),
            &OverlayStyle::default(),
        );

        assert_eq!(
            layout.handles,
            vec![
                Rect::new(96, 96, 8, 8),
                Rect::new(146, 96, 8, 8),
                Rect::new(96, 136, 8, 8),
                Rect::new(146, 136, 8, 8),
            ]
        );
    }

    #[test]
    fn size_label_moves_below_near_top_edge() {
        let layout = SelectionLayout::compute(
            Rect::new(0, 0, 1920, 1080),
            Some(Rect::new(10, 40, 100, 60)),
            &OverlayStyle::default(),
        );
        // 40 - 25 = 15 is above the 30px limit, so the label goes below
        assert_eq!(layout.labels[0].anchor, Anchor::TopLeft { x: 10.0, y: 120.0 });
    }

    #[test]
    fn scaled_style_grows_with_dpi() {
        let style = OverlayStyle::scaled(2.0);
        assert_eq!(style.border_width, 4);
        assert_eq!(style.handle_size, 16);
        assert!(style.label_font_px > OverlayStyle::default().label_font_px);
        assert_eq!(OverlayStyle::scaled(0.5), OverlayStyle::default());
    }

    #[test]
    fn render_dims_desktop_and_clears_selection() {
        let renderer = SelectionRenderer::without_font(OverlayStyle::default());
        let layout = SelectionLayout::compute(
            Rect::new(0, 0, 400, 300),
            Some(Rect::new(100, 100, 100, 80)),
            renderer.style(),
        );

        let pixmap = renderer.render_layout(&layout).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (400, 300));

        // Outside the selection: dim wash
        assert_eq!(alpha_at(&pixmap, 10, 250), 76);
        // Inside the selection: nearly transparent but still hit-testable
        assert_eq!(alpha_at(&pixmap, 150, 140), 1);
        // On a corner handle: accent colour
        assert!(alpha_at(&pixmap, 100, 100) >= 200);
    }

    #[test]
    fn render_without_font_skips_labels() {
        let renderer = SelectionRenderer::without_font(OverlayStyle::default());
        assert!(!renderer.has_font());

        let layout = SelectionLayout::compute(Rect::new(0, 0, 800, 200), None, renderer.style());
        let pixmap = renderer.render_layout(&layout).unwrap();
        // No instruction box is drawn without a font
        assert_eq!(alpha_at(&pixmap, 400, 50), 76);
    }

    #[test]
    fn empty_surface_fails() {
        let renderer = SelectionRenderer::without_font(OverlayStyle::default());
        let layout = SelectionLayout::compute(Rect::new(0, 0, 0, 0), None, renderer.style());
        assert!(matches!(
            renderer.render_layout(&layout),
            Err(RendererError::PixmapCreationFailed { .. })
        ));
    }

    #[test]
    fn invalid_font_data_is_rejected() {
        let result = SelectionRenderer::with_font_data(OverlayStyle::default(), vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(RendererError::InvalidFont)));
    }

    #[test]
    fn bgra_conversion_swaps_red_and_blue() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        pixmap.fill(Color::from_rgba8(10, 20, 30, 255));
        assert_eq!(pixmap_to_bgra(&pixmap), vec![30, 20, 10, 255]);
    }
}
