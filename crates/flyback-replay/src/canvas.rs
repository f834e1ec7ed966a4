//! Drawing surface abstraction, an SVG backend, and the frame renderer.

use std::fmt::Write as _;

use flyback_core::rotate_point;
use nalgebra::{Point2, Vector2};

use crate::compositor::Frame;
use crate::config::{IconSpec, PlaybackConfig};
use crate::overlay::{Overlay, TITLE, X_AXIS_LABEL, Y_AXIS_LABEL};

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const ORANGE: Self = Self::rgb(255, 165, 0);
    /// Half-transparent trajectory blue.
    pub const BLUE: Self = Self {
        r: 0,
        g: 0,
        b: 255,
        a: 128,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// 2D drawing primitives a frame is rendered with.
///
/// Coordinates are screen pixels, y grows downward. Angles are degrees
/// clockwise.
pub trait Canvas {
    fn clear(&mut self, color: Color);

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, color: Color, width: f64);

    fn draw_polyline(&mut self, points: &[Point2<f64>], color: Color, width: f64);

    fn draw_circle(&mut self, center: Point2<f64>, radius: f64, color: Color);

    /// Draws the vehicle centered on `center`, nose rotated `angle_deg` from
    /// screen-up.
    fn draw_icon(&mut self, center: Point2<f64>, angle_deg: f64, icon: &IconSpec);

    /// `at` is the text's top edge at its anchor.
    fn draw_text(
        &mut self,
        at: Point2<f64>,
        text: &str,
        size: f64,
        anchor: TextAnchor,
        rotation_deg: f64,
    );
}

// ---------------------------------------------------------------------------
// SVG backend
// ---------------------------------------------------------------------------

/// Accumulates primitives into a standalone SVG document.
pub struct SvgCanvas {
    width: u32,
    height: u32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

// `write!` into a String cannot fail
impl Canvas for SvgCanvas {
    fn clear(&mut self, color: Color) {
        self.body.clear();
        let _ = writeln!(
            self.body,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            color.hex()
        );
    }

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>, color: Color, width: f64) {
        let _ = writeln!(
            self.body,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-opacity=\"{:.2}\" stroke-width=\"{}\"/>",
            from.x,
            from.y,
            to.x,
            to.y,
            color.hex(),
            color.opacity(),
            width
        );
    }

    fn draw_polyline(&mut self, points: &[Point2<f64>], color: Color, width: f64) {
        if points.len() < 2 {
            return;
        }
        let mut coords = String::with_capacity(points.len() * 16);
        for p in points {
            let _ = write!(coords, "{:.2},{:.2} ", p.x, p.y);
        }
        let _ = writeln!(
            self.body,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-opacity=\"{:.2}\" stroke-width=\"{}\"/>",
            coords.trim_end(),
            color.hex(),
            color.opacity(),
            width
        );
    }

    fn draw_circle(&mut self, center: Point2<f64>, radius: f64, color: Color) {
        let _ = writeln!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" fill-opacity=\"{:.2}\"/>",
            center.x,
            center.y,
            radius,
            color.hex(),
            color.opacity()
        );
    }

    fn draw_icon(&mut self, center: Point2<f64>, angle_deg: f64, icon: &IconSpec) {
        let w = icon.drawn_width();
        let h = icon.drawn_height();

        if let Some(href) = &icon.href {
            let _ = writeln!(
                self.body,
                "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" transform=\"rotate({:.2} {:.2} {:.2})\"/>",
                escape(href),
                center.x - w / 2.0,
                center.y - h / 2.0,
                w,
                h,
                angle_deg,
                center.x,
                center.y
            );
            return;
        }

        // Silhouette: body with a pointed nose, rotated about its center
        let nose = h * 0.15;
        let outline = [
            Point2::new(center.x, center.y - h / 2.0),
            Point2::new(center.x + w / 2.0, center.y - h / 2.0 + nose),
            Point2::new(center.x + w / 2.0, center.y + h / 2.0),
            Point2::new(center.x - w / 2.0, center.y + h / 2.0),
            Point2::new(center.x - w / 2.0, center.y - h / 2.0 + nose),
        ];
        let mut coords = String::new();
        for p in outline {
            let p = rotate_point(p, center, angle_deg);
            let _ = write!(coords, "{:.2},{:.2} ", p.x, p.y);
        }
        let _ = writeln!(
            self.body,
            "<polygon points=\"{}\" fill=\"#303030\" stroke=\"#000000\" stroke-width=\"1\"/>",
            coords.trim_end()
        );
    }

    fn draw_text(
        &mut self,
        at: Point2<f64>,
        text: &str,
        size: f64,
        anchor: TextAnchor,
        rotation_deg: f64,
    ) {
        let anchor = match anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
        };
        // SVG positions text by its baseline
        let baseline = at.y + size * 0.8;
        let transform = if rotation_deg != 0.0 {
            format!(
                " transform=\"rotate({:.2} {:.2} {:.2})\"",
                rotation_deg, at.x, at.y
            )
        } else {
            String::new()
        };
        let _ = writeln!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{}\" text-anchor=\"{}\"{}>{}</text>",
            at.x,
            baseline,
            size,
            anchor,
            transform,
            escape(text)
        );
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Frame rendering
// ---------------------------------------------------------------------------

const LABEL_SIZE: f64 = 14.0;
const AXIS_SIZE: f64 = 24.0;

/// Draws the overlay, then one frame on top of it.
pub fn render_frame<C: Canvas + ?Sized>(
    canvas: &mut C,
    overlay: &Overlay,
    frame: &Frame,
    config: &PlaybackConfig,
) {
    let width = config.width as f64;
    let height = config.height as f64;

    canvas.clear(Color::WHITE);

    // 1. Static trajectory
    canvas.draw_polyline(&overlay.points, Color::BLUE, overlay.line_thickness as f64);
    for marker in &overlay.time_markers {
        canvas.draw_circle(marker.position, 3.0, Color::BLACK);
        canvas.draw_text(
            marker.position + Vector2::new(5.0, -15.0),
            &marker.label,
            LABEL_SIZE,
            TextAnchor::Start,
            0.0,
        );
    }
    for marker in &overlay.event_markers {
        canvas.draw_circle(marker.position, 3.0, Color::RED);
        canvas.draw_text(
            marker.position + Vector2::new(5.0, -15.0),
            &marker.label,
            LABEL_SIZE,
            TextAnchor::Start,
            0.0,
        );
    }

    // 2. Axis labels
    canvas.draw_text(Point2::new(width / 2.0, 10.0), TITLE, AXIS_SIZE, TextAnchor::Middle, 0.0);
    canvas.draw_text(
        Point2::new(width / 2.0, height - 30.0),
        X_AXIS_LABEL,
        AXIS_SIZE,
        TextAnchor::Middle,
        0.0,
    );
    canvas.draw_text(
        Point2::new(10.0, height / 2.0),
        Y_AXIS_LABEL,
        AXIS_SIZE,
        TextAnchor::Middle,
        -90.0,
    );

    // 3. Vehicle
    canvas.draw_icon(frame.position, frame.displayed_angle, &config.icon);
    for p in &frame.particles {
        canvas.draw_circle(p.position, p.radius as f64, p.color.color());
    }
    canvas.draw_circle(frame.top, 3.0, Color::RED);

    // 4. Readouts
    for (i, line) in info_lines(frame).iter().enumerate() {
        canvas.draw_text(
            Point2::new(10.0, 10.0 + i as f64 * 20.0),
            line,
            LABEL_SIZE,
            TextAnchor::Start,
            0.0,
        );
    }

    // 5. Ground
    canvas.draw_line(
        Point2::new(0.0, height - 10.0),
        Point2::new(width, height - 10.0),
        Color::BLACK,
        1.0,
    );
}

/// Text readouts for the info panel.
pub fn info_lines(frame: &Frame) -> [String; 5] {
    let s = &frame.sample;
    [
        format!("Time: {:.2} s", s.time),
        format!("Altitude: {:.2} km", s.altitude),
        format!("Speed: {:.2} m/s", s.speed),
        format!("Mach: {:.2}", s.mach),
        format!("Dynamic Pressure: {:.2} kPa", s.dynamic_pressure),
    ]
}

/// Renders one frame to a complete SVG document.
pub fn render_svg(overlay: &Overlay, frame: &Frame, config: &PlaybackConfig) -> String {
    let mut canvas = SvgCanvas::new(config.width, config.height);
    render_frame(&mut canvas, overlay, frame, config);
    canvas.finish()
}
