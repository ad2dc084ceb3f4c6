use iced::{
    mouse,
    widget::{
        canvas::{self, Frame, Geometry, Path, Stroke},
        image,
    },
    Color, Pixels, Point, Rectangle, Renderer, Size, Theme,
};
use mpcore::generator::{CanvasSize, CANONICAL_CANVAS};
use mpcore::model::{Detection, ParticleType};

fn particle_color(particle: ParticleType) -> Color {
    let [r, g, b] = particle.color().to_rgb();
    Color::from_rgb(r, g, b)
}

/// Scale and offset that fit `source` centred inside `bounds` without distortion.
fn fit(source: CanvasSize, bounds: Size) -> (f32, Point) {
    let scale = (bounds.width / source.width as f32).min(bounds.height / source.height as f32);
    let offset = Point::new(
        (bounds.width - source.width as f32 * scale) / 2.0,
        (bounds.height - source.height as f32 * scale) / 2.0,
    );
    (scale, offset)
}

/// Bounding boxes drawn over the analyzed image, mapped onto the canonical 640x480 frame.
pub struct DetectionOverlay {
    pub image_name: String,
    /// Decoded lazily by the renderer; `None` falls back to a plain backdrop.
    pub image: Option<image::Handle>,
    pub detections: Vec<Detection>,
    pub selected: Option<String>,
}

impl<Message> canvas::Program<Message> for DetectionOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.02, 0.02, 0.04),
        );

        let (scale, offset) = fit(CANONICAL_CANVAS, bounds.size());
        let image_size = Size::new(
            CANONICAL_CANVAS.width as f32 * scale,
            CANONICAL_CANVAS.height as f32 * scale,
        );
        match &self.image {
            Some(handle) => frame.draw_image(
                Rectangle::new(offset, image_size),
                canvas::Image::new(handle.clone()),
            ),
            None => {
                frame.fill_rectangle(offset, image_size, Color::from_rgb(0.12, 0.14, 0.18));
                frame.fill_text(canvas::Text {
                    content: self.image_name.clone(),
                    position: Point::new(offset.x + 6.0, offset.y + image_size.height - 16.0),
                    color: Color::from_rgb(0.55, 0.58, 0.65),
                    size: Pixels(11.0),
                    ..canvas::Text::default()
                });
            }
        }

        for detection in &self.detections {
            let color = particle_color(detection.particle_type);
            let bbox = detection.bounding_box.scaled(scale as f64, scale as f64);
            let top_left = Point::new(offset.x + bbox.x as f32, offset.y + bbox.y as f32);
            let size = Size::new(bbox.width as f32, bbox.height as f32);
            let is_selected = self.selected.as_deref() == Some(detection.id.as_str());

            frame.stroke(
                &Path::rectangle(top_left, size),
                Stroke::default()
                    .with_width(if is_selected { 3.0 } else { 2.0 })
                    .with_color(color),
            );
            frame.fill_rectangle(
                Point::new(top_left.x, top_left.y - 14.0),
                Size::new(size.width, 13.0),
                color,
            );
            frame.fill_text(canvas::Text {
                content: detection.label(),
                position: Point::new(top_left.x + 3.0, top_left.y - 13.0),
                color: Color::WHITE,
                size: Pixels(10.0),
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}

/// Absorbance curve of one detection, plotted on a fixed 0..1 scale.
pub struct SpectrumChart {
    pub data: Vec<f64>,
}

impl<Message> canvas::Program<Message> for SpectrumChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        for quarter in 0..=4 {
            let y = bounds.height * quarter as f32 / 4.0;
            let grid = Path::line(Point::new(0.0, y), Point::new(bounds.width, y));
            frame.stroke(
                &grid,
                Stroke::default()
                    .with_width(0.5)
                    .with_color(Color::from_rgb(0.25, 0.25, 0.3)),
            );
        }

        if self.data.len() > 1 {
            let step = bounds.width / (self.data.len() as f32 - 1.0);
            let path = Path::new(|builder| {
                for (i, value) in self.data.iter().enumerate() {
                    let x = i as f32 * step;
                    let y = bounds.height - (*value as f32).clamp(0.0, 1.0) * bounds.height;
                    if i == 0 {
                        builder.move_to(Point::new(x, y));
                    } else {
                        builder.line_to(Point::new(x, y));
                    }
                }
            });

            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        }

        vec![frame.into_geometry()]
    }
}
