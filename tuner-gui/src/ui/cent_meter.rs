//! # Cent Meter Widget
//!
//! A linear tuning meter: a centre line for "on target" and an indicator
//! that slides left (flat) or right (sharp), coloured by classification.

use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};
use tuner_core::Classification;

/// Cent deviation shown at either edge of the meter.
const METER_RANGE: f32 = 50.0;

/// Maps a cent deviation to a horizontal position in [0, 1].
///
/// -50 cents is the left edge, 0 the centre and +50 the right edge; larger
/// deviations stick to the edge.
pub fn indicator_position(cents: f32) -> f32 {
    (cents.clamp(-METER_RANGE, METER_RANGE) + METER_RANGE) / (2.0 * METER_RANGE)
}

/// Display colour for a classification.
pub fn classification_color(classification: Classification) -> Color {
    match classification {
        Classification::InTune => Color::from_rgb8(0x34, 0xDB, 0x98), // Green
        Classification::Close => Color::from_rgb8(0xFF, 0xC3, 0x00),  // Yellow
        Classification::Off => Color::from_rgb8(0xFF, 0x33, 0x33),    // Red
    }
}

/// Cent meter widget for displaying tuning accuracy.
pub struct CentMeter {
    /// Current deviation, `None` when there is no signal
    reading: Option<(f32, Classification)>,
}

impl CentMeter {
    pub fn new(reading: Option<(f32, Classification)>) -> Self {
        Self { reading }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(80.0)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for CentMeter {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let background = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&background, Color::from_rgb8(0x40, 0x40, 0x40));

        // In-tune band
        let band_width = bounds.width * (indicator_position(5.0) - indicator_position(-5.0));
        let band = Path::rectangle(
            Point::new((bounds.width - band_width) / 2.0, 0.0),
            Size::new(band_width, bounds.height),
        );
        frame.fill(&band, Color::from_rgba8(0x34, 0xDB, 0x98, 0.2));

        let center_x = bounds.width / 2.0;
        let center_line = Path::line(
            Point::new(center_x, 0.0),
            Point::new(center_x, bounds.height),
        );
        frame.stroke(
            &center_line,
            Stroke::default()
                .with_width(2.0)
                .with_color(Color::WHITE),
        );

        // No signal: the indicator rests at the centre in a neutral colour.
        let (position, color) = match self.reading {
            Some((cents, classification)) => {
                (indicator_position(cents), classification_color(classification))
            }
            None => (0.5, Color::from_rgb8(0x90, 0x90, 0x90)),
        };
        let needle_x = position * bounds.width;
        let needle = Path::rectangle(
            Point::new(needle_x - 2.0, 0.0),
            Size::new(4.0, bounds.height),
        );
        frame.fill(&needle, color);

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_maps_range_to_unit_interval() {
        assert_eq!(indicator_position(-50.0), 0.0);
        assert_eq!(indicator_position(0.0), 0.5);
        assert_eq!(indicator_position(50.0), 1.0);
        assert_eq!(indicator_position(25.0), 0.75);
    }

    #[test]
    fn indicator_clamps_large_deviations() {
        assert_eq!(indicator_position(-300.0), 0.0);
        assert_eq!(indicator_position(99.0), 1.0);
    }
}
