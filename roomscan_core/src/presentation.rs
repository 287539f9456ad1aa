//! Presentation adapter: registry selection → rectangle draw commands.

use crate::object_record::ObjectRecord;
use roomscan_env::{Color, RectangleRenderer};

/// Translates the selected record into one draw call per cycle.
///
/// Holds only formatting settings; what to show comes from the registry.
#[derive(Debug, Clone)]
pub struct PresentationAdapter {
    color: Color,
    unit_label: String,
}

impl PresentationAdapter {
    pub fn new(color: Color, unit_label: impl Into<String>) -> Self {
        Self {
            color,
            unit_label: unit_label.into(),
        }
    }

    /// Caption drawn next to the highlighted rectangle, e.g.
    /// `chair: 0.80, 12.1 ft³`.
    pub fn caption(&self, record: &ObjectRecord) -> String {
        format!(
            "{}: {:.2}, {:.1} {}",
            record.label(),
            record.confidence(),
            record.volume(),
            self.unit_label
        )
    }

    /// Draw the selected record, or clear the display when nothing is
    /// selected.
    pub fn present<R>(&self, selected: Option<&ObjectRecord>, renderer: &mut R)
    where
        R: RectangleRenderer + ?Sized,
    {
        match selected {
            Some(record) => renderer.draw_rectangle(
                record.bounding_rect_2d(),
                self.color,
                &self.caption(record),
            ),
            None => renderer.clear_all_rectangles(),
        }
    }
}

impl Default for PresentationAdapter {
    fn default() -> Self {
        Self::new(Color::PALETTE[0], "ft³")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds3;
    use crate::object_record::Observation;
    use crate::testing::{DrawCommand, RecordingRenderer};
    use nalgebra::{Point3, Vector3};
    use roomscan_env::Rect;

    fn chair() -> ObjectRecord {
        ObjectRecord::create(
            Observation::new(
                "chair",
                0.8,
                Rect::new(10.0, 10.0, 50.0, 50.0),
                Bounds3::from_center_size(Point3::origin(), Vector3::new(0.7, 0.7, 0.7)),
            ),
            0.0,
            35.3147,
        )
    }

    #[test]
    fn test_caption_format() {
        let adapter = PresentationAdapter::default();
        assert_eq!(adapter.caption(&chair()), "chair: 0.80, 12.1 ft³");
    }

    #[test]
    fn test_present_selected_draws_one_red_rect() {
        let mut renderer = RecordingRenderer::default();
        let record = chair();

        PresentationAdapter::default().present(Some(&record), &mut renderer);

        assert_eq!(
            renderer.commands,
            vec![DrawCommand::Draw {
                rect: Rect::new(10.0, 10.0, 50.0, 50.0),
                color: Color::RED,
                text: "chair: 0.80, 12.1 ft³".to_string(),
            }]
        );
    }

    #[test]
    fn test_present_nothing_clears() {
        let mut renderer = RecordingRenderer::default();
        PresentationAdapter::default().present(None, &mut renderer);
        assert_eq!(renderer.commands, vec![DrawCommand::Clear]);
    }
}
