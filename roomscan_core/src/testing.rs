//! Test doubles shared by the unit tests in this crate.

use roomscan_env::{Color, Rect, RectangleRenderer};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Draw { rect: Rect, color: Color, text: String },
    Clear,
}

/// Renderer that records every command it receives.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn last(&self) -> Option<&DrawCommand> {
        self.commands.last()
    }
}

impl RectangleRenderer for RecordingRenderer {
    fn draw_rectangle(&mut self, rect: Rect, color: Color, text: &str) {
        self.commands.push(DrawCommand::Draw {
            rect,
            color,
            text: text.to_string(),
        });
    }

    fn clear_all_rectangles(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }
}
