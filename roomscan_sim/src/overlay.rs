//! In-memory rectangle overlay standing in for the device UI.

use roomscan_env::{Color, Rect, RectangleRenderer};
use std::collections::VecDeque;

/// One pooled rectangle slot.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRect {
    pub rect: Rect,
    pub color: Color,
    pub text: String,
    pub visible: bool,
}

/// Rectangle pool with per-slot persistence timers.
///
/// Slots are reused through a queue of open indices; a new slot is only
/// allocated when none is open. A visible rectangle hides itself once it
/// has been shown for `persistence_time` seconds without being redrawn.
#[derive(Debug, Clone)]
pub struct RectOverlay {
    slots: Vec<OverlayRect>,
    open: VecDeque<usize>,
    timers: Vec<f64>,
    persistence_time: f64,
    draws: u64,
    clears: u64,
}

impl RectOverlay {
    pub fn new(persistence_time: f64) -> Self {
        Self {
            slots: Vec::new(),
            open: VecDeque::new(),
            timers: Vec::new(),
            persistence_time,
            draws: 0,
            clears: 0,
        }
    }

    /// Age every visible rectangle by `dt` seconds and hide the expired ones.
    pub fn update(&mut self, dt: f64) {
        for index in 0..self.slots.len() {
            if !self.slots[index].visible {
                continue;
            }
            self.timers[index] += dt;
            if self.timers[index] >= self.persistence_time {
                self.slots[index].visible = false;
                self.release(index);
            }
        }
    }

    pub fn visible_rects(&self) -> impl Iterator<Item = &OverlayRect> {
        self.slots.iter().filter(|slot| slot.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_rects().count()
    }

    /// Slots allocated so far, visible or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    fn release(&mut self, index: usize) {
        if !self.open.contains(&index) {
            self.open.push_back(index);
        }
    }
}

impl Default for RectOverlay {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl RectangleRenderer for RectOverlay {
    fn draw_rectangle(&mut self, rect: Rect, color: Color, text: &str) {
        self.draws += 1;
        let index = match self.open.pop_front() {
            Some(index) => index,
            None => {
                self.slots.push(OverlayRect {
                    rect,
                    color,
                    text: String::new(),
                    visible: false,
                });
                self.timers.push(0.0);
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        slot.rect = rect;
        slot.color = color;
        slot.text = text.to_string();
        slot.visible = true;
        self.timers[index] = 0.0;
    }

    fn clear_all_rectangles(&mut self) {
        self.clears += 1;
        for index in 0..self.slots.len() {
            self.slots[index].visible = false;
            self.release(index);
        }
    }
}
