//! Screen geometry
//!
//! Coordinates are screen points with the origin at the bottom-left corner,
//! y growing upward. Balloons enter below the bottom edge and leave above the
//! top edge.

use std::ops::RangeInclusive;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Balloon;
use crate::config::{GameConfig, Insets, Size};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playfield {
    pub screen: Size,
    pub safe_area: Insets,
    pub balloon_radius: f32,
    pub stroke_width: f32,
    pub edge_margin: f32,
    pub restart_button: Size,
}

impl Playfield {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            screen: config.screen,
            safe_area: config.safe_area,
            balloon_radius: config.balloon_radius,
            stroke_width: config.stroke_width,
            edge_margin: config.edge_margin,
            restart_button: config.restart_button,
        }
    }

    /// Distance a balloon center must keep from a screen edge
    fn edge_padding(&self) -> f32 {
        self.balloon_radius + self.stroke_width + self.edge_margin
    }

    /// Valid horizontal spawn range, or None if the screen is too narrow
    pub fn x_range(&self) -> Option<RangeInclusive<f32>> {
        let pad = self.edge_padding();
        let min_x = self.safe_area.left + pad;
        let max_x = self.screen.width - self.safe_area.right - pad;
        (max_x > min_x).then_some(min_x..=max_x)
    }

    /// Horizontal midpoint of the safe area
    pub fn mid_x(&self) -> f32 {
        (self.safe_area.left + self.screen.width - self.safe_area.right) / 2.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.screen.width / 2.0, self.screen.height / 2.0)
    }

    /// Outer radius used for hit-testing (the stroke is tappable too)
    pub fn hit_radius(&self) -> f32 {
        self.balloon_radius + self.stroke_width
    }

    /// Where a balloon is drawn at `now`: fully below the screen at spawn,
    /// fully above it when it escapes.
    pub fn balloon_center(&self, balloon: &Balloon, now: std::time::Duration) -> Vec2 {
        let r = self.hit_radius();
        let start_y = -r;
        let end_y = self.screen.height + r;
        let y = start_y + (end_y - start_y) * balloon.progress(now);
        Vec2::new(balloon.x, y)
    }

    pub fn balloon_contains(&self, balloon: &Balloon, now: std::time::Duration, point: Vec2) -> bool {
        self.balloon_center(balloon, now).distance(point) <= self.hit_radius()
    }

    /// Whether `point` lies on the restart control (centered on screen)
    pub fn restart_contains(&self, point: Vec2) -> bool {
        let half = Vec2::new(self.restart_button.width, self.restart_button.height) / 2.0;
        let offset = (point - self.center()).abs();
        offset.x <= half.x && offset.y <= half.y
    }
}
