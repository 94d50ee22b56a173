//! # Touch Swipe Module
//!
//! Tracks a single-finger drag and classifies it as a page turn.
//!
//! A drag counts as a horizontal swipe when it travels more than the minimum
//! distance along x and its direction lies within the angle threshold of the
//! x axis; vertical swipes work the same way on y. Dragging right or down goes
//! back a page, dragging left or up goes forward.
//!
//! ```
//! use pdf_presenter::input::TouchPoint;
//! use pdf_presenter::presentation::swipe::{SwipeThresholds, TouchSwipeState};
//! use pdf_presenter::presentation::PageTurn;
//!
//! let mut swipe = TouchSwipeState::begin(TouchPoint::new(300.0, 200.0));
//! swipe.update(TouchPoint::new(200.0, 210.0));
//! assert_eq!(swipe.classify(&SwipeThresholds::default()), Some(PageTurn::Next));
//! ```

use std::f64::consts::{FRAC_PI_2, PI};

use super::PageTurn;
use crate::input::TouchPoint;

/// Minimum travel in CSS pixels for a movement to count as a swipe.
pub const SWIPE_MIN_DISTANCE_THRESHOLD: f64 = 50.0;

/// Maximum deviation from an axis, in radians (30°).
pub const SWIPE_ANGLE_THRESHOLD: f64 = PI / 6.0;

/// Distance and angle limits for swipe classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeThresholds {
    /// Minimum travel along the swipe axis, in CSS pixels.
    pub min_distance: f64,
    /// Maximum deviation from the swipe axis, in radians.
    pub max_angle: f64,
}

impl Default for SwipeThresholds {
    fn default() -> Self {
        Self {
            min_distance: SWIPE_MIN_DISTANCE_THRESHOLD,
            max_angle: SWIPE_ANGLE_THRESHOLD,
        }
    }
}

impl SwipeThresholds {
    pub fn from_degrees(min_distance: f64, max_angle_deg: f64) -> Self {
        Self {
            min_distance,
            max_angle: max_angle_deg.to_radians(),
        }
    }
}

/// Start and latest position of the tracked finger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSwipeState {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl TouchSwipeState {
    pub fn begin(point: TouchPoint) -> Self {
        Self {
            start_x: point.x,
            start_y: point.y,
            end_x: point.x,
            end_y: point.y,
        }
    }

    pub fn update(&mut self, point: TouchPoint) {
        self.end_x = point.x;
        self.end_y = point.y;
    }

    /// Page turn for the drag so far, or `None` if it is too short or too
    /// diagonal.
    #[must_use]
    pub fn classify(&self, thresholds: &SwipeThresholds) -> Option<PageTurn> {
        let dx = self.end_x - self.start_x;
        let dy = self.end_y - self.start_y;
        let abs_angle = dy.atan2(dx).abs();

        let delta = if dx.abs() > thresholds.min_distance
            && (abs_angle <= thresholds.max_angle || abs_angle >= PI - thresholds.max_angle)
        {
            dx
        } else if dy.abs() > thresholds.min_distance
            && (abs_angle - FRAC_PI_2).abs() <= thresholds.max_angle
        {
            dy
        } else {
            0.0
        };

        if delta > 0.0 {
            Some(PageTurn::Previous)
        } else if delta < 0.0 {
            Some(PageTurn::Next)
        } else {
            None
        }
    }
}
