//! The walkthrough timeline: camera segments, overlay fades and water.
//!
//! Segment boundaries are authored in seconds of the 120 s reference loop
//! and scaled proportionally, so a shorter or longer loop keeps the same
//! choreography.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::Serialize;

use crate::engine::source::{REFERENCE_LOOP_SECONDS, TimelineConfig};
use crate::types::Waypoints;

/// Orbit sweep as a fraction of a full turn.
pub const ORBIT_TURNS: f32 = 0.75;
/// Orbit radius as a fraction of the room's shorter side.
pub const ORBIT_RADIUS_FACTOR: f32 = 0.35;

/// A named point the timeline can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Door,
    Center,
    SinkFront,
    SinkTarget,
    /// Where the orbit segment leaves the camera.
    OrbitEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Motion {
    Hold { at: Anchor },
    Ease { from: Anchor, to: Anchor },
    Orbit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// Exclusive end of the segment, in reference-loop seconds.
    pub end: f64,
    pub motion: Motion,
    pub target: Anchor,
}

/// The reference choreography, authored against a 120 s loop.
pub const REFERENCE_SEGMENTS: [Segment; 7] = [
    Segment { end: 10.0, motion: Motion::Hold { at: Anchor::Door }, target: Anchor::Center },
    Segment {
        end: 30.0,
        motion: Motion::Ease { from: Anchor::Door, to: Anchor::SinkFront },
        target: Anchor::SinkTarget,
    },
    Segment { end: 50.0, motion: Motion::Hold { at: Anchor::SinkFront }, target: Anchor::SinkTarget },
    Segment { end: 90.0, motion: Motion::Orbit, target: Anchor::Center },
    Segment {
        end: 110.0,
        motion: Motion::Ease { from: Anchor::OrbitEnd, to: Anchor::Center },
        target: Anchor::SinkTarget,
    },
    Segment {
        end: 117.0,
        motion: Motion::Ease { from: Anchor::Center, to: Anchor::Door },
        target: Anchor::Center,
    },
    Segment { end: REFERENCE_LOOP_SECONDS, motion: Motion::Hold { at: Anchor::Door }, target: Anchor::Center },
];

/// Ease-in-out quadratic on `[0, 1]`.
pub fn ease(x: f64) -> f64 {
    if x < 0.5 {
        2.0 * x * x
    } else {
        1.0 - 2.0 * (1.0 - x) * (1.0 - x)
    }
}

/// Circular sweep around the room center at constant height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orbit {
    pub center: Vec3,
    pub radius: f32,
    pub start_angle: f32,
    pub sweep: f32,
}

impl Orbit {
    /// Orbit around `waypoints.center`, starting on the bearing of the sink
    /// front so the camera swings out from where it just stood.
    pub fn new(waypoints: &Waypoints, length: f32, width: f32) -> Self {
        let from_center = waypoints.sink_front - waypoints.center;
        Orbit {
            center: waypoints.center,
            radius: length.min(width) * ORBIT_RADIUS_FACTOR,
            start_angle: from_center.z.atan2(from_center.x),
            sweep: ORBIT_TURNS * TAU,
        }
    }

    /// Position at linear progress `x` in `[0, 1]`.
    pub fn at(&self, x: f32) -> Vec3 {
        let angle = self.start_angle + self.sweep * x;
        self.center + Vec3::new(angle.cos() * self.radius, 0.0, angle.sin() * self.radius)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub loop_duration: f64,
    pub fade_time: f64,
    pub show_time: f64,
    pub water: [f64; 2],
    pub segments: Vec<Segment>,
}

impl Timeline {
    pub fn from_config(config: &TimelineConfig) -> Self {
        Timeline {
            loop_duration: config.loop_duration,
            fade_time: config.fade_time,
            show_time: config.show_time,
            water: config.water_interval(),
            segments: REFERENCE_SEGMENTS.to_vec(),
        }
    }

    /// Elapsed time folded into `[0, loop_duration)`.
    pub fn phase(&self, elapsed: f64) -> f64 {
        let phase = elapsed.rem_euclid(self.loop_duration);
        // rem_euclid can round up to the modulus for tiny negative inputs.
        if phase >= self.loop_duration { 0.0 } else { phase }
    }

    pub fn overlay_alpha(&self, phase: f64) -> f32 {
        let window = self.fade_time + self.show_time;
        let head = phase;
        let tail = self.loop_duration - phase;
        let alpha = if head < window {
            (head / self.fade_time).min(1.0)
        } else if tail < window {
            (tail / self.fade_time).min(1.0)
        } else {
            0.0
        };
        alpha as f32
    }

    pub fn water_visible(&self, phase: f64) -> bool {
        let [start, end] = self.water;
        start <= phase && phase <= end
    }

    fn scale(&self) -> f64 {
        self.loop_duration / REFERENCE_LOOP_SECONDS
    }

    /// Active segment index and normalized progress through it.
    pub fn segment_at(&self, phase: f64) -> (usize, f64) {
        let scale = self.scale();
        let mut start = 0.0;
        for (i, segment) in self.segments.iter().enumerate() {
            let end = segment.end * scale;
            if phase < end || i + 1 == self.segments.len() {
                let span = end - start;
                let x = if span > 0.0 { (phase - start) / span } else { 1.0 };
                return (i, x.clamp(0.0, 1.0));
            }
            start = end;
        }
        (0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Timeline {
        Timeline::from_config(&TimelineConfig::default())
    }

    #[test]
    fn test_ease_endpoints_and_symmetry() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(0.5), 0.5);
        assert_eq!(ease(1.0), 1.0);
        assert!((ease(0.25) - 0.125).abs() < 1e-12);
        assert!((ease(0.25) + ease(0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_phase_wraps_negative_and_large_times() {
        let t = reference();
        assert_eq!(t.phase(5.0), 5.0);
        assert_eq!(t.phase(245.0), 5.0);
        assert_eq!(t.phase(-115.0), 5.0);
        assert_eq!(t.phase(120.0), 0.0);
    }

    #[test]
    fn test_overlay_alpha_profile() {
        let t = Timeline {
            fade_time: 2.0,
            ..reference()
        };
        assert_eq!(t.overlay_alpha(0.0), 0.0);
        assert_eq!(t.overlay_alpha(1.0), 0.5);
        assert_eq!(t.overlay_alpha(2.0), 1.0);
        assert_eq!(t.overlay_alpha(6.9), 1.0);
        assert_eq!(t.overlay_alpha(7.0), 0.0);
        assert_eq!(t.overlay_alpha(60.0), 0.0);
        assert_eq!(t.overlay_alpha(115.0), 1.0);
        assert_eq!(t.overlay_alpha(119.0), 0.5);
    }

    #[test]
    fn test_overlay_alpha_reaches_one_at_fade_time() {
        let t = reference();
        assert_eq!(t.overlay_alpha(t.fade_time), 1.0);
        assert_eq!(t.overlay_alpha(0.5), 0.5);
    }

    #[test]
    fn test_water_interval_is_closed() {
        let t = reference();
        assert!(!t.water_visible(29.999));
        assert!(t.water_visible(30.0));
        assert!(t.water_visible(60.0));
        assert!(t.water_visible(95.0));
        assert!(!t.water_visible(95.001));
        assert!(!t.water_visible(5.0));
    }

    #[test]
    fn test_segment_lookup() {
        let t = reference();
        assert_eq!(t.segment_at(0.0), (0, 0.0));
        assert_eq!(t.segment_at(5.0), (0, 0.5));
        assert_eq!(t.segment_at(10.0), (1, 0.0));
        assert_eq!(t.segment_at(20.0), (1, 0.5));
        assert_eq!(t.segment_at(70.0), (3, 0.5));
        assert_eq!(t.segment_at(118.5).0, 6);
    }

    #[test]
    fn test_segments_scale_with_duration() {
        let t = Timeline::from_config(&TimelineConfig {
            loop_duration: 60.0,
            ..Default::default()
        });
        assert_eq!(t.segment_at(5.0), (1, 0.0));
        assert_eq!(t.segment_at(35.0), (3, 0.5));
    }

    #[test]
    fn test_orbit_radius_and_sweep() {
        let wp = Waypoints {
            door: Vec3::ZERO,
            center: Vec3::new(0.0, 1.6, 0.0),
            sink_front: Vec3::new(0.0, 1.6, 1.0),
            sink_target: Vec3::ZERO,
        };
        let orbit = Orbit::new(&wp, 3.0, 2.0);
        assert!((orbit.radius - 0.7).abs() < 1e-6);
        let start = orbit.at(0.0);
        assert!((start - Vec3::new(0.0, 1.6, 0.7)).length() < 1e-5);
        let end = orbit.at(1.0);
        assert!((end - Vec3::new(0.7, 1.6, 0.0)).length() < 1e-5);
        for i in 0..=8 {
            let p = orbit.at(i as f32 / 8.0);
            assert!(((p - wp.center).length() - 0.7).abs() < 1e-5);
            assert_eq!(p.y, 1.6);
        }
    }
}
