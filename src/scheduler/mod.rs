//! Scheduler: the per-frame walkthrough clock.
//!
//! Holds the loop start and the resolved waypoints; `tick` is a pure function
//! of those plus the current time. Nothing here mutates between frames.

pub mod timeline;

use glam::Vec3;

use crate::engine::ScenePlan;
use crate::types::{LoopState, Waypoints};
use timeline::{Anchor, Motion, Orbit, Timeline, ease};

#[derive(Debug, Clone)]
pub struct Scheduler {
    loop_start: f64,
    timeline: Timeline,
    waypoints: Waypoints,
    orbit: Orbit,
}

impl Scheduler {
    /// `timeline` must come from a validated configuration: a non-positive
    /// loop duration makes every phase NaN.
    pub fn new(loop_start: f64, timeline: Timeline, waypoints: Waypoints, orbit: Orbit) -> Self {
        Scheduler {
            loop_start,
            timeline,
            waypoints,
            orbit,
        }
    }

    pub fn for_plan(plan: &ScenePlan, loop_start: f64) -> Self {
        let orbit = Orbit::new(&plan.waypoints, plan.room.length, plan.room.width);
        Self::new(
            loop_start,
            Timeline::from_config(&plan.timeline),
            plan.waypoints,
            orbit,
        )
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn waypoints(&self) -> &Waypoints {
        &self.waypoints
    }

    pub fn tick(&self, now: f64) -> LoopState {
        let phase = self.timeline.phase(now - self.loop_start);
        let (segment, x) = self.timeline.segment_at(phase);
        let current = &self.timeline.segments[segment];

        let camera_position = match current.motion {
            Motion::Hold { at } => self.anchor(at),
            Motion::Ease { from, to } => self.anchor(from).lerp(self.anchor(to), ease(x) as f32),
            Motion::Orbit => self.orbit.at(x as f32),
        };

        LoopState {
            phase,
            segment,
            camera_position,
            camera_target: self.anchor(current.target),
            water_visible: self.timeline.water_visible(phase),
            overlay_alpha: self.timeline.overlay_alpha(phase),
        }
    }

    fn anchor(&self, anchor: Anchor) -> Vec3 {
        match anchor {
            Anchor::Door => self.waypoints.door,
            Anchor::Center => self.waypoints.center,
            Anchor::SinkFront => self.waypoints.sink_front,
            Anchor::SinkTarget => self.waypoints.sink_target,
            Anchor::OrbitEnd => self.orbit.at(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::source::TimelineConfig;

    fn scheduler(loop_start: f64) -> Scheduler {
        let waypoints = Waypoints {
            door: Vec3::new(-1.1, 1.6, 0.0),
            center: Vec3::new(0.0, 1.6, 0.0),
            sink_front: Vec3::new(-0.5, 1.6, -0.05),
            sink_target: Vec3::new(-0.5, 1.0, 0.75),
        };
        let orbit = Orbit::new(&waypoints, 3.0, 2.2);
        Scheduler::new(
            loop_start,
            Timeline::from_config(&TimelineConfig::default()),
            waypoints,
            orbit,
        )
    }

    #[test]
    fn test_reference_scenario_at_five_seconds() {
        let s = scheduler(0.0);
        let state = s.tick(5.0);
        assert_eq!(state.phase, 5.0);
        assert_eq!(state.overlay_alpha, 1.0);
        assert!(!state.water_visible);
        assert_eq!(state.segment, 0);
        assert_eq!(state.camera_position, s.waypoints().door);
        assert_eq!(state.camera_target, s.waypoints().center);
    }

    #[test]
    fn test_short_loop_overlay_windows_overlap() {
        let config = TimelineConfig { loop_duration: 10.0, ..Default::default() };
        let base = scheduler(0.0);
        let s = Scheduler::new(0.0, Timeline::from_config(&config), *base.waypoints(), base.orbit);

        assert_eq!(s.tick(0.5).overlay_alpha, 0.5);
        assert_eq!(s.tick(5.0).overlay_alpha, 1.0);
        assert_eq!(s.tick(9.5).overlay_alpha, 0.5);
        assert_eq!(s.tick(12.5), s.tick(2.5));
        assert_eq!(s.tick(0.5).segment, 0);
        assert_eq!(s.tick(9.9).segment, 6);
    }

    #[test]
    fn test_tick_is_periodic() {
        let s = scheduler(3.25);
        for t in [0.0, 7.5, 22.25, 61.0, 100.5, 118.75] {
            for k in [-2.0, 1.0, 3.0, 10.0] {
                assert_eq!(s.tick(t), s.tick(t + k * 120.0), "t={t} k={k}");
            }
        }
    }

    #[test]
    fn test_loop_start_offsets_phase() {
        let s = scheduler(1000.0);
        assert_eq!(s.tick(1005.0).phase, 5.0);
        assert_eq!(s.tick(995.0).phase, 115.0);
    }

    #[test]
    fn test_ease_segment_midpoint_and_ends() {
        let s = scheduler(0.0);
        let wp = *s.waypoints();
        let start = s.tick(10.0).camera_position;
        let mid = s.tick(20.0).camera_position;
        assert!((start - wp.door).length() < 1e-6);
        assert!((mid - (wp.door + wp.sink_front) / 2.0).length() < 1e-5);
        assert!((s.tick(30.0).camera_position - wp.sink_front).length() < 1e-6);
    }

    #[test]
    fn test_water_follows_reference_interval() {
        let s = scheduler(0.0);
        assert!(!s.tick(29.5).water_visible);
        assert!(s.tick(30.0).water_visible);
        assert!(s.tick(95.0).water_visible);
        assert!(!s.tick(95.5).water_visible);
    }

    #[test]
    fn test_orbit_keeps_radius_and_height() {
        let s = scheduler(0.0);
        let radius = 2.2 * 0.35;
        for t in [50.0, 60.0, 75.0, 89.0] {
            let state = s.tick(t);
            assert_eq!(state.segment, 3);
            let offset = state.camera_position - s.waypoints().center;
            assert!((offset.length() - radius).abs() < 1e-4);
            assert!(offset.y.abs() < 1e-6);
            assert_eq!(state.camera_target, s.waypoints().center);
        }
    }

    #[test]
    fn test_path_is_continuous_after_orbit_and_at_wrap() {
        let s = scheduler(0.0);
        let eps = 1e-6;
        let before = s.tick(90.0 - eps).camera_position;
        let after = s.tick(90.0).camera_position;
        assert!((before - after).length() < 1e-3);

        let end = s.tick(120.0 - eps).camera_position;
        let start = s.tick(0.0).camera_position;
        assert!((end - start).length() < 1e-6);
    }
}
