//! Posture evaluation from 2-D body landmarks.
//!
//! The neck angle is the ear-shoulder-hip angle in degrees; slouching pulls
//! the ear forward and shrinks it below the warning threshold. The face
//! distance proxy is the ear-to-ear distance in normalized image coordinates,
//! which grows as the face approaches the camera. A bad reading must persist
//! for a full streak of frames before it counts as a bad-posture event.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

/// The landmark subset one posture reading needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub left_ear: Landmark,
    pub right_ear: Landmark,
    pub left_shoulder: Landmark,
    pub left_hip: Landmark,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PostureThresholds {
    /// Neck angles below this many degrees indicate forward head posture.
    pub warning_angle: f64,
    /// Ear-to-ear distances above this indicate the face is too close.
    pub face_distance: f64,
    /// Consecutive bad readings required before an event is counted.
    pub streak_frames: u32,
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self {
            warning_angle: 150.0,
            face_distance: 0.5,
            streak_frames: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureReading {
    pub neck_angle: f64,
    pub face_distance: f64,
    pub is_bad_posture: bool,
    /// True on the reading where a bad streak first crosses the frame
    /// threshold.
    pub sustained_event: bool,
}

pub struct PostureMonitor {
    thresholds: PostureThresholds,
    bad_streak: u32,
    event_count: u64,
}

impl PostureMonitor {
    pub fn new(thresholds: PostureThresholds) -> Self {
        Self {
            thresholds,
            bad_streak: 0,
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Evaluates one frame of landmarks. Returns `None` for degenerate
    /// geometry (coincident landmarks), which resolves no reading rather
    /// than an error.
    pub fn evaluate(&mut self, frame: &LandmarkFrame) -> Option<PostureReading> {
        let neck_angle = neck_angle_degrees(frame.left_ear, frame.left_shoulder, frame.left_hip)?;
        let face_distance = face_distance(frame.left_ear, frame.right_ear);

        let is_bad_angle = neck_angle < self.thresholds.warning_angle;
        let is_too_close = face_distance > self.thresholds.face_distance;
        let is_bad_posture = is_bad_angle || is_too_close;

        let mut sustained_event = false;
        if is_bad_posture {
            self.bad_streak += 1;
            if self.bad_streak == self.thresholds.streak_frames + 1 {
                self.event_count += 1;
                sustained_event = true;
            }
        } else {
            self.bad_streak = 0;
        }

        Some(PostureReading {
            neck_angle,
            face_distance,
            is_bad_posture,
            sustained_event,
        })
    }
}

/// Angle at the shoulder between the ear and hip directions, in degrees.
fn neck_angle_degrees(ear: Landmark, shoulder: Landmark, hip: Landmark) -> Option<f64> {
    let v1 = (ear.x - shoulder.x, ear.y - shoulder.y);
    let v2 = (hip.x - shoulder.x, hip.y - shoulder.y);

    let norm1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let norm2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if norm1 == 0.0 || norm2 == 0.0 {
        return None;
    }

    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (norm1 * norm2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

fn face_distance(left_ear: Landmark, right_ear: Landmark) -> f64 {
    let dx = left_ear.x - right_ear.x;
    let dy = left_ear.y - right_ear.y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f64, y: f64) -> Landmark {
        Landmark { x, y }
    }

    // Image coordinates: y grows downward.
    fn upright_frame() -> LandmarkFrame {
        LandmarkFrame {
            left_ear: lm(0.5, 0.2),
            right_ear: lm(0.6, 0.2),
            left_shoulder: lm(0.5, 0.5),
            left_hip: lm(0.5, 0.9),
        }
    }

    fn slouched_frame() -> LandmarkFrame {
        LandmarkFrame {
            left_ear: lm(0.8, 0.2),
            right_ear: lm(0.9, 0.2),
            left_shoulder: lm(0.5, 0.5),
            left_hip: lm(0.5, 0.9),
        }
    }

    #[test]
    fn upright_posture_reads_straight_and_good() {
        let mut monitor = PostureMonitor::new(PostureThresholds::default());
        let reading = monitor.evaluate(&upright_frame()).unwrap();

        assert!((reading.neck_angle - 180.0).abs() < 1e-9);
        assert!(!reading.is_bad_posture);
    }

    #[test]
    fn forward_head_drops_below_warning_angle() {
        let mut monitor = PostureMonitor::new(PostureThresholds::default());
        let reading = monitor.evaluate(&slouched_frame()).unwrap();

        // Ear pulled forward of the shoulder: 135 degrees at the shoulder.
        assert!((reading.neck_angle - 135.0).abs() < 1e-6);
        assert!(reading.is_bad_posture);
    }

    #[test]
    fn close_face_flags_bad_posture_even_with_straight_neck() {
        let mut monitor = PostureMonitor::new(PostureThresholds::default());
        let mut frame = upright_frame();
        frame.right_ear = lm(1.1, 0.2);

        let reading = monitor.evaluate(&frame).unwrap();
        assert!(reading.face_distance > 0.5);
        assert!(reading.is_bad_posture);
    }

    #[test]
    fn sustained_event_fires_once_per_streak() {
        let thresholds = PostureThresholds {
            streak_frames: 3,
            ..PostureThresholds::default()
        };
        let mut monitor = PostureMonitor::new(thresholds);

        let mut events = 0;
        for _ in 0..10 {
            let reading = monitor.evaluate(&slouched_frame()).unwrap();
            if reading.sustained_event {
                events += 1;
            }
        }
        assert_eq!(events, 1);
        assert_eq!(monitor.event_count(), 1);

        // A good reading resets the streak, so a new streak counts again.
        monitor.evaluate(&upright_frame()).unwrap();
        for _ in 0..10 {
            monitor.evaluate(&slouched_frame()).unwrap();
        }
        assert_eq!(monitor.event_count(), 2);
    }

    #[test]
    fn degenerate_landmarks_yield_no_reading() {
        let mut monitor = PostureMonitor::new(PostureThresholds::default());
        let frame = LandmarkFrame {
            left_ear: lm(0.5, 0.5),
            right_ear: lm(0.6, 0.5),
            left_shoulder: lm(0.5, 0.5),
            left_hip: lm(0.5, 0.9),
        };
        assert!(monitor.evaluate(&frame).is_none());
    }
}
