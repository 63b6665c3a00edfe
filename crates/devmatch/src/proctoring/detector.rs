//! Face detection for webcam snapshots.

use rand::Rng;

/// Counts faces in an uploaded snapshot.
pub trait FaceDetector: Send + Sync {
    fn count_faces(&self, image_data: &str) -> u32;
}

/// Simulated detector: usually one face, sometimes none or two.
#[derive(Debug, Clone)]
pub struct SimulatedFaceDetector {
    no_face_probability: f64,
    multiple_faces_probability: f64,
}

impl SimulatedFaceDetector {
    pub fn new(no_face_probability: f64, multiple_faces_probability: f64) -> Self {
        Self {
            no_face_probability: no_face_probability.clamp(0.0, 1.0),
            multiple_faces_probability: multiple_faces_probability.clamp(0.0, 1.0),
        }
    }

    pub fn no_face_probability(&self) -> f64 {
        self.no_face_probability
    }

    pub fn multiple_faces_probability(&self) -> f64 {
        self.multiple_faces_probability
    }
}

impl Default for SimulatedFaceDetector {
    fn default() -> Self {
        Self::new(0.05, 0.02)
    }
}

impl FaceDetector for SimulatedFaceDetector {
    fn count_faces(&self, _image_data: &str) -> u32 {
        let roll: f64 = rand::rng().random();
        if roll < self.no_face_probability {
            0
        } else if roll < self.no_face_probability + self.multiple_faces_probability {
            2
        } else {
            1
        }
    }
}

/// Detector that always reports the same count.
#[derive(Debug, Clone, Copy)]
pub struct FixedFaceDetector(pub u32);

impl FaceDetector for FixedFaceDetector {
    fn count_faces(&self, _image_data: &str) -> u32 {
        self.0
    }
}
