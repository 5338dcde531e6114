//! Frontal-face scorer (C4, §4.3): a pure function over 5 facial
//! keypoints producing a frontality score in `[0.0, 1.0]`.

use vtrack_models::FaceLandmarks;

const VERTICAL_RATIO_MIN: f64 = 0.35;
const VERTICAL_RATIO_MAX: f64 = 0.75;

const SYMMETRY_WEIGHT: f64 = 0.35;
const ROLL_WEIGHT: f64 = 0.25;
const VERTICAL_WEIGHT: f64 = 0.20;
const MOUTH_SYMMETRY_WEIGHT: f64 = 0.20;

/// Score how frontal a face is, using inter-pupillary distance as the
/// scale reference for every other measurement. Degenerate landmarks
/// (eyes coincident) score `0.0` rather than dividing by zero.
pub fn frontal_face_score(landmarks: &FaceLandmarks) -> f64 {
    let le = landmarks.left_eye();
    let re = landmarks.right_eye();
    let nose = landmarks.nose();
    let lm = landmarks.left_mouth();
    let rm = landmarks.right_mouth();

    let eye_dist = distance(le.x, le.y, re.x, re.y);
    if eye_dist < 1e-6 {
        return 0.0;
    }

    let symmetry = symmetry_score(le.x, re.x, nose.x, eye_dist);
    let roll = roll_score(le.y, re.y, eye_dist);
    let vertical = vertical_score(nose.y, lm.y, rm.y, eye_dist);
    let mouth_symmetry = mouth_symmetry_score(lm.x, rm.x, nose.x, eye_dist);

    let score = SYMMETRY_WEIGHT * symmetry
        + ROLL_WEIGHT * roll
        + VERTICAL_WEIGHT * vertical
        + MOUTH_SYMMETRY_WEIGHT * mouth_symmetry;

    (score.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

/// Horizontal symmetry: how centered the nose is between the eyes.
fn symmetry_score(x_le: f64, x_re: f64, x_n: f64, eye_dist: f64) -> f64 {
    let eye_center_x = (x_le + x_re) / 2.0;
    let nose_offset = (x_n - eye_center_x).abs() / eye_dist;
    (1.0 - nose_offset).max(0.0)
}

/// Eye-line alignment (roll).
fn roll_score(y_le: f64, y_re: f64, eye_dist: f64) -> f64 {
    let eye_vertical_diff = (y_le - y_re).abs() / eye_dist;
    (1.0 - eye_vertical_diff).max(0.0)
}

/// Nose-to-mouth vertical proportion, penalized outside the expected
/// band (a tilted-back or tilted-forward head stretches or compresses
/// this ratio).
fn vertical_score(y_n: f64, y_lm: f64, y_rm: f64, eye_dist: f64) -> f64 {
    let mouth_center_y = (y_lm + y_rm) / 2.0;
    let vertical_ratio = (mouth_center_y - y_n) / eye_dist;

    if vertical_ratio < VERTICAL_RATIO_MIN {
        vertical_ratio / VERTICAL_RATIO_MIN
    } else if vertical_ratio > VERTICAL_RATIO_MAX {
        (1.0 - (vertical_ratio - VERTICAL_RATIO_MAX)).max(0.0)
    } else {
        1.0
    }
}

/// Horizontal mouth symmetry relative to the nose.
fn mouth_symmetry_score(x_lm: f64, x_rm: f64, x_n: f64, eye_dist: f64) -> f64 {
    let mouth_center_x = (x_lm + x_rm) / 2.0;
    let mouth_offset = (mouth_center_x - x_n).abs() / eye_dist;
    (1.0 - mouth_offset).max(0.0)
}
