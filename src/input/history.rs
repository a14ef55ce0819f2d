//! Per-stroke coordinate log and arrowhead geometry.

use std::collections::VecDeque;

/// Samples retained per stroke. Enough to measure a trailing segment of a few
/// hundred pixels; this is not a full stroke record.
const MAX_SAMPLES: usize = 256;

/// One recorded stroke sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordSample {
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

/// Parameters for the end-of-stroke arrowhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowParams {
    /// Average stroke width over the measured trailing span
    pub width: f64,
    /// Direction of travel at the endpoint, radians
    pub direction: f64,
}

/// Bounded newest-first log of recent stroke samples.
///
/// Non-empty only between stroke start and stroke end; the router clears it
/// on button-up regardless of outcome. Its sole purpose is to supply enough
/// trailing geometry to fit an arrowhead direction and width.
#[derive(Debug, Default)]
pub struct CoordinateHistory {
    samples: VecDeque<CoordSample>,
}

impl CoordinateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a sample (newest first), dropping the oldest past the cap.
    pub fn push(&mut self, x: f64, y: f64, width: f64) {
        if self.samples.len() >= MAX_SAMPLES {
            self.samples.pop_back();
        }
        self.samples.push_front(CoordSample { x, y, width });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Fits arrowhead parameters to the trailing span of the stroke.
    ///
    /// Walks backward from the endpoint accumulating path length until
    /// `min_path_length` is covered or the log runs out; a stroke shorter
    /// than the requested span still yields parameters from whatever is
    /// available. Fails only when fewer than two samples exist.
    pub fn arrow_params(&self, min_path_length: f64) -> Option<ArrowParams> {
        if self.samples.len() < 2 {
            log::debug!(
                "Arrow fit needs at least 2 samples, have {}",
                self.samples.len()
            );
            return None;
        }

        let end = self.samples[0];
        let mut path_len = 0.0;
        let mut width_sum = end.width;
        let mut count = 1usize;
        let mut back = end;

        for i in 0..self.samples.len() - 1 {
            let (newer, older) = (self.samples[i], self.samples[i + 1]);
            path_len += ((newer.x - older.x).powi(2) + (newer.y - older.y).powi(2)).sqrt();
            width_sum += older.width;
            count += 1;
            back = older;
            if path_len >= min_path_length {
                break;
            }
        }

        let direction = (end.y - back.y).atan2(end.x - back.x);
        Some(ArrowParams {
            width: width_sum / count as f64,
            direction,
        })
    }
}
