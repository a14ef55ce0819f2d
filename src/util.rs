//! Utility functions for colors and arrowhead geometry.

use crate::draw::{Color, color::*};

// ============================================================================
// Arrowhead Geometry
// ============================================================================

/// Computes the two free endpoints of a chevron arrowhead.
///
/// The chevron is rooted at the tip and opens backwards along the stroke
/// direction: both arms sweep away from `direction` by a fixed spread so the
/// head reads as an arrow regardless of stroke width.
///
/// # Arguments
/// * `tip_x`, `tip_y` - Arrowhead tip coordinates (the stroke endpoint)
/// * `size` - Arrowhead scale; arm length is twice this
/// * `direction` - Stroke direction at the endpoint, radians
///
/// # Returns
/// Array of two points `[(left_x, left_y), (right_x, right_y)]`.
pub fn chevron_points(tip_x: f64, tip_y: f64, size: f64, direction: f64) -> [(f64, f64); 2] {
    // 30 degrees either side of the reversed direction
    const SPREAD: f64 = std::f64::consts::PI / 6.0;
    let arm = (size * 2.0).max(1.0);
    let back = direction + std::f64::consts::PI;

    let left = (
        tip_x + arm * (back + SPREAD).cos(),
        tip_y + arm * (back + SPREAD).sin(),
    );
    let right = (
        tip_x + arm * (back - SPREAD).cos(),
        tip_y + arm * (back - SPREAD).sin(),
    );
    [left, right]
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from tool presets.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "orange", "pink", "white", "black"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BLACK, WHITE};

    #[test]
    fn chevron_arms_point_behind_the_tip() {
        // Stroke moving in +x: both arms must land at x < tip.
        let [(lx, ly), (rx, ry)] = chevron_points(50.0, 50.0, 10.0, 0.0);
        assert!(lx < 50.0);
        assert!(rx < 50.0);
        // Arms straddle the stroke axis symmetrically.
        assert!((ly - 50.0) * (ry - 50.0) < 0.0);
        assert!(((ly - 50.0) + (ry - 50.0)).abs() < 1e-9);
    }

    #[test]
    fn chevron_arm_length_scales_with_size() {
        let [(lx, ly), _] = chevron_points(0.0, 0.0, 5.0, 0.0);
        let arm = (lx * lx + ly * ly).sqrt();
        assert!((arm - 10.0).abs() < 1e-9);
    }

    #[test]
    fn name_color_mapping_knows_the_palette() {
        assert_eq!(name_to_color("white").unwrap(), WHITE);
        assert_eq!(name_to_color("Black").unwrap(), BLACK);
        assert!(name_to_color("chartreuse").is_none());
    }
}
