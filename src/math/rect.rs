//! Planar axis-aligned bounding rectangle

use crate::core::types::Vec2;

/// Axis-aligned rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create rect from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create rect from center and half-extents
    pub fn from_center_half_extent(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Get center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if point is inside the rect
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y
    }

    /// Squared distance from a point to the nearest edge, zero inside
    pub fn distance_sq_to_point(&self, p: Vec2) -> f32 {
        let dx = (self.min.x - p.x).max(p.x - self.max.x).max(0.0);
        let dy = (self.min.y - p.y).max(p.y - self.max.y).max(0.0);
        dx * dx + dy * dy
    }

    /// Distance from a point to the nearest edge, zero inside
    pub fn distance_to_point(&self, p: Vec2) -> f32 {
        self.distance_sq_to_point(p).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let rect = Rect::new(Vec2::ZERO, Vec2::ONE);
        assert_eq!(rect.center(), Vec2::splat(0.5));
        assert_eq!(rect.size(), Vec2::ONE);
    }

    #[test]
    fn test_from_center_half_extent() {
        let rect = Rect::from_center_half_extent(Vec2::ZERO, Vec2::splat(120.0));
        assert_eq!(rect.min, Vec2::splat(-120.0));
        assert_eq!(rect.max, Vec2::splat(120.0));
    }

    #[test]
    fn test_contains_point() {
        let rect = Rect::new(Vec2::ZERO, Vec2::ONE);
        assert!(rect.contains_point(Vec2::splat(0.5)));
        assert!(rect.contains_point(Vec2::ONE));
        assert!(!rect.contains_point(Vec2::splat(2.0)));
    }

    #[test]
    fn test_distance_inside_is_zero() {
        let rect = Rect::new(Vec2::splat(-1.0), Vec2::splat(1.0));
        assert_eq!(rect.distance_to_point(Vec2::ZERO), 0.0);
        assert_eq!(rect.distance_to_point(Vec2::ONE), 0.0);
    }

    #[test]
    fn test_distance_to_edge() {
        let rect = Rect::new(Vec2::splat(-1.0), Vec2::splat(1.0));
        // Straight out along +x
        assert_eq!(rect.distance_to_point(Vec2::new(4.0, 0.0)), 3.0);
        // Diagonal from a corner
        let d = rect.distance_to_point(Vec2::new(4.0, 5.0));
        assert!((d - (9.0f32 + 16.0).sqrt()).abs() < 1e-6);
    }
}
