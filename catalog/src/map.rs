//! Map geometry consumed by path following and tower placement.

use serde::{Deserialize, Serialize};
use space_salvagers_core::Vec2;

/// Static map description produced by the level authoring tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    /// Ordered enemy path from spawn to station.
    pub path: Vec<Vec2>,
    /// Tower placement options.
    pub build_nodes: Vec<Vec2>,
    /// Additional placement options with no special behaviour in the simulation.
    #[serde(default)]
    pub special_nodes: Vec<Vec2>,
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            path: vec![
                Vec2::new(0.0, 100.0),
                Vec2::new(800.0, 100.0),
                Vec2::new(800.0, 300.0),
                Vec2::new(200.0, 300.0),
                Vec2::new(200.0, 500.0),
                Vec2::new(1000.0, 500.0),
            ],
            build_nodes: vec![
                Vec2::new(150.0, 40.0),
                Vec2::new(400.0, 40.0),
                Vec2::new(650.0, 40.0),
                Vec2::new(300.0, 200.0),
                Vec2::new(500.0, 200.0),
                Vec2::new(700.0, 200.0),
                Vec2::new(880.0, 200.0),
                Vec2::new(120.0, 400.0),
                Vec2::new(400.0, 400.0),
                Vec2::new(600.0, 400.0),
                Vec2::new(280.0, 420.0),
                Vec2::new(450.0, 570.0),
                Vec2::new(700.0, 570.0),
                Vec2::new(900.0, 430.0),
            ],
            special_nodes: vec![Vec2::new(960.0, 580.0)],
        }
    }
}

impl MapLayout {
    /// Every placement option, build nodes first.
    pub fn placement_nodes(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.build_nodes
            .iter()
            .chain(self.special_nodes.iter())
            .copied()
    }
}

/// Arc-length parameterised polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct PathGeometry {
    points: Vec<Vec2>,
    cumulative: Vec<f32>,
    length: f32,
}

impl PathGeometry {
    /// Builds the geometry from an ordered list of points.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut length = 0.0;
        for (index, point) in points.iter().enumerate() {
            if index > 0 {
                length += points[index - 1].distance(*point);
            }
            cumulative.push(length);
        }
        Self {
            points,
            cumulative,
            length,
        }
    }

    /// Total length in world units.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Ordered path points.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// First point of the path, or the origin for an empty path.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Position at normalised progress, clamped to `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, progress: f32) -> Vec2 {
        let Some(last) = self.points.last().copied() else {
            return Vec2::ZERO;
        };
        if self.length <= f32::EPSILON {
            return last;
        }
        let travelled = progress.clamp(0.0, 1.0) * self.length;
        let segment = self
            .cumulative
            .partition_point(|distance| *distance <= travelled)
            .clamp(1, self.points.len() - 1);
        let from = self.cumulative[segment - 1];
        let span = self.cumulative[segment] - from;
        if span <= f32::EPSILON {
            return self.points[segment];
        }
        self.points[segment - 1].lerp(self.points[segment], (travelled - from) / span)
    }

    /// Shortest distance between a point and the path.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        match self.points.as_slice() {
            [] => f32::INFINITY,
            [only] => only.distance(point),
            points => points
                .windows(2)
                .map(|pair| point.distance_to_segment(pair[0], pair[1]))
                .fold(f32::INFINITY, f32::min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_path() -> PathGeometry {
        PathGeometry::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
        ])
    }

    #[test]
    fn length_sums_segments() {
        assert!((l_path().length() - 200.0).abs() < 1e-4);
    }

    #[test]
    fn point_at_walks_segments_by_arc_length() {
        let path = l_path();
        assert_eq!(path.point_at(0.0), Vec2::new(0.0, 0.0));
        assert_eq!(path.point_at(0.25), Vec2::new(50.0, 0.0));
        assert_eq!(path.point_at(0.5), Vec2::new(100.0, 0.0));
        assert_eq!(path.point_at(0.75), Vec2::new(100.0, 50.0));
        assert_eq!(path.point_at(1.0), Vec2::new(100.0, 100.0));
        assert_eq!(path.point_at(7.0), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn distance_to_uses_closest_segment() {
        let path = l_path();
        assert!((path.distance_to(Vec2::new(50.0, 30.0)) - 30.0).abs() < 1e-4);
        assert!((path.distance_to(Vec2::new(130.0, 60.0)) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_paths_do_not_panic() {
        let empty = PathGeometry::new(Vec::new());
        assert_eq!(empty.point_at(0.5), Vec2::ZERO);
        assert_eq!(empty.length(), 0.0);

        let single = PathGeometry::new(vec![Vec2::new(3.0, 4.0)]);
        assert_eq!(single.point_at(0.5), Vec2::new(3.0, 4.0));
        assert!((single.distance_to(Vec2::ZERO) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn default_layout_keeps_nodes_off_the_path() {
        let layout = MapLayout::default();
        let path = PathGeometry::new(layout.path.clone());
        for node in layout.placement_nodes() {
            assert!(path.distance_to(node) >= 30.0, "{node:?} sits on the path");
        }
    }
}
