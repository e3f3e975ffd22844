//! Coordinate point sets
//!
//! Areas are built by Area clauses and narrowed - never widened - by
//! Filter clauses. Effects receive the final narrowed set.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A set of grid points.
///
/// Backed by an ordered set so iteration order is deterministic - effects
/// that walk an area produce stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    points: BTreeSet<Point>,
}

impl Area {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point. Returns false if it was already present.
    pub fn insert(&mut self, point: Point) -> bool {
        self.points.insert(point)
    }

    /// Remove a point. Returns false if it was not present.
    pub fn remove(&mut self, point: Point) -> bool {
        self.points.remove(&point)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.points.contains(&point)
    }

    /// Keep only points also present in `other`.
    pub fn intersect(&mut self, other: &Area) {
        self.points.retain(|point| other.contains(*point));
    }

    /// Keep only points for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Point) -> bool,
    {
        self.points.retain(|&point| keep(point));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Points in ascending `(x, y)` order.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }
}

impl FromIterator<Point> for Area {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<Point> for Area {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(points: &[(i32, i32)]) -> Area {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_insert_and_contains() {
        let mut a = Area::new();
        assert!(a.insert(Point::new(1, 2)));
        assert!(!a.insert(Point::new(1, 2)));
        assert!(a.contains(Point::new(1, 2)));
        assert!(!a.contains(Point::new(2, 1)));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_intersect_narrows() {
        let mut a = area(&[(0, 0), (1, 0), (2, 0)]);
        let b = area(&[(1, 0), (9, 9)]);
        a.intersect(&b);
        assert_eq!(a, area(&[(1, 0)]));
    }

    #[test]
    fn test_retain() {
        let mut a = area(&[(0, 0), (1, 0), (2, 0)]);
        a.retain(|point| point.x >= 1);
        assert_eq!(a, area(&[(1, 0), (2, 0)]));
    }

    #[test]
    fn test_iteration_is_ordered() {
        let a = area(&[(2, 0), (0, 5), (0, 1)]);
        let points: Vec<Point> = a.iter().collect();
        assert_eq!(
            points,
            vec![Point::new(0, 1), Point::new(0, 5), Point::new(2, 0)]
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let mut a = area(&[(0, 0), (1, 1)]);
        assert!(a.remove(Point::new(0, 0)));
        assert!(!a.remove(Point::new(0, 0)));
        a.clear();
        assert!(a.is_empty());
    }
}
