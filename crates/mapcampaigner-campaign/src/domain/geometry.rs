//! Geo helpers: the stored polygon region, axis correction, bounding boxes
//! and the buffer circle used by proximity search.
//!
//! Stored positions are `[lon, lat]`. Everything downstream of
//! [`correct_ring`] works in `[lat, lon]`, and distances are raw coordinate
//! units with no projection.

use std::f64::consts::TAU;

use mapcampaigner_core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A coordinate pair.
pub type Position = [f64; 2];

/// Segments per quarter circle when approximating a buffer circle.
pub const QUADRANT_SEGMENTS: usize = 16;

/// A GeoJSON-like FeatureCollection holding one polygon feature.
///
/// The document is kept verbatim so that properties and other members
/// survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geometry(Value);

impl Geometry {
    /// Wraps a decoded GeoJSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The underlying GeoJSON value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The first feature's outer ring, in stored `[lon, lat]` order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidGeometry` if there is no feature, no
    /// polygon ring, or a position is not a pair of numbers.
    pub fn outer_ring(&self) -> Result<Vec<Position>, DomainError> {
        let feature = self
            .features()?
            .first()
            .ok_or_else(|| invalid("collection has no features"))?;
        let ring = feature
            .get("geometry")
            .and_then(|geometry| geometry.get("coordinates"))
            .and_then(Value::as_array)
            .and_then(|rings| rings.first())
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("feature has no polygon ring"))?;

        ring.iter()
            .enumerate()
            .map(|(index, position)| {
                position_of(position)
                    .ok_or_else(|| invalid(&format!("position {index} is not a [lon, lat] pair")))
            })
            .collect()
    }

    /// The outer ring with each pair swapped to `[lat, lon]`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidGeometry` as [`Geometry::outer_ring`] does.
    pub fn corrected_ring(&self) -> Result<Vec<Position>, DomainError> {
        Ok(correct_ring(&self.outer_ring()?))
    }

    /// Checks that the collection holds exactly one feature with a non-empty
    /// polygon ring.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidGeometry` describing the first problem.
    pub fn check_shape(&self) -> Result<(), DomainError> {
        let count = self.features()?.len();
        if count != 1 {
            return Err(invalid(&format!("expected exactly one feature, found {count}")));
        }
        if self.outer_ring()?.is_empty() {
            return Err(invalid("polygon ring is empty"));
        }
        Ok(())
    }

    fn features(&self) -> Result<&Vec<Value>, DomainError> {
        self.0
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("not a feature collection"))
    }
}

/// Swaps every `[lon, lat]` pair to `[lat, lon]`.
#[must_use]
pub fn correct_ring(ring: &[Position]) -> Vec<Position> {
    ring.iter().map(|&[lon, lat]| [lat, lon]).collect()
}

/// Minimal enclosing rectangle in `[lat, lon]` axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Bounds of `positions` given in `[lat, lon]` order; `None` when empty.
    #[must_use]
    pub fn from_positions(positions: &[Position]) -> Option<Self> {
        let (&[lat, lon], rest) = positions.split_first()?;
        let start = Self {
            min_lat: lat,
            min_lon: lon,
            max_lat: lat,
            max_lon: lon,
        };
        Some(rest.iter().fold(start, |bbox, &[lat, lon]| Self {
            min_lat: bbox.min_lat.min(lat),
            min_lon: bbox.min_lon.min(lon),
            max_lat: bbox.max_lat.max(lat),
            max_lon: bbox.max_lon.max(lon),
        }))
    }

    /// `[min_lat, min_lon, max_lat, max_lon]`.
    #[must_use]
    pub fn as_array(&self) -> [f64; 4] {
        [self.min_lat, self.min_lon, self.max_lat, self.max_lon]
    }
}

/// A disk around a point, approximated by a regular polygon with
/// `4 * QUADRANT_SEGMENTS` vertices on the circle.
#[derive(Debug, Clone)]
pub struct BufferCircle {
    center: Position,
    radius: f64,
    vertices: Vec<Position>,
}

impl BufferCircle {
    /// Builds the buffer of `radius` around `center`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(center: Position, radius: f64) -> Self {
        let count = QUADRANT_SEGMENTS * 4;
        let vertices = (0..count)
            .map(|index| {
                let angle = TAU * index as f64 / count as f64;
                [
                    center[0] + radius * angle.cos(),
                    center[1] + radius * angle.sin(),
                ]
            })
            .collect();
        Self {
            center,
            radius,
            vertices,
        }
    }

    #[must_use]
    pub fn center(&self) -> Position {
        self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `point` lies strictly inside the polygon.
    #[must_use]
    pub fn contains_point(&self, point: Position) -> bool {
        // Vertices run counter-clockwise, so the interior is left of every edge.
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .all(|(a, b)| {
                (b[0] - a[0]) * (point[1] - a[1]) - (b[1] - a[1]) * (point[0] - a[0]) > 0.0
            })
    }

    /// Whether the polygon bounded by `ring` lies inside the buffer. The
    /// buffer is convex, so this holds exactly when every vertex does. An
    /// empty ring is never contained.
    ///
    /// Containment is strict: a ring with a vertex exactly on the buffer's
    /// edge is not contained, unlike boundary-inclusive containment where
    /// such a ring still counts as inside.
    #[must_use]
    pub fn contains_ring(&self, ring: &[Position]) -> bool {
        !ring.is_empty() && ring.iter().all(|&position| self.contains_point(position))
    }
}

/// Parses a `"lat,lon"` string.
///
/// # Errors
///
/// Returns `DomainError::InvalidCoordinate` unless the input is exactly two
/// comma-separated finite numbers.
pub fn parse_coordinate(input: &str) -> Result<Position, DomainError> {
    let parsed: Option<Vec<f64>> = input
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect();
    match parsed.as_deref() {
        Some(&[lat, lon]) => Ok([lat, lon]),
        _ => Err(DomainError::InvalidCoordinate(input.to_owned())),
    }
}

fn position_of(value: &Value) -> Option<Position> {
    match value.as_array()?.as_slice() {
        [x, y, ..] => Some([x.as_f64()?, y.as_f64()?]),
        _ => None,
    }
}

fn invalid(reason: &str) -> DomainError {
    DomainError::InvalidGeometry(reason.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcampaigner_test_support::square_geometry;
    use serde_json::json;

    #[test]
    fn test_outer_ring_reads_first_feature_in_stored_order() {
        let geometry = Geometry::new(square_geometry(100.5, 0.5, 0.5));

        let ring = geometry.outer_ring().unwrap();

        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], [100.0, 0.0]);
        assert_eq!(ring[2], [101.0, 1.0]);
    }

    #[test]
    fn test_corrected_ring_swaps_axis_order() {
        let geometry = Geometry::new(square_geometry(100.5, 0.5, 0.5));

        let ring = geometry.corrected_ring().unwrap();

        assert_eq!(ring[0], [0.0, 100.0]);
        assert_eq!(ring[2], [1.0, 101.0]);
    }

    #[test]
    fn test_check_shape_rejects_multiple_features() {
        let mut value = square_geometry(0.0, 0.0, 1.0);
        let feature = value["features"][0].clone();
        value["features"] = json!([feature.clone(), feature]);

        match Geometry::new(value).check_shape() {
            Err(DomainError::InvalidGeometry(reason)) => {
                assert!(reason.contains("exactly one feature"));
            }
            other => panic!("expected InvalidGeometry, got {other:?}"),
        }
    }

    #[test]
    fn test_outer_ring_rejects_malformed_positions() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], ["a", 1.0]]]}
            }]
        });

        match Geometry::new(value).outer_ring() {
            Err(DomainError::InvalidGeometry(reason)) => assert!(reason.contains("position 1")),
            other => panic!("expected InvalidGeometry, got {other:?}"),
        }
    }

    #[test]
    fn test_bounding_box_of_square_in_lat_lon_order() {
        let geometry = Geometry::new(square_geometry(100.5, 0.5, 0.5));
        let ring = geometry.corrected_ring().unwrap();

        let bbox = BoundingBox::from_positions(&ring).unwrap();

        assert_eq!(bbox.as_array(), [0.0, 100.0, 1.0, 101.0]);
    }

    #[test]
    fn test_bounding_box_of_nothing_is_none() {
        assert!(BoundingBox::from_positions(&[]).is_none());
    }

    #[test]
    fn test_buffer_circle_contains_small_square_at_center() {
        let circle = BufferCircle::new([0.0, 0.0], 3.0);
        let ring = correct_ring(&[[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]]);

        assert!(circle.contains_ring(&ring));
    }

    #[test]
    fn test_buffer_circle_excludes_distant_and_straddling_rings() {
        let circle = BufferCircle::new([0.0, 0.0], 3.0);

        assert!(!circle.contains_ring(&[[9.0, 9.0], [11.0, 9.0], [11.0, 11.0]]));
        assert!(!circle.contains_ring(&[[0.0, 0.0], [4.0, 0.0], [0.0, 1.0]]));
        assert!(!circle.contains_ring(&[]));
    }

    #[test]
    fn test_buffer_circle_is_a_polygon_inside_the_true_circle() {
        let circle = BufferCircle::new([0.0, 0.0], 3.0);
        let mid_edge = std::f64::consts::PI / 64.0;

        // Vertices sit on the circle; edge midpoints sit at r * cos(pi / 64).
        assert!(circle.contains_point([2.99, 0.0]));
        assert!(circle.contains_point([2.99 * mid_edge.cos(), 2.99 * mid_edge.sin()]));
        assert!(!circle.contains_point([2.999 * mid_edge.cos(), 2.999 * mid_edge.sin()]));
        assert!(!circle.contains_point([3.0, 0.0]));
    }

    #[test]
    fn test_buffer_circle_excludes_ring_touching_its_edge() {
        let circle = BufferCircle::new([0.0, 0.0], 3.0);

        let touching = [[0.0, 0.0], [1.0, 0.0], [3.0, 0.0], [0.0, 1.0]];
        let inside = [[0.0, 0.0], [1.0, 0.0], [2.9, 0.0], [0.0, 1.0]];

        assert!(!circle.contains_point([3.0, 0.0]));
        assert!(!circle.contains_ring(&touching));
        assert!(circle.contains_ring(&inside));
    }

    #[test]
    fn test_buffer_circle_is_centred_on_its_point() {
        let circle = BufferCircle::new([10.0, -20.0], 3.0);

        assert_eq!(circle.center(), [10.0, -20.0]);
        assert!((circle.radius() - 3.0).abs() < f64::EPSILON);
        assert!(circle.contains_point([10.0, -20.0]));
        assert!(!circle.contains_point([0.0, 0.0]));
    }

    #[test]
    fn test_parse_coordinate_accepts_lat_lon_pairs() {
        assert_eq!(parse_coordinate("1.5,-2").unwrap(), [1.5, -2.0]);
        assert_eq!(parse_coordinate(" 0 , 0 ").unwrap(), [0.0, 0.0]);
    }

    #[test]
    fn test_parse_coordinate_rejects_other_shapes() {
        for input in ["", "1", "1,2,3", "a,b", "NaN,0", "1;2"] {
            match parse_coordinate(input) {
                Err(DomainError::InvalidCoordinate(found)) => assert_eq!(found, input),
                other => panic!("expected InvalidCoordinate for {input:?}, got {other:?}"),
            }
        }
    }
}
