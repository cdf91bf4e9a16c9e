//! Conversion from shapefile records to `geo` geometries.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape};

/// Converts a polygon shape (plain, M or Z) into a lon/lat
/// [`MultiPolygon`], dropping measure and elevation.
///
/// Returns `None` for non-polygon shapes.
#[must_use]
pub fn to_multipolygon(shape: &Shape) -> Option<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(p) => Some(from_rings(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Some(from_rings(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Some(from_rings(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        _ => None,
    }
}

/// Short label for a shape variant, used in skip warnings.
#[must_use]
pub const fn shape_kind(shape: &Shape) -> &'static str {
    match shape {
        Shape::NullShape => "null",
        Shape::Point(_) | Shape::PointM(_) | Shape::PointZ(_) => "point",
        Shape::Polyline(_) | Shape::PolylineM(_) | Shape::PolylineZ(_) => "polyline",
        Shape::Polygon(_) | Shape::PolygonM(_) | Shape::PolygonZ(_) => "polygon",
        Shape::Multipoint(_) | Shape::MultipointM(_) | Shape::MultipointZ(_) => "multipoint",
        Shape::Multipatch(_) => "multipatch",
    }
}

/// Groups rings into polygons: each outer ring owns the inner rings that
/// follow it. An inner ring with no preceding outer ring becomes an
/// exterior of its own.
fn from_rings<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in rings {
        let line = closed(ring.points().iter().map(&xy).collect());
        if line.0.len() < 4 {
            continue;
        }

        match ring {
            PolygonRing::Outer(_) => {
                if let Some(ext) = exterior.take() {
                    polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(line);
            }
            PolygonRing::Inner(_) => {
                if exterior.is_some() {
                    holes.push(line);
                } else {
                    polygons.push(Polygon::new(line, vec![]));
                }
            }
        }
    }

    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polygons)
}

fn closed(mut coords: Vec<Coord<f64>>) -> LineString<f64> {
    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied())
        && first != last
    {
        coords.push(first);
    }
    LineString(coords)
}

#[cfg(test)]
mod tests {
    use shapefile::{Point, PointZ};

    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        // clockwise, as shapefiles store outer rings
        vec![
            Point::new(x0, y0),
            Point::new(x0, y0 + size),
            Point::new(x0 + size, y0 + size),
            Point::new(x0 + size, y0),
            Point::new(x0, y0),
        ]
    }

    #[test]
    fn outer_ring_with_hole() {
        let mut hole = square(1.0, 1.0, 1.0);
        hole.reverse();
        let shape = Shape::Polygon(shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(square(0.0, 0.0, 4.0)),
            PolygonRing::Inner(hole),
        ]));

        let mp = to_multipolygon(&shape).unwrap();
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
    }

    #[test]
    fn two_outer_rings_make_two_polygons() {
        let shape = Shape::Polygon(shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(square(0.0, 0.0, 1.0)),
            PolygonRing::Outer(square(5.0, 5.0, 1.0)),
        ]));

        let mp = to_multipolygon(&shape).unwrap();
        assert_eq!(mp.0.len(), 2);
    }

    #[test]
    fn z_values_are_dropped() {
        let ring = square(0.0, 0.0, 1.0)
            .into_iter()
            .map(|p| PointZ::new(p.x, p.y, 10.0, 0.0))
            .collect();
        let shape = Shape::PolygonZ(shapefile::PolygonZ::new(PolygonRing::Outer(ring)));

        let mp = to_multipolygon(&shape).unwrap();
        assert_eq!(mp.0[0].exterior().0[0], Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn points_are_not_polygons() {
        let shape = Shape::Point(Point::new(1.0, 2.0));
        assert!(to_multipolygon(&shape).is_none());
        assert_eq!(shape_kind(&shape), "point");
    }

    #[test]
    fn closes_open_rings() {
        let line = closed(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ]);
        assert_eq!(line.0.len(), 4);
        assert_eq!(line.0[0], line.0[3]);
    }
}
