use super::Lanelet;
use crate::types::{create_hull_from_footprints, Footprint};
use geo::{Coord, Intersects, Point};

/// Lanelets touching or overlapping the convex hull of all footprints
///
/// Bounds the per-vertex containment checks to the local neighbourhood.
pub fn get_candidate_lanelets(lanelets: &[Lanelet], footprints: &[Footprint]) -> Vec<Lanelet> {
    let footprint_hull = create_hull_from_footprints(footprints);

    lanelets
        .iter()
        .filter(|lanelet| lanelet.polygon.intersects(&footprint_hull))
        .cloned()
        .collect()
}

/// Closed containment: a point on a lanelet border counts as inside
pub fn is_in_any_lane(candidate_lanelets: &[Lanelet], point: Coord<f64>) -> bool {
    let point = Point::from(point);
    candidate_lanelets
        .iter()
        .any(|lanelet| lanelet.polygon.intersects(&point))
}

/// True if any footprint vertex lies outside every candidate lanelet
pub fn is_out_of_lane(candidate_lanelets: &[Lanelet], footprint: &Footprint) -> bool {
    footprint
        .exterior()
        .coords()
        .any(|c| !is_in_any_lane(candidate_lanelets, *c))
}

/// True on the first footprint (in time order) that is out of lane
pub fn will_leave_lane(candidate_lanelets: &[Lanelet], footprints: &[Footprint]) -> bool {
    footprints
        .iter()
        .any(|footprint| is_out_of_lane(candidate_lanelets, footprint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::polygon_from_coords;

    fn make_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> geo::Polygon<f64> {
        polygon_from_coords(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    fn make_lanelets() -> Vec<Lanelet> {
        vec![
            Lanelet::new(1, make_rect(0.0, 0.0, 10.0, 4.0)),
            Lanelet::new(2, make_rect(10.0, 0.0, 20.0, 4.0)),
            Lanelet::new(3, make_rect(50.0, 0.0, 60.0, 4.0)),
        ]
    }

    #[test]
    fn test_candidates_overlap_hull() {
        let footprints = vec![make_rect(1.0, 1.0, 3.0, 2.0), make_rect(11.0, 1.0, 13.0, 2.0)];
        let ids: Vec<u64> = get_candidate_lanelets(&make_lanelets(), &footprints)
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_candidates_include_touching() {
        let footprints = vec![make_rect(48.0, 1.0, 50.0, 2.0)];
        let ids: Vec<u64> = get_candidate_lanelets(&make_lanelets(), &footprints)
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_boundary_vertex_is_in_lane() {
        let lanelets = make_lanelets();
        assert!(is_in_any_lane(&lanelets, Coord { x: 0.0, y: 2.0 }));
        assert!(is_in_any_lane(&lanelets, Coord { x: 10.0, y: 4.0 }));
        assert!(!is_in_any_lane(&lanelets, Coord { x: 5.0, y: 4.1 }));
    }

    #[test]
    fn test_out_of_lane() {
        let lanelets = make_lanelets();
        // Spans two adjacent lanelets: every vertex is in one of them
        assert!(!is_out_of_lane(&lanelets, &make_rect(8.0, 1.0, 12.0, 3.0)));
        // Sticks out over the top edge
        assert!(is_out_of_lane(&lanelets, &make_rect(8.0, 3.0, 12.0, 5.0)));
    }

    #[test]
    fn test_no_candidates_is_out_of_lane() {
        assert!(is_out_of_lane(&[], &make_rect(1.0, 1.0, 2.0, 2.0)));
        assert!(will_leave_lane(&[], &[make_rect(1.0, 1.0, 2.0, 2.0)]));
    }

    #[test]
    fn test_adding_lanelets_never_creates_departure() {
        let footprint = make_rect(8.0, 1.0, 12.0, 3.0);
        let lanelets = make_lanelets();

        let mut subset: Vec<Lanelet> = Vec::new();
        let mut previous = is_out_of_lane(&subset, &footprint);
        for lanelet in lanelets {
            subset.push(lanelet);
            let current = is_out_of_lane(&subset, &footprint);
            assert!(previous || !current, "adding a lanelet turned false into true");
            previous = current;
        }
        assert!(!previous);
    }

    #[test]
    fn test_will_leave_lane_any_footprint() {
        let lanelets = make_lanelets();
        let inside = make_rect(1.0, 1.0, 3.0, 3.0);
        let outside = make_rect(21.0, 1.0, 23.0, 3.0);

        assert!(!will_leave_lane(&lanelets, &[inside.clone(), inside.clone()]));
        assert!(will_leave_lane(&lanelets, &[inside.clone(), outside]));
        assert!(!will_leave_lane(&lanelets, &[]));
    }
}
