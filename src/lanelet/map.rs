use crate::types::polygon_envelope;
use geo::{EuclideanDistance, Intersects, LineString, Polygon};
use rstar::{RTree, RTreeObject, AABB};

/// One lane segment as a 2D polygon
#[derive(Clone, Debug, PartialEq)]
pub struct Lanelet {
    pub id: u64,
    pub polygon: Polygon<f64>,
}

impl Lanelet {
    pub fn new(id: u64, polygon: Polygon<f64>) -> Self {
        Lanelet { id, polygon }
    }
}

/// Map linestring (lane border, curb, road border...) with its type attribute
#[derive(Clone, Debug, PartialEq)]
pub struct MapLineString {
    pub id: u64,
    pub line_type: Option<String>,
    pub geometry: LineString<f64>,
}

/// R-tree entry pointing back into `LaneletMap::lanelets`
#[derive(Clone, Debug)]
pub struct SpatialLanelet {
    pub index: usize,
    pub envelope: AABB<[f64; 2]>,
}

impl RTreeObject for SpatialLanelet {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Read-only lane map: lanelet layer plus linestring layer
///
/// # Architecture
/// - Lanelets are indexed by bounding box for `find_within_2d`
/// - Linestrings are scanned linearly; the boundary extractor filters them
///   by type and distance before building its own per-call index
pub struct LaneletMap {
    lanelets: Vec<Lanelet>,
    line_strings: Vec<MapLineString>,
    tree: RTree<SpatialLanelet>,
}

impl LaneletMap {
    pub fn new(lanelets: Vec<Lanelet>, line_strings: Vec<MapLineString>) -> Self {
        let spatial: Vec<SpatialLanelet> = lanelets
            .iter()
            .enumerate()
            .filter_map(|(index, lanelet)| {
                polygon_envelope(&lanelet.polygon).map(|envelope| SpatialLanelet { index, envelope })
            })
            .collect();

        LaneletMap {
            lanelets,
            line_strings,
            tree: RTree::bulk_load(spatial),
        }
    }

    pub fn lanelets(&self) -> &[Lanelet] {
        &self.lanelets
    }

    pub fn line_strings(&self) -> &[MapLineString] {
        &self.line_strings
    }

    pub fn lanelet(&self, id: u64) -> Option<&Lanelet> {
        self.lanelets.iter().find(|l| l.id == id)
    }

    /// Lanelets with the given ids, in the order the ids are listed
    ///
    /// Unknown ids are skipped.
    pub fn lanelets_by_ids(&self, ids: &[u64]) -> Vec<Lanelet> {
        ids.iter()
            .filter_map(|id| self.lanelet(*id).cloned())
            .collect()
    }

    /// Lanelets whose polygon lies within `max_distance` of `area`
    ///
    /// # Returns
    /// (distance, lanelet) pairs sorted by distance; ties keep map order
    pub fn find_within_2d(&self, area: &Polygon<f64>, max_distance: f64) -> Vec<(f64, &Lanelet)> {
        let Some(envelope) = polygon_envelope(area) else {
            return Vec::new();
        };
        let lower = envelope.lower();
        let upper = envelope.upper();
        let query = AABB::from_corners(
            [lower[0] - max_distance, lower[1] - max_distance],
            [upper[0] + max_distance, upper[1] + max_distance],
        );

        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.index)
            .collect();
        indices.sort_unstable();

        let mut found: Vec<(f64, &Lanelet)> = indices
            .into_iter()
            .map(|index| {
                let lanelet = &self.lanelets[index];
                let distance = if lanelet.polygon.intersects(area) {
                    0.0
                } else {
                    lanelet.polygon.euclidean_distance(area)
                };
                (distance, lanelet)
            })
            .filter(|(distance, _)| *distance <= max_distance)
            .collect();

        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found
    }

    pub fn lanelet_count(&self) -> usize {
        self.lanelets.len()
    }
}

impl Default for LaneletMap {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
