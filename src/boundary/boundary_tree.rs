use crate::types::{polygon_envelope, rect_to_envelope};
use geo::{BoundingRect, Intersects, Line, Polygon};
use rstar::{RTree, RTreeObject, AABB};

/// Two-point piece of an uncrossable map linestring
#[derive(Clone, Debug, PartialEq)]
pub struct BoundarySegment {
    pub line_string_id: u64,
    pub line: Line<f64>,
}

/// Wrapper for BoundarySegment with spatial indexing envelope
#[derive(Clone, Debug)]
pub struct SpatialBoundarySegment {
    pub segment: BoundarySegment,
    pub envelope: AABB<[f64; 2]>,
}

impl RTreeObject for SpatialBoundarySegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-Tree spatial index over uncrossable boundary segments
///
/// # Architecture
/// - Indexes segments by bounding box (envelope)
/// - Built once per check from segments already filtered to the ego
///   neighbourhood, then only queried
/// - Polygon queries: envelope pre-filter, then exact segment/polygon test
pub struct BoundaryTree {
    tree: RTree<SpatialBoundarySegment>,
    segment_count: usize,
}

impl BoundaryTree {
    /// Create empty R-Tree
    pub fn new() -> Self {
        BoundaryTree {
            tree: RTree::new(),
            segment_count: 0,
        }
    }

    /// Bulk-load the tree from a collection of segments
    pub fn from_segments(segments: Vec<BoundarySegment>) -> Self {
        let spatial_segments: Vec<SpatialBoundarySegment> = segments
            .into_iter()
            .map(|segment| {
                let envelope = rect_to_envelope(segment.line.bounding_rect());
                SpatialBoundarySegment { segment, envelope }
            })
            .collect();

        let segment_count = spatial_segments.len();

        BoundaryTree {
            tree: RTree::bulk_load(spatial_segments),
            segment_count,
        }
    }

    /// Add single segment to tree
    pub fn insert(&mut self, segment: BoundarySegment) {
        let envelope = rect_to_envelope(segment.line.bounding_rect());
        self.tree.insert(SpatialBoundarySegment { segment, envelope });
        self.segment_count += 1;
    }

    /// Segments that touch or cross `polygon`
    pub fn segments_intersecting(&self, polygon: &Polygon<f64>) -> Vec<&BoundarySegment> {
        let Some(envelope) = polygon_envelope(polygon) else {
            return Vec::new();
        };

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|spatial_seg| &spatial_seg.segment)
            .filter(|segment| segment.line.intersects(polygon))
            .collect()
    }

    /// Like `segments_intersecting`, stopping at the first hit
    pub fn intersects_polygon(&self, polygon: &Polygon<f64>) -> bool {
        let Some(envelope) = polygon_envelope(polygon) else {
            return false;
        };

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|spatial_seg| spatial_seg.segment.line.intersects(polygon))
    }

    /// Total segments in tree
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn is_empty(&self) -> bool {
        self.segment_count == 0
    }
}

impl Default for BoundaryTree {
    fn default() -> Self {
        Self::new()
    }
}
