// graph.rs - Proximity edges between constellation particles
//
// Edges are derived, never stored: every frame builds a fresh iterator over
// the current field. Two strategies yield the same edge set:
//   Pairwise - every i < j pair, quadratic, no setup cost
//   Grid     - bucket particles into max_distance cells, test 3x3 neighbors
// Emission order differs between strategies.

use crate::sim::Constellation;

/// Edge alpha at zero distance. Decays linearly to 0 at the threshold.
pub const INTENSITY_SCALE: f32 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Always `i < j`.
    pub i: usize,
    pub j: usize,
    pub distance: f32,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeStrategy {
    #[default]
    Pairwise,
    Grid,
}

/// Edges for every pair closer than `max_distance`, using the quadratic scan.
pub fn build_edges(field: &Constellation, max_distance: f32) -> PairwiseEdges<'_> {
    PairwiseEdges::new(field, max_distance)
}

/// Edges for every pair closer than `max_distance`, using `strategy`.
pub fn build_edges_with(field: &Constellation, max_distance: f32, strategy: EdgeStrategy) -> Edges<'_> {
    match strategy {
        EdgeStrategy::Pairwise => Edges::Pairwise(PairwiseEdges::new(field, max_distance)),
        EdgeStrategy::Grid => Edges::Grid(GridEdges::new(field, max_distance)),
    }
}

/// Distance test shared by both strategies. NaN distances never pass.
#[inline]
fn test_pair(field: &Constellation, i: usize, j: usize, max_distance: f32) -> Option<Edge> {
    let dx = field.x[i] - field.x[j];
    let dy = field.y[i] - field.y[j];
    let distance = (dx * dx + dy * dy).sqrt();

    if !(distance < max_distance) {
        return None;
    }
    Some(Edge {
        i,
        j,
        distance,
        intensity: (1.0 - distance / max_distance) * INTENSITY_SCALE,
    })
}

#[inline]
fn usable(max_distance: f32) -> bool {
    max_distance.is_finite() && max_distance > 0.0
}

pub enum Edges<'a> {
    Pairwise(PairwiseEdges<'a>),
    Grid(GridEdges<'a>),
}

impl Iterator for Edges<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        match self {
            Edges::Pairwise(e) => e.next(),
            Edges::Grid(e) => e.next(),
        }
    }
}

// ============================================================================
// Pairwise
// ============================================================================

pub struct PairwiseEdges<'a> {
    field: &'a Constellation,
    max_distance: f32,
    n: usize,
    i: usize,
    j: usize,
}

impl<'a> PairwiseEdges<'a> {
    fn new(field: &'a Constellation, max_distance: f32) -> Self {
        let n = if usable(max_distance) { field.len() } else { 0 };
        Self { field, max_distance, n, i: 0, j: 1 }
    }
}

impl Iterator for PairwiseEdges<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        while self.i < self.n {
            while self.j < self.n {
                let j = self.j;
                self.j += 1;
                if let Some(edge) = test_pair(self.field, self.i, j, self.max_distance) {
                    return Some(edge);
                }
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }
}

// ============================================================================
// Grid
// ============================================================================

// Cells per axis are capped; larger cells only add candidates, never lose edges.
const MAX_AXIS_CELLS: f32 = 256.0;

const NEIGHBORS: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),  (0, 0),  (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

pub struct GridEdges<'a> {
    field: &'a Constellation,
    max_distance: f32,
    cols: i32,
    rows: i32,
    // Particle cell, and particles sorted by cell (CSR layout)
    cell_of: Vec<usize>,
    order: Vec<usize>,
    starts: Vec<usize>,
    // Cursor: particle, neighbor slot, position within that cell's run
    i: usize,
    k: usize,
    pos: usize,
    end: usize,
}

impl<'a> GridEdges<'a> {
    fn new(field: &'a Constellation, max_distance: f32) -> Self {
        let n = if usable(max_distance) { field.len() } else { 0 };
        let cell_size = max_distance
            .max(field.width() / MAX_AXIS_CELLS)
            .max(field.height() / MAX_AXIS_CELLS);
        let cols = ((field.width() / cell_size).ceil() as i32).max(1);
        let rows = ((field.height() / cell_size).ceil() as i32).max(1);

        let cell = |i: usize| -> usize {
            // `as` saturates, NaN lands in cell 0
            let cx = ((field.x[i] / cell_size) as i32).clamp(0, cols - 1);
            let cy = ((field.y[i] / cell_size) as i32).clamp(0, rows - 1);
            (cy * cols + cx) as usize
        };
        let cell_of: Vec<usize> = (0..n).map(cell).collect();

        // Counting sort into cell runs
        let cells = (cols * rows) as usize;
        let mut starts = vec![0usize; cells + 1];
        for &c in &cell_of { starts[c + 1] += 1; }
        for c in 0..cells { starts[c + 1] += starts[c]; }
        let mut fill = starts.clone();
        let mut order = vec![0usize; n];
        for (i, &c) in cell_of.iter().enumerate() {
            order[fill[c]] = i;
            fill[c] += 1;
        }

        let mut edges = Self {
            field, max_distance, cols, rows, cell_of, order, starts,
            i: 0, k: 0, pos: 0, end: 0,
        };
        if n > 0 { edges.load_run(); }
        edges
    }

    /// Point `pos..end` at the run for neighbor slot `k` of particle `i`.
    fn load_run(&mut self) {
        let home = self.cell_of[self.i] as i32;
        let (cx, cy) = (home % self.cols, home / self.cols);
        let (dx, dy) = NEIGHBORS[self.k];
        let (nx, ny) = (cx + dx, cy + dy);

        if nx < 0 || ny < 0 || nx >= self.cols || ny >= self.rows {
            self.pos = 0;
            self.end = 0;
            return;
        }
        let c = (ny * self.cols + nx) as usize;
        self.pos = self.starts[c];
        self.end = self.starts[c + 1];
    }
}

impl Iterator for GridEdges<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let n = self.cell_of.len();
        while self.i < n {
            while self.pos < self.end {
                let j = self.order[self.pos];
                self.pos += 1;
                if j <= self.i { continue; }
                if let Some(edge) = test_pair(self.field, self.i, j, self.max_distance) {
                    return Some(edge);
                }
            }

            self.k += 1;
            if self.k == NEIGHBORS.len() {
                self.k = 0;
                self.i += 1;
                if self.i == n { break; }
            }
            self.load_run();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::sim::field_rng;

    fn pair(distance: f32) -> Constellation {
        let mut f = Constellation::empty(1000, 1000);
        f.push(100.0, 100.0, 0.0, 0.0, 1.0, 0.5);
        f.push(100.0 + distance, 100.0, 0.0, 0.0, 1.0, 0.5);
        f
    }

    fn sorted(edges: impl Iterator<Item = Edge>) -> Vec<(usize, usize)> {
        let mut v: Vec<_> = edges.map(|e| (e.i, e.j)).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn just_outside_threshold_has_no_edge() {
        let f = pair(180.0 + 0.01);
        assert_eq!(build_edges(&f, 180.0).count(), 0);
    }

    #[test]
    fn just_inside_threshold_has_one_faint_edge() {
        let f = pair(180.0 - 0.01);
        let edges: Vec<_> = build_edges(&f, 180.0).collect();
        assert_eq!(edges.len(), 1);
        let e = edges[0];
        assert_eq!((e.i, e.j), (0, 1));
        assert!(e.intensity > 0.0 && e.intensity <= INTENSITY_SCALE);
    }

    #[test]
    fn exact_threshold_is_excluded() {
        assert_eq!(build_edges(&pair(180.0), 180.0).count(), 0);
    }

    #[test]
    fn coincident_particles_get_full_intensity() {
        let e = build_edges(&pair(0.0), 50.0).next().unwrap();
        assert_eq!(e.intensity, INTENSITY_SCALE);
    }

    #[test]
    fn edges_are_ordered_pairs_without_mirrors() {
        let config = EngineConfig { particle_count: 120, ..EngineConfig::default() };
        let f = Constellation::generate(600, 400, &config, &mut field_rng(9)).unwrap();
        let edges = sorted(build_edges(&f, 120.0));
        assert!(!edges.is_empty());
        for &(i, j) in &edges {
            assert!(i < j);
            assert!(!edges.contains(&(j, i)));
        }
        let mut dedup = edges.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), edges.len());
    }

    #[test]
    fn grid_matches_pairwise() {
        let config = EngineConfig { particle_count: 300, ..EngineConfig::default() };
        for (seed, w, h, d) in [(1, 800, 600, 180.0), (2, 1920, 1080, 90.0), (3, 100, 50, 400.0)] {
            let f = Constellation::generate(w, h, &config, &mut field_rng(seed)).unwrap();
            let a = sorted(build_edges_with(&f, d, EdgeStrategy::Pairwise));
            let b = sorted(build_edges_with(&f, d, EdgeStrategy::Grid));
            assert_eq!(a, b, "seed {seed}");
        }
    }

    #[test]
    fn nan_positions_are_skipped() {
        let mut f = pair(10.0);
        f.x[1] = f32::NAN;
        assert_eq!(build_edges(&f, 50.0).count(), 0);
        assert_eq!(build_edges_with(&f, 50.0, EdgeStrategy::Grid).count(), 0);
    }

    #[test]
    fn unusable_distance_yields_nothing() {
        let f = pair(1.0);
        assert_eq!(build_edges(&f, 0.0).count(), 0);
        assert_eq!(build_edges_with(&f, f32::NAN, EdgeStrategy::Grid).count(), 0);
    }

    #[test]
    fn empty_and_single_fields() {
        let f = Constellation::empty(10, 10);
        assert_eq!(build_edges(&f, 5.0).count(), 0);
        assert_eq!(build_edges_with(&f, 5.0, EdgeStrategy::Grid).count(), 0);
    }
}
