//! Spherical range search over the sector index.
//!
//! A [`VolumeQuery`] turns a center and radius into the set of sector cells
//! that could hold a system within range. Along each axis the nearest points
//! of two cells `d` apart are `max(|d| - 1, 0)` whole cells apart, so a cell
//! whose squared gap exceeds the squared sector radius cannot hold a hit and
//! is skipped before any system is looked at. Systems in the surviving cells
//! are then tested against the exact squared radius.

use std::cmp::Ordering;

use crate::entity::{EntityId, System};
use crate::error::RegistryError;
use crate::geometry::{Coordinate, Positioned, SectorKey, SectorShift, SquareFloat, SquareInt};

use super::database::SystemDatabase;

/// Largest sector radius a query works with. Wider searches already reach
/// every representable cell, and the bound keeps the cube arithmetic in range.
pub const MAX_SECTOR_RADIUS: i64 = i64::MAX / 4;

/// A system found by a range query.
#[derive(Debug, Clone, Copy)]
pub struct RangeHit<'a> {
    pub system: &'a System,
    pub distance_sq: SquareFloat,
}

impl RangeHit<'_> {
    /// Distance from the query center in light-years.
    pub fn distance(&self) -> f64 {
        self.distance_sq.root()
    }
}

/// Precomputed parameters of one range search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeQuery {
    center: Coordinate,
    center_key: SectorKey,
    radius: f64,
    radius_sq: SquareFloat,
    sector_radius: i64,
    sector_radius_sq: SquareInt,
}

impl VolumeQuery {
    pub fn new(
        center: &impl Positioned,
        radius: f64,
        shift: SectorShift,
    ) -> Result<Self, RegistryError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(RegistryError::InvalidRadius(radius));
        }
        let center = center.position();
        let sector_radius = ((radius / shift.cell_width()).ceil() as i64).min(MAX_SECTOR_RADIUS);
        Ok(Self {
            center,
            center_key: center.sector_key(shift),
            radius,
            radius_sq: SquareFloat::new(radius),
            sector_radius,
            sector_radius_sq: SquareInt::new(sector_radius),
        })
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn center_key(&self) -> SectorKey {
        self.center_key
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn radius_sq(&self) -> SquareFloat {
        self.radius_sq
    }

    /// Radius in whole sector cells, rounded up and capped at
    /// [`MAX_SECTOR_RADIUS`].
    pub fn sector_radius(&self) -> i64 {
        self.sector_radius
    }

    pub fn sector_radius_sq(&self) -> SquareInt {
        self.sector_radius_sq
    }

    /// Squared distance from the center to `target`.
    pub fn distance_sq(&self, target: &impl Positioned) -> SquareFloat {
        self.center.distance_sq(&target.position())
    }

    /// Whether `target` lies inside the sphere, boundary included.
    pub fn contains(&self, target: &impl Positioned) -> bool {
        self.distance_sq(target) <= self.radius_sq
    }

    /// Whether cell `key` is close enough to hold a system within range.
    pub fn reaches_sector(&self, key: &SectorKey) -> bool {
        let gap = gap_sq(key.x.saturating_sub(self.center_key.x))
            + gap_sq(key.y.saturating_sub(self.center_key.y))
            + gap_sq(key.z.saturating_sub(self.center_key.z));
        gap <= self.sector_radius_sq
    }

    /// Number of cells in the candidate cube before pruning.
    pub fn cube_volume(&self) -> u64 {
        let side = (2 * self.span() + 1) as u64;
        side.saturating_mul(side).saturating_mul(side)
    }

    /// Every cell that survives pruning.
    pub fn sector_keys(&self) -> SectorKeys {
        let span = self.span();
        SectorKeys {
            query: *self,
            span,
            dx: -span,
            dy: -span,
            dz: -span,
            done: false,
        }
    }

    fn span(&self) -> i64 {
        self.sector_radius + 1
    }
}

fn gap_sq(offset: i64) -> SquareInt {
    SquareInt::new(offset.saturating_abs().saturating_sub(1).max(0))
}

/// Iterator over the pruned cells of a [`VolumeQuery`].
#[derive(Debug, Clone)]
pub struct SectorKeys {
    query: VolumeQuery,
    span: i64,
    dx: i64,
    dy: i64,
    dz: i64,
    done: bool,
}

impl SectorKeys {
    fn advance(&mut self) {
        self.dz += 1;
        if self.dz > self.span {
            self.dz = -self.span;
            self.dy += 1;
            if self.dy > self.span {
                self.dy = -self.span;
                self.dx += 1;
                if self.dx > self.span {
                    self.done = true;
                }
            }
        }
    }
}

impl Iterator for SectorKeys {
    type Item = SectorKey;

    fn next(&mut self) -> Option<SectorKey> {
        while !self.done {
            let key = self.query.center_key.offset(self.dx, self.dy, self.dz);
            self.advance();
            if self.query.reaches_sector(&key) {
                return Some(key);
            }
        }
        None
    }
}

fn by_distance_then_id(a: &RangeHit<'_>, b: &RangeHit<'_>) -> Ordering {
    a.distance_sq
        .value()
        .total_cmp(&b.distance_sq.value())
        .then_with(|| a.system.id().cmp(&b.system.id()))
}

impl SystemDatabase {
    /// Systems within `radius` light-years of `center`, nearest first.
    pub fn range_query(
        &self,
        center: &impl Positioned,
        radius: f64,
    ) -> Result<Vec<RangeHit<'_>>, RegistryError> {
        let query = VolumeQuery::new(center, radius, self.sector_shift())?;
        // Huge radii would walk mostly empty cells; scan occupied ones instead.
        let scan_occupied = query.cube_volume() > 8 * self.sector_count() as u64;
        Ok(self.collect_hits(&query, scan_occupied))
    }

    fn collect_hits(&self, query: &VolumeQuery, scan_occupied: bool) -> Vec<RangeHit<'_>> {
        let sectors = self.galaxy.sectors();
        let mut hits = Vec::new();
        let mut visit = |ids: &[EntityId]| {
            for id in ids {
                let Some(system) = self.galaxy.system(*id) else {
                    continue;
                };
                let distance_sq = query.distance_sq(system);
                if distance_sq <= query.radius_sq() {
                    hits.push(RangeHit {
                        system,
                        distance_sq,
                    });
                }
            }
        };

        if scan_occupied {
            for (key, ids) in sectors.iter() {
                if query.reaches_sector(key) {
                    visit(ids);
                }
            }
        } else {
            for key in query.sector_keys() {
                visit(sectors.bucket(&key));
            }
        }

        hits.sort_by(by_distance_then_id);
        hits
    }

    /// Reference O(n) scan over every system.
    pub fn range_query_brute_force(
        &self,
        center: &impl Positioned,
        radius: f64,
    ) -> Result<Vec<RangeHit<'_>>, RegistryError> {
        let query = VolumeQuery::new(center, radius, self.sector_shift())?;
        let mut hits: Vec<RangeHit<'_>> = self
            .systems()
            .filter_map(|system| {
                let distance_sq = query.distance_sq(system);
                (distance_sq <= query.radius_sq()).then_some(RangeHit {
                    system,
                    distance_sq,
                })
            })
            .collect();
        hits.sort_by(by_distance_then_id);
        Ok(hits)
    }

    /// Systems within `radius` of the named system, the origin included.
    pub fn systems_within(
        &self,
        origin: &str,
        radius: f64,
    ) -> Result<Vec<RangeHit<'_>>, RegistryError> {
        let origin = self
            .get_system(origin)
            .ok_or_else(|| RegistryError::UnknownName(origin.to_string()))?;
        self.range_query(origin, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DbEntity;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn sdb_with(points: &[(f64, f64, f64)], shift: SectorShift) -> SystemDatabase {
        let mut sdb = SystemDatabase::new(shift, Default::default());
        for (index, (x, y, z)) in points.iter().enumerate() {
            let entity = DbEntity::new(index as i64 + 1, &format!("S{}", index + 1)).unwrap();
            sdb.register_system(System::new(entity, Coordinate::new(*x, *y, *z)))
                .unwrap();
        }
        sdb
    }

    fn names(hits: &[RangeHit<'_>]) -> Vec<String> {
        hits.iter().map(|hit| hit.system.name().to_string()).collect()
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let origin = Coordinate::default();
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = VolumeQuery::new(&origin, radius, SectorShift::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Malformed);
        }
    }

    #[test]
    fn test_precomputed_values() {
        let query =
            VolumeQuery::new(&Coordinate::new(-1.0, 40.0, 0.0), 40.0, SectorShift::default())
                .unwrap();
        assert_eq!(query.center_key(), SectorKey::new(-1, 1, 0));
        assert_eq!(query.radius_sq().value(), 1600.0);
        assert_eq!(query.sector_radius(), 2);
        assert_eq!(query.sector_radius_sq(), SquareInt::new(2));
    }

    #[test]
    fn test_sector_keys_are_pruned() {
        let query =
            VolumeQuery::new(&Coordinate::default(), 1.0, SectorShift::default()).unwrap();
        let keys: Vec<SectorKey> = query.sector_keys().collect();

        // R = 1: the full 5x5x5 cube minus the cells with a squared gap above 1.
        assert!(keys.contains(&SectorKey::new(0, 0, 0)));
        assert!(keys.contains(&SectorKey::new(2, 0, 0)));
        assert!(keys.contains(&SectorKey::new(-1, -1, -1)));
        assert!(!keys.contains(&SectorKey::new(2, 2, 0)));
        assert!(!keys.contains(&SectorKey::new(2, 2, 2)));
        assert!(keys.len() < 125);
    }

    #[test]
    fn test_example_query() {
        let sdb = sdb_with(
            &[(0.0, 0.0, 0.0), (3.0, 4.0, 0.0), (100.0, 0.0, 0.0)],
            SectorShift::default(),
        );
        let hits = sdb.range_query(&Coordinate::default(), 5.0).unwrap();
        assert_eq!(names(&hits), vec!["S1", "S2"]);
        assert_eq!(hits[1].distance(), 5.0);
    }

    #[test]
    fn test_small_radius_across_cell_corner() {
        // Neighbours on opposite sides of a cell corner, well under 1 ly apart.
        let sdb = sdb_with(
            &[(-0.1, -0.1, -0.1), (0.1, 0.1, 0.1), (31.9, 0.0, 0.0)],
            SectorShift::default(),
        );
        let center = Coordinate::new(0.05, 0.05, 0.05);
        let hits = sdb.range_query(&center, 0.5).unwrap();
        assert_eq!(names(&hits), vec!["S2", "S1"]);
    }

    #[test]
    fn test_ties_sorted_by_id() {
        let sdb = sdb_with(
            &[(0.0, 2.0, 0.0), (2.0, 0.0, 0.0), (0.0, 0.0, 2.0)],
            SectorShift::default(),
        );
        let hits = sdb.range_query(&Coordinate::default(), 2.0).unwrap();
        assert_eq!(names(&hits), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_huge_radius_scans_occupied_sectors() {
        let sdb = sdb_with(
            &[(0.0, 0.0, 0.0), (-5000.0, 0.0, 0.0), (9000.0, 9000.0, 9000.0)],
            SectorShift::default(),
        );
        let hits = sdb.range_query(&Coordinate::default(), 6000.0).unwrap();
        assert_eq!(names(&hits), vec!["S1", "S2"]);
    }

    #[test]
    fn test_enormous_radius_returns_everything() {
        let sdb = sdb_with(
            &[
                (0.0, 0.0, 0.0),
                (-5000.0, 0.0, 0.0),
                (9000.0, 9000.0, 9000.0),
                (1e18, -1e18, 1e18),
            ],
            SectorShift::FINE,
        );
        let hits = sdb.range_query(&Coordinate::default(), 1e300).unwrap();
        assert_eq!(names(&hits), vec!["S1", "S2", "S3", "S4"]);

        let query = VolumeQuery::new(&Coordinate::default(), 1e300, SectorShift::FINE).unwrap();
        assert_eq!(query.sector_radius(), MAX_SECTOR_RADIUS);
        assert_eq!(query.cube_volume(), u64::MAX);
        assert!(query.reaches_sector(&SectorKey::new(i64::MIN, i64::MAX, 0)));
    }

    #[test]
    fn test_systems_within() {
        let sdb = sdb_with(
            &[(0.0, 0.0, 0.0), (3.0, 4.0, 0.0), (100.0, 0.0, 0.0)],
            SectorShift::default(),
        );
        let hits = sdb.systems_within("s2", 5.0).unwrap();
        assert_eq!(names(&hits), vec!["S2", "S1"]);

        let err = sdb.systems_within("nowhere", 5.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    fn ids(hits: &[RangeHit<'_>]) -> Vec<u32> {
        hits.iter().map(|hit| hit.system.id().get()).collect()
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(
            points in prop::collection::vec(
                (-300.0f64..300.0, -300.0f64..300.0, -300.0f64..300.0),
                1..120,
            ),
            center in (-300.0f64..300.0, -300.0f64..300.0, -300.0f64..300.0),
            radius in 0.01f64..250.0,
            coarse in any::<bool>(),
        ) {
            let shift = if coarse { SectorShift::COARSE } else { SectorShift::FINE };
            let sdb = sdb_with(&points, shift);
            let center = Coordinate::new(center.0, center.1, center.2);

            let query = VolumeQuery::new(&center, radius, shift).unwrap();
            let by_cells = sdb.collect_hits(&query, false);
            let by_occupied = sdb.collect_hits(&query, true);
            let slow = sdb.range_query_brute_force(&center, radius).unwrap();
            prop_assert_eq!(ids(&by_cells), ids(&slow));
            prop_assert_eq!(ids(&by_occupied), ids(&slow));
        }

        #[test]
        fn prop_hits_are_within_radius_and_sorted(
            points in prop::collection::vec(
                (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0),
                1..60,
            ),
            radius in 0.5f64..80.0,
        ) {
            let sdb = sdb_with(&points, SectorShift::default());
            let hits = sdb.range_query(&Coordinate::default(), radius).unwrap();
            for pair in hits.windows(2) {
                prop_assert!(pair[0].distance_sq <= pair[1].distance_sq);
            }
            for hit in &hits {
                prop_assert!(hit.distance_sq.value() <= radius * radius);
            }
        }
    }
}
