// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-region primitive lists.

use crate::primitive::PrimitiveSet;
use crate::tree::SpatialTree;
use crate::types::BoundsKind;

/// Primitive indices of one set, grouped by region.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellLists {
    /// Regions the lists describe, ascending.
    pub regions: Vec<usize>,
    /// For each entry of `regions`, the primitives whose centroid it owns, ascending.
    pub owned: Vec<Vec<usize>>,
    /// For each entry of `regions`, the primitives overlapping it whose centroid lies
    /// elsewhere, ascending. `None` unless boundary cells were requested.
    pub boundary: Option<Vec<Vec<usize>>>,
}

impl CellLists {
    fn slot(&self, region: usize) -> Option<usize> {
        self.regions.binary_search(&region).ok()
    }

    /// Primitives owned by `region`, if it was requested.
    pub fn owned_by(&self, region: usize) -> Option<&[usize]> {
        self.slot(region).map(|s| self.owned[s].as_slice())
    }

    /// Boundary primitives of `region`, if it was requested with boundary cells.
    pub fn boundary_of(&self, region: usize) -> Option<&[usize]> {
        let s = self.slot(region)?;
        self.boundary.as_ref().map(|b| b[s].as_slice())
    }
}

impl SpatialTree {
    /// Group the primitives of set `set_index` by region.
    ///
    /// `set` must be the dataset passed at that position to the last build. With `regions`
    /// given, only those regions are listed; otherwise every region is. With
    /// `include_boundary`, each region also gets the primitives that overlap its spatial box
    /// without owning their centroid, which costs one geometric test per nearby region.
    ///
    /// A set index or length that does not match the last build logs an error and yields
    /// empty lists.
    pub fn create_cell_lists<S: PrimitiveSet + ?Sized>(
        &self,
        set_index: usize,
        set: &S,
        regions: Option<&[usize]>,
        include_boundary: bool,
    ) -> CellLists {
        let Some(owners) = self.all_regions_containing_cells(set_index) else {
            return CellLists::default();
        };
        if owners.len() != set.len() {
            log::error!(
                "set {set_index} has {} primitives but was built with {}",
                set.len(),
                owners.len()
            );
            return CellLists::default();
        }

        let restricted = regions.map(|ids| self.sorted_region_ids(ids));
        let requested = match &restricted {
            Some(ids) => ids.clone(),
            None => (0..self.num_regions()).collect(),
        };
        // Region id to output slot.
        let mut slot_of = vec![None; self.num_regions()];
        for (slot, &r) in requested.iter().enumerate() {
            slot_of[r] = Some(slot);
        }

        let mut owned = vec![Vec::new(); requested.len()];
        let mut boundary = include_boundary.then(|| vec![Vec::new(); requested.len()]);
        for (cell, &owner) in owners.iter().enumerate() {
            if let Some(slot) = slot_of[owner] {
                owned[slot].push(cell);
            }
            let Some(boundary) = boundary.as_mut() else {
                continue;
            };
            let primitive = set.primitive(cell);
            let wanted = restricted.as_deref();
            for r in self.cell_regions_among(&primitive, Some(owner), BoundsKind::Spatial, wanted) {
                if r == owner {
                    continue;
                }
                if let Some(slot) = slot_of[r] {
                    boundary[slot].push(cell);
                }
            }
        }
        CellLists {
            regions: requested,
            owned,
            boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{CellKind, PointCloud, PolyMesh};
    use crate::types::{AxisMask, TreeConfig};
    use glam::DVec3;
    use understory_polytope::Axis;

    /// Four unit-wide slabs along x, one triangle per slab plus one spanning two slabs.
    ///
    /// Coordinates are dyadic so every centroid is exact: slab triangles sit at `i + 0.5`
    /// and the spanning one ties with slab 2, which puts the splits at 1, 2 and 3.
    fn slabs() -> (SpatialTree, PolyMesh) {
        let mut mesh = PolyMesh::default();
        for i in 0..4 {
            let x = f64::from(i);
            let a = mesh.push_point(DVec3::new(x + 0.25, 0.0, 0.0));
            let b = mesh.push_point(DVec3::new(x + 0.75, 0.0, 0.0));
            let c = mesh.push_point(DVec3::new(x + 0.5, 1.0, 0.0));
            mesh.push_cell(CellKind::Triangle, &[a, b, c]).unwrap();
        }
        // Centroid at x = 2.5, reaching back over x = 2 but short of x = 3.
        let a = mesh.push_point(DVec3::new(1.75, 0.25, 0.0));
        let b = mesh.push_point(DVec3::new(2.875, 0.25, 0.0));
        let c = mesh.push_point(DVec3::new(2.875, 0.75, 0.0));
        mesh.push_cell(CellKind::Triangle, &[a, b, c]).unwrap();

        let mut tree = SpatialTree::with_config(TreeConfig {
            max_level: 2,
            min_cells_per_region: 0,
            allowed_axes: AxisMask::only(Axis::X),
        });
        tree.build(&[&mesh]).unwrap();
        (tree, mesh)
    }

    #[test]
    fn owned_lists_follow_centroids() {
        let (tree, mesh) = slabs();
        assert_eq!(tree.num_regions(), 4);
        assert_eq!(mesh.centroid(4).x, 2.5);
        for (r, edge) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            let b = tree.region_bounds(r, BoundsKind::Spatial).unwrap();
            assert_eq!(b.max.x, edge, "region {r} ends at a slab edge");
        }
        let lists = tree.create_cell_lists(0, &mesh, None, false);
        assert_eq!(lists.regions, vec![0, 1, 2, 3]);
        assert!(lists.boundary.is_none());
        let total: usize = lists.owned.iter().map(Vec::len).sum();
        assert_eq!(total, mesh.len());
        for (slot, cells) in lists.owned.iter().enumerate() {
            for &c in cells {
                assert_eq!(tree.region_containing_cell(0, c), Some(lists.regions[slot]));
            }
        }
    }

    #[test]
    fn boundary_cells_are_listed_once() {
        let (tree, mesh) = slabs();
        let lists = tree.create_cell_lists(0, &mesh, None, true);
        let spanning = 4;
        let owner = tree.region_containing_cell(0, spanning).unwrap();
        let neighbours: Vec<usize> = (0..4)
            .filter(|&r| lists.boundary_of(r).unwrap().contains(&spanning))
            .collect();
        assert_eq!(owner, 2);
        assert_eq!(neighbours, vec![1]);
        assert!(lists.owned_by(owner).unwrap().contains(&spanning));
        // Slab triangles stay inside their own region.
        for r in 0..4 {
            assert!(lists.boundary_of(r).unwrap().iter().all(|&c| c == spanning));
        }
    }

    #[test]
    fn restricted_regions_use_their_own_slots() {
        let (tree, mesh) = slabs();
        let lists = tree.create_cell_lists(0, &mesh, Some(&[3, 1, 3, 42][..]), true);
        assert_eq!(lists.regions, vec![1, 3]);
        assert_eq!(lists.owned.len(), 2);
        assert!(lists.owned_by(0).is_none());
        assert!(lists.boundary_of(2).is_none());
        assert!(lists.owned_by(3).is_some());
    }

    #[test]
    fn restricted_boundary_pass_only_visits_requested_regions() {
        let (tree, mesh) = slabs();
        let spanning = mesh.primitive(4);
        let kind = BoundsKind::Spatial;
        assert_eq!(tree.cell_regions_among(&spanning, Some(2), kind, None), vec![1, 2]);
        assert_eq!(tree.cell_regions_among(&spanning, Some(2), kind, Some(&[1, 3][..])), vec![1]);
        assert!(tree.cell_regions_among(&spanning, Some(2), kind, Some(&[0, 3][..])).is_empty());

        let full = tree.create_cell_lists(0, &mesh, None, true);
        let some = tree.create_cell_lists(0, &mesh, Some(&[1, 3][..]), true);
        for r in [1, 3] {
            assert_eq!(some.boundary_of(r), full.boundary_of(r), "region {r}");
            assert_eq!(some.owned_by(r), full.owned_by(r), "region {r}");
        }
    }

    #[test]
    fn mismatched_set_yields_nothing() {
        let (tree, mesh) = slabs();
        assert_eq!(tree.create_cell_lists(1, &mesh, None, false), CellLists::default());
        let other = PointCloud::new(vec![DVec3::ZERO]);
        assert_eq!(tree.create_cell_lists(0, &other, None, false), CellLists::default());
    }
}
