use crate::box_array::BoxArray;
use crate::distribution_mapping::DistributionMapping;




/**
 * Read access to the grids of a mesh hierarchy and their owners: one
 * `BoxArray` and one `DistributionMapping` per refinement level, with level
 * 0 the coarsest. This is what particle bookkeeping needs to know about the
 * mesh.
 */
pub trait ParGdb<const D: usize> {

    /**
     * Must be implemented to return the index of the finest level.
     */
    fn finest_level(&self) -> usize;

    fn box_array(&self, lev: usize) -> &BoxArray<D>;

    fn distribution_map(&self, lev: usize) -> &DistributionMapping;

    /**
     * Must be implemented to return the number of ranks the grids are
     * distributed over.
     */
    fn num_procs(&self) -> usize;

    fn num_levels(&self) -> usize {
        self.finest_level() + 1
    }
}




/**
 * A `ParGdb` which owns its per-level grids and mappings.
 */
#[derive(Clone, Debug)]
pub struct GridHierarchy<const D: usize> {
    levels: Vec<(BoxArray<D>, DistributionMapping)>,
    num_procs: usize,
}




// ============================================================================
impl<const D: usize> GridHierarchy<D> {

    pub fn new(num_procs: usize) -> Self {
        assert!(num_procs > 0, "grid hierarchy needs at least one rank");
        Self { levels: Vec::new(), num_procs }
    }

    /**
     * Append a finer level.
     */
    pub fn add_level(&mut self, ba: BoxArray<D>, dm: DistributionMapping) -> &mut Self {
        self.check_level(&ba, &dm);
        self.levels.push((ba, dm));
        self
    }

    /**
     * Replace the grids of an existing level, as a regrid would.
     */
    pub fn set_level(&mut self, lev: usize, ba: BoxArray<D>, dm: DistributionMapping) {
        self.check_level(&ba, &dm);
        self.levels[lev] = (ba, dm);
    }

    fn check_level(&self, ba: &BoxArray<D>, dm: &DistributionMapping) {
        assert!(
            ba.len() == dm.len(),
            "box array has {} grids but distribution mapping has {}", ba.len(), dm.len());
        assert!(
            dm.min_num_procs() <= self.num_procs,
            "distribution mapping refers to rank {} of {}", dm.min_num_procs() - 1, self.num_procs);
    }
}

impl<const D: usize> ParGdb<D> for GridHierarchy<D> {
    fn finest_level(&self) -> usize {
        assert!(!self.levels.is_empty(), "grid hierarchy has no levels");
        self.levels.len() - 1
    }

    fn box_array(&self, lev: usize) -> &BoxArray<D> {
        &self.levels[lev].0
    }

    fn distribution_map(&self, lev: usize) -> &DistributionMapping {
        &self.levels[lev].1
    }

    fn num_procs(&self) -> usize {
        self.num_procs
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use crate::box_array::BoxArray;
    use crate::distribution_mapping::DistributionMapping;
    use crate::index_box::IndexBox;
    use super::{GridHierarchy, ParGdb};

    #[test]
    fn hierarchy_reports_levels() {
        let ba = BoxArray::chopped(IndexBox::cell([0, 0], [15, 15]), 8);
        let dm = DistributionMapping::round_robin(ba.len(), 2);
        let mut gdb = GridHierarchy::new(2);
        gdb.add_level(ba.clone(), dm.clone());
        gdb.add_level(ba.clone(), dm);

        assert_eq!(gdb.finest_level(), 1);
        assert_eq!(gdb.num_levels(), 2);
        assert!(gdb.box_array(1).same_ref(&ba));
    }

    #[test]
    #[should_panic]
    fn mismatched_level_panics() {
        let ba = BoxArray::chopped(IndexBox::cell([0, 0], [15, 15]), 8);
        GridHierarchy::new(2).add_level(ba, DistributionMapping::round_robin(3, 2));
    }

    #[test]
    #[should_panic]
    fn rank_out_of_range_panics() {
        let ba = BoxArray::chopped(IndexBox::cell([0, 0], [15, 15]), 8);
        GridHierarchy::new(2).add_level(ba, DistributionMapping::round_robin(4, 4));
    }
}
