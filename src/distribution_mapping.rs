use std::ops::Index;
use std::sync::Arc;




/**
 * A reference-counted table assigning each grid of a `BoxArray` to the rank
 * which owns it. Cloning aliases the same table.
 */
#[derive(Clone, Debug)]
pub struct DistributionMapping {
    pmap: Arc<Vec<usize>>,
}




// ============================================================================
impl DistributionMapping {

    pub fn new(pmap: Vec<usize>) -> Self {
        Self { pmap: Arc::new(pmap) }
    }

    /**
     * Deal the grids out to ranks one at a time.
     */
    pub fn round_robin(ngrids: usize, nprocs: usize) -> Self {
        assert!(nprocs > 0, "distribution needs at least one rank");
        Self::new((0..ngrids).map(|gid| gid % nprocs).collect())
    }

    /**
     * Give each rank a contiguous run of grids. Run lengths differ by at
     * most one, and the longer runs go to the lower ranks.
     */
    pub fn contiguous(ngrids: usize, nprocs: usize) -> Self {
        assert!(nprocs > 0, "distribution needs at least one rank");

        let sz = ngrids / nprocs;
        let extra = ngrids % nprocs;
        let mut pmap = Vec::with_capacity(ngrids);

        for rank in 0..nprocs {
            let count = if rank < extra { sz + 1 } else { sz };
            pmap.extend(std::iter::repeat(rank).take(count));
        }
        Self::new(pmap)
    }

    pub fn len(&self) -> usize {
        self.pmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pmap.is_empty()
    }

    pub fn rank_of(&self, gid: usize) -> usize {
        self.pmap[gid]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.pmap
    }

    /**
     * Return the number of ranks needed to hold this mapping: one more than
     * the highest rank it refers to.
     */
    pub fn min_num_procs(&self) -> usize {
        self.pmap.iter().max().map_or(0, |r| r + 1)
    }

    pub fn same_ref(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pmap, &other.pmap)
    }
}




// ============================================================================
impl Index<usize> for DistributionMapping {
    type Output = usize;

    fn index(&self, gid: usize) -> &usize {
        &self.pmap[gid]
    }
}

impl PartialEq for DistributionMapping {
    fn eq(&self, other: &Self) -> bool {
        self.same_ref(other) || self.pmap == other.pmap
    }
}

impl Eq for DistributionMapping {}




// ============================================================================
#[cfg(test)]
mod test {

    use super::DistributionMapping;

    #[test]
    fn round_robin_cycles_ranks() {
        let dm = DistributionMapping::round_robin(7, 3);
        assert_eq!(dm.as_slice(), &[0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(dm.min_num_procs(), 3);
    }

    #[test]
    fn contiguous_runs_are_balanced() {
        let dm = DistributionMapping::contiguous(7, 3);
        assert_eq!(dm.as_slice(), &[0, 0, 0, 1, 1, 2, 2]);
        assert_eq!(DistributionMapping::contiguous(2, 4).as_slice(), &[0, 1]);
    }

    #[test]
    fn equality_is_identity_or_content() {
        let a = DistributionMapping::new(vec![1, 0, 1]);
        let b = a.clone();
        let c = DistributionMapping::new(vec![1, 0, 1]);
        assert!(a.same_ref(&b));
        assert!(!a.same_ref(&c));
        assert_eq!(a, c);
        assert_eq!(a[2], 1);
        assert_eq!(a.rank_of(1), 0);
    }
}
