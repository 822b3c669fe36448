use log::info;
use crate::box_array::BoxArray;
use crate::distribution_mapping::DistributionMapping;
use crate::par_gdb::ParGdb;




/**
 * Numbers every grid of a mesh hierarchy with a dense "bucket" index, for
 * routing particles to the grid and rank that own them.
 *
 * Buckets are numbered in order of (owning rank, level, grid id), so the
 * buckets owned by one rank form a contiguous range. The map remembers the
 * box arrays and distribution mappings it was built from; when the mesh
 * changes, `is_valid` returns false and the map must be defined again.
 */
#[derive(Clone, Debug, Default)]
pub struct ParticleBufferMap<const D: usize> {
    defined: bool,
    ba: Vec<BoxArray<D>>,
    dm: Vec<DistributionMapping>,
    bucket_to_gid: Vec<usize>,
    bucket_to_lev: Vec<usize>,
    bucket_to_pid: Vec<usize>,
    lev_gid_to_bucket: Vec<usize>,
    lev_offsets: Vec<usize>,
    proc_box_counts: Vec<usize>,
    proc_box_offsets: Vec<usize>,
}




/**
 * Looks up the rank owning a (level, grid) pair. Borrows the tables of a
 * `ParticleBufferMap`, and is cheap to copy into parallel workers.
 */
#[derive(Clone, Copy, Debug)]
pub struct GetPid<'a> {
    bucket_to_pid: &'a [usize],
    lev_gid_to_bucket: &'a [usize],
    lev_offsets: &'a [usize],
}

impl<'a> GetPid<'a> {
    #[inline]
    pub fn get(&self, lev: usize, gid: usize) -> usize {
        self.bucket_to_pid[self.lev_gid_to_bucket[self.lev_offsets[lev] + gid]]
    }
}




/**
 * Looks up the bucket of a (level, grid) pair.
 */
#[derive(Clone, Copy, Debug)]
pub struct GetBucket<'a> {
    lev_gid_to_bucket: &'a [usize],
    lev_offsets: &'a [usize],
}

impl<'a> GetBucket<'a> {
    #[inline]
    pub fn get(&self, lev: usize, gid: usize) -> usize {
        self.lev_gid_to_bucket[self.lev_offsets[lev] + gid]
    }
}




// ============================================================================
impl<const D: usize> ParticleBufferMap<D> {

    /**
     * Create a map which has not been defined. Every accessor except
     * `is_valid` panics until `define` is called.
     */
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_gdb<G: ParGdb<D> + ?Sized>(gdb: &G) -> Self {
        let mut result = Self::new();
        result.define(gdb);
        result
    }

    /**
     * Build the bucket tables from the grids of every level of `gdb`,
     * replacing any previous definition.
     */
    pub fn define<G: ParGdb<D> + ?Sized>(&mut self, gdb: &G) {
        let num_levels = gdb.num_levels();
        let num_procs = gdb.num_procs();

        self.ba = (0..num_levels).map(|lev| gdb.box_array(lev).clone()).collect();
        self.dm = (0..num_levels).map(|lev| gdb.distribution_map(lev).clone()).collect();

        let mut keys = Vec::new();

        for lev in 0..num_levels {
            assert!(
                self.ba[lev].len() == self.dm[lev].len(),
                "level {} has {} grids but {} owners", lev, self.ba[lev].len(), self.dm[lev].len());

            for gid in 0..self.ba[lev].len() {
                let pid = self.dm[lev][gid];
                assert!(pid < num_procs, "grid {} on level {} is owned by rank {} of {}", gid, lev, pid, num_procs);
                keys.push((pid, lev, gid));
            }
        }
        keys.sort_unstable();

        self.bucket_to_pid = keys.iter().map(|k| k.0).collect();
        self.bucket_to_lev = keys.iter().map(|k| k.1).collect();
        self.bucket_to_gid = keys.iter().map(|k| k.2).collect();

        self.lev_offsets = Vec::with_capacity(num_levels + 1);
        self.lev_offsets.push(0);

        for ba in &self.ba {
            let last = self.lev_offsets[self.lev_offsets.len() - 1];
            self.lev_offsets.push(last + ba.len());
        }

        self.lev_gid_to_bucket = vec![0; keys.len()];

        for (bucket, &(_, lev, gid)) in keys.iter().enumerate() {
            self.lev_gid_to_bucket[self.lev_offsets[lev] + gid] = bucket;
        }

        self.proc_box_counts = vec![0; num_procs];

        for &pid in &self.bucket_to_pid {
            self.proc_box_counts[pid] += 1;
        }

        self.proc_box_offsets = Vec::with_capacity(num_procs + 1);
        self.proc_box_offsets.push(0);

        for count in &self.proc_box_counts {
            let last = self.proc_box_offsets[self.proc_box_offsets.len() - 1];
            self.proc_box_offsets.push(last + count);
        }
        self.defined = true;

        info!("defined particle buffer map: {} levels, {} buckets, {} ranks", num_levels, keys.len(), num_procs);
    }

    /**
     * Return true if this map was defined from exactly the grids and owners
     * currently held by `gdb`. Box arrays and mappings compare equal if they
     * share storage or have the same contents.
     */
    pub fn is_valid<G: ParGdb<D> + ?Sized>(&self, gdb: &G) -> bool {
        if !self.defined || gdb.num_levels() != self.ba.len() {
            return false
        }
        (0..self.ba.len()).all(|lev| {
            gdb.box_array(lev) == &self.ba[lev] &&
            gdb.distribution_map(lev) == &self.dm[lev]
        })
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn num_levels(&self) -> usize {
        self.assert_defined();
        self.lev_offsets.len() - 1
    }

    pub fn num_buckets(&self) -> usize {
        self.assert_defined();
        self.bucket_to_gid.len()
    }

    pub fn bucket_to_grid(&self, bucket: usize) -> usize {
        self.assert_defined();
        self.bucket_to_gid[bucket]
    }

    pub fn bucket_to_level(&self, bucket: usize) -> usize {
        self.assert_defined();
        self.bucket_to_lev[bucket]
    }

    pub fn bucket_to_proc(&self, bucket: usize) -> usize {
        self.assert_defined();
        self.bucket_to_pid[bucket]
    }

    pub fn grid_and_lev_to_bucket(&self, gid: usize, lev: usize) -> usize {
        self.assert_defined();
        self.lev_gid_to_bucket[self.lev_offsets[lev] + gid]
    }

    pub fn first_bucket_on_proc(&self, pid: usize) -> usize {
        self.assert_defined();
        self.proc_box_offsets[pid]
    }

    pub fn num_boxes_on_proc(&self, pid: usize) -> usize {
        self.assert_defined();
        self.proc_box_counts[pid]
    }

    pub fn all_buckets_on_proc(&self, pid: usize) -> Vec<usize> {
        let first = self.first_bucket_on_proc(pid);
        (first..first + self.num_boxes_on_proc(pid)).collect()
    }

    /**
     * Return the owner of a grid, read from the distribution mapping.
     */
    pub fn proc_id(&self, gid: usize, lev: usize) -> usize {
        self.assert_defined();
        self.dm[lev][gid]
    }

    pub fn pid_functor(&self) -> GetPid<'_> {
        self.assert_defined();
        GetPid {
            bucket_to_pid: &self.bucket_to_pid,
            lev_gid_to_bucket: &self.lev_gid_to_bucket,
            lev_offsets: &self.lev_offsets,
        }
    }

    pub fn bucket_functor(&self) -> GetBucket<'_> {
        self.assert_defined();
        GetBucket {
            lev_gid_to_bucket: &self.lev_gid_to_bucket,
            lev_offsets: &self.lev_offsets,
        }
    }

    fn assert_defined(&self) {
        assert!(self.defined, "ParticleBufferMap used before define");
    }
}
