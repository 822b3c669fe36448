use std::ops::Range;
use std::sync::{Arc, RwLock};
use log::info;
use crate::comm::{self, Communicator};
use crate::error::Error;




/**
 * Immutable row table, published as a unit whenever a partition is defined.
 */
#[derive(Debug, PartialEq, Eq)]
struct Table {
    rows: Vec<i64>,
    num_active_procs: usize,
}

impl Table {
    fn new(rows: Vec<i64>) -> Self {
        let num_active_procs = rows.windows(2).filter(|w| w[1] > w[0]).count();
        Self { rows, num_active_procs }
    }
}




/**
 * Assigns contiguous ranges of rows of a distributed vector or matrix to
 * ranks. Entry `i` of the table is the first row owned by rank `i`, and the
 * last entry is the total number of rows.
 *
 * An `AlgPartition` is a handle: clones share one table, and defining any of
 * them replaces the table seen by all of them. Each definition publishes a
 * new immutable table, so a snapshot taken with `rows` stays consistent even
 * if the partition is redefined afterwards. Like every mutating operation in
 * this crate, redefinition should be confined to setup code.
 */
#[derive(Clone, Debug, Default)]
pub struct AlgPartition {
    shared: Arc<RwLock<Option<Arc<Table>>>>,
}




// ============================================================================
impl AlgPartition {

    /**
     * Create a partition which has not been defined yet.
     */
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_size(global_size: i64, num_procs: usize) -> Self {
        let result = Self::new();
        result.define(global_size, num_procs);
        result
    }

    pub fn from_rows(rows: Vec<i64>) -> Self {
        let result = Self::new();
        result.define_rows(rows);
        result
    }

    /**
     * Split `global_size` rows as evenly as possible over `num_procs` ranks.
     * The first `global_size % num_procs` ranks get one extra row.
     */
    pub fn define(&self, global_size: i64, num_procs: usize) {
        assert!(num_procs > 0, "partition needs at least one rank");
        assert!(global_size >= 0, "partition size must be non-negative, got {}", global_size);

        let p = num_procs as i64;
        let sz = global_size / p;
        let extra = global_size - sz * p;

        let rows = (0..=p)
            .map(|i| if i < extra { i * (sz + 1) } else { i * sz + extra })
            .collect();

        self.publish(rows)
    }

    /**
     * Split `global_size` rows over the ranks of a communicator.
     */
    pub fn define_on<C: Communicator + ?Sized>(&self, comm: &C, global_size: i64) {
        self.define(global_size, comm.size())
    }

    /**
     * Adopt a table of row boundaries. Panics if the table is empty, does
     * not start at zero, or decreases anywhere.
     */
    pub fn define_rows(&self, rows: Vec<i64>) {
        if let Err(e) = self.try_define_rows(rows) {
            panic!("{}", e)
        }
    }

    /**
     * Adopt a table of row boundaries, or return an error describing why the
     * table is invalid. The partition is left unchanged on error.
     */
    pub fn try_define_rows(&self, rows: Vec<i64>) -> Result<(), Error> {
        match rows.first() {
            None => return Err(Error::EmptyPartition),
            Some(&r) if r != 0 => return Err(Error::PartitionStartsAt(r)),
            Some(_) => {}
        }
        if let Some(i) = rows.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::DecreasingPartition { index: i + 1, prev: rows[i], next: rows[i + 1] })
        }
        self.publish(rows);
        Ok(())
    }

    /**
     * Replace this partition's table with the one held on rank 0. Must be
     * called collectively, and the partition must be defined on rank 0.
     */
    pub fn broadcast<C: Communicator + ?Sized>(&self, comm: &C) -> Result<(), Error> {
        let rows = if comm.rank() == 0 {
            self.table().rows.clone()
        } else {
            Vec::new()
        };
        let rows: Vec<i64> = comm::broadcast_value(comm, &rows)?;
        self.try_define_rows(rows)
    }

    /**
     * Return true if the partition has not been defined.
     */
    pub fn is_empty(&self) -> bool {
        self.shared.read().unwrap().is_none()
    }

    pub fn row(&self, i: usize) -> i64 {
        self.table().rows[i]
    }

    pub fn num_global_rows(&self) -> i64 {
        let table = self.table();
        table.rows[table.rows.len() - 1]
    }

    /**
     * Return the number of ranks which own at least one row.
     */
    pub fn num_active_procs(&self) -> usize {
        self.table().num_active_procs
    }

    pub fn num_procs(&self) -> usize {
        self.table().rows.len() - 1
    }

    /**
     * Return a snapshot of the row table. The snapshot is not affected by
     * later redefinitions.
     */
    pub fn rows(&self) -> Arc<[i64]> {
        self.table().rows.as_slice().into()
    }

    pub fn local_range(&self, rank: usize) -> Range<i64> {
        let table = self.table();
        table.rows[rank]..table.rows[rank + 1]
    }

    /**
     * Return the rank which owns the given row.
     */
    pub fn owner_of_row(&self, row: i64) -> usize {
        let table = self.table();
        let n = table.rows[table.rows.len() - 1];
        assert!(0 <= row && row < n, "row {} is outside the partition [0, {})", row, n);
        table.rows.partition_point(|&r| r <= row) - 1
    }

    /**
     * Return true if the two handles share one table.
     */
    pub fn same_ref(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn table(&self) -> Arc<Table> {
        match &*self.shared.read().unwrap() {
            Some(table) => table.clone(),
            None => panic!("AlgPartition used before it was defined"),
        }
    }

    fn publish(&self, rows: Vec<i64>) {
        let table = Table::new(rows);

        info!(
            "defined partition of {} rows over {} ranks ({} active)",
            table.rows[table.rows.len() - 1],
            table.rows.len() - 1,
            table.num_active_procs);

        *self.shared.write().unwrap() = Some(Arc::new(table));
    }
}




// ============================================================================
impl PartialEq for AlgPartition {
    fn eq(&self, other: &Self) -> bool {
        if self.same_ref(other) {
            return true
        }
        let a = self.shared.read().unwrap().clone();
        let b = other.shared.read().unwrap().clone();
        a == b
    }
}

impl Eq for AlgPartition {}




// ============================================================================
#[cfg(test)]
mod test {

    use std::thread;
    use crate::comm::{Communicator, ThreadCommunicator};
    use crate::error::Error;
    use super::AlgPartition;

    #[test]
    fn even_split_covers_all_rows() {
        for &(n, p) in &[(0, 1), (0, 4), (3, 5), (10, 3), (100, 7), (64, 8)] {
            let part = AlgPartition::with_global_size(n, p);
            let rows = part.rows();

            assert_eq!(rows.len(), p + 1);
            assert_eq!(rows[0], 0);
            assert_eq!(rows[p], n);
            assert!(rows.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!((0..p).map(|i| rows[i + 1] - rows[i]).sum::<i64>(), n);
            assert!((0..p).all(|i| (rows[i + 1] - rows[i] - n / p as i64).abs() <= 1));
        }
    }

    #[test]
    fn remainder_goes_to_lowest_ranks() {
        let part = AlgPartition::with_global_size(10, 4);
        assert_eq!(&*part.rows(), &[0, 3, 6, 8, 10]);
        assert_eq!(part.num_active_procs(), 4);
        assert_eq!(part.num_global_rows(), 10);
    }

    #[test]
    fn fewer_rows_than_ranks() {
        let part = AlgPartition::with_global_size(3, 5);
        assert_eq!(&*part.rows(), &[0, 1, 2, 3, 3, 3]);
        assert_eq!(part.num_active_procs(), 3);
        assert_eq!(part.num_procs(), 5);
    }

    #[test]
    fn owner_of_row_skips_empty_ranks() {
        let part = AlgPartition::from_rows(vec![0, 0, 3, 3, 5]);
        assert_eq!(part.owner_of_row(0), 1);
        assert_eq!(part.owner_of_row(2), 1);
        assert_eq!(part.owner_of_row(3), 3);
        assert_eq!(part.owner_of_row(4), 3);
        assert_eq!(part.local_range(1), 0..3);
        assert_eq!(part.num_active_procs(), 2);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        let part = AlgPartition::new();
        assert!(matches!(part.try_define_rows(vec![]), Err(Error::EmptyPartition)));
        assert!(matches!(part.try_define_rows(vec![1, 2]), Err(Error::PartitionStartsAt(1))));
        assert!(matches!(
            part.try_define_rows(vec![0, 4, 2]),
            Err(Error::DecreasingPartition { index: 2, prev: 4, next: 2 })));
        assert!(part.is_empty());
    }

    #[test]
    #[should_panic]
    fn define_rows_panics_on_decreasing_table() {
        AlgPartition::from_rows(vec![0, 5, 4]);
    }

    #[test]
    #[should_panic]
    fn undefined_partition_panics_on_access() {
        AlgPartition::new().num_global_rows();
    }

    #[test]
    fn clones_observe_redefinition() {
        let a = AlgPartition::with_global_size(10, 2);
        let b = a.clone();
        let snapshot = a.rows();

        a.define(20, 4);
        assert_eq!(b.num_global_rows(), 20);
        assert_eq!(b.num_procs(), 4);
        assert_eq!(snapshot[2], 10);
        assert!(a.same_ref(&b));
    }

    #[test]
    fn equality_compares_tables() {
        let a = AlgPartition::with_global_size(10, 4);
        let b = AlgPartition::from_rows(vec![0, 3, 6, 8, 10]);
        let c = AlgPartition::from_rows(vec![0, 4, 6, 8, 10]);
        assert!(a == b);
        assert!(a != c);
        assert!(a == a.clone());
        assert!(AlgPartition::new() == AlgPartition::new());
    }

    #[test]
    fn broadcast_replicates_table() {
        let procs: Vec<_> = ThreadCommunicator::group(4)
            .into_iter()
            .map(|comm| thread::spawn(move || {
                let part = AlgPartition::new();
                if comm.rank() == 0 {
                    part.define_rows(vec![0, 2, 2, 7, 9]);
                }
                part.broadcast(&comm).unwrap();
                part.rows().to_vec()
            }))
            .collect();

        for process in procs {
            assert_eq!(process.join().unwrap(), vec![0, 2, 2, 7, 9]);
        }
    }

    #[test]
    fn define_on_uses_communicator_size() {
        let comm = ThreadCommunicator::group(3).remove(0);
        let part = AlgPartition::new();
        part.define_on(&comm, 7);
        assert_eq!(&*part.rows(), &[0, 3, 5, 7]);
    }
}
