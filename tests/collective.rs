use std::thread;
use boxmesh::comm::{Communicator, ThreadCommunicator};
use boxmesh::{AlgPartition, BoxList, IndexBox};




/**
 * Run a closure on every rank of an in-process communicator, and return the
 * results in rank order.
 */
fn run_collective<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(ThreadCommunicator) -> T + Send + Sync + Copy + 'static,
{
    ThreadCommunicator::group(size)
        .into_iter()
        .map(|comm| thread::spawn(move || f(comm)))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|process| process.join().unwrap())
        .collect()
}




#[test]
fn box_list_broadcast_replicates_root_list() {
    let lists = run_collective(5, |comm| {
        let mut bl = if comm.rank() == 0 {
            BoxList::chopped(IndexBox::cell([0, 0, 0], [31, 15, 15]), 6)
        } else {
            BoxList::new()
        };
        bl.broadcast(&comm).unwrap();
        bl
    });
    let expected = BoxList::chopped(IndexBox::cell([0, 0, 0], [31, 15, 15]), 6);

    for bl in lists {
        assert_eq!(bl, expected);
    }
}

#[test]
fn partition_defined_on_communicator_is_replicated() {
    let tables = run_collective(6, |comm| {
        let part = AlgPartition::new();
        part.define_on(&comm, 1000);
        (comm.rank(), part.local_range(comm.rank()), part.rows().to_vec())
    });

    let mut next = 0;

    for (rank, range, rows) in &tables {
        assert_eq!(rows, &tables[0].2);
        assert_eq!(range.start, next);
        assert_eq!(rows[*rank], range.start);
        next = range.end;
    }
    assert_eq!(next, 1000);
}
