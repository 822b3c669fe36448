use boxmesh::{box_domain, box_list};
use boxmesh::{
    AlgPartition,
    BoxArray,
    BoxDomain,
    BoxList,
    DistributionMapping,
    GridHierarchy,
    IndexBox,
    IntVect,
    ParGdb,
    ParticleBufferMap,
    Periodicity,
};




fn stupid_random_boxes(len: usize, extent: i64, mut seed: u64) -> Vec<IndexBox<3>> {
    let mut next = move || {
        seed = (1103515245 * seed + 12345) % (1 << 31);
        (seed >> 8) as i64
    };
    (0..len).map(|_| {
        let lo = [next() % extent, next() % extent, next() % extent];
        let hi = [lo[0] + next() % 6, lo[1] + next() % 6, lo[2] + next() % 6];
        IndexBox::cell(lo, hi)
    }).collect()
}

fn random_domain(len: usize, extent: i64, seed: u64) -> BoxDomain<3> {
    let mut bd = BoxDomain::new();
    for bx in stupid_random_boxes(len, extent, seed) {
        bd.add(bx)
    }
    bd
}




#[test]
fn coarsen_and_refine_preserve_disjointness() {
    for seed in 1..6 {
        let bd = random_domain(20, 24, seed);
        assert!(bd.ok());

        for &ratio in &[2, 3, 4] {
            assert!(box_domain::coarsen(&bd, ratio).ok());
            assert!(box_domain::refine(&bd, ratio).ok());
        }
    }
}

#[test]
fn complement_and_domain_exactly_cover_box() {
    let bx = IndexBox::cell([0, 0, 0], [23, 23, 23]);

    for seed in 1..6 {
        let bd = box_domain::intersect(&random_domain(25, 26, seed), &bx);
        let c = box_domain::complement_in(bx, &bd);

        assert!(c.ok());
        assert_eq!(c.num_pts() + bd.num_pts(), bx.num_pts());

        let mut union = c.clone();
        union.add_list(bd.box_list());
        assert_eq!(union.num_pts(), bx.num_pts());
    }
}

#[test]
fn simplify_is_idempotent() {
    for seed in 1..6 {
        let mut bl = box_list::remove_overlap(&BoxList::from_boxes(stupid_random_boxes(40, 20, seed)));
        bl.max_size(2);
        assert!(bl.is_disjoint());
        let cells = bl.num_pts();

        bl.simplify(true);
        let once = bl.clone();
        bl.simplify(true);

        assert_eq!(bl, once);
        assert_eq!(bl.num_pts(), cells);
    }
}

#[test]
fn partition_covers_rows() {
    for &n in &[0, 1, 17, 1000, 12345] {
        for p in 1..12 {
            let part = AlgPartition::with_global_size(n, p);
            let rows = part.rows();

            assert_eq!(rows[p], n);
            assert!(rows.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!((0..p).map(|i| part.local_range(i).end - part.local_range(i).start).sum::<i64>(), n);
            assert_eq!(part.num_active_procs(), (n as usize).min(p));
        }
    }
}

#[test]
fn periodic_shift_counts() {
    let periodic = Periodicity::new(IntVect::from([32, 32, 32]));
    let open = Periodicity::<3>::non_periodic();
    let ghost = IntVect::splat(1);

    assert_eq!(periodic.shift_int_vect(ghost).len(), 27);
    assert_eq!(open.shift_int_vect(ghost), vec![IntVect::zero()]);
}

#[test]
fn buffer_map_round_trips_grids() {
    let mut gdb = GridHierarchy::new(5);

    for lev in 0..4 {
        let ba = BoxArray::chopped(IndexBox::cell([0, 0, 0], [15, 15, 15]).refine(1 << lev), 8);
        let dm = DistributionMapping::round_robin(ba.len(), 5);
        gdb.add_level(ba, dm);
    }
    let map = ParticleBufferMap::from_gdb(&gdb);
    let total: usize = (0..gdb.num_levels()).map(|lev| gdb.box_array(lev).len()).sum();

    assert_eq!(map.num_buckets(), total);

    for lev in 0..gdb.num_levels() {
        for gid in 0..gdb.box_array(lev).len() {
            assert_eq!(map.bucket_to_grid(map.grid_and_lev_to_bucket(gid, lev)), gid);
        }
    }
}

#[test]
fn hole_in_square_leaves_84_cells() {
    let b = IndexBox::cell([0, 0], [9, 9]);
    let d = BoxDomain::from_box(IndexBox::cell([2, 2], [5, 5]));
    assert!(d.ok());

    let c = box_domain::complement_in(b, &d).into_box_list();
    assert!(c.is_disjoint());
    assert_eq!(c.num_pts(), 84);
    assert!(d.ok());
}
