use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use boxmesh::box_domain;
use boxmesh::{
    AlgPartition,
    BoxArray,
    BoxDomain,
    DistributionMapping,
    GridHierarchy,
    IndexBox,
    IntVect,
    ParGdb,
    ParticleBufferMap,
    Periodicity,
};

#[derive(Debug, Parser)]
#[clap(version = "1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    #[clap(short = 'n', long, default_value = "10")]
    domain_size: i64,

    #[clap(long, default_value = "2")]
    hole_lo: i64,

    #[clap(long, default_value = "5")]
    hole_hi: i64,

    #[clap(short = 'p', long, default_value = "4")]
    num_procs: usize,

    #[clap(short = 'l', long, default_value = "3")]
    num_levels: usize,

    #[clap(short = 'c', long, default_value = "8")]
    chunk: i64,

    #[clap(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let opts = Opts::parse();
    let level = if opts.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    SimpleLogger::new().with_level(level).init().unwrap();

    println!("{:?}", opts);

    let b = IndexBox::cell([0, 0], [opts.domain_size - 1, opts.domain_size - 1]);
    let d = BoxDomain::from_box(IndexBox::cell([opts.hole_lo; 2], [opts.hole_hi; 2]));
    let c = box_domain::complement_in(b, &d);

    println!();
    println!("domain ................ {}", b);
    println!("hole .................. {}", d);
    println!("complement ............ {}", c);
    println!("complement cells ...... {}", c.num_pts());
    println!("domain valid .......... {}", d.ok() && c.ok());

    let periodicity = Periodicity::<2>::new(IntVect::splat(opts.domain_size));
    println!("periodic shifts ....... {}", periodicity.shift_int_vect_all(1).len());

    let part = AlgPartition::with_global_size(b.num_pts(), opts.num_procs);
    println!("row partition ......... {:?}", &*part.rows());

    let mut gdb = GridHierarchy::new(opts.num_procs);

    for lev in 0..opts.num_levels {
        let ba = BoxArray::chopped(b.refine(1 << lev), opts.chunk);
        let dm = DistributionMapping::round_robin(ba.len(), opts.num_procs);
        gdb.add_level(ba, dm);
    }
    let map = ParticleBufferMap::from_gdb(&gdb);

    println!("buffer map buckets .... {}", map.num_buckets());

    for pid in 0..gdb.num_procs() {
        println!("  rank {} ............. {} buckets from {}", pid, map.num_boxes_on_proc(pid), map.first_bucket_on_proc(pid));
    }
}
