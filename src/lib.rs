//! Boxmesh is the index-space core of a block-structured adaptive mesh
//! refinement (AMR) framework. It describes a computational domain as a set
//! of rectangular boxes of integer cells or nodes, and provides the set
//! algebra needed to build and transform such sets: intersection, union,
//! complement, refinement, coarsening, and growing, while keeping sets of
//! boxes disjoint where that is required. On top of the box algebra it
//! provides periodic-image enumeration and the tables which assign boxes,
//! matrix rows, and particle buckets to parallel ranks.
//!
//! All geometric types take the spatial dimension as a const generic
//! parameter. Metadata is replicated: every rank runs the same deterministic
//! construction on the same inputs, so queries never need to communicate.

pub mod alg_partition;
pub mod box_array;
pub mod box_domain;
pub mod box_list;
pub mod comm;
pub mod distribution_mapping;
pub mod error;
pub mod index_box;
pub mod index_type;
pub mod int_vect;
pub mod par_gdb;
pub mod particle_buffer_map;
pub mod periodicity;

pub use alg_partition::AlgPartition;
pub use box_array::BoxArray;
pub use box_domain::BoxDomain;
pub use box_list::BoxList;
pub use distribution_mapping::DistributionMapping;
pub use error::Error;
pub use index_box::IndexBox;
pub use index_type::{Centering, IndexType};
pub use int_vect::IntVect;
pub use par_gdb::{GridHierarchy, ParGdb};
pub use particle_buffer_map::ParticleBufferMap;
pub use periodicity::Periodicity;
