use core::fmt;
use serde::{Deserialize, Serialize};
use crate::int_vect::IntVect;




/**
 * Identifier for the centering of an index space along a single axis
 */
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Centering {
    Cell,
    Node,
}




/**
 * Tags each axis of a D-dimensional index space as either cell-centered or
 * node-centered. Stored as a bit field: bit `d` is set if axis `d` is
 * node-centered.
 */
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct IndexType<const D: usize> {
    bits: u32,
}




// ============================================================================
impl<const D: usize> IndexType<D> {

    /**
     * Cell-centered on every axis.
     */
    pub const fn cell() -> Self {
        Self { bits: 0 }
    }

    /**
     * Node-centered on every axis.
     */
    pub fn node() -> Self {
        assert!(D <= 32, "index type supports at most 32 dimensions");
        Self { bits: ((1u64 << D) - 1) as u32 }
    }

    pub fn from_centerings(centerings: [Centering; D]) -> Self {
        let mut result = Self::cell();

        for (dir, c) in centerings.iter().enumerate() {
            if *c == Centering::Node {
                result.set_node(dir)
            }
        }
        result
    }

    pub fn centering(&self, dir: usize) -> Centering {
        if self.is_node(dir) {
            Centering::Node
        } else {
            Centering::Cell
        }
    }

    pub fn is_node(&self, dir: usize) -> bool {
        self.bits & (1 << dir) != 0
    }

    pub fn is_cell(&self, dir: usize) -> bool {
        !self.is_node(dir)
    }

    pub fn set_node(&mut self, dir: usize) {
        assert!(dir < D, "axis {} out of range for {}-d index type", dir, D);
        self.bits |= 1 << dir
    }

    pub fn set_cell(&mut self, dir: usize) {
        assert!(dir < D, "axis {} out of range for {}-d index type", dir, D);
        self.bits &= !(1 << dir)
    }

    pub fn cell_centered(&self) -> bool {
        self.bits == 0
    }

    pub fn node_centered(&self) -> bool {
        *self == Self::node()
    }

    /**
     * Return a vector with 1 on node-centered axes and 0 on cell-centered
     * ones.
     */
    pub fn as_int_vect(&self) -> IntVect<D> {
        let mut result = IntVect::zero();

        for dir in 0..D {
            if self.is_node(dir) {
                result[dir] = 1
            }
        }
        result
    }
}




// ============================================================================
impl<const D: usize> Default for IndexType<D> {
    fn default() -> Self {
        Self::cell()
    }
}

impl<const D: usize> fmt::Display for IndexType<D> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.as_int_vect())
    }
}
