use core::fmt;
use log::{debug, warn};
use crate::box_list::{self, BoxList};
use crate::index_box::IndexBox;
use crate::index_type::IndexType;
use crate::int_vect::IntVect;




/**
 * A list of mutually disjoint boxes, representing a set of indexes. A
 * `BoxDomain` holds a `BoxList` but is not one: only operations which keep
 * the boxes disjoint are exposed. Adding a box inserts just the part of it
 * not already covered, so the domain behaves as a union. Transforms which
 * could make boxes overlap (coarsening, growing) rebuild the domain from the
 * transformed boxes the same way.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxDomain<const D: usize> {
    list: BoxList<D>,
}




// ============================================================================
impl<const D: usize> BoxDomain<D> {

    pub fn new() -> Self {
        Self::with_index_type(IndexType::cell())
    }

    pub fn with_index_type(itype: IndexType<D>) -> Self {
        Self { list: BoxList::with_index_type(itype) }
    }

    pub fn from_box(bx: IndexBox<D>) -> Self {
        let mut result = Self::with_index_type(bx.index_type());
        result.add(bx);
        result
    }

    /**
     * Wrap a list which is known to be disjoint.
     */
    fn from_disjoint(list: BoxList<D>) -> Self {
        debug_assert!(list.is_disjoint(), "box list is not disjoint");
        Self { list }
    }

    /**
     * Build a domain covering the union of the given boxes.
     */
    fn rebuild(list: &BoxList<D>) -> Self {
        let mut result = Self::with_index_type(list.index_type());
        result.add_list(list);
        debug!("rebuilt box domain: {} boxes -> {} disjoint boxes", list.len(), result.len());
        result
    }

    pub fn index_type(&self) -> IndexType<D> {
        self.list.index_type()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, IndexBox<D>> {
        self.list.iter()
    }

    /**
     * Return the number of indexes in the domain. Since the boxes are
     * disjoint, each index is counted once.
     */
    pub fn num_pts(&self) -> i64 {
        self.list.num_pts()
    }

    pub fn minimal_box(&self) -> IndexBox<D> {
        self.list.minimal_box()
    }

    pub fn contains_index(&self, index: IntVect<D>) -> bool {
        self.list.contains_index(index)
    }

    /**
     * Determine whether the domain covers every box of the given list.
     */
    pub fn contains(&self, other: &BoxList<D>) -> bool {
        self.list.contains(other)
    }

    pub fn box_list(&self) -> &BoxList<D> {
        &self.list
    }

    pub fn into_box_list(self) -> BoxList<D> {
        self.list
    }

    /**
     * Add the indexes of a box to the domain. The part of the box already
     * covered by the domain is clipped off, and the remainder is appended
     * as disjoint pieces.
     */
    pub fn add(&mut self, bx: IndexBox<D>) {
        assert!(
            bx.index_type() == self.index_type(),
            "index type mismatch: domain is {}, box is {}", self.index_type(), bx);

        for piece in box_list::subtract_all(bx, self.list.as_slice()) {
            self.list.push(piece)
        }
    }

    /**
     * Add the indexes of every box in the list.
     */
    pub fn add_list(&mut self, bl: &BoxList<D>) {
        for bx in bl {
            self.add(*bx)
        }
    }

    /**
     * Remove a box which exactly matches `bx`. Does nothing if there is no
     * such box; partially overlapping boxes are left alone. To remove a
     * region instead, use `subtract`.
     */
    pub fn rm_box(&mut self, bx: &IndexBox<D>) -> &mut Self {
        if let Some(i) = self.list.iter().position(|b| b == bx) {
            self.list.remove(i);
        }
        self
    }

    /**
     * Remove the indexes of `bx` from the domain. Boxes which straddle its
     * boundary are split.
     */
    pub fn subtract(&mut self, bx: &IndexBox<D>) -> &mut Self {
        let mut result = BoxList::with_index_type(self.index_type());

        for b in &self.list {
            if b.intersects(bx) {
                result.join(&box_list::box_diff(b, bx))
            } else {
                result.push(*b)
            }
        }
        self.list = result;
        self
    }

    /**
     * Determine whether this domain is valid: every box is non-empty and no
     * two boxes intersect. An empty domain is valid.
     */
    pub fn ok(&self) -> bool {
        if !self.list.ok() {
            warn!("invalid box domain: contains an empty box");
            return false;
        }
        match box_list::first_overlap(self.list.as_slice()) {
            Some((i, j)) => {
                let boxes = self.list.as_slice();
                warn!("invalid box domain: boxes {} and {} intersect", boxes[i], boxes[j]);
                false
            }
            None => true,
        }
    }

    /**
     * Merge abutting boxes. See `BoxList::simplify`.
     */
    pub fn simplify(&mut self, best: bool) -> usize {
        self.list.simplify(best)
    }

    pub fn shift(&mut self, offset: IntVect<D>) -> &mut Self {
        self.list.shift(offset);
        self
    }

    pub fn refine(&mut self, ratio: i64) -> &mut Self {
        self.list.refine(ratio);
        self
    }

    /**
     * Coarsen every box. Disjoint fine boxes may cover the same coarse cell,
     * so the domain is rebuilt from the coarsened boxes.
     */
    pub fn coarsen(&mut self, ratio: i64) -> &mut Self {
        let mut coarse = self.list.clone();
        coarse.coarsen(ratio);
        *self = Self::rebuild(&coarse);
        self
    }

    pub fn intersect(&mut self, bx: &IndexBox<D>) -> &mut Self {
        self.list.intersect(bx);
        self
    }

    /**
     * Grow every box by `delta`. Grown boxes generally overlap, so the
     * domain is rebuilt from them and then simplified.
     */
    pub fn accrete(&mut self, delta: i64) -> &mut Self {
        let mut grown = self.list.clone();
        grown.accrete(delta);
        *self = Self::rebuild(&grown);
        self.list.simplify(true);
        self
    }

    /**
     * Replace this domain with the complement of `other` within `bx`.
     */
    pub fn complement_in(&mut self, bx: IndexBox<D>, other: &Self) -> &mut Self {
        self.list.complement_in(bx, &other.list);
        self
    }
}




// ============================================================================
impl<const D: usize> Default for BoxDomain<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const D: usize> IntoIterator for &'a BoxDomain<D> {
    type Item = &'a IndexBox<D>;
    type IntoIter = core::slice::Iter<'a, IndexBox<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const D: usize> fmt::Display for BoxDomain<D> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "(BoxDomain {})", self.list)
    }
}




/**
 * Return the complement of the domain `bd` within `bx`.
 */
pub fn complement_in<const D: usize>(bx: IndexBox<D>, bd: &BoxDomain<D>) -> BoxDomain<D> {
    BoxDomain::from_disjoint(box_list::complement_in(bx, &bd.list))
}

pub fn coarsen<const D: usize>(bd: &BoxDomain<D>, ratio: i64) -> BoxDomain<D> {
    let mut result = bd.clone();
    result.coarsen(ratio);
    result
}

pub fn refine<const D: usize>(bd: &BoxDomain<D>, ratio: i64) -> BoxDomain<D> {
    let mut result = bd.clone();
    result.refine(ratio);
    result
}

pub fn intersect<const D: usize>(bd: &BoxDomain<D>, bx: &IndexBox<D>) -> BoxDomain<D> {
    let mut result = bd.clone();
    result.intersect(bx);
    result
}

pub fn accrete<const D: usize>(bd: &BoxDomain<D>, delta: i64) -> BoxDomain<D> {
    let mut result = bd.clone();
    result.accrete(delta);
    result
}




// ============================================================================
#[cfg(test)]
mod test {

    use crate::box_list::BoxList;
    use crate::index_box::IndexBox;
    use super::{accrete, coarsen, complement_in, refine, BoxDomain};

    fn checkerboard() -> BoxDomain<2> {
        let mut bd = BoxDomain::new();
        for i in 0..4 {
            for j in 0..4 {
                if (i + j) % 2 == 0 {
                    bd.add(IndexBox::cell([3 * i, 3 * j], [3 * i + 2, 3 * j + 2]));
                }
            }
        }
        bd
    }

    #[test]
    fn empty_domain_is_valid() {
        assert!(BoxDomain::<3>::new().ok());
    }

    #[test]
    fn add_clips_overlapping_boxes() {
        let mut bd = BoxDomain::from_box(IndexBox::cell([0, 0], [3, 3]));
        bd.add(IndexBox::cell([2, 2], [5, 5]));
        assert!(bd.ok());
        assert_eq!(bd.num_pts(), 16 + 16 - 4);
        bd.add(IndexBox::cell([1, 1], [2, 2]));
        assert_eq!(bd.num_pts(), 28);
        assert!(bd.ok());
        bd.add(IndexBox::cell([5, 0], [7, 1]));
        assert_eq!(bd.num_pts(), 34);
    }

    #[test]
    fn rm_box_needs_an_exact_match() {
        let a = IndexBox::cell([0, 0], [3, 3]);
        let b = IndexBox::cell([4, 0], [7, 3]);
        let mut bd = BoxDomain::from_box(a);
        bd.add(b);

        bd.rm_box(&IndexBox::cell([0, 0], [2, 2]));
        assert_eq!(bd.len(), 2);

        bd.rm_box(&a);
        assert_eq!(bd.iter().copied().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn subtract_removes_a_region() {
        let mut bd = BoxDomain::from_box(IndexBox::cell([0, 0], [9, 9]));
        bd.subtract(&IndexBox::cell([2, 2], [5, 5]));
        assert!(bd.ok());
        assert_eq!(bd.num_pts(), 84);
        assert!(!bd.contains_index([3, 3].into()));
    }

    #[test]
    fn coarsening_keeps_domain_disjoint() {
        let bd = checkerboard();
        assert!(bd.ok());
        let coarse = coarsen(&bd, 2);
        assert!(coarse.ok());

        for index in coarse.minimal_box().iter() {
            let fine = IndexBox::cell(index.as_array(), index.as_array()).refine(2);
            let touched = fine.iter().any(|i| bd.contains_index(i));
            assert_eq!(coarse.contains_index(index), touched);
        }
    }

    #[test]
    fn refining_keeps_domain_disjoint() {
        let fine = refine(&checkerboard(), 4);
        assert!(fine.ok());
        assert_eq!(fine.num_pts(), checkerboard().num_pts() * 16);
    }

    #[test]
    fn accrete_covers_grown_boxes() {
        let bd = checkerboard();
        let grown = accrete(&bd, 1);
        assert!(grown.ok());
        assert_eq!(grown.minimal_box(), IndexBox::cell([-1, -1], [12, 12]));

        for index in grown.minimal_box().iter() {
            let expected = bd.iter().any(|b| b.grow(1).contains(index));
            assert_eq!(grown.contains_index(index), expected);
        }
    }

    #[test]
    fn complement_in_box_is_disjoint_and_exact() {
        let b = IndexBox::cell([0, 0], [9, 9]);
        let bd = BoxDomain::from_box(IndexBox::cell([2, 2], [5, 5]));
        let c = complement_in(b, &bd);
        assert!(c.ok());
        assert_eq!(c.num_pts(), 84);
        assert!(bd.ok());
    }

    #[test]
    fn domain_covers_list() {
        let bd = checkerboard();
        assert!(bd.contains(&BoxList::from_box(IndexBox::cell([0, 0], [1, 1]))));
        assert!(!bd.contains(&BoxList::from_box(IndexBox::cell([0, 0], [3, 3]))));
    }
}
