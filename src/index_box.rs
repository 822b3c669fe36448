use core::fmt;
use core::ops::BitAnd;
use serde::{Deserialize, Serialize};
use crate::index_type::IndexType;
use crate::int_vect::IntVect;




/**
 * Represents a rectangular region in a discrete D-dimensional index space.
 * The corners are inclusive: a box contains every index `i` with `small_end
 * <= i <= big_end` on each axis. The box is empty if `small_end[d] >
 * big_end[d]` on any axis. The index type says whether the indexes refer to
 * cells or to the nodes between them.
 */
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct IndexBox<const D: usize> {
    small: IntVect<D>,
    big: IntVect<D>,
    itype: IndexType<D>,
}




// ============================================================================
impl<const D: usize> IndexBox<D> {


    pub fn new(small: IntVect<D>, big: IntVect<D>, itype: IndexType<D>) -> Self {

        assert!(
            small.all_le(&(big + IntVect::unit())),
            "index box {} {} has negative volume", small, big);

        Self { small, big, itype }
    }


    /**
     * Construct a cell-centered box from its inclusive corners.
     */
    pub fn cell(small: [i64; D], big: [i64; D]) -> Self {
        Self::new(small.into(), big.into(), IndexType::cell())
    }


    /**
     * Return the canonical empty box of the given index type.
     */
    pub fn empty(itype: IndexType<D>) -> Self {
        Self { small: IntVect::unit(), big: IntVect::zero(), itype }
    }


    /**
     * Construct a box from corners which may describe an empty region. Empty
     * regions collapse to the canonical empty box.
     */
    fn clamped(small: IntVect<D>, big: IntVect<D>, itype: IndexType<D>) -> Self {
        if small.all_le(&big) {
            Self { small, big, itype }
        } else {
            Self::empty(itype)
        }
    }


    pub fn small_end(&self) -> IntVect<D> {
        self.small
    }


    pub fn big_end(&self) -> IntVect<D> {
        self.big
    }


    pub fn index_type(&self) -> IndexType<D> {
        self.itype
    }


    pub fn same_type(&self, other: &Self) -> bool {
        self.itype == other.itype
    }


    /**
     * Determine whether this box contains at least one index.
     */
    pub fn ok(&self) -> bool {
        self.small.all_le(&self.big)
    }


    pub fn is_empty(&self) -> bool {
        !self.ok()
    }


    /**
     * Return the number of indexes along the given axis.
     */
    pub fn length(&self, dir: usize) -> i64 {
        (self.big[dir] - self.small[dir] + 1).max(0)
    }


    /**
     * Return the number of indexes along each axis.
     */
    pub fn size(&self) -> IntVect<D> {
        (self.big - self.small + IntVect::unit()).map(|n| n.max(0))
    }


    /**
     * Return the number of indexes in this box.
     */
    pub fn num_pts(&self) -> i64 {
        if self.ok() {
            self.size().product()
        } else {
            0
        }
    }


    /**
     * Return the longest side length and the axis it lies along. Ties go to
     * the lowest axis.
     */
    pub fn longside(&self) -> (i64, usize) {
        let mut result = (self.length(0), 0);

        for dir in 1..D {
            if self.length(dir) > result.0 {
                result = (self.length(dir), dir)
            }
        }
        result
    }


    /**
     * Determine whether this box contains the given index.
     */
    pub fn contains(&self, index: IntVect<D>) -> bool {
        self.small.all_le(&index) && index.all_le(&self.big)
    }


    /**
     * Determine whether another box is a subset of this one. The empty box is
     * a subset of every box.
     */
    pub fn contains_box(&self, other: &Self) -> bool {
        self.assert_same_type(other);
        other.is_empty() || (self.small.all_le(&other.small) && other.big.all_le(&self.big))
    }


    /**
     * Determine whether this box shares at least one index with another.
     */
    pub fn intersects(&self, other: &Self) -> bool {
        self.assert_same_type(other);
        self.intersection(other).ok()
    }


    /**
     * Return the region common to both boxes, which may be empty.
     */
    pub fn intersection(&self, other: &Self) -> Self {
        self.assert_same_type(other);
        Self::clamped(
            self.small.elementwise_max(other.small),
            self.big.elementwise_min(other.big),
            self.itype)
    }


    /**
     * Return the smallest box containing both this box and another one.
     */
    pub fn min_box(&self, other: &Self) -> Self {
        self.assert_same_type(other);

        if self.is_empty() {
            *other
        } else if other.is_empty() {
            *self
        } else {
            Self {
                small: self.small.elementwise_min(other.small),
                big: self.big.elementwise_max(other.big),
                itype: self.itype,
            }
        }
    }


    /**
     * Map this box to an index space which is finer by the given factor on
     * every axis.
     */
    pub fn refine(&self, ratio: i64) -> Self {
        self.refine_vect(IntVect::splat(ratio))
    }


    pub fn refine_vect(&self, ratio: IntVect<D>) -> Self {
        assert!(ratio.all_ge(&IntVect::unit()), "refinement ratio {} must be positive", ratio);

        if self.is_empty() {
            return *self;
        }
        let nodal = self.itype.as_int_vect();
        let unit = IntVect::unit();
        Self {
            small: self.small * ratio,
            big: (self.big + unit - nodal) * ratio - unit + nodal,
            itype: self.itype,
        }
    }


    /**
     * Map this box to an index space which is coarser by the given factor on
     * every axis. Cell-centered axes round toward negative infinity, so the
     * result covers every coarse cell touched by this box. Node-centered
     * axes must be divisible by the ratio.
     */
    pub fn coarsen(&self, ratio: i64) -> Self {
        self.coarsen_vect(IntVect::splat(ratio))
    }


    pub fn coarsen_vect(&self, ratio: IntVect<D>) -> Self {
        assert!(ratio.all_ge(&IntVect::unit()), "coarsening ratio {} must be positive", ratio);

        if self.is_empty() {
            return *self;
        }
        for dir in 0..D {
            if self.itype.is_node(dir) {
                assert!(
                    self.small[dir] % ratio[dir] == 0 && self.big[dir] % ratio[dir] == 0,
                    "node-centered box {} cannot be coarsened by {} on axis {}",
                    self, ratio, dir);
            }
        }
        Self {
            small: self.small.coarsen(ratio),
            big: self.big.coarsen(ratio),
            itype: self.itype,
        }
    }


    /**
     * Determine whether coarsening by the given ratio loses no information,
     * that is, whether refining the coarsened box gives back this box.
     */
    pub fn coarsenable(&self, ratio: i64) -> bool {
        let r = IntVect::splat(ratio);
        let nodal = self.itype.as_int_vect();
        let unit = IntVect::unit();
        self.small.coarsen(r) * r == self.small
            && (self.big + unit - nodal).coarsen(r) * r == self.big + unit - nodal
    }


    /**
     * Expand this box by the given number of indexes on each side of every
     * axis. A negative value shrinks the box.
     */
    pub fn grow(&self, delta: i64) -> Self {
        self.grow_vect(IntVect::splat(delta))
    }


    pub fn grow_vect(&self, delta: IntVect<D>) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::clamped(self.small - delta, self.big + delta, self.itype)
    }


    pub fn grow_dir(&self, dir: usize, delta: i64) -> Self {
        self.grow_vect(IntVect::basis(dir, delta))
    }


    pub fn shift(&self, offset: IntVect<D>) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self { small: self.small + offset, big: self.big + offset, itype: self.itype }
    }


    pub fn shift_dir(&self, dir: usize, offset: i64) -> Self {
        self.shift(IntVect::basis(dir, offset))
    }


    /**
     * Split this box into a lower and upper part at the given index on the
     * given axis. For cells the upper part starts at `pnt`; for nodes both
     * parts share the plane of nodes at `pnt`.
     */
    pub fn chop(&self, dir: usize, pnt: i64) -> (Self, Self) {
        let mut lower = *self;
        let mut upper = *self;

        if self.itype.is_node(dir) {
            assert!(
                self.small[dir] < pnt && pnt < self.big[dir],
                "cannot chop node box {} at {} on axis {}", self, pnt, dir);
            lower.big[dir] = pnt;
        } else {
            assert!(
                self.small[dir] < pnt && pnt <= self.big[dir],
                "cannot chop cell box {} at {} on axis {}", self, pnt, dir);
            lower.big[dir] = pnt - 1;
        }
        upper.small[dir] = pnt;
        (lower, upper)
    }


    /**
     * Return this box in a different index type. Switching an axis from cell
     * to node adds the high-side node; switching it back removes it.
     */
    pub fn convert(&self, itype: IndexType<D>) -> Self {
        if self.is_empty() {
            return Self::empty(itype);
        }
        let mut result = *self;

        for dir in 0..D {
            match (self.itype.is_node(dir), itype.is_node(dir)) {
                (false, true) => result.big[dir] += 1,
                (true, false) => result.big[dir] -= 1,
                _ => {}
            }
        }
        result.itype = itype;
        result
    }


    /**
     * Return the node-centered box of the nodes bounding this box's cells.
     */
    pub fn surrounding_nodes(&self) -> Self {
        self.convert(IndexType::node())
    }


    /**
     * Return the cell-centered box of the cells enclosed by this box's nodes.
     */
    pub fn enclosed_cells(&self) -> Self {
        self.convert(IndexType::cell())
    }


    /**
     * Return an iterator which traverses the box in Fortran order (the first
     * index increases fastest).
     */
    pub fn iter(&self) -> Iter<D> {
        Iter {
            space: *self,
            next: if self.ok() { Some(self.small) } else { None },
        }
    }


    pub(crate) fn set_small(&mut self, dir: usize, value: i64) {
        self.small[dir] = value
    }


    pub(crate) fn set_big(&mut self, dir: usize, value: i64) {
        self.big[dir] = value
    }


    fn assert_same_type(&self, other: &Self) {
        assert!(
            self.same_type(other),
            "index type mismatch: {} vs {}", self, other);
    }
}




// ============================================================================
impl<const D: usize> BitAnd for IndexBox<D> {
    type Output = Self;

    fn bitand(self, other: Self) -> Self::Output {
        self.intersection(&other)
    }
}

impl<const D: usize> fmt::Display for IndexBox<D> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "({} {} {})", self.small, self.big, self.itype)
    }
}

impl<'a, const D: usize> IntoIterator for &'a IndexBox<D> {
    type Item = IntVect<D>;
    type IntoIter = Iter<D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}




/**
 * Iterator over the indexes of a box, in Fortran order.
 */
pub struct Iter<const D: usize> {
    space: IndexBox<D>,
    next: Option<IntVect<D>>,
}

impl<const D: usize> Iterator for Iter<D> {
    type Item = IntVect<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut index = current;

        self.next = None;

        for dir in 0..D {
            if index[dir] < self.space.big[dir] {
                index[dir] += 1;
                self.next = Some(index);
                break;
            }
            index[dir] = self.space.small[dir];
        }
        Some(current)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use crate::index_type::IndexType;
    use crate::int_vect::IntVect;
    use super::IndexBox;

    #[test]
    fn volume_and_lengths_work() {
        let b = IndexBox::cell([0, 0], [9, 4]);
        assert_eq!(b.length(0), 10);
        assert_eq!(b.length(1), 5);
        assert_eq!(b.num_pts(), 50);
        assert_eq!(b.longside(), (10, 0));
        assert_eq!(IndexBox::<2>::empty(IndexType::cell()).num_pts(), 0);
    }

    #[test]
    #[should_panic]
    fn negative_volume_is_rejected() {
        IndexBox::cell([0, 0], [-2, 4]);
    }

    #[test]
    fn intersection_works() {
        let a = IndexBox::cell([0, 0], [9, 9]);
        let b = IndexBox::cell([5, -3], [12, 4]);
        assert_eq!(a & b, IndexBox::cell([5, 0], [9, 4]));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&IndexBox::cell([10, 0], [12, 9])));
        assert!((a & IndexBox::cell([10, 0], [12, 9])).is_empty());
    }

    #[test]
    #[should_panic]
    fn mixed_index_types_do_not_intersect() {
        let a = IndexBox::cell([0, 0], [9, 9]);
        let b = a.surrounding_nodes();
        a.intersects(&b);
    }

    #[test]
    fn refine_then_coarsen_is_identity_for_cells() {
        let b = IndexBox::cell([-3, 2, 0], [4, 7, 1]);
        assert_eq!(b.refine(2), IndexBox::cell([-6, 4, 0], [9, 15, 3]));
        assert_eq!(b.refine(2).coarsen(2), b);
        assert!(b.refine(4).coarsenable(4));
    }

    #[test]
    fn coarsening_cells_rounds_down() {
        let b = IndexBox::cell([-3, 1], [4, 6]);
        assert_eq!(b.coarsen(2), IndexBox::cell([-2, 0], [2, 3]));
        assert!(!b.coarsenable(2));
    }

    #[test]
    fn node_boxes_refine_and_coarsen_exactly() {
        let b = IndexBox::cell([0, 0], [3, 3]).surrounding_nodes();
        assert_eq!(b.big_end(), IntVect::new([4, 4]));
        assert_eq!(b.refine(2).big_end(), IntVect::new([8, 8]));
        assert_eq!(b.refine(2).coarsen(2), b);
    }

    #[test]
    #[should_panic]
    fn node_boxes_must_coarsen_exactly() {
        let b = IndexBox::cell([0, 0], [2, 2]).surrounding_nodes();
        b.coarsen(2);
    }

    #[test]
    fn grow_can_shrink_to_empty() {
        let b = IndexBox::cell([0, 0], [2, 2]);
        assert_eq!(b.grow(1), IndexBox::cell([-1, -1], [3, 3]));
        assert!(b.grow(-2).is_empty());
        assert_eq!(b.grow_dir(1, 2), IndexBox::cell([0, -2], [2, 4]));
    }

    #[test]
    fn chop_splits_cells_and_shares_nodes() {
        let b = IndexBox::cell([0, 0], [9, 9]);
        let (lo, hi) = b.chop(0, 4);
        assert_eq!(lo, IndexBox::cell([0, 0], [3, 9]));
        assert_eq!(hi, IndexBox::cell([4, 0], [9, 9]));

        let n = b.surrounding_nodes();
        let (lo, hi) = n.chop(1, 5);
        assert_eq!(lo.big_end()[1], 5);
        assert_eq!(hi.small_end()[1], 5);
    }

    #[test]
    fn iteration_is_fortran_ordered() {
        let b = IndexBox::cell([0, 0], [1, 2]);
        let indexes: Vec<_> = b.iter().map(|i| i.as_array()).collect();
        assert_eq!(indexes, vec![[0, 0], [1, 0], [0, 1], [1, 1], [0, 2], [1, 2]]);
        assert_eq!(IndexBox::<2>::empty(IndexType::cell()).iter().count(), 0);
        assert_eq!(IndexBox::cell([0, 0, 0], [4, 4, 4]).iter().count(), 125);
    }

    #[test]
    fn min_box_bounds_both() {
        let a = IndexBox::cell([0, 0], [1, 1]);
        let b = IndexBox::cell([4, -2], [5, 0]);
        assert_eq!(a.min_box(&b), IndexBox::cell([0, -2], [5, 1]));
    }

    #[test]
    fn displays_corners_and_type() {
        let b = IndexBox::cell([0, 0], [9, 9]);
        assert_eq!(b.to_string(), "((0,0) (9,9) (0,0))");
    }

    #[test]
    fn converting_empty_box_stays_empty() {
        let empty = IndexBox::<2>::empty(IndexType::cell());
        assert_eq!(empty.surrounding_nodes().num_pts(), 0);
        assert!(empty.surrounding_nodes().index_type().node_centered());
        assert!(empty.surrounding_nodes().enclosed_cells().is_empty());

        let thin = IndexBox::cell([0, 3], [4, 2]);
        assert_eq!(thin.surrounding_nodes().num_pts(), 0);
    }
}
