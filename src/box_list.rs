use core::fmt;
use core::iter::FromIterator;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::comm::{self, Communicator};
use crate::error::Error;
use crate::index_box::IndexBox;
use crate::index_type::IndexType;
use crate::int_vect::IntVect;




/**
 * An ordered sequence of boxes which share one index type. The boxes may
 * overlap. Bulk transforms are applied in place and return `&mut Self` so
 * they can be chained; the free functions at the bottom of this module leave
 * their input untouched and return a new list.
 */
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxList<const D: usize> {
    boxes: Vec<IndexBox<D>>,
    itype: IndexType<D>,
}




// ============================================================================
impl<const D: usize> BoxList<D> {


    /**
     * Construct an empty, cell-centered box list.
     */
    pub fn new() -> Self {
        Self::with_index_type(IndexType::cell())
    }


    pub fn with_index_type(itype: IndexType<D>) -> Self {
        Self { boxes: Vec::new(), itype }
    }


    pub fn from_box(bx: IndexBox<D>) -> Self {
        Self { boxes: vec![bx], itype: bx.index_type() }
    }


    /**
     * Construct a box list from a vector of boxes. The index type is taken
     * from the first box, and all boxes must share it.
     */
    pub fn from_boxes(boxes: Vec<IndexBox<D>>) -> Self {
        let itype = boxes.first().map_or(IndexType::cell(), |b| b.index_type());
        let mut result = Self::with_index_type(itype);

        for bx in boxes {
            result.push(bx)
        }
        result
    }


    /**
     * Cover a box with `nboxes` disjoint pieces, by recursively halving it
     * along its longest side.
     */
    pub fn chopped(bx: IndexBox<D>, nboxes: usize) -> Self {
        assert!(nboxes > 0, "cannot chop a box into zero pieces");
        assert!(
            bx.enclosed_cells().num_pts() >= nboxes as i64,
            "box {} has fewer than {} cells", bx, nboxes);

        Self::chopped_cells(bx, nboxes, None)
    }


    /**
     * Cover a box with `nboxes` disjoint slabs stacked along the given axis.
     */
    pub fn chopped_in_dir(bx: IndexBox<D>, nboxes: usize, dir: usize) -> Self {
        assert!(nboxes > 0, "cannot chop a box into zero pieces");
        assert!(
            bx.enclosed_cells().length(dir) >= nboxes as i64,
            "box {} is shorter than {} on axis {}", bx, nboxes, dir);

        Self::chopped_cells(bx, nboxes, Some(dir))
    }


    /**
     * Chop the cells of `bx` and convert the pieces back to its index type,
     * so node-centered pieces share their boundary planes.
     */
    fn chopped_cells(bx: IndexBox<D>, nboxes: usize, fixed_dir: Option<usize>) -> Self {
        let mut cells = Vec::with_capacity(nboxes);
        chop_boxes(&mut cells, bx.enclosed_cells(), nboxes, fixed_dir);

        let itype = bx.index_type();
        Self { boxes: cells.into_iter().map(|b| b.convert(itype)).collect(), itype }
    }


    /**
     * Cover a box with tiles of the given size, anchored at the box's small
     * end. Tiles on the high side are truncated to fit. The tiles are listed
     * in Fortran order.
     */
    pub fn tiled(bx: IndexBox<D>, tile_size: IntVect<D>) -> Self {
        assert!(tile_size.all_ge(&IntVect::unit()), "tile size {} must be positive", tile_size);

        let mut result = Self::with_index_type(bx.index_type());

        if bx.is_empty() {
            return result;
        }
        let len = bx.size();
        let unit = IntVect::unit();
        let num_tiles = (len + tile_size - unit).zip_with(tile_size, |a, b| a / b);

        for ijk in IndexBox::cell([0; D], (num_tiles - unit).as_array()).iter() {
            let small = ijk * tile_size;
            let big = (small + tile_size - unit).elementwise_min(len - unit);
            result.boxes.push(IndexBox::new(small, big, bx.index_type()).shift(bx.small_end()))
        }
        result
    }


    pub fn index_type(&self) -> IndexType<D> {
        self.itype
    }


    pub fn len(&self) -> usize {
        self.boxes.len()
    }


    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }


    pub fn iter(&self) -> core::slice::Iter<'_, IndexBox<D>> {
        self.boxes.iter()
    }


    pub fn as_slice(&self) -> &[IndexBox<D>] {
        &self.boxes
    }


    pub fn into_vec(self) -> Vec<IndexBox<D>> {
        self.boxes
    }


    /**
     * Return the total number of indexes in the list, counting overlapping
     * regions more than once.
     */
    pub fn num_pts(&self) -> i64 {
        self.boxes.iter().map(|b| b.num_pts()).sum()
    }


    /**
     * Determine whether every box in the list is non-empty.
     */
    pub fn ok(&self) -> bool {
        self.boxes.iter().all(|b| b.ok())
    }


    /**
     * Determine whether the given index lies in at least one box of the
     * list.
     */
    pub fn contains_index(&self, index: IntVect<D>) -> bool {
        self.boxes.iter().any(|b| b.contains(index))
    }


    /**
     * Determine whether the union of this list covers every box of another
     * list. Returns false if either list is empty.
     */
    pub fn contains(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.assert_same_type(other.itype);
        other.iter().all(|b| complement_in(*b, self).is_empty())
    }


    /**
     * Determine whether no two boxes in the list overlap. Boxes are swept in
     * order of their low edge on the first axis, so only boxes which overlap
     * on that axis are tested against each other.
     */
    pub fn is_disjoint(&self) -> bool {
        first_overlap(&self.boxes).is_none()
    }


    /**
     * Return the smallest box containing every box in the list, or the
     * canonical empty box if the list is empty.
     */
    pub fn minimal_box(&self) -> IndexBox<D> {
        self.boxes
            .iter()
            .fold(IndexBox::empty(self.itype), |acc, b| acc.min_box(b))
    }


    pub fn push(&mut self, bx: IndexBox<D>) {
        self.assert_same_type(bx.index_type());
        self.boxes.push(bx)
    }


    /**
     * Append copies of the boxes in another list.
     */
    pub fn join(&mut self, other: &Self) {
        if !other.is_empty() {
            self.assert_same_type(other.itype);
        }
        self.boxes.extend_from_slice(&other.boxes)
    }


    /**
     * Move the boxes of another list onto the end of this one, leaving the
     * other list empty.
     */
    pub fn catenate(&mut self, other: &mut Self) {
        if !other.is_empty() {
            self.assert_same_type(other.itype);
        }
        self.boxes.append(&mut other.boxes)
    }


    pub fn clear(&mut self) {
        self.boxes.clear()
    }


    pub(crate) fn remove(&mut self, i: usize) -> IndexBox<D> {
        self.boxes.remove(i)
    }


    pub fn remove_empty(&mut self) -> &mut Self {
        self.boxes.retain(|b| b.ok());
        self
    }


    /**
     * Replace each box by its intersection with `bx`, dropping empty results.
     */
    pub fn intersect(&mut self, bx: &IndexBox<D>) -> &mut Self {
        self.assert_same_type(bx.index_type());

        for b in self.boxes.iter_mut() {
            *b = b.intersection(bx)
        }
        self.remove_empty()
    }


    /**
     * Replace the list with the pairwise intersections of its boxes with the
     * boxes of another list.
     */
    pub fn intersect_list(&mut self, other: &Self) -> &mut Self {
        self.assert_same_type(other.itype);

        let boxes = self.boxes
            .iter()
            .flat_map(|a| other.iter().map(move |b| a.intersection(b)))
            .filter(|b| b.ok())
            .collect();

        self.boxes = boxes;
        self
    }


    pub fn refine(&mut self, ratio: i64) -> &mut Self {
        self.refine_vect(IntVect::splat(ratio))
    }


    pub fn refine_vect(&mut self, ratio: IntVect<D>) -> &mut Self {
        for b in self.boxes.iter_mut() {
            *b = b.refine_vect(ratio)
        }
        self
    }


    pub fn coarsen(&mut self, ratio: i64) -> &mut Self {
        self.coarsen_vect(IntVect::splat(ratio))
    }


    pub fn coarsen_vect(&mut self, ratio: IntVect<D>) -> &mut Self {
        for b in self.boxes.iter_mut() {
            *b = b.coarsen_vect(ratio)
        }
        self
    }


    /**
     * Grow every box by `delta` on each side of every axis. A negative value
     * shrinks the boxes, and boxes which vanish are dropped.
     */
    pub fn accrete(&mut self, delta: i64) -> &mut Self {
        self.accrete_vect(IntVect::splat(delta))
    }


    pub fn accrete_vect(&mut self, delta: IntVect<D>) -> &mut Self {
        for b in self.boxes.iter_mut() {
            *b = b.grow_vect(delta)
        }
        self.remove_empty()
    }


    pub fn shift(&mut self, offset: IntVect<D>) -> &mut Self {
        for b in self.boxes.iter_mut() {
            *b = b.shift(offset)
        }
        self
    }


    pub fn convert(&mut self, itype: IndexType<D>) -> &mut Self {
        for b in self.boxes.iter_mut() {
            *b = b.convert(itype)
        }
        self.itype = itype;
        self
    }


    pub fn surrounding_nodes(&mut self) -> &mut Self {
        self.convert(IndexType::node())
    }


    pub fn enclosed_cells(&mut self) -> &mut Self {
        self.convert(IndexType::cell())
    }


    /**
     * Replace this list with the complement of `other` within `bx`: a list
     * of disjoint boxes covering exactly the indexes of `bx` which are not
     * covered by any box of `other`.
     *
     * The region outside the bounding box of `other` is obtained directly by
     * a box difference. The region inside it is cut into blocks sized after
     * the average box of `other`, and the blocks are processed in parallel;
     * each block is split against every box of `other` that touches it. The
     * output order depends only on the inputs.
     */
    pub fn complement_in(&mut self, bx: IndexBox<D>, other: &Self) -> &mut Self {
        if !other.is_empty() {
            other.assert_same_type(bx.index_type());
        }
        self.boxes.clear();
        self.itype = bx.index_type();

        if bx.is_empty() {
            return self;
        }
        match other.len() {
            0 => self.boxes.push(bx),
            1 => self.boxes = box_diff(&bx, &other.boxes[0]).boxes,
            n => {
                let mbox = other.minimal_box();
                self.boxes = box_diff(&bx, &mbox).boxes;

                let mesh = mbox & bx;

                if mesh.is_empty() {
                    return self;
                }
                let avg_box = (other.num_pts() / n as i64).max(1) as f64;
                let side = avg_box.powf(1.0 / D as f64);
                let block_size = 4 * ((side / 4.0).ceil() as i64 * 4).max(1);
                let blocks = Self::tiled(mesh, IntVect::splat(block_size));

                debug!(
                    "complement_in: {} boxes, {} blocks of size {}",
                    n, blocks.len(), block_size);

                let pieces: Vec<Vec<IndexBox<D>>> = blocks.boxes
                    .par_iter()
                    .map(|block| {
                        let touching: Vec<_> = other.boxes
                            .iter()
                            .filter(|b| b.intersects(block))
                            .copied()
                            .collect();
                        subtract_all(*block, &touching)
                    })
                    .collect();

                for p in pieces {
                    self.boxes.extend(p)
                }
            }
        }
        self
    }


    /**
     * Merge pairs of boxes which abut (or overlap) along one axis and have
     * identical extents on all the others, until no further merges are
     * possible. The boxes are left sorted by their small end. If `best` is
     * false, each box is only compared with its next 100 neighbors in sorted
     * order, which is much faster for long lists but may miss merges.
     * Returns the number of merges performed. Calling this again on the
     * result performs no merges and leaves the list unchanged.
     */
    pub fn simplify(&mut self, best: bool) -> usize {
        let depth = if best { usize::MAX } else { 100 };
        let mut count = 0;

        self.remove_empty();

        loop {
            self.boxes.sort_by(|a, b| a.small_end().cmp(&b.small_end()));

            let merged = self.simplify_pass(depth);

            if merged == 0 {
                break;
            }
            count += merged;
        }
        count
    }


    /**
     * Merge each box only with its immediate successor, once per axis,
     * without reordering the list. Returns the number of merges in the last
     * pass.
     */
    pub fn ordered_simplify(&mut self) -> usize {
        let mut count = 0;

        for _ in 0..D {
            count = self.simplify_pass(1);
        }
        count
    }


    /**
     * Chop every box so that no side is longer than `chunk`. Where a side is
     * split, the pieces are as even as possible; when both the side length
     * and the chunk are divisible by a power of two, the cut points stay
     * aligned to it. Node-centered pieces share their boundary planes.
     */
    pub fn max_size(&mut self, chunk: i64) -> &mut Self {
        self.max_size_vect(IntVect::splat(chunk))
    }


    pub fn max_size_vect(&mut self, chunk: IntVect<D>) -> &mut Self {
        assert!(chunk.all_ge(&IntVect::unit()), "chunk size {} must be positive", chunk);

        let mut boxes = Vec::with_capacity(self.boxes.len());

        for bx in &self.boxes {
            let boxlen = bx.enclosed_cells().size();
            let boxlo = bx.small_end();
            let mut ratio: IntVect<D> = IntVect::unit();
            let mut numblk = IntVect::unit();
            let mut extra: IntVect<D> = IntVect::zero();
            let mut sz = boxlen;

            for dir in 0..D {
                if boxlen[dir] > chunk[dir] {
                    let mut bs = chunk[dir];
                    let mut nlen = boxlen[dir];

                    while bs % 2 == 0 && nlen % 2 == 0 {
                        ratio[dir] *= 2;
                        bs /= 2;
                        nlen /= 2;
                    }
                    numblk[dir] = (nlen + bs - 1) / bs;
                    sz[dir] = nlen / numblk[dir];
                    extra[dir] = nlen - sz[dir] * numblk[dir];
                }
            }

            if numblk.all_eq(1) {
                boxes.push(*bx);
                continue;
            }
            for ijk in IndexBox::cell([0; D], (numblk - IntVect::unit()).as_array()).iter() {
                let mut lo = IntVect::zero();
                let mut hi = IntVect::zero();

                for dir in 0..D {
                    let k = ijk[dir];
                    if k < extra[dir] {
                        lo[dir] = k * (sz[dir] + 1) * ratio[dir];
                        hi[dir] = lo[dir] + (sz[dir] + 1) * ratio[dir] - 1;
                    } else {
                        lo[dir] = (k * sz[dir] + extra[dir]) * ratio[dir];
                        hi[dir] = lo[dir] + sz[dir] * ratio[dir] - 1;
                    }
                }
                let piece = IndexBox::new(lo + boxlo, hi + boxlo, IndexType::cell());
                boxes.push(piece.convert(self.itype))
            }
        }
        self.boxes = boxes;
        self
    }


    /**
     * Replace this list on every rank with the list held by rank 0.
     */
    pub fn broadcast<C: Communicator>(&mut self, comm: &C) -> Result<(), Error> {
        *self = comm::broadcast_value(comm, &*self)?;
        Ok(())
    }


    fn simplify_pass(&mut self, depth: usize) -> usize {
        let mut count = 0;
        let n = self.boxes.len();

        for a in 0..n {
            let ba = self.boxes[a];

            if ba.is_empty() {
                continue;
            }
            for b in (a + 1..n).take(depth) {
                if let Some(merged) = try_join(&ba, &self.boxes[b]) {
                    self.boxes[b] = merged;
                    self.boxes[a] = IndexBox::empty(self.itype);
                    count += 1;
                    break;
                }
            }
        }
        self.remove_empty();
        count
    }


    fn assert_same_type(&self, itype: IndexType<D>) {
        assert!(
            self.itype == itype,
            "index type mismatch: box list is {}, operand is {}", self.itype, itype);
    }
}




// ============================================================================
fn chop_boxes<const D: usize>(out: &mut Vec<IndexBox<D>>, bx: IndexBox<D>, nboxes: usize, fixed_dir: Option<usize>) {
    if nboxes == 1 {
        out.push(bx);
        return;
    }
    let (len, dir) = match fixed_dir {
        Some(dir) => (bx.length(dir), dir),
        None => bx.longside(),
    };
    let (left, right) = bx.chop(dir, bx.small_end()[dir] + len / 2);

    // Each half can yield at most one piece per cell (per slab on a fixed
    // axis), so split the piece count in proportion to the halves' sizes.
    let capacity = |b: &IndexBox<D>| match fixed_dir {
        Some(dir) => b.length(dir) as usize,
        None => b.num_pts() as usize,
    };
    let (cap_left, cap_right) = (capacity(&left), capacity(&right));
    let share = (nboxes * cap_left + (cap_left + cap_right) / 2) / (cap_left + cap_right);
    let nleft = share
        .max(1)
        .max(nboxes.saturating_sub(cap_right))
        .min(cap_left)
        .min(nboxes - 1);

    chop_boxes(out, left, nleft, fixed_dir);
    chop_boxes(out, right, nboxes - nleft, fixed_dir);
}


/**
 * Return the box covering the union of `a` and `b`, if that union is a box:
 * the two must have identical extents on all axes but one, and abut or
 * overlap on that one.
 */
fn try_join<const D: usize>(a: &IndexBox<D>, b: &IndexBox<D>) -> Option<IndexBox<D>> {
    let (alo, ahi) = (a.small_end(), a.big_end());
    let (blo, bhi) = (b.small_end(), b.big_end());
    let mut lo = alo;
    let mut hi = ahi;
    let mut joined = 0;

    for dir in 0..D {
        if alo[dir] == blo[dir] && ahi[dir] == bhi[dir] {
            continue;
        } else if alo[dir] <= blo[dir] && blo[dir] <= ahi[dir] + 1 {
            hi[dir] = ahi[dir].max(bhi[dir]);
            joined += 1;
        } else if blo[dir] <= alo[dir] && alo[dir] <= bhi[dir] + 1 {
            lo[dir] = blo[dir];
            hi[dir] = ahi[dir].max(bhi[dir]);
            joined += 1;
        } else {
            return None;
        }
    }
    if joined <= 1 {
        Some(IndexBox::new(lo, hi, a.index_type()))
    } else {
        None
    }
}


/**
 * Return the indexes of two overlapping boxes, if there are any.
 */
pub(crate) fn first_overlap<const D: usize>(boxes: &[IndexBox<D>]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    let mut active: Vec<usize> = Vec::new();

    order.sort_by_key(|&i| boxes[i].small_end()[0]);

    for i in order {
        let bi = &boxes[i];
        active.retain(|&j| boxes[j].big_end()[0] >= bi.small_end()[0]);

        if let Some(&j) = active.iter().find(|&&j| boxes[j].intersects(bi)) {
            return Some((j.min(i), j.max(i)));
        }
        active.push(i)
    }
    None
}


/**
 * Return disjoint pieces covering the indexes of `bx` not covered by any of
 * the given boxes. Each box which overlaps a remaining piece splits it into
 * at most 2D smaller ones.
 */
pub(crate) fn subtract_all<const D: usize>(bx: IndexBox<D>, boxes: &[IndexBox<D>]) -> Vec<IndexBox<D>> {
    let mut pieces = if bx.ok() { vec![bx] } else { Vec::new() };

    for b in boxes {
        if pieces.is_empty() {
            break;
        }
        let mut next = Vec::with_capacity(pieces.len());

        for p in pieces {
            if p.intersects(b) {
                next.extend(box_diff(&p, b).boxes)
            } else {
                next.push(p)
            }
        }
        pieces = next;
    }
    pieces
}




// ============================================================================
impl<const D: usize> Default for BoxList<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> IntoIterator for BoxList<D> {
    type Item = IndexBox<D>;
    type IntoIter = std::vec::IntoIter<IndexBox<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl<'a, const D: usize> IntoIterator for &'a BoxList<D> {
    type Item = &'a IndexBox<D>;
    type IntoIter = core::slice::Iter<'a, IndexBox<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

impl<const D: usize> FromIterator<IndexBox<D>> for BoxList<D> {
    fn from_iter<I: IntoIterator<Item = IndexBox<D>>>(iter: I) -> Self {
        Self::from_boxes(iter.into_iter().collect())
    }
}

impl<const D: usize> From<IndexBox<D>> for BoxList<D> {
    fn from(bx: IndexBox<D>) -> Self {
        Self::from_box(bx)
    }
}

impl<const D: usize> fmt::Display for BoxList<D> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(fmt, "(BoxList {} {}", self.len(), self.itype)?;
        for (i, b) in self.boxes.iter().enumerate() {
            writeln!(fmt, "{} : {}", i + 1, b)?;
        }
        writeln!(fmt, ")")
    }
}




/**
 * Return a list of at most 2D disjoint boxes covering `b1` minus `b2`.
 */
pub fn box_diff<const D: usize>(b1: &IndexBox<D>, b2: &IndexBox<D>) -> BoxList<D> {
    assert!(b1.same_type(b2), "index type mismatch: {} vs {}", b1, b2);

    let mut result = BoxList::with_index_type(b1.index_type());

    if b1.is_empty() || b2.contains_box(b1) {
        return result;
    }
    if !b1.intersects(b2) {
        result.boxes.push(*b1);
        return result;
    }
    let mut rest = *b1;
    let (lo2, hi2) = (b2.small_end(), b2.big_end());

    for dir in (0..D).rev() {
        let (lo1, hi1) = (rest.small_end(), rest.big_end());

        if lo1[dir] < lo2[dir] && lo2[dir] <= hi1[dir] {
            let mut piece = rest;
            piece.set_big(dir, lo2[dir] - 1);
            result.boxes.push(piece);
            rest.set_small(dir, lo2[dir]);
        }
        if lo1[dir] <= hi2[dir] && hi2[dir] < hi1[dir] {
            let mut piece = rest;
            piece.set_small(dir, hi2[dir] + 1);
            result.boxes.push(piece);
            rest.set_big(dir, hi2[dir]);
        }
    }
    result
}


/**
 * Return the complement of the boxes in `bl` within `bx`, as a list of
 * disjoint boxes.
 */
pub fn complement_in<const D: usize>(bx: IndexBox<D>, bl: &BoxList<D>) -> BoxList<D> {
    let mut result = BoxList::with_index_type(bx.index_type());
    result.complement_in(bx, bl);
    result
}


pub fn intersect<const D: usize>(bl: &BoxList<D>, bx: &IndexBox<D>) -> BoxList<D> {
    let mut result = bl.clone();
    result.intersect(bx);
    result
}


pub fn refine<const D: usize>(bl: &BoxList<D>, ratio: i64) -> BoxList<D> {
    let mut result = bl.clone();
    result.refine(ratio);
    result
}


pub fn coarsen<const D: usize>(bl: &BoxList<D>, ratio: i64) -> BoxList<D> {
    let mut result = bl.clone();
    result.coarsen(ratio);
    result
}


pub fn accrete<const D: usize>(bl: &BoxList<D>, delta: i64) -> BoxList<D> {
    let mut result = bl.clone();
    result.accrete(delta);
    result
}


/**
 * Return a list of disjoint boxes covering the same indexes as `bl`. Earlier
 * boxes are kept whole; later ones are clipped against them.
 */
pub fn remove_overlap<const D: usize>(bl: &BoxList<D>) -> BoxList<D> {
    let mut result = BoxList::with_index_type(bl.index_type());

    for bx in bl {
        let pieces = subtract_all(*bx, &result.boxes);
        result.boxes.extend(pieces)
    }
    result.simplify(true);
    result
}
