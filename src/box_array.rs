use std::ops::Index;
use std::sync::Arc;
use crate::box_list::BoxList;
use crate::index_box::IndexBox;
use crate::index_type::IndexType;




/**
 * An immutable, reference-counted array of boxes: the grids of one level of
 * a mesh hierarchy. Grid ids are positions in the array. Cloning a
 * `BoxArray` is cheap and the clone refers to the same boxes, which lets
 * dependent structures detect whether they were built from this exact
 * array with `same_ref`.
 */
#[derive(Clone, Debug)]
pub struct BoxArray<const D: usize> {
    boxes: Arc<BoxList<D>>,
}




// ============================================================================
impl<const D: usize> BoxArray<D> {

    pub fn from_box_list(bl: BoxList<D>) -> Self {
        Self { boxes: Arc::new(bl) }
    }

    pub fn from_boxes(boxes: Vec<IndexBox<D>>) -> Self {
        Self::from_box_list(BoxList::from_boxes(boxes))
    }

    /**
     * Chop a box into grids no larger than `chunk` on a side.
     */
    pub fn chopped(bx: IndexBox<D>, chunk: i64) -> Self {
        let mut bl = BoxList::from_box(bx);
        bl.max_size(chunk);
        Self::from_box_list(bl)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, gid: usize) -> Option<&IndexBox<D>> {
        self.boxes.as_slice().get(gid)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, IndexBox<D>> {
        self.boxes.iter()
    }

    pub fn index_type(&self) -> IndexType<D> {
        self.boxes.index_type()
    }

    pub fn box_list(&self) -> &BoxList<D> {
        &self.boxes
    }

    pub fn minimal_box(&self) -> IndexBox<D> {
        self.boxes.minimal_box()
    }

    pub fn num_pts(&self) -> i64 {
        self.boxes.num_pts()
    }

    /**
     * Return true if the two arrays share storage.
     */
    pub fn same_ref(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.boxes, &other.boxes)
    }
}




// ============================================================================
impl<const D: usize> Index<usize> for BoxArray<D> {
    type Output = IndexBox<D>;

    fn index(&self, gid: usize) -> &Self::Output {
        &self.boxes.as_slice()[gid]
    }
}

impl<const D: usize> PartialEq for BoxArray<D> {
    fn eq(&self, other: &Self) -> bool {
        self.same_ref(other) || self.boxes == other.boxes
    }
}

impl<const D: usize> Eq for BoxArray<D> {}

impl<const D: usize> From<BoxList<D>> for BoxArray<D> {
    fn from(bl: BoxList<D>) -> Self {
        Self::from_box_list(bl)
    }
}

impl<'a, const D: usize> IntoIterator for &'a BoxArray<D> {
    type Item = &'a IndexBox<D>;
    type IntoIter = core::slice::Iter<'a, IndexBox<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use crate::index_box::IndexBox;
    use super::BoxArray;

    #[test]
    fn chopped_array_covers_box() {
        let bx = IndexBox::cell([0, 0, 0], [31, 31, 15]);
        let ba = BoxArray::chopped(bx, 8);
        assert_eq!(ba.len(), 4 * 4 * 2);
        assert_eq!(ba.num_pts(), bx.num_pts());
        assert_eq!(ba.minimal_box(), bx);
        assert!(ba.iter().all(|b| b.size().all_le(&[8, 8, 8].into())));
    }

    #[test]
    fn clones_share_storage() {
        let ba = BoxArray::from_boxes(vec![IndexBox::cell([0, 0], [3, 3])]);
        let copy = ba.clone();
        let rebuilt = BoxArray::from_boxes(vec![IndexBox::cell([0, 0], [3, 3])]);

        assert!(ba.same_ref(&copy));
        assert!(!ba.same_ref(&rebuilt));
        assert_eq!(ba, rebuilt);
        assert_eq!(ba[0], IndexBox::cell([0, 0], [3, 3]));
        assert!(ba.get(1).is_none());
    }
}
