use serde::{Deserialize, Serialize};
use crate::index_box::IndexBox;
use crate::index_type::IndexType;
use crate::int_vect::IntVect;




/**
 * Describes which directions of a domain wrap around. A period of zero means
 * the direction is not periodic; a positive period L means the domain is
 * periodic in that direction with cells 0 through L - 1.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Periodicity<const D: usize> {
    period: IntVect<D>,
}




// ============================================================================
impl<const D: usize> Periodicity<D> {

    pub fn new(period: IntVect<D>) -> Self {
        assert!(
            period.all_ge(&IntVect::zero()),
            "periodicity must be non-negative, got {}", period);
        Self { period }
    }

    pub fn non_periodic() -> Self {
        Self { period: IntVect::zero() }
    }

    pub fn is_any_periodic(&self) -> bool {
        self.period.iter().any(|&p| p > 0)
    }

    pub fn is_all_periodic(&self) -> bool {
        self.period.iter().all(|&p| p > 0)
    }

    pub fn is_periodic(&self, dir: usize) -> bool {
        self.period[dir] > 0
    }

    pub fn int_vect(&self) -> IntVect<D> {
        self.period
    }

    /**
     * Return the cell-centered box of the periodic domain. Its extent in
     * periodic directions is [0, L - 1]; in the other directions it is
     * effectively unbounded.
     */
    pub fn domain(&self) -> IndexBox<D> {
        let mut lo = IntVect::splat(i64::MIN / 4);
        let mut hi = IntVect::splat(i64::MAX / 4);

        for dir in 0..D {
            if self.is_periodic(dir) {
                lo[dir] = 0;
                hi[dir] = self.period[dir] - 1;
            }
        }
        IndexBox::new(lo, hi, IndexType::cell())
    }

    /**
     * Return the shifts which map the domain onto each of its periodic
     * images lying within `nghost` cells of it. A direction contributes
     * shifts of -L, 0, and L if it is periodic and has a non-zero ghost
     * width, and only 0 otherwise. The zero shift is always included, and
     * at most 3^D vectors are returned.
     */
    pub fn shift_int_vect(&self, nghost: IntVect<D>) -> Vec<IntVect<D>> {
        let mut shifts = vec![IntVect::zero()];

        for dir in 0..D {
            if self.is_periodic(dir) && nghost[dir] > 0 {
                let p = self.period[dir];
                let mut next = Vec::with_capacity(shifts.len() * 3);

                for s in &shifts {
                    for &offset in &[-p, 0, p] {
                        let mut shift = *s;
                        shift[dir] = offset;
                        next.push(shift);
                    }
                }
                shifts = next;
            }
        }
        shifts
    }

    /**
     * Return the shifts for a uniform ghost width in every direction.
     */
    pub fn shift_int_vect_all(&self, nghost: i64) -> Vec<IntVect<D>> {
        self.shift_int_vect(IntVect::splat(nghost))
    }
}




// ============================================================================
impl<const D: usize> Default for Periodicity<D> {
    fn default() -> Self {
        Self::non_periodic()
    }
}
