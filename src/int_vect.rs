use core::cmp::Ordering;
use core::convert::TryFrom;
use core::fmt;
use core::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};
use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, Serializer};




/**
 * A statically-sized integer coordinate tuple, identifying a cell or a node
 * in a D-dimensional index space. Arithmetic is element-wise; division by a
 * scalar rounds toward negative infinity, so that coarsening a negative
 * index lands in the coarse cell which contains it.
 */
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IntVect<const D: usize> {
    data: [i64; D]
}




// ============================================================================
impl<const D: usize> IntVect<D> {

    pub const fn new(data: [i64; D]) -> Self {
        Self { data }
    }

    pub const fn splat(value: i64) -> Self {
        Self { data: [value; D] }
    }

    pub const fn zero() -> Self {
        Self::splat(0)
    }

    pub const fn unit() -> Self {
        Self::splat(1)
    }

    /**
     * Return a vector which is zero everywhere except for `value` on the
     * given axis.
     */
    pub fn basis(dir: usize, value: i64) -> Self {
        let mut result = Self::zero();
        result[dir] = value;
        result
    }

    pub fn as_array(&self) -> [i64; D] {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.data.iter()
    }

    /**
     * Return the component-wise minimum of two vectors.
     */
    pub fn elementwise_min(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a.min(b))
    }

    /**
     * Return the component-wise maximum of two vectors.
     */
    pub fn elementwise_max(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a.max(b))
    }

    pub fn all_le(&self, other: &Self) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(a, b)| a <= b)
    }

    pub fn all_lt(&self, other: &Self) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(a, b)| a < b)
    }

    pub fn all_ge(&self, other: &Self) -> bool {
        other.all_le(self)
    }

    pub fn all_eq(&self, value: i64) -> bool {
        self.data.iter().all(|&a| a == value)
    }

    /**
     * Return the product of the components.
     */
    pub fn product(&self) -> i64 {
        self.data.iter().product()
    }

    /**
     * Return the sum of the components.
     */
    pub fn sum(&self) -> i64 {
        self.data.iter().sum()
    }

    /**
     * Divide each component by the corresponding component of `ratio`,
     * rounding toward negative infinity.
     */
    pub fn coarsen(self, ratio: Self) -> Self {
        self.zip_with(ratio, floor_div)
    }

    pub(crate) fn map<F: Fn(i64) -> i64>(self, f: F) -> Self {
        let mut data = self.data;

        for x in data.iter_mut() {
            *x = f(*x)
        }
        Self { data }
    }

    pub(crate) fn zip_with<F: Fn(i64, i64) -> i64>(self, other: Self, f: F) -> Self {
        let mut data = self.data;

        for (i, x) in data.iter_mut().enumerate() {
            *x = f(*x, other.data[i])
        }
        Self { data }
    }
}




/**
 * Integer division rounding toward negative infinity.
 */
pub(crate) fn floor_div(a: i64, b: i64) -> i64 {
    assert!(b > 0, "coarsening ratio must be positive, got {}", b);
    a.div_euclid(b)
}




// ============================================================================
impl<const D: usize> Add for IntVect<D> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        self.zip_with(other, |a, b| a + b)
    }
}

impl<const D: usize> Sub for IntVect<D> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self.zip_with(other, |a, b| a - b)
    }
}

impl<const D: usize> Mul for IntVect<D> {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        self.zip_with(other, |a, b| a * b)
    }
}

impl<const D: usize> Mul<i64> for IntVect<D> {
    type Output = Self;

    fn mul(self, other: i64) -> Self::Output {
        self.map(|a| a * other)
    }
}

impl<const D: usize> Div<i64> for IntVect<D> {
    type Output = Self;

    fn div(self, other: i64) -> Self::Output {
        self.map(|a| floor_div(a, other))
    }
}

impl<const D: usize> Neg for IntVect<D> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(|a| -a)
    }
}




// ============================================================================
impl<const D: usize> Index<usize> for IntVect<D> {
    type Output = i64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<const D: usize> IndexMut<usize> for IntVect<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}




// ============================================================================
impl<const D: usize> PartialOrd for IntVect<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic, with the last axis most significant. This matches the
/// Fortran-order traversal used by `IndexBox::iter`.
impl<const D: usize> Ord for IntVect<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.iter().rev().cmp(other.data.iter().rev())
    }
}

impl<const D: usize> From<[i64; D]> for IntVect<D> {
    fn from(data: [i64; D]) -> Self {
        Self { data }
    }
}

impl<const D: usize> Default for IntVect<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> fmt::Display for IntVect<D> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "(")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                write!(fmt, ",")?;
            }
            write!(fmt, "{}", x)?;
        }
        write!(fmt, ")")
    }
}




// ============================================================================
impl<const D: usize> Serialize for IntVect<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.data.iter())
    }
}

impl<'de, const D: usize> Deserialize<'de> for IntVect<D> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let values = Vec::<i64>::deserialize(deserializer)?;
        let len = values.len();
        let data = <[i64; D]>::try_from(values)
            .map_err(|_| De::Error::invalid_length(len, &"one component per dimension"))?;
        Ok(Self { data })
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::IntVect;

    #[test]
    fn arithmetic_is_element_wise() {
        let a = IntVect::new([1, 2, 3]);
        let b = IntVect::new([4, 5, 6]);
        assert_eq!(a + b, IntVect::new([5, 7, 9]));
        assert_eq!(b - a, IntVect::new([3, 3, 3]));
        assert_eq!(a * b, IntVect::new([4, 10, 18]));
        assert_eq!(a * 2, IntVect::new([2, 4, 6]));
        assert_eq!(-a, IntVect::new([-1, -2, -3]));
    }

    #[test]
    fn division_rounds_toward_negative_infinity() {
        assert_eq!(IntVect::new([-1, -4, 5]) / 4, IntVect::new([-1, -1, 1]));
        assert_eq!(IntVect::new([-5, 7]).coarsen(IntVect::new([2, 3])), IntVect::new([-3, 2]));
    }

    #[test]
    fn ordering_is_last_axis_major() {
        let a = IntVect::new([5, 0]);
        let b = IntVect::new([0, 1]);
        assert!(a < b);
        assert!(IntVect::new([0, 1]) < IntVect::new([1, 1]));
    }

    #[test]
    fn component_wise_predicates_work() {
        let a = IntVect::new([0, 0]);
        let b = IntVect::new([1, 0]);
        assert!(a.all_le(&b));
        assert!(!a.all_lt(&b));
        assert!(b.all_ge(&a));
        assert_eq!(a.elementwise_min(b), a);
        assert_eq!(a.elementwise_max(b), b);
        assert_eq!(IntVect::new([2, 3, 4]).product(), 24);
    }

    #[test]
    fn displays_as_tuple() {
        assert_eq!(IntVect::new([1, -2, 3]).to_string(), "(1,-2,3)");
    }
}
