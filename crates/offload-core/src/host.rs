//! Host-side storage: the mirror paired with each device buffer, and the
//! [`HostArray`] view of foreign host arrays.

use crate::shape::Layout;
use ndarray::{ArrayBase, Data, Dimension};
use offload_backends::{DType, Element};
use parking_lot::RwLock;

/// Host copy of an array's data, shared by an owner and all of its views
///
/// Bytes are stored contiguously in the owning array's layout. The stream
/// worker writes into the mirror when a device-to-host copy completes.
#[derive(Debug)]
pub struct HostMirror {
    bytes: RwLock<Vec<u8>>,
}

impl HostMirror {
    /// Zero-filled mirror of `nbytes`
    pub fn zeroed(nbytes: usize) -> Self {
        Self {
            bytes: RwLock::new(vec![0u8; nbytes]),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }

    /// Overwrite the start of the mirror with `data`
    pub fn write(&self, data: &[u8]) {
        let mut bytes = self.bytes.write();
        let n = data.len().min(bytes.len());
        bytes[..n].copy_from_slice(&data[..n]);
    }

    /// Run `f` with mutable access to the bytes
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.bytes.write()[..])
    }

    /// Contents reinterpreted as elements of `T`
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        bytemuck::pod_collect_to_vec(&self.bytes.read()[..])
    }
}

/// A host array that can be bound to a device or used as an operand
///
/// Implemented for `ndarray` arrays and views of any dimensionality, and for
/// slices and vectors (as 1-D arrays).
pub trait HostArray {
    fn dtype(&self) -> DType;

    /// Extent of each axis
    fn dims(&self) -> Vec<usize>;

    /// Number of elements
    fn len(&self) -> usize {
        self.dims().iter().product()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contiguous bytes of the elements in `layout` order
    fn to_bytes(&self, layout: Layout) -> Vec<u8>;
}

impl<A, S, D> HostArray for ArrayBase<S, D>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn dtype(&self) -> DType {
        A::DTYPE
    }

    fn dims(&self) -> Vec<usize> {
        self.shape().to_vec()
    }

    fn len(&self) -> usize {
        ArrayBase::len(self)
    }

    fn to_bytes(&self, layout: Layout) -> Vec<u8> {
        let values: Vec<A> = match layout {
            Layout::RowMajor => self.iter().copied().collect(),
            Layout::ColumnMajor => self.t().iter().copied().collect(),
        };
        bytemuck::cast_slice::<A, u8>(&values).to_vec()
    }
}

impl<T: Element> HostArray for [T] {
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn dims(&self) -> Vec<usize> {
        vec![<[T]>::len(self)]
    }

    fn to_bytes(&self, _layout: Layout) -> Vec<u8> {
        bytemuck::cast_slice::<T, u8>(self).to_vec()
    }
}

impl<T: Element> HostArray for Vec<T> {
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn dims(&self) -> Vec<usize> {
        vec![Vec::len(self)]
    }

    fn to_bytes(&self, layout: Layout) -> Vec<u8> {
        self.as_slice().to_bytes(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, ShapeBuilder};

    #[test]
    fn test_mirror_round_trip() {
        let mirror = HostMirror::zeroed(12);
        assert_eq!(mirror.len(), 12);

        mirror.write(bytemuck::cast_slice(&[1i32, 2, 3]));
        assert_eq!(mirror.to_vec::<i32>(), vec![1, 2, 3]);

        mirror.with_bytes_mut(|bytes| bytes[..4].copy_from_slice(bytemuck::bytes_of(&9i32)));
        assert_eq!(mirror.to_vec::<i32>(), vec![9, 2, 3]);
    }

    #[test]
    fn test_ndarray_bytes_follow_layout() {
        let a: Array2<u8> = array![[1, 2, 3], [4, 5, 6]];
        assert_eq!(HostArray::dtype(&a), DType::U8);
        assert_eq!(HostArray::dims(&a), vec![2, 3]);
        assert_eq!(a.to_bytes(Layout::RowMajor), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(a.to_bytes(Layout::ColumnMajor), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_fortran_ordered_source_is_read_logically() {
        let a = Array2::from_shape_vec((2, 2).f(), vec![1u16, 3, 2, 4]).unwrap();
        let row: Vec<u16> = bytemuck::pod_collect_to_vec(&a.to_bytes(Layout::RowMajor)[..]);
        assert_eq!(row, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_vec_is_one_dimensional() {
        let v = vec![1.0f64, 2.0];
        assert_eq!(HostArray::dims(&v), vec![2]);
        assert_eq!(HostArray::len(&v), 2);
        assert_eq!(v.to_bytes(Layout::ColumnMajor).len(), 16);
    }
}
