//! Argument encoding for element-wise kernels
//!
//! Binary kernels take eight positional arguments:
//!
//! ```text
//! (type_tag, n, left, left_stride, right, right_stride, result, result_stride)
//! ```
//!
//! The left operand and the result always walk with stride 1. The right
//! operand walks with stride 1 when it is a device buffer of the same shape,
//! and stride 0 when it is a scalar broadcast to every element.

use offload_backends::{BufferHandle, DType, KernelArg, Scalar};

/// Right-hand side of a binary kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchOperand {
    /// Device buffer with one element per result element
    Buffer(BufferHandle),
    /// Single value repeated across all elements
    Broadcast(Scalar),
}

impl DispatchOperand {
    pub fn stride(&self) -> usize {
        match self {
            DispatchOperand::Buffer(_) => 1,
            DispatchOperand::Broadcast(_) => 0,
        }
    }

    fn to_arg(self) -> KernelArg {
        match self {
            DispatchOperand::Buffer(handle) => KernelArg::Buffer(handle),
            DispatchOperand::Broadcast(value) => KernelArg::Scalar(value),
        }
    }
}

/// Fully resolved arguments of one binary kernel launch
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryDispatch {
    pub dtype: DType,
    pub count: usize,
    pub left: BufferHandle,
    pub right: DispatchOperand,
    pub result: BufferHandle,
}

impl BinaryDispatch {
    pub const LEFT_STRIDE: usize = 1;
    pub const RESULT_STRIDE: usize = 1;

    pub fn new(dtype: DType, count: usize, left: BufferHandle, right: DispatchOperand, result: BufferHandle) -> Self {
        Self {
            dtype,
            count,
            left,
            right,
            result,
        }
    }

    /// Positional kernel arguments
    pub fn to_args(&self) -> Vec<KernelArg> {
        vec![
            KernelArg::dtype(self.dtype),
            KernelArg::Count(self.count),
            KernelArg::Buffer(self.left),
            KernelArg::Stride(Self::LEFT_STRIDE),
            self.right.to_arg(),
            KernelArg::Stride(self.right.stride()),
            KernelArg::Buffer(self.result),
            KernelArg::Stride(Self::RESULT_STRIDE),
        ]
    }
}
