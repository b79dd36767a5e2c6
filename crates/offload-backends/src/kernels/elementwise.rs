//! Entry points of the `offload_array` kernel library
//!
//! Every kernel copies its operands out of device memory first, computes in
//! parallel, then writes the result back. Result buffers may therefore alias
//! operand buffers.

use super::arith::Arith;
use super::{ArgReader, KernelArg};
use crate::backend::BufferHandle;
use crate::backends::cpu::MemoryManager;
use crate::dtype::Element;
use crate::error::{BackendError, Result};
use crate::scalar::Scalar;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Pow,
}

impl BinaryOp {
    const fn kernel_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "offload_array_add",
            BinaryOp::Sub => "offload_array_sub",
            BinaryOp::Mul => "offload_array_mul",
            BinaryOp::Pow => "offload_array_pow",
        }
    }

    fn apply<T: Arith>(self, lhs: T, rhs: T) -> T {
        match self {
            BinaryOp::Add => lhs.add(rhs),
            BinaryOp::Sub => lhs.sub(rhs),
            BinaryOp::Mul => lhs.mul(rhs),
            BinaryOp::Pow => lhs.pow(rhs),
        }
    }
}

/// Operand values read from a buffer or passed by value
enum Source<T> {
    Values(Vec<T>),
    Value(T),
}

impl<T: Copy> Source<T> {
    fn at(&self, index: usize) -> T {
        match self {
            Source::Values(values) => values[index],
            Source::Value(value) => *value,
        }
    }
}

/// Number of elements a strided walk of `n` steps touches
fn span(n: usize, stride: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n - 1) * stride + 1
    }
}

fn scalar_as<T: Element>(value: Scalar) -> Result<T> {
    value
        .get::<T>()
        .ok_or_else(|| BackendError::type_mismatch(T::DTYPE, value.dtype()))
}

fn load<T: Element>(memory: &MemoryManager, arg: KernelArg, n: usize, stride: usize) -> Result<Source<T>> {
    match arg {
        KernelArg::Buffer(handle) => Ok(Source::Values(memory.read_elements(handle, span(n, stride))?)),
        KernelArg::Scalar(value) => Ok(Source::Value(scalar_as(value)?)),
        other => Err(BackendError::invalid_args(format!("expected buffer or scalar operand, found {other}"))),
    }
}

fn store<T: Element>(memory: &mut MemoryManager, handle: BufferHandle, values: Vec<T>, stride: usize) -> Result<()> {
    match stride {
        0 => Err(BackendError::invalid_args("result stride must be positive")),
        1 => memory.write_elements(handle, 0, &values),
        _ => {
            let mut region: Vec<T> = memory.read_elements(handle, span(values.len(), stride))?;
            for (i, value) in values.into_iter().enumerate() {
                region[i * stride] = value;
            }
            memory.write_elements(handle, 0, &region)
        }
    }
}

fn binary(op: BinaryOp, memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    let mut reader = ArgReader::new(op.kernel_name(), args);
    let dtype = reader.dtype()?;
    let n = reader.count()?;
    let x = reader.buffer()?;
    let incx = reader.stride()?;
    let y = reader.operand()?;
    let incy = reader.stride()?;
    let r = reader.buffer()?;
    let incr = reader.stride()?;
    reader.finish()?;

    with_element_type!(dtype, T => binary_typed::<T>(op, memory, n, (x, incx), (y, incy), (r, incr)))
}

fn binary_typed<T: Arith>(
    op: BinaryOp,
    memory: &mut MemoryManager,
    n: usize,
    (x, incx): (BufferHandle, usize),
    (y, incy): (KernelArg, usize),
    (r, incr): (BufferHandle, usize),
) -> Result<()> {
    let lhs: Source<T> = load(memory, KernelArg::Buffer(x), n, incx)?;
    let rhs: Source<T> = load(memory, y, n, incy)?;

    let out: Vec<T> = (0..n)
        .into_par_iter()
        .map(|i| op.apply(lhs.at(i * incx), rhs.at(i * incy)))
        .collect();

    store(memory, r, out, incr)
}

pub(super) fn add(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    binary(BinaryOp::Add, memory, args)
}

pub(super) fn sub(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    binary(BinaryOp::Sub, memory, args)
}

pub(super) fn mul(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    binary(BinaryOp::Mul, memory, args)
}

pub(super) fn pow(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    binary(BinaryOp::Pow, memory, args)
}

pub(super) fn abs(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    let mut reader = ArgReader::new("offload_array_abs", args);
    let dtype = reader.dtype()?;
    let n = reader.count()?;
    let x = reader.buffer()?;
    let r = reader.buffer()?;
    reader.finish()?;

    with_element_type!(dtype, T => abs_typed::<T>(memory, n, x, r))
}

fn abs_typed<T: Arith>(memory: &mut MemoryManager, n: usize, x: BufferHandle, r: BufferHandle) -> Result<()> {
    let values: Vec<T> = memory.read_elements(x, n)?;
    let out: Vec<T::Magnitude> = values.into_par_iter().map(T::magnitude).collect();
    memory.write_elements(r, 0, &out)
}

pub(super) fn fill(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    let mut reader = ArgReader::new("offload_array_fill", args);
    let dtype = reader.dtype()?;
    let n = reader.count()?;
    let x = reader.buffer()?;
    let value = reader.scalar()?;
    reader.finish()?;

    with_element_type!(dtype, T => {
        let value: T = scalar_as(value)?;
        memory.write_elements(x, 0, &vec![value; n])
    })
}

pub(super) fn reverse(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    let mut reader = ArgReader::new("offload_array_reverse", args);
    let dtype = reader.dtype()?;
    let n = reader.count()?;
    let x = reader.buffer()?;
    let r = reader.buffer()?;
    reader.finish()?;

    with_element_type!(dtype, T => {
        let mut values: Vec<T> = memory.read_elements(x, n)?;
        values.reverse();
        memory.write_elements(r, 0, &values)
    })
}

pub(super) fn setslice(memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
    let mut reader = ArgReader::new("offload_array_setslice", args);
    let dtype = reader.dtype()?;
    let lb = reader.count()?;
    let ub = reader.count()?;
    let x = reader.buffer()?;
    let src = reader.buffer()?;
    reader.finish()?;

    if lb > ub {
        return Err(BackendError::invalid_args(format!(
            "offload_array_setslice: lower bound {lb} exceeds upper bound {ub}"
        )));
    }

    with_element_type!(dtype, T => {
        let values: Vec<T> = memory.read_elements(src, ub - lb)?;
        memory.write_elements(x, lb, &values)
    })
}
