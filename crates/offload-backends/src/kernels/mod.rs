//! Native kernel library for offloaded arrays
//!
//! Kernels are looked up by entry-point name and invoked with a positional
//! argument list. The `offload_array` library provides:
//!
//! | entry point | arguments |
//! |-------------|-----------|
//! | `offload_array_{add,sub,mul,pow}` | `TypeTag, Count n, Buffer x, Stride incx, Buffer\|Scalar y, Stride incy, Buffer r, Stride incr` |
//! | `offload_array_abs` | `TypeTag, Count n, Buffer x, Buffer r` |
//! | `offload_array_fill` | `TypeTag, Count n, Buffer x, Scalar v` |
//! | `offload_array_reverse` | `TypeTag, Count n, Buffer x, Buffer r` |
//! | `offload_array_setslice` | `TypeTag, Count lb, Count ub, Buffer x, Buffer src` |
//!
//! The leading `TypeTag` is [`DType::type_tag`] of the operands; build it
//! with [`KernelArg::dtype`]. A stride of 0 broadcasts element 0 of the
//! operand.

mod arith;
mod elementwise;

use crate::backend::BufferHandle;
use crate::backends::cpu::MemoryManager;
use crate::dtype::DType;
use crate::error::{BackendError, Result};
use crate::scalar::Scalar;
use std::collections::HashMap;
use std::fmt;

pub use arith::Arith;

/// One positional kernel argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArg {
    TypeTag(u32),
    Count(usize),
    Buffer(BufferHandle),
    Scalar(Scalar),
    Stride(usize),
}

impl KernelArg {
    /// Type tag argument for `dtype`
    pub const fn dtype(dtype: DType) -> Self {
        KernelArg::TypeTag(dtype.type_tag())
    }
}

impl fmt::Display for KernelArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelArg::TypeTag(tag) => match DType::from_type_tag(*tag) {
                Some(dtype) => write!(f, "dtype={dtype}"),
                None => write!(f, "type_tag={tag}"),
            },
            KernelArg::Count(n) => write!(f, "n={n}"),
            KernelArg::Buffer(handle) => write!(f, "{handle}"),
            KernelArg::Scalar(value) => write!(f, "scalar={value}"),
            KernelArg::Stride(stride) => write!(f, "stride={stride}"),
        }
    }
}

/// Native kernel function signature
pub type KernelFn = fn(&mut MemoryManager, &[KernelArg]) -> Result<()>;

/// A named entry point in a [`KernelLibrary`]
#[derive(Clone, Copy)]
pub struct KernelEntry {
    name: &'static str,
    func: KernelFn,
}

impl KernelEntry {
    pub const fn new(name: &'static str, func: KernelFn) -> Self {
        Self { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the kernel against device memory
    pub fn call(&self, memory: &mut MemoryManager, args: &[KernelArg]) -> Result<()> {
        (self.func)(memory, args)
    }
}

impl fmt::Debug for KernelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelEntry").field("name", &self.name).finish()
    }
}

/// Table of kernel entry points loaded for a device
#[derive(Debug, Clone)]
pub struct KernelLibrary {
    name: String,
    entries: HashMap<&'static str, KernelEntry>,
}

impl KernelLibrary {
    /// Create an empty library
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// The element-wise kernels used by `OffloadArray`
    pub fn offload_array() -> Self {
        let mut library = Self::new("offload_array");
        library.register(KernelEntry::new("offload_array_add", elementwise::add));
        library.register(KernelEntry::new("offload_array_sub", elementwise::sub));
        library.register(KernelEntry::new("offload_array_mul", elementwise::mul));
        library.register(KernelEntry::new("offload_array_pow", elementwise::pow));
        library.register(KernelEntry::new("offload_array_abs", elementwise::abs));
        library.register(KernelEntry::new("offload_array_fill", elementwise::fill));
        library.register(KernelEntry::new("offload_array_reverse", elementwise::reverse));
        library.register(KernelEntry::new("offload_array_setslice", elementwise::setslice));
        tracing::debug!(library = %library.name, kernels = library.len(), "kernel library loaded");
        library
    }

    /// Register an entry point, replacing any previous one with the same name
    pub fn register(&mut self, entry: KernelEntry) {
        self.entries.insert(entry.name, entry);
    }

    /// Look up an entry point
    pub fn get(&self, name: &str) -> Result<KernelEntry> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| BackendError::KernelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sorted entry-point names
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Positional reader over a kernel's argument list
pub(crate) struct ArgReader<'a> {
    kernel: &'static str,
    args: &'a [KernelArg],
    pos: usize,
}

impl<'a> ArgReader<'a> {
    pub(crate) fn new(kernel: &'static str, args: &'a [KernelArg]) -> Self {
        Self { kernel, args, pos: 0 }
    }

    fn next(&mut self, expected: &str) -> Result<KernelArg> {
        let arg = self.args.get(self.pos).copied().ok_or_else(|| {
            BackendError::invalid_args(format!(
                "{}: missing argument {} ({expected})",
                self.kernel, self.pos
            ))
        })?;
        self.pos += 1;
        Ok(arg)
    }

    fn unexpected(&self, expected: &str, found: KernelArg) -> BackendError {
        BackendError::invalid_args(format!(
            "{}: argument {} should be {expected}, found {found}",
            self.kernel,
            self.pos - 1
        ))
    }

    pub(crate) fn dtype(&mut self) -> Result<DType> {
        match self.next("type tag")? {
            KernelArg::TypeTag(tag) => DType::from_type_tag(tag).ok_or_else(|| {
                BackendError::invalid_args(format!(
                    "{}: argument {} is an unknown type tag {tag}",
                    self.kernel,
                    self.pos - 1
                ))
            }),
            other => Err(self.unexpected("type tag", other)),
        }
    }

    pub(crate) fn count(&mut self) -> Result<usize> {
        match self.next("count")? {
            KernelArg::Count(n) => Ok(n),
            other => Err(self.unexpected("count", other)),
        }
    }

    pub(crate) fn stride(&mut self) -> Result<usize> {
        match self.next("stride")? {
            KernelArg::Stride(stride) => Ok(stride),
            other => Err(self.unexpected("stride", other)),
        }
    }

    pub(crate) fn buffer(&mut self) -> Result<BufferHandle> {
        match self.next("buffer")? {
            KernelArg::Buffer(handle) => Ok(handle),
            other => Err(self.unexpected("buffer", other)),
        }
    }

    pub(crate) fn scalar(&mut self) -> Result<Scalar> {
        match self.next("scalar")? {
            KernelArg::Scalar(value) => Ok(value),
            other => Err(self.unexpected("scalar", other)),
        }
    }

    /// A buffer or scalar operand
    pub(crate) fn operand(&mut self) -> Result<KernelArg> {
        match self.next("buffer or scalar")? {
            arg @ (KernelArg::Buffer(_) | KernelArg::Scalar(_)) => Ok(arg),
            other => Err(self.unexpected("buffer or scalar", other)),
        }
    }

    pub(crate) fn finish(self) -> Result<()> {
        if self.pos != self.args.len() {
            return Err(BackendError::invalid_args(format!(
                "{}: expected {} arguments, got {}",
                self.kernel,
                self.pos,
                self.args.len()
            )));
        }
        Ok(())
    }
}
