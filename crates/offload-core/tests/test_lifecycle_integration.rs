//! Integration tests for ownership, views, slice assignment and validation

use ndarray::array;
use offload_core::{DType, Device, DeviceId, DeviceRegistry, Error, Layout, RuntimeConfig, Stream};
use proptest::prelude::*;

fn setup() -> (Device, Stream) {
    let device = Device::cpu(DeviceId::new(0));
    let stream = device.stream().expect("stream");
    (device, stream)
}

// ================================================================================================
// Ownership
// ================================================================================================

#[test]
fn test_owner_drop_releases_exactly_once() -> offload_core::Result<()> {
    let (device, stream) = setup();
    let a = stream.zeros([4, 4], DType::F64)?;
    assert_eq!(device.live_buffers(), 1);

    drop(a);
    // A double release would leave an error on the stream
    stream.synchronize()?;
    assert_eq!(device.live_buffers(), 0);
    Ok(())
}

#[test]
fn test_views_never_release() -> offload_core::Result<()> {
    let (device, stream) = setup();
    let a = stream.zeros([2, 6], DType::I32)?;
    {
        let v = a.reshape([3, 4])?;
        let w = v.ravel()?;
        assert!(v.is_view() && w.is_view());
        assert_eq!(device.live_buffers(), 1);
    }
    stream.synchronize()?;
    assert_eq!(device.live_buffers(), 1);

    a.update_host()?;
    drop(a);
    stream.synchronize()?;
    assert_eq!(device.live_buffers(), 0);
    Ok(())
}

#[test]
fn test_temporaries_are_released() -> offload_core::Result<()> {
    let (device, stream) = setup();
    let a = stream.bind(&vec![1.0f32, 2.0, 3.0])?;
    let host = vec![1.0f32; 3];

    let b = a.add(&host)?.mul(2.0f32)?.sub(&a)?;
    stream.synchronize()?;
    // a, b and nothing else: intermediates and the bound host operand are gone
    assert_eq!(device.live_buffers(), 2);

    b.update_host()?;
    assert_eq!(b.to_vec::<f32>()?, vec![3.0, 4.0, 5.0]);
    Ok(())
}

#[test]
fn test_dropping_last_stream_handle_drains_releases() -> offload_core::Result<()> {
    let device = Device::cpu(DeviceId::new(0));
    {
        let stream = device.stream()?;
        let _a = stream.zeros(16, DType::U8)?;
        let _b = stream.ones(16, DType::U8)?;
    }
    assert_eq!(device.live_buffers(), 0);
    Ok(())
}

// ================================================================================================
// Views
// ================================================================================================

#[test]
fn test_reshape_ravel_reshape_round_trip() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let a = stream.bind(&array![[1i32, 2, 3], [4, 5, 6]])?;

    let flat = a.ravel()?;
    let back = flat.reshape([2, 3])?;
    assert_eq!(back.shape(), a.shape());
    assert!(back.same_storage(&a));
    assert_eq!(back.to_vec::<i32>()?, a.to_vec::<i32>()?);
    Ok(())
}

#[test]
fn test_fill_through_view_is_visible_to_owner() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let a = stream.zeros([2, 3], DType::F32)?;
    {
        let mut v = a.reshape(6)?;
        v.fill(4.0f32)?;
    }
    a.update_host()?;
    assert_eq!(a.to_vec::<f32>()?, vec![4.0; 6]);

    let v = a.reshape([3, 2])?;
    assert_eq!(v.to_vec::<f32>()?, vec![4.0; 6]);
    Ok(())
}

#[test]
fn test_reshape_size_mismatch() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let a = stream.zeros([2, 3], DType::F32)?;
    match a.reshape([4, 2]) {
        Err(Error::ShapeMismatch(message)) => assert!(message.contains("total size must be unchanged")),
        other => panic!("expected shape mismatch, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_reshape_to_overflowing_shape() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let a = stream.zeros([2, 3], DType::F32)?;
    match a.reshape([usize::MAX, 2]) {
        Err(Error::ShapeMismatch(message)) => assert!(message.contains("total size must be unchanged")),
        other => panic!("expected shape mismatch, got {other:?}"),
    }
    assert!(matches!(a.reshape([3, 0]), Err(Error::ShapeMismatch(_))));
    Ok(())
}

#[test]
fn test_len_of_rank_zero_and_one() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let a = stream.zeros(7, DType::I8)?;
    assert_eq!(a.len(), 7);
    let v = a.reshape([7, 1])?;
    assert_eq!(v.len(), 7);

    let s = stream.zeros(1, DType::I8)?;
    let scalar = s.reshape(Vec::new())?;
    assert_eq!(scalar.rank(), 0);
    assert_eq!(scalar.len(), 1);
    Ok(())
}

// ================================================================================================
// set_slice
// ================================================================================================

#[test]
fn test_set_slice_overwrites_exact_range() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let mut a = stream.zeros(6, DType::I64)?;
    let src = stream.bind(&vec![7i64, 8, 9])?;

    a.set_slice(2..5, &src)?;
    a.update_host()?;
    assert_eq!(a.to_vec::<i64>()?, vec![0, 0, 7, 8, 9, 0]);

    a.set_slice(0..2, &vec![-1i64, -2])?;
    a.update_host()?;
    assert_eq!(a.to_vec::<i64>()?, vec![-1, -2, 7, 8, 9, 0]);
    Ok(())
}

#[test]
fn test_set_slice_clamps_bounds() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let mut a = stream.zeros(4, DType::U32)?;

    a.set_slice(2..100, &vec![5u32, 6])?;
    a.update_host()?;
    assert_eq!(a.to_vec::<u32>()?, vec![0, 0, 5, 6]);

    // Fully out of range clamps to an empty range
    a.set_slice(10..20, &vec![1u32, 2, 3])?;
    a.update_host()?;
    assert_eq!(a.to_vec::<u32>()?, vec![0, 0, 5, 6]);
    Ok(())
}

#[test]
fn test_set_slice_scalar_fills_everything() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let mut a = stream.zeros(5, DType::F64)?;
    a.set_slice(1..2, 3.0f64)?;
    a.update_host()?;
    assert_eq!(a.to_vec::<f64>()?, vec![3.0; 5]);
    Ok(())
}

#[test]
fn test_set_slice_validation() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let mut a = stream.zeros(4, DType::I32)?;

    let err = a.set_slice(0..2, &vec![1i32, 2, 3]).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch(_)));

    let err = a.set_slice(0..2, &vec![1.0f32, 2.0]).unwrap_err();
    assert_eq!(err, Error::TypeMismatch { expected: DType::I32, actual: DType::F32 });

    let err = a.set_slice(0..2, 1u8).unwrap_err();
    assert_eq!(err, Error::TypeMismatch { expected: DType::I32, actual: DType::U8 });
    Ok(())
}

// ================================================================================================
// Validation
// ================================================================================================

#[test]
fn test_mismatches_allocate_nothing() -> offload_core::Result<()> {
    let (device, stream) = setup();
    let a = stream.bind(&vec![1.0f32, 2.0, 3.0, 4.0])?;
    let wrong_shape = stream.zeros([2, 2], DType::F32)?;
    let wrong_type = stream.zeros(4, DType::F64)?;
    stream.synchronize()?;
    let live = device.live_buffers();

    assert!(matches!(a.add(&wrong_shape), Err(Error::ShapeMismatch(_))));
    assert_eq!(
        a.sub(&wrong_type).unwrap_err(),
        Error::TypeMismatch { expected: DType::F32, actual: DType::F64 }
    );
    assert_eq!(
        a.mul(2i32).unwrap_err(),
        Error::TypeMismatch { expected: DType::F32, actual: DType::I32 }
    );
    assert!(matches!(a.pow(&vec![1.0f32; 5]), Err(Error::ShapeMismatch(_))));
    assert!(matches!(a.add(&array![[1.0f32, 2.0], [3.0, 4.0]]), Err(Error::ShapeMismatch(_))));

    stream.synchronize()?;
    assert_eq!(device.live_buffers(), live);

    a.update_host()?;
    assert_eq!(a.to_vec::<f32>()?, vec![1.0, 2.0, 3.0, 4.0]);
    Ok(())
}

#[test]
fn test_layout_mismatch_is_rejected() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let row = stream.empty([2, 2], DType::F32, Layout::RowMajor, false)?;
    let col = stream.empty([2, 2], DType::F32, Layout::ColumnMajor, false)?;
    assert!(matches!(row.add(&col), Err(Error::ShapeMismatch(_))));
    Ok(())
}

#[test]
fn test_cross_device_operands() -> offload_core::Result<()> {
    let config = RuntimeConfig {
        device_count: 2,
        ..RuntimeConfig::default()
    };
    let registry = DeviceRegistry::from_config(&config)?;
    let s0 = registry.stream(0)?;
    let s1 = registry.stream(1)?;

    let a = s0.zeros(3, DType::F32)?;
    let b = s1.zeros(3, DType::F32)?;
    assert_eq!(
        a.add(&b).unwrap_err(),
        Error::DeviceMismatch {
            expected: DeviceId::new(0),
            actual: DeviceId::new(1)
        }
    );
    Ok(())
}

#[test]
fn test_assign_stream() -> offload_core::Result<()> {
    let config = RuntimeConfig {
        device_count: 2,
        ..RuntimeConfig::default()
    };
    let registry = DeviceRegistry::from_config(&config)?;
    let first = registry.stream(0)?;
    let second = registry.stream(0)?;
    let foreign = registry.stream(1)?;

    let mut a = first.zeros(2, DType::I32)?;
    a.fill(3i32)?;
    first.synchronize()?;

    a.assign_stream(&second)?;
    assert!(a.stream().same_stream(&second));
    a.update_host()?;
    assert_eq!(a.to_vec::<i32>()?, vec![3, 3]);

    assert!(matches!(a.assign_stream(&foreign), Err(Error::DeviceMismatch { .. })));
    assert!(a.stream().same_stream(&second));
    Ok(())
}

#[test]
fn test_empty_like_and_update_host_flag() -> offload_core::Result<()> {
    let (_device, stream) = setup();
    let mut a = stream.empty([3, 2], DType::U64, Layout::ColumnMajor, false)?;
    a.fill(9u64)?;

    let like = stream.empty_like(&a, true)?;
    assert_eq!(like.shape(), a.shape());
    assert_eq!(like.dtype(), DType::U64);
    assert_eq!(like.layout(), Layout::ColumnMajor);
    assert_eq!(like.to_vec::<u64>()?, vec![0; 6]);
    assert!(!like.same_storage(&a));
    Ok(())
}

proptest! {
    #[test]
    fn prop_reshape_preserves_storage(dims in proptest::collection::vec(1usize..5, 1..4)) {
        let (device, stream) = setup();
        let a = stream.zeros(dims.clone(), DType::U16).unwrap();
        let size: usize = dims.iter().product();

        let flat = a.ravel().unwrap();
        prop_assert_eq!(flat.dims(), &[size][..]);
        prop_assert!(flat.same_storage(&a));

        let back = flat.reshape(dims.clone()).unwrap();
        prop_assert_eq!(back.dims(), dims.as_slice());
        prop_assert_eq!(back.nbytes(), a.nbytes());

        prop_assert!(matches!(a.reshape(vec![size + 1]), Err(Error::ShapeMismatch(_))));

        drop(back);
        drop(flat);
        drop(a);
        stream.synchronize().unwrap();
        prop_assert_eq!(device.live_buffers(), 0);
    }
}
