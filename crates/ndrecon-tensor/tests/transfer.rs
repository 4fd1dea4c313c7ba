use ndrecon_tensor::{
    current_device, registry, set_current_device, Device, DeviceGuard, Tensor, THREAD_CONTEXT,
};

#[test]
fn test_cpu_to_accelerator_transfer() -> Result<(), Box<dyn std::error::Error>> {
    let data = vec![1.0f32, 2.0, 3.0, 4.0];
    let cpu_tensor = Tensor::from_shape_vec(&[4], data.clone(), Device::Cpu)?;

    let accel_tensor = cpu_tensor.to_device(Device::accelerator(0))?;
    assert!(accel_tensor.device().is_accelerator());
    assert_eq!(accel_tensor.as_slice(), data.as_slice());

    Ok(())
}

#[test]
fn test_roundtrip_transfer() -> Result<(), Box<dyn std::error::Error>> {
    let original_data = vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
    let cpu_tensor = Tensor::from_shape_vec(&[2, 3], original_data.clone(), Device::Cpu)?;

    for _ in 0..5 {
        let accel_tensor = cpu_tensor.to_device(Device::accelerator(0))?;
        let cpu_tensor_back = accel_tensor.to_device(Device::Cpu)?;
        assert_eq!(cpu_tensor_back.shape, vec![2, 3]);
        assert_eq!(cpu_tensor_back.as_slice(), original_data.as_slice());
    }

    Ok(())
}

#[test]
fn test_accelerator_memory_accounting() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let backend = registry().backend(Device::accelerator(0))?;
    let t = Tensor::<u8>::zeros(&[1 << 16], Device::accelerator(0))?;
    assert!(backend.memory_in_use() >= 1 << 16);
    assert_eq!(t.storage.size_in_bytes(), 1 << 16);
    Ok(())
}

#[test]
fn test_guard_switches_thread_device() -> Result<(), Box<dyn std::error::Error>> {
    set_current_device(Device::accelerator(0))?;
    {
        let guard = DeviceGuard::enter(&THREAD_CONTEXT, Device::Cpu)?;
        assert_eq!(guard.device(), Device::Cpu);
        assert_eq!(current_device(), Device::Cpu);
    }
    assert_eq!(current_device(), Device::accelerator(0));
    Ok(())
}

#[test]
fn test_guard_restores_after_error_path() -> Result<(), Box<dyn std::error::Error>> {
    fn failing_op() -> Result<(), Box<dyn std::error::Error>> {
        let _guard = DeviceGuard::enter(&THREAD_CONTEXT, Device::Cpu)?;
        Tensor::from_shape_vec(&[3], vec![1u8], Device::Cpu)?;
        Ok(())
    }

    set_current_device(Device::accelerator(0))?;
    assert!(failing_op().is_err());
    assert_eq!(current_device(), Device::accelerator(0));
    Ok(())
}
