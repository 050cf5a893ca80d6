use candle_core::Device;

pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) { tracing::info!("embedding device: metal"); return dev; }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(dev) = Device::new_cuda(0) { tracing::info!("embedding device: cuda"); return dev; }
    }
    tracing::info!("embedding device: cpu");
    Device::Cpu
}
