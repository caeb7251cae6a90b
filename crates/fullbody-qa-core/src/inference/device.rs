//! Compute device selection.

use candle_core::Device;
use tracing::info;

/// Picks the device the face model runs on.
///
/// Uses Metal or CUDA when the matching cargo feature is enabled and a device
/// is present; otherwise the CPU.
#[must_use]
pub fn get_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Face model running on Metal");
            return device;
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Face model running on CUDA");
            return device;
        }
    }

    info!("Face model running on CPU");
    Device::Cpu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_build_selects_cpu() {
        let device = get_device();
        if cfg!(not(any(feature = "metal", feature = "cuda"))) {
            assert!(device.is_cpu());
        }
    }
}
