//! Safetensors weight loading.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use safetensors::{Dtype, SafeTensors};
use tracing::debug;

/// Reads a safetensors file into a `VarBuilder` on `device`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid safetensors, or
/// holds a tensor type candle cannot represent.
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;
    let store = SafeTensors::deserialize(&bytes)
        .with_context(|| format!("Invalid safetensors file: {}", path.display()))?;

    let tensors = store
        .tensors()
        .into_iter()
        .map(|(name, view)| {
            let dtype = candle_dtype(view.dtype())
                .with_context(|| format!("Tensor '{name}' in {}", path.display()))?;
            let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
                .with_context(|| format!("Failed to create tensor '{name}'"))?;
            Ok((name, tensor))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    debug!("Loaded {} tensors from {}", tensors.len(), path.display());
    Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
}

fn candle_dtype(dtype: Dtype) -> Result<DType> {
    Ok(match dtype {
        Dtype::F32 => DType::F32,
        Dtype::F64 => DType::F64,
        Dtype::F16 => DType::F16,
        Dtype::BF16 => DType::BF16,
        Dtype::I64 => DType::I64,
        Dtype::U32 => DType::U32,
        Dtype::U8 => DType::U8,
        other => anyhow::bail!("unsupported dtype {other:?}"),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    use safetensors::tensor::TensorView;
    use tempfile::NamedTempFile;

    fn write_store(dtype: Dtype, shape: Vec<usize>, data: &[u8]) -> NamedTempFile {
        let view = TensorView::new(dtype, shape, data).expect("valid tensor view");
        let bytes = safetensors::serialize(HashMap::from([("weight".to_string(), view)]), &None)
            .expect("serialize");

        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&bytes).expect("write");
        file
    }

    #[test]
    fn test_load_f32_tensor() {
        let data: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0];
        let file = write_store(Dtype::F32, vec![2, 2], bytemuck::cast_slice(&data));

        let vb = load_safetensors(file.path(), &Device::Cpu).expect("load");
        let weight = vb.get((2, 2), "weight").expect("tensor present");
        assert_eq!(
            weight.to_vec2::<f32>().expect("values"),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
    }

    #[test]
    fn test_missing_file() {
        assert!(load_safetensors("/nonexistent/path.safetensors", &Device::Cpu).is_err());
    }

    #[test]
    fn test_garbage_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"not a tensor store").expect("write");

        assert!(load_safetensors(file.path(), &Device::Cpu).is_err());
    }

    #[test]
    fn test_unsupported_dtype() {
        let file = write_store(Dtype::I16, vec![2], &[0, 0, 0, 0]);

        let err = load_safetensors(file.path(), &Device::Cpu).err().expect("i16 is rejected");
        assert!(format!("{err:#}").contains("unsupported dtype"));
    }
}
