//! Pretrained weight resolution and SafeTensors loading
//!
//! Checkpoint names follow the HuggingFace DistilBERT convention
//! (`distilbert.transformer.layer.{i}.attention.q_lin.weight` and friends).
//! Linear weights are stored (out, in) in the checkpoint and transposed to
//! the (in, out) layout the forward pass multiplies against.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Maps a pretrained-weights alias to its checkpoint directory.
///
/// Aliases name domain-adapted masked-LM checkpoints kept under a shared
/// parameter directory. Anything that is not a known alias is treated as a
/// literal path, so `distilbert-base-uncased` works as a local directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightRegistry;

/// Alias -> checkpoint subdirectory.
const ALIASES: &[(&str, &str)] = &[
    ("simsents30k", "maskedlm_golbeck_simsents_5k"),
    ("target30k", "maskedlm_golbeck_5k"),
    ("external30k", "maskedlm_nelagt_5k"),
    ("simsents7.5m", "maskedlm_golbeck_simsents"),
    ("target7.5m", "maskedlm_golbeck"),
    ("external7.5m", "maskedlm_nelagt"),
];

impl WeightRegistry {
    /// Resolve a weights name to a checkpoint path.
    pub fn resolve(name: &str, params_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some((_, subdir)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
            let dir = params_dir.ok_or_else(|| {
                Error::ConfigError(format!(
                    "weights alias '{name}' requires a model parameters directory"
                ))
            })?;
            return Ok(dir.join(subdir));
        }
        Ok(PathBuf::from(name))
    }

    /// Known aliases, for CLI help output.
    #[must_use]
    pub fn aliases() -> Vec<&'static str> {
        ALIASES.iter().map(|(alias, _)| *alias).collect()
    }
}

/// A named tensor read from a checkpoint.
#[derive(Debug, Clone)]
pub struct RawTensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl RawTensor {
    /// Total element count.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Load all tensors from a checkpoint file or directory.
///
/// The leading `distilbert.` prefix masked-LM checkpoints carry is
/// stripped so downstream lookup uses one naming scheme.
pub fn load_raw_tensors(model_path: &Path) -> Result<HashMap<String, RawTensor>> {
    use safetensors::SafeTensors;

    let st_files = find_safetensors_files(model_path);
    if st_files.is_empty() {
        return Err(Error::ConfigError(format!(
            "No SafeTensors files found in {}",
            model_path.display()
        )));
    }

    let mut tensors_out = HashMap::new();
    for st_path in &st_files {
        let data = std::fs::read(st_path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {e}", st_path.display())))?;

        let tensors = SafeTensors::deserialize(&data).map_err(|e| {
            Error::Serialization(format!(
                "Failed to parse SafeTensors {}: {e}",
                st_path.display()
            ))
        })?;

        for name in tensors.names() {
            if let Ok(view) = tensors.tensor(name) {
                if let Some(values) = tensor_to_f32_vec(&view) {
                    let key = name.strip_prefix("distilbert.").unwrap_or(name);
                    tensors_out.insert(
                        key.to_string(),
                        RawTensor {
                            shape: view.shape().to_vec(),
                            data: values,
                        },
                    );
                }
            }
        }
    }

    Ok(tensors_out)
}

/// Fetch a tensor by name, checking its element count.
pub fn take_tensor(
    tensors: &HashMap<String, RawTensor>,
    name: &str,
    expected_numel: usize,
) -> Result<Vec<f32>> {
    let raw = tensors.get(name).ok_or_else(|| {
        Error::ConfigError(format!("checkpoint is missing tensor '{name}'"))
    })?;
    if raw.numel() != expected_numel {
        return Err(Error::ConfigError(format!(
            "tensor '{name}' has {} elements, expected {expected_numel}",
            raw.numel()
        )));
    }
    Ok(raw.data.clone())
}

/// Fetch a checkpoint linear weight stored (out, in) and transpose it to
/// the (in, out) layout used by the forward pass.
pub fn take_linear_weight(
    tensors: &HashMap<String, RawTensor>,
    name: &str,
    in_dim: usize,
    out_dim: usize,
) -> Result<Vec<f32>> {
    let stored = take_tensor(tensors, name, in_dim * out_dim)?;
    Ok(crate::autograd::transpose(&stored, out_dim, in_dim))
}

fn find_safetensors_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        if path.extension().is_some_and(|e| e == "safetensors") {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        let single = path.join("model.safetensors");
        if single.exists() {
            files.push(single);
        } else if let Ok(entries) = std::fs::read_dir(path) {
            for entry in entries.flatten() {
                let p = entry.path();
                if p.extension().is_some_and(|e| e == "safetensors") {
                    files.push(p);
                }
            }
            files.sort();
        }
    }

    files
}

/// Convert a SafeTensors view to f32, handling f32, f16, and bf16.
fn tensor_to_f32_vec(tensor: &safetensors::tensor::TensorView<'_>) -> Option<Vec<f32>> {
    use safetensors::Dtype;

    let data = tensor.data();
    match tensor.dtype() {
        Dtype::F32 => Some(
            data.chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        ),
        Dtype::F16 => Some(
            data.chunks_exact(2)
                .map(|chunk| {
                    let bits = u16::from_le_bytes([chunk[0], chunk[1]]);
                    half::f16::from_bits(bits).to_f32()
                })
                .collect(),
        ),
        Dtype::BF16 => Some(
            data.chunks_exact(2)
                .map(|chunk| {
                    let bits = u16::from_le_bytes([chunk[0], chunk[1]]);
                    half::bf16::from_bits(bits).to_f32()
                })
                .collect(),
        ),
        other => {
            eprintln!("Warning: unsupported tensor dtype {other:?}, skipping");
            None
        }
    }
}
