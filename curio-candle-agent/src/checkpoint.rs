//! Single-artifact checkpoints over several cooperating networks.
//!
//! All variables of an agent's networks are flattened into one safetensors
//! file, with each variable stored under `<network name>.<variable name>`.
//! Loading validates the key set before mutating any parameter.
use anyhow::Result;
use candle_core::{safetensors, Device};
use candle_nn::VarMap;
use curio_core::error::CurioError;
use log::info;
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

fn keys_of(nets: &[(&str, &VarMap)]) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for (name, varmap) in nets {
        let data = varmap.data().lock().unwrap();
        for key in data.keys() {
            keys.insert(format!("{}.{}", name, key));
        }
    }
    keys
}

/// Saves named networks into a single safetensors file.
///
/// The file is written to a temporary sibling path first and renamed into
/// place, so a crash during the write cannot leave a truncated checkpoint
/// under `path`.
pub fn save(nets: &[(&str, &VarMap)], path: &Path) -> Result<()> {
    let mut tensors = HashMap::new();
    for (name, varmap) in nets {
        let data = varmap.data().lock().unwrap();
        for (key, var) in data.iter() {
            tensors.insert(format!("{}.{}", name, key), var.as_tensor().clone());
        }
    }

    let tmp = path.with_extension("tmp");
    safetensors::save(&tensors, &tmp)?;
    std::fs::rename(&tmp, path)?;
    info!("Saved checkpoint to {:?}", path);

    Ok(())
}

/// Loads a checkpoint written by [`save`] into the given networks.
///
/// The key set of the checkpoint must match the variables of `nets`
/// exactly; otherwise the load fails with
/// [`CurioError::CheckpointKeyMismatch`] and no parameter is modified.
pub fn load(nets: &[(&str, &VarMap)], path: &Path, device: &Device) -> Result<()> {
    let tensors = safetensors::load(path, device)?;

    let expected = keys_of(nets);
    let found: BTreeSet<String> = tensors.keys().cloned().collect();
    let missing: Vec<String> = expected.difference(&found).cloned().collect();
    let unexpected: Vec<String> = found.difference(&expected).cloned().collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(CurioError::CheckpointKeyMismatch {
            missing,
            unexpected,
        }
        .into());
    }

    for (name, varmap) in nets {
        let data = varmap.data().lock().unwrap();
        for (key, var) in data.iter() {
            var.set(&tensors[&format!("{}.{}", name, key)])?;
        }
    }
    info!("Loaded checkpoint from {:?}", path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::copy_params;
    use candle_core::{DType, Tensor};
    use candle_nn::Init;
    use tempdir::TempDir;

    fn varmap(name: &str, value: f32) -> VarMap {
        let varmap = VarMap::new();
        varmap
            .get(&[2], name, Init::Const(value as f64), DType::F32, &Device::Cpu)
            .unwrap();
        varmap
    }

    fn values(varmap: &VarMap, name: &str) -> Vec<f32> {
        let data = varmap.data().lock().unwrap();
        data.get(name)
            .unwrap()
            .as_tensor()
            .to_vec1::<f32>()
            .unwrap()
    }

    #[test]
    fn round_trip_restores_parameters() {
        let dir = TempDir::new("checkpoint").unwrap();
        let path = dir.path().join("agent.safetensors");

        let model = varmap("w", 3.0);
        let model_a = varmap("enc", -1.0);
        save(&[("model", &model), ("model_a", &model_a)], &path).unwrap();

        let model2 = varmap("w", 0.0);
        let model_a2 = varmap("enc", 0.0);
        load(
            &[("model", &model2), ("model_a", &model_a2)],
            &path,
            &Device::Cpu,
        )
        .unwrap();

        assert_eq!(values(&model2, "w"), vec![3.0, 3.0]);
        assert_eq!(values(&model_a2, "enc"), vec![-1.0, -1.0]);
    }

    #[test]
    fn key_mismatch_fails_without_touching_parameters() {
        let dir = TempDir::new("checkpoint").unwrap();
        let path = dir.path().join("agent.safetensors");

        let model = varmap("w", 3.0);
        save(&[("model", &model)], &path).unwrap();

        // a network set that additionally expects a curiosity module
        let model2 = varmap("w", 7.0);
        let model_a2 = varmap("enc", 7.0);
        let before = varmap("w", 0.0);
        copy_params(&before, &model2).unwrap();

        let err = load(
            &[("model", &model2), ("model_a", &model_a2)],
            &path,
            &Device::Cpu,
        )
        .unwrap_err();
        assert!(err.to_string().contains("checkpoint key mismatch"));
        assert_eq!(values(&model2, "w"), values(&before, "w"));
        assert_eq!(values(&model_a2, "enc"), vec![7.0, 7.0]);
    }

    #[test]
    fn save_replaces_existing_file_atomically() {
        let dir = TempDir::new("checkpoint").unwrap();
        let path = dir.path().join("agent.safetensors");

        let model = varmap("w", 1.0);
        save(&[("model", &model)], &path).unwrap();
        {
            let data = model.data().lock().unwrap();
            data.get("w")
                .unwrap()
                .set(&Tensor::from_slice(&[5.0f32, 5.0], (2,), &Device::Cpu).unwrap())
                .unwrap();
        }
        save(&[("model", &model)], &path).unwrap();

        let model2 = varmap("w", 0.0);
        load(&[("model", &model2)], &path, &Device::Cpu).unwrap();
        assert_eq!(values(&model2, "w"), vec![5.0, 5.0]);
    }
}
