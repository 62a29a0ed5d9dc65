//! Utilities shared by the agents.
use anyhow::{anyhow, Result};
use candle_core::{backprop::GradStore, DType, Tensor, Var};
use candle_nn::VarMap;
use serde::{Deserialize, Serialize};

/// Accessors to the output dimension of a network configuration.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: i64);
}

/// The loss used for value function regression.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 (Huber) loss.
    SmoothL1,
}

/// Smooth L1 loss, averaged over all elements.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor> {
    let d = (x - y)?.abs()?;
    let quadratic = (d.sqr()? * 0.5)?;
    let linear = (&d - 0.5)?;
    let mask = d.le(1.0)?.to_dtype(DType::F32)?;
    let ones = mask.ones_like()?;
    let loss = ((&mask * quadratic)? + ((ones - &mask)? * linear)?)?;
    Ok(loss.mean_all()?)
}

/// Copies all variables of `src` into `dest`.
///
/// Variables are matched by name; `dest` must contain exactly the variables
/// of `src`.
pub fn copy_params(dest: &VarMap, src: &VarMap) -> Result<()> {
    let src = src.data().lock().unwrap();
    let dest = dest.data().lock().unwrap();
    for (name, var_src) in src.iter() {
        let var_dest = dest
            .get(name)
            .ok_or_else(|| anyhow!("variable {} is missing in the destination", name))?;
        var_dest.set(var_src.as_tensor())?;
    }
    Ok(())
}

/// Soft update of the variables of `dest`:
/// `dest = tau * src + (1 - tau) * dest`.
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    let src = src.data().lock().unwrap();
    let dest = dest.data().lock().unwrap();
    for (name, var_src) in src.iter() {
        let var_dest = dest
            .get(name)
            .ok_or_else(|| anyhow!("variable {} is missing in the destination", name))?;
        let t_src = var_src.as_tensor();
        let t_dest = var_dest.as_tensor();
        let t = ((tau * t_src)? + ((1.0 - tau) * t_dest)?)?;
        var_dest.set(&t)?;
    }
    Ok(())
}

/// Adds the gradients of `src` for the given variables into `acc`.
///
/// Variables without a gradient in `src` are left untouched, so stores of
/// losses touching different parameter subsets can be merged.
pub fn accumulate_grads(acc: &mut GradStore, src: &GradStore, vars: &[Var]) -> Result<()> {
    for var in vars.iter() {
        if let Some(g) = src.get(var) {
            let g = match acc.remove(var) {
                Some(g0) => (g0 + g)?,
                None => g.clone(),
            };
            acc.insert(var, g);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::{Init, VarMap};

    fn varmap_with(name: &str, values: &[f32]) -> VarMap {
        let varmap = VarMap::new();
        varmap
            .get(
                &[values.len()],
                name,
                Init::Const(0.0),
                DType::F32,
                &Device::Cpu,
            )
            .unwrap();
        let data = varmap.data().lock().unwrap();
        data.get(name)
            .unwrap()
            .set(&Tensor::from_slice(values, (values.len(),), &Device::Cpu).unwrap())
            .unwrap();
        drop(data);
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
    fn copy_params_is_exact() {
        let src = varmap_with("w", &[1.0, -2.0, 3.5]);
        let dest = varmap_with("w", &[0.0, 0.0, 0.0]);
        copy_params(&dest, &src).unwrap();
        assert_eq!(values(&dest, "w"), vec![1.0, -2.0, 3.5]);
    }

    #[test]
    fn copied_params_stay_independent() {
        let src = varmap_with("w", &[1.0]);
        let dest = varmap_with("w", &[0.0]);
        copy_params(&dest, &src).unwrap();

        let data = src.data().lock().unwrap();
        data.get("w")
            .unwrap()
            .set(&Tensor::from_slice(&[9.0f32], (1,), &Device::Cpu).unwrap())
            .unwrap();
        drop(data);

        assert_eq!(values(&dest, "w"), vec![1.0]);
    }

    #[test]
    fn track_follows_the_soft_update_law() {
        let src = varmap_with("w", &[4.0, 0.0]);
        let dest = varmap_with("w", &[0.0, 8.0]);
        track(&dest, &src, 0.25).unwrap();
        // 0.25 * src + 0.75 * dest
        assert_eq!(values(&dest, "w"), vec![1.0, 6.0]);
    }

    #[test]
    fn smooth_l1_is_quadratic_then_linear() {
        let x = Tensor::from_slice(&[0.0f32, 0.0], (2,), &Device::Cpu).unwrap();
        let y = Tensor::from_slice(&[0.5f32, 2.0], (2,), &Device::Cpu).unwrap();
        let loss = smooth_l1_loss(&x, &y).unwrap().to_scalar::<f32>().unwrap();
        // elementwise losses: 0.5 * 0.5^2 = 0.125 and 2.0 - 0.5 = 1.5
        assert!((loss - (0.125 + 1.5) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn accumulate_grads_sums_per_variable() {
        let varmap = VarMap::new();
        varmap
            .get(&[1], "w", Init::Const(3.0), DType::F32, &Device::Cpu)
            .unwrap();
        let vars = varmap.all_vars();
        let w = &vars[0];

        // two losses over the same variable: w^2 and 2 * w
        let loss1 = w.sqr().unwrap().sum_all().unwrap();
        let loss2 = (w.as_tensor() * 2.0).unwrap().sum_all().unwrap();

        let mut acc = loss1.backward().unwrap();
        let grads2 = loss2.backward().unwrap();
        accumulate_grads(&mut acc, &grads2, &vars).unwrap();

        let g = acc
            .get(&vars[0])
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        // d(w^2)/dw + d(2w)/dw = 2 * 3 + 2
        assert_eq!(g, vec![8.0]);
    }
}
