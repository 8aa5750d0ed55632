use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::combine::{Coalescer, StrategyKind};
use crate::config::CoalescenceConfig;
use crate::core::particle::{Parton, DIM};
use crate::core::Event;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn check_rows(name: &str, shape: &[usize], n: usize) -> PyResult<()> {
    if shape.len() != 2 || shape[0] != n || shape[1] != DIM {
        return Err(py_err(format!(
            "{name} must have shape ({n}, {DIM}), got {shape:?}"
        )));
    }
    Ok(())
}

/// Python-facing wrapper around the Rust coalescence engine.
///
/// API:
/// - __new__(strategy="KDTreeGlobal", baryon_preference=1.0, frame_count=10,
///   frame_policy="EqualTime", fixed_step=0.5, neighbors=20,
///   opposite_window=10, seed=None)
/// - combine(positions, momenta, charges, species, times=None) -> dict
/// - strategies() -> list[str]
#[pyclass(name = "Coalescer")]
pub struct PyCoalescer {
    inner: Coalescer,
    next_event: u64,
}

#[pymethods]
impl PyCoalescer {
    /// Errors: raises ValueError on an unknown strategy or frame-policy name,
    /// or on invalid numeric parameters.
    #[new]
    #[allow(clippy::too_many_arguments)]
    #[pyo3(signature = (
        strategy="KDTreeGlobal",
        baryon_preference=1.0,
        frame_count=10,
        frame_policy="EqualTime",
        fixed_step=0.5,
        neighbors=20,
        opposite_window=10,
        seed=None
    ))]
    fn new(
        strategy: &str,
        baryon_preference: f64,
        frame_count: usize,
        frame_policy: &str,
        fixed_step: f64,
        neighbors: usize,
        opposite_window: usize,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let mut config = CoalescenceConfig::from_names(strategy, frame_policy)
            .map_err(py_err)?
            .with_baryon_preference(baryon_preference)
            .with_fixed_step(fixed_step)
            .with_neighbors(neighbors)
            .with_opposite_window(opposite_window);
        config.frame_count = frame_count;
        config.seed = seed;
        let inner = Coalescer::new(config).map_err(py_err)?;
        Ok(Self {
            inner,
            next_event: 0,
        })
    }

    /// Names accepted by the `strategy` argument.
    #[staticmethod]
    fn strategies() -> Vec<&'static str> {
        StrategyKind::ALL.iter().map(|k| k.name()).collect()
    }

    /// Coalesce one event (releases the GIL during computation).
    ///
    /// Parameters
    /// - positions, momenta: float64 arrays of shape (N, 3)
    /// - charges: float64 array of length N, each +-1/3
    /// - species: int32 PDG codes of length N
    /// - times: optional float64 formation times of length N (default 0)
    ///
    /// Returns a dict of per-hadron arrays: "position" and "momentum" (M, 3),
    /// "charge", "mass", "cost", "forced", "constituents" (M, 3) with row
    /// indices into the input padded by -1, plus "unconsumed" (int).
    #[pyo3(signature = (positions, momenta, charges, species, times=None))]
    fn combine<'py>(
        &mut self,
        py: Python<'py>,
        positions: PyReadonlyArray2<'py, f64>,
        momenta: PyReadonlyArray2<'py, f64>,
        charges: PyReadonlyArray1<'py, f64>,
        species: PyReadonlyArray1<'py, i32>,
        times: Option<PyReadonlyArray1<'py, f64>>,
    ) -> PyResult<Py<PyDict>> {
        let charges = charges.as_slice().map_err(py_err)?;
        let species = species.as_slice().map_err(py_err)?;
        let n = charges.len();
        let pos = positions.as_array();
        let mom = momenta.as_array();
        check_rows("positions", pos.shape(), n)?;
        check_rows("momenta", mom.shape(), n)?;
        if species.len() != n {
            return Err(py_err(format!("species must have length {n}")));
        }
        let times: Option<Vec<f64>> = match times {
            Some(t) => Some(t.as_slice().map_err(py_err)?.to_vec()),
            None => None,
        };
        if times.as_ref().is_some_and(|t| t.len() != n) {
            return Err(py_err(format!("times must have length {n}")));
        }

        let mut partons = Vec::with_capacity(n);
        for i in 0..n {
            let r = [pos[[i, 0]], pos[[i, 1]], pos[[i, 2]]];
            let p = [mom[[i, 0]], mom[[i, 1]], mom[[i, 2]]];
            let t = times.as_ref().map_or(0.0, |t| t[i]);
            partons.push(Parton::new(i as u32, r, t, p, charges[i], species[i]).map_err(py_err)?);
        }
        let mut event = Event::new(self.next_event, partons).map_err(py_err)?;
        self.next_event += 1;

        let summary = py
            .detach(|| self.inner.run(&mut event))
            .map_err(py_err)?;

        let hadrons = event.hadrons();
        let m = hadrons.len();
        let mut position = Array2::<f64>::zeros((m, DIM));
        let mut momentum = Array2::<f64>::zeros((m, DIM));
        let mut constituents = Array2::<i64>::from_elem((m, 3), -1);
        for (i, h) in hadrons.iter().enumerate() {
            for k in 0..DIM {
                position[[i, k]] = h.r[k];
                momentum[[i, k]] = h.p[k];
            }
            for (j, &id) in h.constituents.iter().enumerate() {
                constituents[[i, j]] = i64::from(id);
            }
        }
        let charge: Vec<i32> = hadrons.iter().map(|h| h.charge).collect();
        let mass: Vec<f64> = hadrons.iter().map(|h| h.mass).collect();
        let cost: Vec<f64> = hadrons.iter().map(|h| h.formation_cost).collect();
        let forced: Vec<bool> = hadrons.iter().map(|h| h.forced).collect();

        let out = PyDict::new(py);
        out.set_item("position", position.into_pyarray(py))?;
        out.set_item("momentum", momentum.into_pyarray(py))?;
        out.set_item("charge", charge.into_pyarray(py))?;
        out.set_item("mass", mass.into_pyarray(py))?;
        out.set_item("cost", cost.into_pyarray(py))?;
        out.set_item("forced", forced.into_pyarray(py))?;
        out.set_item("constituents", constituents.into_pyarray(py))?;
        out.set_item("unconsumed", summary.unconsumed)?;
        Ok(out.into())
    }
}

/// The hadrocoal Python module entry point.
#[pymodule]
fn hadrocoal(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCoalescer>()?;
    Ok(())
}
