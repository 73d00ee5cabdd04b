//! Discretized kernel-integral operator.
//!
//! Approximates
//!
//! ```text
//! v(y) = ∫ k(x, y) u(x) dx
//! ```
//!
//! by a quadrature over the sensor points.

use continuum_core::{ContinuumError, Result, Tensor};
use continuum_data::DatasetShapes;
use tracing::{debug, trace};

use crate::kernels::{check_role, KernelFunction};
use crate::operator::Operator;

/// How the integrand sampled at the sensors is reduced to an integral.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuadratureRule {
    /// Equal weight `1 / sensors` for every sensor: the sum over sensors,
    /// divided by the sensor count.
    #[default]
    Uniform,
}

impl QuadratureRule {
    /// Reduce `[observations, sensors, queries, channels]` over the sensor axis.
    ///
    /// An integrand without sensors has no defined average and is rejected
    /// with [`ContinuumError::ShapeMismatch`].
    pub fn integrate(self, integrand: &Tensor) -> Result<Tensor> {
        let sensors = integrand.dims().get(1).copied().unwrap_or(0);
        if sensors == 0 {
            let mut expected = integrand.dims().to_vec();
            expected.resize(expected.len().max(2), 0);
            expected[1] = 1;
            return Err(ContinuumError::ShapeMismatch {
                expected,
                got: integrand.dims().to_vec(),
            });
        }
        match self {
            QuadratureRule::Uniform => {
                // Sum first, then divide, so an indicator kernel returns u / sensors exactly.
                Ok(integrand.sum_axis(1)?.div_scalar(sensors as f32))
            }
        }
    }
}

/// Kernel-integral operator with a fixed quadrature rule:
///
/// ```text
/// v[o, q, c_out] = 1/S * Σ_s Σ_c_in k[o, s, q, c_in, c_out] * u[o, s, c_in]
/// ```
///
/// where `S` is the number of sensors of the call. Changing the sensor count
/// rescales the result accordingly: the operator computes an average over
/// sensors, not a raw sum.
pub struct NaiveIntegralKernel {
    kernel: Box<dyn KernelFunction>,
    quadrature: QuadratureRule,
}

impl NaiveIntegralKernel {
    /// Integrate against `kernel` with the uniform quadrature rule.
    pub fn new(kernel: Box<dyn KernelFunction>) -> Self {
        Self::with_quadrature(kernel, QuadratureRule::Uniform)
    }

    /// Integrate against `kernel` with an explicit quadrature rule.
    pub fn with_quadrature(kernel: Box<dyn KernelFunction>, quadrature: QuadratureRule) -> Self {
        debug!(shapes = %kernel.shapes(), ?quadrature, "naive integral kernel created");
        Self { kernel, quadrature }
    }

    /// The kernel evaluated on every forward pass.
    pub fn kernel(&self) -> &dyn KernelFunction {
        self.kernel.as_ref()
    }

    pub fn quadrature(&self) -> QuadratureRule {
        self.quadrature
    }
}

impl Operator for NaiveIntegralKernel {
    fn shapes(&self) -> &DatasetShapes {
        self.kernel.shapes()
    }

    fn forward(&self, x: &Tensor, u: &Tensor, y: &Tensor) -> Result<Tensor> {
        let shapes = self.kernel.shapes();
        check_role(u, shapes.u().dim())?;
        if u.ndim() != x.ndim() || u.dims()[..2] != x.dims()[..2] {
            return Err(ContinuumError::roles("x", x.dims(), "u", u.dims()));
        }
        if x.dims()[1] == 0 {
            // v is an average over sensors; with none it would be 0 / 0.
            return Err(ContinuumError::ShapeMismatch {
                expected: vec![x.dims()[0], 1, shapes.x().dim()],
                got: x.dims().to_vec(),
            });
        }

        let k = self.kernel.evaluate(x, y)?;
        let (b, s) = (x.dims()[0], x.dims()[1]);
        let q = y.dims()[1];
        let (c_in, c_out) = (shapes.u().dim(), shapes.v().dim());
        let expected = [b, s, q, c_in, c_out];
        if k.dims() != expected {
            return Err(ContinuumError::KernelOutputShape {
                expected: expected.to_vec(),
                got: k.dims().to_vec(),
            });
        }
        trace!(observations = b, sensors = s, queries = q, "integral kernel forward");

        // [b, s, q, c_in, c_out] * [b, s, 1, c_in, 1], then contract c_in.
        let u_block = u.reshape_to(&[b, s, 1, c_in, 1])?;
        let integrand = k.mul(&u_block)?.sum_axis(3)?;
        self.quadrature.integrate(&integrand)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        self.kernel.parameters()
    }
}
