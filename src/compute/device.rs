//! Accelerator devices, which compute on buffers of double-precision values.

use std::fmt::Debug;

use rayon::prelude::*;
use thiserror::Error;

/// A failure of a device kernel. The operation is recomputed on the CPU.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Device {device} failed: {reason}")]
pub struct DeviceError {
    pub device: String,
    pub reason: String,
}

impl DeviceError {
    pub fn new(device: impl Into<String>, reason: impl Into<String>) -> DeviceError {
        DeviceError {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

/// A compute device that executes kernels on buffers of `f64`.
///
/// Matrices are passed in row-major order. Kernels may run asynchronously,
/// but every result must be complete after [Device::synchronize] returns.
///
/// A product with a zero factor must contribute nothing, also when the other
/// factor is infinite or NaN, so that results agree with the CPU kernels.
pub trait Device: Send + Sync + Debug {
    /// A unique name of the device.
    fn name(&self) -> &str;

    /// Devices with a higher priority are preferred.
    fn priority(&self) -> i32 {
        0
    }

    /// Return `false` if the device cannot be used on this machine.
    fn is_available(&self) -> bool {
        true
    }

    /// Compute the elementwise sum of `a` and `b`.
    fn add(&self, a: &[f64], b: &[f64]) -> Result<Vec<f64>, DeviceError>;

    /// Multiply every element of `a` by `s`.
    fn scale(&self, a: &[f64], s: f64) -> Result<Vec<f64>, DeviceError>;

    /// Compute the product of the `m x k` matrix `a` and the `k x n` matrix `b`.
    fn matmul(
        &self,
        a: &[f64],
        b: &[f64],
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<Vec<f64>, DeviceError>;

    /// Compute the scalar product of `a` and `b`.
    fn dot(&self, a: &[f64], b: &[f64]) -> Result<f64, DeviceError>;

    /// Wait until all submitted kernels have finished.
    fn synchronize(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Check that the device computes `1 + 2 = 3`.
    fn self_test(&self) -> Result<(), DeviceError> {
        let r = self.add(&[1.], &[2.])?;
        self.synchronize()?;

        match r.first() {
            Some(v) if (v - 3.).abs() < 1e-4 => Ok(()),
            _ => Err(DeviceError::new(
                self.name(),
                format!("self-test computed 1 + 2 = {:?}", r),
            )),
        }
    }
}

#[inline]
fn fma(x: f64, y: f64, acc: f64) -> f64 {
    if x == 0. || y == 0. {
        acc
    } else {
        x.mul_add(y, acc)
    }
}

#[inline]
fn scale(x: f64, s: f64) -> f64 {
    if x == 0. || s == 0. {
        0.
    } else {
        x * s
    }
}

/// A device that distributes kernels over a work-stealing thread pool on the host.
///
/// Buffers shorter than `min_parallel_len` are processed sequentially.
#[derive(Clone, Debug)]
pub struct HostParallelDevice {
    min_parallel_len: usize,
    priority: i32,
}

impl Default for HostParallelDevice {
    fn default() -> Self {
        HostParallelDevice {
            min_parallel_len: 4096,
            priority: 0,
        }
    }
}

impl HostParallelDevice {
    pub fn new(min_parallel_len: usize, priority: i32) -> HostParallelDevice {
        HostParallelDevice {
            min_parallel_len,
            priority,
        }
    }

    fn check_len(&self, op: &str, a: usize, b: usize) -> Result<(), DeviceError> {
        if a != b {
            Err(DeviceError::new(
                self.name(),
                format!("{}: buffer lengths {} and {} differ", op, a, b),
            ))
        } else {
            Ok(())
        }
    }
}

impl Device for HostParallelDevice {
    fn name(&self) -> &str {
        "host-parallel"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn add(&self, a: &[f64], b: &[f64]) -> Result<Vec<f64>, DeviceError> {
        self.check_len("add", a.len(), b.len())?;

        if a.len() < self.min_parallel_len {
            Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
        } else {
            Ok(a.par_iter().zip(b).map(|(x, y)| x + y).collect())
        }
    }

    fn scale(&self, a: &[f64], s: f64) -> Result<Vec<f64>, DeviceError> {
        if a.len() < self.min_parallel_len {
            Ok(a.iter().map(|x| scale(*x, s)).collect())
        } else {
            Ok(a.par_iter().map(|x| scale(*x, s)).collect())
        }
    }

    fn matmul(
        &self,
        a: &[f64],
        b: &[f64],
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<Vec<f64>, DeviceError> {
        self.check_len("matmul", a.len(), m * k)?;
        self.check_len("matmul", b.len(), k * n)?;

        if n == 0 {
            return Ok(vec![]);
        }

        let row = |(i, out): (usize, &mut [f64])| {
            for (j, o) in out.iter_mut().enumerate() {
                let mut sum = 0.;
                for l in 0..k {
                    sum = fma(a[i * k + l], b[l * n + j], sum);
                }
                *o = sum;
            }
        };

        let mut c = vec![0.; m * n];
        if m * n * k < self.min_parallel_len {
            c.chunks_mut(n).enumerate().for_each(row);
        } else {
            c.par_chunks_mut(n).enumerate().for_each(row);
        }

        Ok(c)
    }

    fn dot(&self, a: &[f64], b: &[f64]) -> Result<f64, DeviceError> {
        self.check_len("dot", a.len(), b.len())?;

        if a.len() < self.min_parallel_len {
            Ok(a.iter().zip(b).fold(0., |acc, (x, y)| fma(*x, *y, acc)))
        } else {
            Ok(a.par_iter().zip(b).map(|(x, y)| scale(*x, *y)).sum())
        }
    }
}
