//! Selection of the backend that performs the arithmetic of vectors and matrices.
//!
//! Every arithmetic operation asks a [ComputeContext] for a [LinearAlgebraProvider]
//! for the field of its operands. The [ComputeMode] of the context decides which provider is used:
//! - [ComputeMode::Cpu] always uses the reference [CpuProvider].
//! - [ComputeMode::Gpu] requires an [AcceleratedProvider] and fails with
//!   [UnsupportedAcceleration](LinalgError::UnsupportedAcceleration) if none can be constructed.
//! - [ComputeMode::Auto] uses an [AcceleratedProvider] if one can be constructed and
//!   falls back to the [CpuProvider] otherwise.
//!
//! An accelerated provider needs a field that implements
//! [HardwareAccelerable](crate::domains::HardwareAccelerable) and a usable [Device]
//! registered in the context. No devices are registered by default.
//!
//! The mode is read once per operation, so changing it affects all later operations.
//! A process-wide context is available through [ComputeContext::global], and can be
//! seeded with the environment variable `FIELDLINALG_COMPUTE_MODE`.
mod accelerated;
mod cpu;
pub mod device;
mod elimination;

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, RwLock,
    },
};

use ahash::HashMap;
use once_cell::sync::{Lazy, OnceCell};
use smartstring::alias::String as SmartString;
use tracing::{debug, trace, warn};

pub use accelerated::AcceleratedProvider;
pub use cpu::{CpuProvider, PARALLEL_THRESHOLD};
pub use device::{Device, DeviceError, HostParallelDevice};

use crate::{
    domains::Field,
    error::{LinalgError, Result},
    tensors::{Matrix, Vector},
};

/// The environment variable that seeds the mode of [ComputeContext::global].
pub const COMPUTE_MODE_ENV: &str = "FIELDLINALG_COMPUTE_MODE";

/// The policy that governs which provider performs an operation.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ComputeMode {
    /// Always compute on the CPU.
    Cpu = 0,
    /// Always compute on an accelerator, and fail if that is not possible.
    Gpu = 1,
    /// Compute on an accelerator if possible, and on the CPU otherwise.
    #[default]
    Auto = 2,
}

impl ComputeMode {
    fn from_u8(v: u8) -> ComputeMode {
        match v {
            0 => ComputeMode::Cpu,
            1 => ComputeMode::Gpu,
            _ => ComputeMode::Auto,
        }
    }
}

impl Display for ComputeMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComputeMode::Cpu => "cpu",
            ComputeMode::Gpu => "gpu",
            ComputeMode::Auto => "auto",
        })
    }
}

impl FromStr for ComputeMode {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(ComputeMode::Cpu),
            "gpu" => Ok(ComputeMode::Gpu),
            "auto" => Ok(ComputeMode::Auto),
            _ => Err(LinalgError::InvalidConfiguration(format!(
                "unknown compute mode '{}', expected one of cpu, gpu, auto",
                s
            ))),
        }
    }
}

/// The arithmetic of vectors and matrices over a field `F`, implemented by a backend.
///
/// All operations validate the shapes of their operands and return new objects.
pub trait LinearAlgebraProvider<F: Field> {
    /// A human-readable name of the backend.
    fn name(&self) -> &str;
    fn field(&self) -> &F;

    fn add_vectors(&self, a: &Vector<F>, b: &Vector<F>) -> Result<Vector<F>>;
    fn scale_vector(&self, a: &Vector<F>, e: &F::Element) -> Result<Vector<F>>;
    fn dot(&self, a: &Vector<F>, b: &Vector<F>) -> Result<F::Element>;

    /// Compute `sqrt(a · a)`.
    fn norm(&self, a: &Vector<F>) -> Result<F::Element> {
        let d = self.dot(a, a)?;
        self.field()
            .sqrt(&d)
            .ok_or_else(|| LinalgError::MissingCapability {
                op: "norm",
                field: self.field().to_string(),
            })
    }

    fn add(&self, a: &Matrix<F>, b: &Matrix<F>) -> Result<Matrix<F>>;
    fn scale(&self, a: &Matrix<F>, e: &F::Element) -> Result<Matrix<F>>;
    fn multiply(&self, a: &Matrix<F>, b: &Matrix<F>) -> Result<Matrix<F>>;
    fn multiply_vector(&self, a: &Matrix<F>, v: &Vector<F>) -> Result<Vector<F>>;
    fn trace(&self, a: &Matrix<F>) -> Result<F::Element>;
    fn determinant(&self, a: &Matrix<F>) -> Result<F::Element>;
    fn inverse(&self, a: &Matrix<F>) -> Result<Matrix<F>>;
    fn solve(&self, a: &Matrix<F>, b: &Vector<F>) -> Result<Vector<F>>;
}

struct DeviceEntry {
    device: Arc<dyn Device>,
    /// The outcome of the self-test, run on first use.
    usable: OnceCell<bool>,
}

impl DeviceEntry {
    fn is_usable(&self) -> bool {
        *self.usable.get_or_init(|| {
            if !self.device.is_available() {
                debug!("Device {} is not available", self.device.name());
                return false;
            }

            match self.device.self_test() {
                Ok(()) => true,
                Err(e) => {
                    debug!("Device {} failed its self-test: {}", self.device.name(), e);
                    false
                }
            }
        })
    }
}

/// The compute policy and the accelerator devices that operations can use.
///
/// The mode is stored atomically, so that it can be read by many threads while
/// being changed by another.
pub struct ComputeContext {
    mode: AtomicU8,
    devices: RwLock<HashMap<SmartString, DeviceEntry>>,
}

static GLOBAL_CONTEXT: Lazy<ComputeContext> = Lazy::new(ComputeContext::from_env);

impl Default for ComputeContext {
    fn default() -> Self {
        ComputeContext::new(ComputeMode::default())
    }
}

impl ComputeContext {
    /// Create a context with the given mode and no devices.
    pub fn new(mode: ComputeMode) -> ComputeContext {
        ComputeContext {
            mode: AtomicU8::new(mode as u8),
            devices: RwLock::new(HashMap::default()),
        }
    }

    /// Create a context with the mode set by the environment variable
    /// [COMPUTE_MODE_ENV], defaulting to [ComputeMode::Auto].
    /// An unparsable value is ignored.
    pub fn from_env() -> ComputeContext {
        let mode = match std::env::var(COMPUTE_MODE_ENV) {
            Ok(v) => match v.parse() {
                Ok(mode) => mode,
                Err(e) => {
                    warn!("Ignoring {}: {}", COMPUTE_MODE_ENV, e);
                    ComputeMode::default()
                }
            },
            Err(_) => ComputeMode::default(),
        };

        ComputeContext::new(mode)
    }

    /// Get the process-wide context, which is created on first use.
    pub fn global() -> &'static ComputeContext {
        &GLOBAL_CONTEXT
    }

    pub fn mode(&self) -> ComputeMode {
        ComputeMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Set the mode. Operations that have already selected their provider are unaffected.
    pub fn set_mode(&self, mode: ComputeMode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    /// Register `device`, replacing any device with the same name.
    pub fn with_device(self, device: Arc<dyn Device>) -> ComputeContext {
        self.register_device(device);
        self
    }

    /// Register `device`, replacing any device with the same name.
    pub fn register_device(&self, device: Arc<dyn Device>) {
        debug!(
            "Registering device {} with priority {}",
            device.name(),
            device.priority()
        );

        let mut devices = self.devices.write().unwrap_or_else(|e| e.into_inner());
        devices.insert(
            device.name().into(),
            DeviceEntry {
                device,
                usable: OnceCell::new(),
            },
        );
    }

    /// Remove the device called `name`, returning it if it was registered.
    pub fn unregister_device(&self, name: &str) -> Option<Arc<dyn Device>> {
        let mut devices = self.devices.write().unwrap_or_else(|e| e.into_inner());
        devices.remove(name).map(|e| e.device)
    }

    /// Get the names of all registered devices, in alphabetical order.
    pub fn device_names(&self) -> Vec<String> {
        let devices = self.devices.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<_> = devices.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }

    /// Select the usable device with the highest priority. Ties are broken by name.
    fn select_device(&self) -> Option<Arc<dyn Device>> {
        let devices = self.devices.read().unwrap_or_else(|e| e.into_inner());
        devices
            .iter()
            .filter(|(_, e)| e.is_usable())
            .max_by(|(n1, e1), (n2, e2)| {
                e1.device
                    .priority()
                    .cmp(&e2.device.priority())
                    .then_with(|| n2.cmp(n1))
            })
            .map(|(_, e)| e.device.clone())
    }

    /// Construct an accelerated provider for `field`.
    ///
    /// Fails with [UnsupportedAcceleration](LinalgError::UnsupportedAcceleration) if the
    /// field is not [HardwareAccelerable](crate::domains::HardwareAccelerable) or if
    /// no registered device is usable.
    pub fn try_accelerate<'a, F: Field>(&self, field: &'a F) -> Result<AcceleratedProvider<'a, F>> {
        let Some(capability) = field.as_accelerable() else {
            return Err(LinalgError::UnsupportedAcceleration {
                reason: format!("the field {} is not hardware accelerable", field),
            });
        };

        let Some(device) = self.select_device() else {
            return Err(LinalgError::UnsupportedAcceleration {
                reason: "no usable device is registered".to_owned(),
            });
        };

        Ok(AcceleratedProvider::new(field, capability, device))
    }

    /// Select the provider for an operation over `field`, according to the current mode.
    pub fn provider<'a, F: Field>(
        &self,
        field: &'a F,
    ) -> Result<Box<dyn LinearAlgebraProvider<F> + 'a>> {
        let provider: Box<dyn LinearAlgebraProvider<F> + 'a> = match self.mode() {
            ComputeMode::Cpu => Box::new(CpuProvider::new(field)),
            ComputeMode::Gpu => Box::new(self.try_accelerate(field)?),
            ComputeMode::Auto => match self.try_accelerate(field) {
                Ok(p) => Box::new(p),
                Err(e) => {
                    debug!("Falling back to the CPU: {}", e);
                    Box::new(CpuProvider::new(field))
                }
            },
        };

        trace!("Selected provider {} for {}", provider.name(), field);
        Ok(provider)
    }
}
