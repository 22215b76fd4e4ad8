// Config: process-wide typing preferences
//
// Two settings influence how host values are typed:
//
//   float_x       - the preferred float dtype. It is NOT used to widen or
//                   narrow a shared variable's declared type; a variable
//                   keeps the width of the value it was built from. Its one
//                   effect is that a plain host float may always be stored
//                   into a float_x-typed variable.
//   int_bitwidth  - width of the default integer dtype that plain host
//                   integers infer to (32 or 64; defaults to pointer width).
//
// The process default is read once from the TETHER_FLAGS environment
// variable ("floatX=float32,int_bitwidth=32"). A thread can override it
// for the duration of a closure with with_config(), which is how tests
// exercise both integer widths on one machine.

use std::cell::RefCell;
use std::sync::OnceLock;

use crate::dtype::DType;
use crate::error::{Error, Result};

/// Name of the environment variable holding configuration flags.
pub const FLAGS_ENV: &str = "TETHER_FLAGS";

/// Typing preferences consulted by inference and coercion.
///
/// Fields are only reachable through validating setters, so a `Config`
/// always holds a float `float_x` and an `int_bitwidth` of 32 or 64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    float_x: DType,
    int_bitwidth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            float_x: DType::F64,
            int_bitwidth: if usize::BITS == 32 { 32 } else { 64 },
        }
    }
}

impl Config {
    /// Preferred float dtype (`F32` or `F64`).
    pub fn float_x(&self) -> DType {
        self.float_x
    }

    /// Width in bits of the default integer dtype (32 or 64).
    pub fn int_bitwidth(&self) -> u32 {
        self.int_bitwidth
    }

    /// Set the preferred float dtype; non-float dtypes are rejected.
    pub fn with_float_x(mut self, dtype: DType) -> Result<Self> {
        if !dtype.is_float() {
            return Err(invalid(
                format!("floatX={}", dtype),
                "floatX must be a float dtype",
            ));
        }
        self.float_x = dtype;
        Ok(self)
    }

    /// Set the default integer width; only 32 and 64 are accepted.
    pub fn with_int_bitwidth(mut self, bits: u32) -> Result<Self> {
        if bits != 32 && bits != 64 {
            return Err(invalid(
                format!("int_bitwidth={}", bits),
                "int_bitwidth must be 32 or 64",
            ));
        }
        self.int_bitwidth = bits;
        Ok(self)
    }

    /// Dtype of plain host integers.
    pub fn default_int(&self) -> DType {
        if self.int_bitwidth == 32 {
            DType::I32
        } else {
            DType::I64
        }
    }

    /// Dtype of plain host floats. Always `F64`, whatever `float_x` says.
    pub fn default_float(&self) -> DType {
        DType::F64
    }

    /// Parse comma-separated `key=value` flags on top of the defaults.
    ///
    /// Recognized keys: `floatX` (`float32`/`float64`) and `int_bitwidth`
    /// (`32`/`64`). Empty entries are ignored.
    pub fn from_flags(flags: &str) -> Result<Self> {
        let mut config = Config::default();
        for entry in flags.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| invalid(entry, "expected key=value"))?;
            let value = value.trim();
            config = match key.trim() {
                "floatX" | "float_x" => {
                    let dtype: DType = value.parse().map_err(|_| invalid(entry, "unknown dtype"))?;
                    config.with_float_x(dtype)?
                }
                "int_bitwidth" => {
                    let bits: u32 = value
                        .parse()
                        .map_err(|_| invalid(entry, "int_bitwidth must be 32 or 64"))?;
                    config.with_int_bitwidth(bits)?
                }
                _ => return Err(invalid(entry, "unknown key")),
            };
        }
        Ok(config)
    }

    /// Read flags from `TETHER_FLAGS`; defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(FLAGS_ENV) {
            Ok(flags) => Self::from_flags(&flags),
            Err(_) => Ok(Config::default()),
        }
    }
}

fn invalid(flag: impl Into<String>, reason: &str) -> Error {
    Error::InvalidConfig {
        flag: flag.into(),
        reason: reason.to_string(),
    }
}

thread_local! {
    static OVERRIDE: RefCell<Option<Config>> = const { RefCell::new(None) };
}

fn process_default() -> &'static Config {
    static DEFAULT: OnceLock<Config> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        Config::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring {}", FLAGS_ENV);
            Config::default()
        })
    })
}

/// The configuration in effect on this thread.
pub fn current() -> Config {
    OVERRIDE
        .with(|o| o.borrow().clone())
        .unwrap_or_else(|| process_default().clone())
}

/// Puts the previous override back when dropped, also during unwinding.
struct Restore(Option<Config>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        OVERRIDE.with(|o| *o.borrow_mut() = previous);
    }
}

/// Run `f` with `config` in effect on this thread, then restore the
/// previous configuration, even if `f` panics.
pub fn with_config<F, T>(config: Config, f: F) -> T
where
    F: FnOnce() -> T,
{
    let _restore = Restore(OVERRIDE.with(|o| o.borrow_mut().replace(config)));
    f()
}
