//! OpenGL driver for umbra.
//!
//! This crate exports an [OpenGL](https://www.khronos.org/opengl/) implementation of the
//! [`umbra::driver::Driver`] trait. Load it from your windowing crate’s proc-address resolver, then
//! hand it to a context:
//!
//! ```ignore
//! use umbra::context::Context;
//! use umbra::opt::ContextOpt;
//! use umbra_gl::GlDriver;
//!
//! let driver = unsafe { GlDriver::load_with(|s| window.get_proc_address(s) as *const _)? };
//! let mut ctx = unsafe { Context::new(driver, ContextOpt::default()) };
//! ```
//!
//! The indexed buffer targets and some texture kinds need OpenGL 4.3 or later. On older contexts,
//! their limits are reported as absent and a single slot is tracked.

mod convert;
pub mod driver;

pub use driver::{GlDriver, LoadError};
