//! # A shadow-state cache and thread-affine dispatcher for OpenGL-style drivers
//!
//! Graphics drivers in the OpenGL family are big state machines: objects get bound to targets,
//! texture units get activated, depth testing gets switched on and off. Every such change is a
//! driver call, and driver calls are not cheap. Worse, most of them are redundant: binding the
//! buffer that is already bound is a very common thing to do.
//!
//! umbra keeps a client-side mirror of that state, the _shadow state_, and only lets a call reach
//! the driver if it actually changes something. On top of that:
//!
//! - Framebuffers can be _locked_ with their own viewport and depth state: while such a framebuffer
//!   is bound for drawing, global viewport and depth requests are discarded.
//! - A driver context can only be driven from a single thread. Every [`Context`] has an owning
//!   thread; actions pushed from anywhere else are queued and run when the owner flushes them.
//!
//! # Drivers
//!
//! umbra does not talk to any graphics API on its own. It goes through the [`Driver`] trait, which
//! maps one method to one driver call. The `umbra-gl` crate provides an OpenGL implementation;
//! any other backend (or a test double) can be plugged in.
//!
//! # Getting started
//!
//! Create a [`Context`] on the thread where your driver context is current, right after loading
//! the driver:
//!
//! ```ignore
//! let mut ctx = unsafe { Context::new(driver, ContextOpt::default()) };
//!
//! ctx.bind(BufferTarget::Array.into(), &vbo)?;
//! ctx.set_viewport(Viewport::whole(800, 600));
//! ```
//!
//! Hand [`Remote`]s to other threads, and call [`Context::flush`] once per frame on the owning
//! thread.
//!
//! [`Context`]: crate::context::Context
//! [`Context::flush`]: crate::context::Context::flush
//! [`Driver`]: crate::driver::Driver
//! [`Remote`]: crate::dispatch::Remote

//#![deny(missing_docs)]

pub mod cache;
pub mod context;
pub mod depth;
pub mod dispatch;
pub mod driver;
pub mod lock;
pub mod object;
pub mod opt;
pub mod state;
pub mod target;
pub mod viewport;
