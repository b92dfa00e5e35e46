//! OpenGL driver.

use gl::types::*;
use log::{debug, warn};
use std::error;
use std::fmt;
use std::os::raw::c_void;
use umbra::depth::Comparison;
use umbra::driver::{Capability, Driver, Limit};
use umbra::object::ObjectId;
use umbra::target::{BufferTarget, FramebufferRole, IndexedBufferTarget, TextureKind};
use umbra::viewport::Viewport;

use crate::convert::{
  bool_to_glboolean, buffer_target_to_glenum, capability_to_glenum, comparison_to_glenum,
  framebuffer_role_to_glenum, indexed_target_to_glenum, limit_to_glenum, texture_kind_to_glenum,
  viewport_to_glint,
};

/// An OpenGL driver.
///
/// The OpenGL function pointers are process-wide; this type only witnesses that they have been
/// loaded. Every method issues the matching `gl*` call on the OpenGL context current on the calling
/// thread.
#[derive(Debug)]
pub struct GlDriver {
  _priv: (),
}

impl GlDriver {
  /// Load the OpenGL function pointers and create a driver.
  ///
  /// `loader` resolves a function name to its address; windowing crates expose one (for
  /// instance, `window.get_proc_address(name)`).
  ///
  /// # Safety
  ///
  /// The OpenGL context the loader belongs to must be current on the calling thread.
  pub unsafe fn load_with<F>(loader: F) -> Result<Self, LoadError>
  where
    F: FnMut(&'static str) -> *const c_void,
  {
    gl::load_with(loader);
    Self::new()
  }

  /// Create a driver from already loaded function pointers.
  ///
  /// # Safety
  ///
  /// The function pointers must have been loaded for the OpenGL context current on the calling
  /// thread.
  pub unsafe fn new() -> Result<Self, LoadError> {
    let required: [(&'static str, bool); 16] = [
      ("glActiveTexture", gl::ActiveTexture::is_loaded()),
      ("glBindBuffer", gl::BindBuffer::is_loaded()),
      ("glBindBufferBase", gl::BindBufferBase::is_loaded()),
      ("glBindFramebuffer", gl::BindFramebuffer::is_loaded()),
      ("glBindRenderbuffer", gl::BindRenderbuffer::is_loaded()),
      ("glBindTexture", gl::BindTexture::is_loaded()),
      ("glBindVertexArray", gl::BindVertexArray::is_loaded()),
      ("glDepthFunc", gl::DepthFunc::is_loaded()),
      ("glDepthMask", gl::DepthMask::is_loaded()),
      ("glDepthRange", gl::DepthRange::is_loaded()),
      ("glDisable", gl::Disable::is_loaded()),
      ("glEnable", gl::Enable::is_loaded()),
      ("glGetError", gl::GetError::is_loaded()),
      ("glGetIntegerv", gl::GetIntegerv::is_loaded()),
      ("glUseProgram", gl::UseProgram::is_loaded()),
      ("glViewport", gl::Viewport::is_loaded()),
    ];

    for &(name, loaded) in required.iter() {
      if !loaded {
        return Err(LoadError::MissingFunction(name));
      }
    }

    debug!("OpenGL function pointers loaded");
    Ok(GlDriver { _priv: () })
  }
}

unsafe impl Driver for GlDriver {
  unsafe fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ObjectId>) {
    gl::BindBuffer(buffer_target_to_glenum(target), ObjectId::raw(buffer));
  }

  unsafe fn bind_buffer_base(
    &mut self,
    target: IndexedBufferTarget,
    index: u32,
    buffer: Option<ObjectId>,
  ) {
    gl::BindBufferBase(
      indexed_target_to_glenum(target),
      index,
      ObjectId::raw(buffer),
    );
  }

  unsafe fn active_texture(&mut self, unit: u32) {
    gl::ActiveTexture(gl::TEXTURE0 + unit);
  }

  unsafe fn bind_texture(&mut self, kind: TextureKind, texture: Option<ObjectId>) {
    gl::BindTexture(texture_kind_to_glenum(kind), ObjectId::raw(texture));
  }

  unsafe fn bind_framebuffer(&mut self, role: FramebufferRole, framebuffer: Option<ObjectId>) {
    gl::BindFramebuffer(
      framebuffer_role_to_glenum(role),
      ObjectId::raw(framebuffer),
    );
  }

  unsafe fn bind_renderbuffer(&mut self, renderbuffer: Option<ObjectId>) {
    gl::BindRenderbuffer(gl::RENDERBUFFER, ObjectId::raw(renderbuffer));
  }

  unsafe fn bind_vertex_array(&mut self, vertex_array: Option<ObjectId>) {
    gl::BindVertexArray(ObjectId::raw(vertex_array));
  }

  unsafe fn use_program(&mut self, program: Option<ObjectId>) {
    gl::UseProgram(ObjectId::raw(program));
  }

  unsafe fn viewport(&mut self, viewport: Viewport) {
    let [x, y, width, height] = viewport_to_glint(viewport);
    gl::Viewport(x, y, width, height);
  }

  unsafe fn set_capability(&mut self, capability: Capability, enabled: bool) {
    let cap = capability_to_glenum(capability);

    if enabled {
      gl::Enable(cap);
    } else {
      gl::Disable(cap);
    }
  }

  unsafe fn depth_mask(&mut self, write: bool) {
    gl::DepthMask(bool_to_glboolean(write));
  }

  unsafe fn depth_func(&mut self, comparison: Comparison) {
    gl::DepthFunc(comparison_to_glenum(comparison));
  }

  unsafe fn depth_range(&mut self, near: f64, far: f64) {
    gl::DepthRange(near, far);
  }

  unsafe fn limit(&mut self, limit: Limit) -> Option<u32> {
    get_integer(limit_to_glenum(limit))
  }

  unsafe fn version(&mut self) -> Option<(u32, u32)> {
    let major = get_integer(gl::MAJOR_VERSION)?;
    let minor = get_integer(gl::MINOR_VERSION).unwrap_or(0);

    Some((major, minor))
  }
}

// a positive integer, or nothing if the query is not supported by the context
unsafe fn get_integer(pname: GLenum) -> Option<u32> {
  // drop errors left over by previous calls
  let mut stale = 0;
  while gl::GetError() != gl::NO_ERROR {
    stale += 1;

    if stale == 32 {
      warn!("cannot clear the OpenGL error flags");
      return None;
    }
  }

  let mut value: GLint = 0;
  gl::GetIntegerv(pname, &mut value);

  if gl::GetError() != gl::NO_ERROR || value <= 0 {
    None
  } else {
    Some(value as u32)
  }
}

/// Errors that might happen when creating a [`GlDriver`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadError {
  /// An OpenGL function could not be resolved by the loader.
  MissingFunction(&'static str),
}

impl fmt::Display for LoadError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      LoadError::MissingFunction(name) => write!(f, "missing OpenGL function: {}", name),
    }
  }
}

impl error::Error for LoadError {}
