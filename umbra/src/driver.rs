//! Driver boundary.
//!
//! A [`Driver`] is the native call surface of a graphics API: every method maps to exactly one
//! driver call. Drivers are dumb: they do not cache anything nor check anything; that is the job of
//! [`GraphicsState`](crate::state::GraphicsState), which sits in front of them.

use crate::depth::Comparison;
use crate::object::ObjectId;
use crate::opt::ContextOpt;
use crate::target::{BufferTarget, FramebufferRole, IndexedBufferTarget, TextureKind};
use crate::viewport::Viewport;
use log::warn;

/// Capabilities switched on and off by the depth state.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
  /// Depth testing.
  DepthTest,
  /// Depth clamping.
  DepthClamp,
}

/// Implementation limits queried once, when a context is created.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Limit {
  /// Number of texture units usable at once.
  TextureUnits,
  /// Number of indexed slots for a given indexed buffer target.
  IndexedBuffers(IndexedBufferTarget),
}

/// Limits a context is sized from.
///
/// Absent limits are replaced by `1`, which leaves a single, degenerate slot.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Limits {
  /// Driver version, if reported.
  pub version: Option<(u32, u32)>,
  /// Number of texture units.
  pub texture_units: u32,
  /// Number of transform feedback slots.
  pub transform_feedback_buffers: u32,
  /// Number of uniform buffer slots.
  pub uniform_buffers: u32,
  /// Number of atomic counter buffer slots.
  pub atomic_counter_buffers: u32,
  /// Number of shader storage buffer slots.
  pub shader_storage_buffers: u32,
}

impl Limits {
  /// Query every limit from a driver.
  ///
  /// # Safety
  ///
  /// The driver context must be current on the calling thread.
  pub unsafe fn query<D>(driver: &mut D, opt: &ContextOpt) -> Self
  where
    D: Driver + ?Sized,
  {
    let version = driver.version();
    let mut texture_units = query_limit(driver, Limit::TextureUnits);

    if let Some(cap) = opt.texture_units_cap() {
      texture_units = texture_units.min(cap.max(1));
    }

    Limits {
      version,
      texture_units,
      transform_feedback_buffers: query_limit(
        driver,
        Limit::IndexedBuffers(IndexedBufferTarget::TransformFeedback),
      ),
      uniform_buffers: query_limit(driver, Limit::IndexedBuffers(IndexedBufferTarget::Uniform)),
      atomic_counter_buffers: query_limit(
        driver,
        Limit::IndexedBuffers(IndexedBufferTarget::AtomicCounter),
      ),
      shader_storage_buffers: query_limit(
        driver,
        Limit::IndexedBuffers(IndexedBufferTarget::ShaderStorage),
      ),
    }
  }

  /// Number of slots for an indexed buffer target.
  pub fn indexed_buffers(&self, target: IndexedBufferTarget) -> u32 {
    match target {
      IndexedBufferTarget::TransformFeedback => self.transform_feedback_buffers,
      IndexedBufferTarget::Uniform => self.uniform_buffers,
      IndexedBufferTarget::AtomicCounter => self.atomic_counter_buffers,
      IndexedBufferTarget::ShaderStorage => self.shader_storage_buffers,
    }
  }
}

unsafe fn query_limit<D>(driver: &mut D, limit: Limit) -> u32
where
  D: Driver + ?Sized,
{
  match driver.limit(limit) {
    Some(n) if n > 0 => n,
    _ => {
      warn!("driver does not report {:?}; tracking a single slot", limit);
      1
    }
  }
}

/// Native driver call surface.
///
/// # Safety
///
/// Implementors guarantee that every method issues the matching call on the driver context the
/// implementor was created for. Callers guarantee that this context is current on the calling
/// thread; [`Context`](crate::context::Context) upholds it by only calling the driver from its
/// owning thread.
pub unsafe trait Driver {
  /// Bind a buffer to a general binding point.
  unsafe fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ObjectId>);

  /// Bind a buffer to an indexed slot (and to the general binding point of the same name).
  unsafe fn bind_buffer_base(
    &mut self,
    target: IndexedBufferTarget,
    index: u32,
    buffer: Option<ObjectId>,
  );

  /// Make a texture unit active.
  unsafe fn active_texture(&mut self, unit: u32);

  /// Bind a texture to the active unit.
  unsafe fn bind_texture(&mut self, kind: TextureKind, texture: Option<ObjectId>);

  /// Bind a framebuffer.
  unsafe fn bind_framebuffer(&mut self, role: FramebufferRole, framebuffer: Option<ObjectId>);

  /// Bind a renderbuffer.
  unsafe fn bind_renderbuffer(&mut self, renderbuffer: Option<ObjectId>);

  /// Bind a vertex array.
  unsafe fn bind_vertex_array(&mut self, vertex_array: Option<ObjectId>);

  /// Use a shader program.
  unsafe fn use_program(&mut self, program: Option<ObjectId>);

  /// Set the viewport.
  unsafe fn viewport(&mut self, viewport: Viewport);

  /// Enable or disable a capability.
  unsafe fn set_capability(&mut self, capability: Capability, enabled: bool);

  /// Enable or disable depth writes.
  unsafe fn depth_mask(&mut self, write: bool);

  /// Set the depth comparison.
  unsafe fn depth_func(&mut self, comparison: Comparison);

  /// Set the depth range.
  unsafe fn depth_range(&mut self, near: f64, far: f64);

  /// Query an implementation limit.
  ///
  /// `None` means the driver does not report it (unsupported feature, for instance).
  unsafe fn limit(&mut self, limit: Limit) -> Option<u32>;

  /// Query the driver version, as `(major, minor)`.
  unsafe fn version(&mut self) -> Option<(u32, u32)> {
    None
  }
}


#[cfg(test)]
mod tests {
  use super::recording::RecordingDriver;
  use super::*;

  #[test]
  fn absent_limits_fall_back_to_one() {
    let mut driver = RecordingDriver::new();
    driver.indexed = None;
    driver.texture_units = Some(0);

    let limits = unsafe { Limits::query(&mut driver, &ContextOpt::default()) };

    assert_eq!(limits.texture_units, 1);
    for target in IndexedBufferTarget::ALL.iter() {
      assert_eq!(limits.indexed_buffers(*target), 1);
    }
    assert!(driver.calls.is_empty());
  }

  #[test]
  fn texture_units_cap() {
    let mut driver = RecordingDriver::new();
    let opt = ContextOpt::default().set_texture_units_cap(4);

    let limits = unsafe { Limits::query(&mut driver, &opt) };

    assert_eq!(limits.texture_units, 4);
    assert_eq!(limits.uniform_buffers, 8);
    assert_eq!(limits.version, Some((4, 6)));
  }
}
