//! Shadow state.
//!
//! The shadow state is the client-side mirror of the driver state: the last value applied for every
//! binding target, texture unit, indexed buffer slot, framebuffer slot, depth state and viewport.
//! It is pure data. Everybody can read it, but only the crate can write to it, and the crate only
//! does so from [`GraphicsState`](crate::state::GraphicsState), right after issuing the matching
//! driver call.

use crate::depth::DepthState;
use crate::driver::Limits;
use crate::lock::FramebufferSlot;
use crate::object::ObjectId;
use crate::opt::InitialState;
use crate::target::{BindingTarget, BufferTarget, FramebufferRole, IndexedBufferTarget, TextureKind};
use crate::viewport::Viewport;

/// Cached value.
///
/// A cached value is used to prevent issuing costy driver calls if we know the target value is
/// already set to what the call tries to set. For instance, if you ask to bind the texture `34`
/// once, that value will be set on the driver and cached on our side. Later, if no other texture
/// binding has occurred, if you ask to bind the texture `34` again, because the value is cached,
/// we know the driver already has it bound, so we don’t have to perform anything driver-wise.
///
/// A cached value can also be unknown, in which case it is invalid for every requested value.
#[derive(Clone, Copy, Debug)]
pub struct Cached<T>(Option<T>);

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  pub(crate) fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Unknown value.
  pub(crate) fn unknown() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a driver call to run.
  pub(crate) fn invalidate(&mut self) {
    self.0 = None;
  }

  pub(crate) fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// Check if the cached value is invalid regarding a value.
  ///
  /// A non-cached value (i.e. empty) is always invalid whatever compared value. If a value is
  /// already cached, then it’s invalid if it’s not equal ([`PartialEq`]) to the input value.
  pub(crate) fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }

  /// Cached value, if known.
  pub fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }
}

fn initial<T>(value: T, initial_state: InitialState) -> Cached<T>
where
  T: PartialEq,
{
  match initial_state {
    InitialState::Defaults => Cached::new(value),
    InitialState::Unknown => Cached::unknown(),
  }
}

type Binding = Cached<Option<ObjectId>>;

/// Bindings of a single texture unit, one per texture kind.
#[derive(Clone, Debug)]
pub struct TextureUnit {
  bindings: [Binding; TextureKind::COUNT],
}

impl TextureUnit {
  fn new(initial_state: InitialState) -> Self {
    TextureUnit {
      bindings: [initial(None, initial_state); TextureKind::COUNT],
    }
  }

  /// Texture bound for a given kind.
  pub fn bound(&self, kind: TextureKind) -> Option<ObjectId> {
    flatten(&self.bindings[kind.index()])
  }

  pub(crate) fn binding_mut(&mut self, kind: TextureKind) -> &mut Binding {
    &mut self.bindings[kind.index()]
  }
}

/// The four arrays of indexed buffer slots.
#[derive(Clone, Debug)]
pub struct IndexedBufferSlots {
  transform_feedback: Vec<Binding>,
  uniform: Vec<Binding>,
  atomic_counter: Vec<Binding>,
  shader_storage: Vec<Binding>,
}

impl IndexedBufferSlots {
  fn new(limits: &Limits, initial_state: InitialState) -> Self {
    let slots = |target| vec![initial(None, initial_state); limits.indexed_buffers(target) as usize];

    IndexedBufferSlots {
      transform_feedback: slots(IndexedBufferTarget::TransformFeedback),
      uniform: slots(IndexedBufferTarget::Uniform),
      atomic_counter: slots(IndexedBufferTarget::AtomicCounter),
      shader_storage: slots(IndexedBufferTarget::ShaderStorage),
    }
  }

  fn slots(&self, target: IndexedBufferTarget) -> &[Binding] {
    match target {
      IndexedBufferTarget::TransformFeedback => &self.transform_feedback,
      IndexedBufferTarget::Uniform => &self.uniform,
      IndexedBufferTarget::AtomicCounter => &self.atomic_counter,
      IndexedBufferTarget::ShaderStorage => &self.shader_storage,
    }
  }

  fn slots_mut(&mut self, target: IndexedBufferTarget) -> &mut Vec<Binding> {
    match target {
      IndexedBufferTarget::TransformFeedback => &mut self.transform_feedback,
      IndexedBufferTarget::Uniform => &mut self.uniform,
      IndexedBufferTarget::AtomicCounter => &mut self.atomic_counter,
      IndexedBufferTarget::ShaderStorage => &mut self.shader_storage,
    }
  }

  /// Number of slots for a target.
  pub fn len(&self, target: IndexedBufferTarget) -> usize {
    self.slots(target).len()
  }

  /// Buffer bound on a slot; `None` for an empty, unknown or out-of-range slot.
  pub fn bound(&self, target: IndexedBufferTarget, index: u32) -> Option<ObjectId> {
    self.slots(target).get(index as usize).and_then(flatten)
  }

  pub(crate) fn binding_mut(&mut self, target: IndexedBufferTarget, index: u32) -> Option<&mut Binding> {
    self.slots_mut(target).get_mut(index as usize)
  }

  fn all_mut(&mut self) -> impl Iterator<Item = &mut Binding> {
    self
      .transform_feedback
      .iter_mut()
      .chain(self.uniform.iter_mut())
      .chain(self.atomic_counter.iter_mut())
      .chain(self.shader_storage.iter_mut())
  }
}

/// Client-side mirror of the driver state.
#[derive(Clone, Debug)]
pub struct ShadowState {
  buffers: [Binding; BufferTarget::COUNT],
  indexed_buffers: IndexedBufferSlots,
  active_texture_unit: Cached<u32>,
  texture_units: Vec<TextureUnit>,
  read_framebuffer: FramebufferSlot,
  draw_framebuffer: FramebufferSlot,
  renderbuffer: Binding,
  vertex_array: Binding,
  program: Binding,
  viewport: Cached<Viewport>,
  depth: Cached<DepthState>,
}

impl ShadowState {
  /// Create a shadow state sized from driver limits.
  pub(crate) fn new(limits: &Limits, initial_state: InitialState) -> Self {
    let none = initial(None, initial_state);

    ShadowState {
      buffers: [none; BufferTarget::COUNT],
      indexed_buffers: IndexedBufferSlots::new(limits, initial_state),
      active_texture_unit: initial(0, initial_state),
      texture_units: vec![TextureUnit::new(initial_state); limits.texture_units as usize],
      read_framebuffer: FramebufferSlot::new(none),
      draw_framebuffer: FramebufferSlot::new(none),
      renderbuffer: none,
      vertex_array: none,
      program: none,
      // the initial viewport depends on the surface the driver context was created for
      viewport: Cached::unknown(),
      depth: initial(DepthState::default(), initial_state),
    }
  }

  /// Object bound to a target.
  ///
  /// `None` means that nothing is bound, that the binding is unknown (invalidated) or that the
  /// target lies out of the context limits.
  pub fn bound(&self, target: BindingTarget) -> Option<ObjectId> {
    match target {
      BindingTarget::Buffer(target) => flatten(&self.buffers[target.index()]),
      BindingTarget::IndexedBuffer { target, index } => self.indexed_buffers.bound(target, index),
      BindingTarget::Texture { unit, kind } => self.texture_unit(unit).and_then(|u| u.bound(kind)),
      BindingTarget::Framebuffer(role) => self.framebuffer_slot(role).framebuffer(),
      BindingTarget::Renderbuffer => flatten(&self.renderbuffer),
      BindingTarget::VertexArray => flatten(&self.vertex_array),
      BindingTarget::Program => flatten(&self.program),
    }
  }

  /// Active texture unit, if known.
  pub fn active_texture_unit(&self) -> Option<u32> {
    self.active_texture_unit.get().copied()
  }

  /// Number of tracked texture units.
  pub fn texture_unit_count(&self) -> u32 {
    self.texture_units.len() as u32
  }

  /// Bindings of a texture unit.
  pub fn texture_unit(&self, unit: u32) -> Option<&TextureUnit> {
    self.texture_units.get(unit as usize)
  }

  /// Indexed buffer slots.
  pub fn indexed_buffers(&self) -> &IndexedBufferSlots {
    &self.indexed_buffers
  }

  /// Framebuffer slot for a role.
  pub fn framebuffer_slot(&self, role: FramebufferRole) -> &FramebufferSlot {
    match role {
      FramebufferRole::Read => &self.read_framebuffer,
      FramebufferRole::Draw => &self.draw_framebuffer,
    }
  }

  /// Applied viewport, if known.
  pub fn viewport(&self) -> Option<Viewport> {
    self.viewport.get().copied()
  }

  /// Applied depth state, if known.
  pub fn depth(&self) -> Option<DepthState> {
    self.depth.get().copied()
  }

  pub(crate) fn buffer_mut(&mut self, target: BufferTarget) -> &mut Binding {
    &mut self.buffers[target.index()]
  }

  pub(crate) fn indexed_buffers_mut(&mut self) -> &mut IndexedBufferSlots {
    &mut self.indexed_buffers
  }

  pub(crate) fn active_texture_unit_mut(&mut self) -> &mut Cached<u32> {
    &mut self.active_texture_unit
  }

  pub(crate) fn texture_unit_mut(&mut self, unit: u32) -> Option<&mut TextureUnit> {
    self.texture_units.get_mut(unit as usize)
  }

  pub(crate) fn framebuffer_slot_mut(&mut self, role: FramebufferRole) -> &mut FramebufferSlot {
    match role {
      FramebufferRole::Read => &mut self.read_framebuffer,
      FramebufferRole::Draw => &mut self.draw_framebuffer,
    }
  }

  pub(crate) fn renderbuffer_mut(&mut self) -> &mut Binding {
    &mut self.renderbuffer
  }

  pub(crate) fn vertex_array_mut(&mut self) -> &mut Binding {
    &mut self.vertex_array
  }

  pub(crate) fn program_mut(&mut self) -> &mut Binding {
    &mut self.program
  }

  pub(crate) fn viewport_mut(&mut self) -> &mut Cached<Viewport> {
    &mut self.viewport
  }

  pub(crate) fn depth_mut(&mut self) -> &mut Cached<DepthState> {
    &mut self.depth
  }

  /// Invalidate the buffer bindings, indexed slots included.
  pub(crate) fn invalidate_buffers(&mut self) {
    for b in self.buffers.iter_mut().chain(self.indexed_buffers.all_mut()) {
      b.invalidate();
    }
  }

  /// Invalidate the active texture unit and every texture binding.
  pub(crate) fn invalidate_textures(&mut self) {
    self.active_texture_unit.invalidate();

    for unit in &mut self.texture_units {
      for b in &mut unit.bindings {
        b.invalidate();
      }
    }
  }

  /// Invalidate both framebuffer bindings.
  ///
  /// The lock configurations are kept: they belong to the framebuffers, not to the driver.
  pub(crate) fn invalidate_framebuffers(&mut self) {
    self.read_framebuffer.framebuffer.invalidate();
    self.draw_framebuffer.framebuffer.invalidate();
  }

  /// Clear every buffer slot holding a deleted buffer.
  pub(crate) fn forget_buffer(&mut self, buffer: ObjectId) {
    forget(self.buffers.iter_mut().chain(self.indexed_buffers.all_mut()), buffer);
  }

  /// Clear every texture slot holding a deleted texture.
  pub(crate) fn forget_texture(&mut self, texture: ObjectId) {
    forget(
      self.texture_units.iter_mut().flat_map(|u| u.bindings.iter_mut()),
      texture,
    );
  }

  /// Clear the framebuffer slots holding a deleted framebuffer, dropping their lock.
  ///
  /// An invalidated slot stays unknown, but the lock still goes away.
  pub(crate) fn forget_framebuffer(&mut self, framebuffer: ObjectId) {
    for slot in [&mut self.read_framebuffer, &mut self.draw_framebuffer] {
      if slot.framebuffer() == Some(framebuffer) {
        slot.framebuffer.set(None);
      }

      if slot.last == Some(framebuffer) {
        slot.last = None;
        slot.lock = Default::default();
      }
    }
  }
}

fn flatten(binding: &Binding) -> Option<ObjectId> {
  binding.get().copied().flatten()
}

/// Reset to “none” every binding holding a deleted object.
pub(crate) fn forget<'a, I>(bindings: I, object: ObjectId)
where
  I: IntoIterator<Item = &'a mut Binding>,
{
  for b in bindings {
    if b.get() == Some(&Some(object)) {
      b.set(None);
    }
  }
}
