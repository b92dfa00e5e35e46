//! A fake driver keeping its own copy of the state it is driven into.

#![allow(dead_code)]

use std::collections::HashMap;
use umbra::depth::Comparison;
use umbra::driver::{Capability, Driver, Limit};
use umbra::object::ObjectId;
use umbra::target::{BindingTarget, BufferTarget, FramebufferRole, IndexedBufferTarget, TextureKind};
use umbra::viewport::Viewport;

pub const TEXTURE_UNITS: u32 = 4;
pub const INDEXED_SLOTS: u32 = 4;

#[derive(Debug, Default)]
pub struct FakeDriver {
  /// Number of calls issued so far.
  pub calls: usize,
  buffers: HashMap<BufferTarget, Option<ObjectId>>,
  indexed: HashMap<(IndexedBufferTarget, u32), Option<ObjectId>>,
  active_unit: u32,
  textures: HashMap<(u32, TextureKind), Option<ObjectId>>,
  framebuffers: HashMap<FramebufferRole, Option<ObjectId>>,
  renderbuffer: Option<ObjectId>,
  vertex_array: Option<ObjectId>,
  program: Option<ObjectId>,
  pub viewport: Option<Viewport>,
  pub depth_test: bool,
  pub depth_func: Option<Comparison>,
}

impl FakeDriver {
  pub fn new() -> Self {
    FakeDriver::default()
  }

  /// What the driver really has bound to a target.
  pub fn bound(&self, target: BindingTarget) -> Option<ObjectId> {
    match target {
      BindingTarget::Buffer(t) => self.buffers.get(&t).copied().flatten(),
      BindingTarget::IndexedBuffer { target, index } => {
        self.indexed.get(&(target, index)).copied().flatten()
      }
      BindingTarget::Texture { unit, kind } => self.textures.get(&(unit, kind)).copied().flatten(),
      BindingTarget::Framebuffer(role) => self.framebuffers.get(&role).copied().flatten(),
      BindingTarget::Renderbuffer => self.renderbuffer,
      BindingTarget::VertexArray => self.vertex_array,
      BindingTarget::Program => self.program,
    }
  }
}

unsafe impl Driver for FakeDriver {
  unsafe fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ObjectId>) {
    self.calls += 1;
    self.buffers.insert(target, buffer);
  }

  unsafe fn bind_buffer_base(
    &mut self,
    target: IndexedBufferTarget,
    index: u32,
    buffer: Option<ObjectId>,
  ) {
    self.calls += 1;
    self.indexed.insert((target, index), buffer);
    self.buffers.insert(target.general(), buffer);
  }

  unsafe fn active_texture(&mut self, unit: u32) {
    self.calls += 1;
    self.active_unit = unit;
  }

  unsafe fn bind_texture(&mut self, kind: TextureKind, texture: Option<ObjectId>) {
    self.calls += 1;
    self.textures.insert((self.active_unit, kind), texture);
  }

  unsafe fn bind_framebuffer(&mut self, role: FramebufferRole, framebuffer: Option<ObjectId>) {
    self.calls += 1;
    self.framebuffers.insert(role, framebuffer);
  }

  unsafe fn bind_renderbuffer(&mut self, renderbuffer: Option<ObjectId>) {
    self.calls += 1;
    self.renderbuffer = renderbuffer;
  }

  unsafe fn bind_vertex_array(&mut self, vertex_array: Option<ObjectId>) {
    self.calls += 1;
    self.vertex_array = vertex_array;
  }

  unsafe fn use_program(&mut self, program: Option<ObjectId>) {
    self.calls += 1;
    self.program = program;
  }

  unsafe fn viewport(&mut self, viewport: Viewport) {
    self.calls += 1;
    self.viewport = Some(viewport);
  }

  unsafe fn set_capability(&mut self, capability: Capability, enabled: bool) {
    self.calls += 1;

    if capability == Capability::DepthTest {
      self.depth_test = enabled;
    }
  }

  unsafe fn depth_mask(&mut self, _: bool) {
    self.calls += 1;
  }

  unsafe fn depth_func(&mut self, comparison: Comparison) {
    self.calls += 1;
    self.depth_func = Some(comparison);
  }

  unsafe fn depth_range(&mut self, _: f64, _: f64) {
    self.calls += 1;
  }

  unsafe fn limit(&mut self, limit: Limit) -> Option<u32> {
    match limit {
      Limit::TextureUnits => Some(TEXTURE_UNITS),
      Limit::IndexedBuffers(_) => Some(INDEXED_SLOTS),
    }
  }
}

pub fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}
