//! Binding targets.
//!
//! A binding target is a named slot on the driver side that holds at most one object at a time.
//! The set of targets is closed: every state-changing operation matches exhaustively over these
//! types, so a target can never be silently left out of the cache.

use std::fmt;

/// Non-indexed buffer binding points.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferTarget {
  /// Vertex attribute data.
  Array,
  /// Vertex indices.
  ElementArray,
  /// Uniform block storage.
  Uniform,
  /// Shader storage block.
  ShaderStorage,
  /// Atomic counter storage.
  AtomicCounter,
  /// Transform feedback output.
  TransformFeedback,
  /// Pixel read-back target.
  PixelPack,
  /// Pixel upload source.
  PixelUnpack,
  /// Buffer copy source.
  CopyRead,
  /// Buffer copy destination.
  CopyWrite,
  /// Query result storage.
  Query,
}

impl BufferTarget {
  /// Number of buffer targets.
  pub const COUNT: usize = 11;

  /// Every buffer target.
  pub const ALL: [BufferTarget; BufferTarget::COUNT] = [
    BufferTarget::Array,
    BufferTarget::ElementArray,
    BufferTarget::Uniform,
    BufferTarget::ShaderStorage,
    BufferTarget::AtomicCounter,
    BufferTarget::TransformFeedback,
    BufferTarget::PixelPack,
    BufferTarget::PixelUnpack,
    BufferTarget::CopyRead,
    BufferTarget::CopyWrite,
    BufferTarget::Query,
  ];

  pub(crate) fn index(self) -> usize {
    match self {
      BufferTarget::Array => 0,
      BufferTarget::ElementArray => 1,
      BufferTarget::Uniform => 2,
      BufferTarget::ShaderStorage => 3,
      BufferTarget::AtomicCounter => 4,
      BufferTarget::TransformFeedback => 5,
      BufferTarget::PixelPack => 6,
      BufferTarget::PixelUnpack => 7,
      BufferTarget::CopyRead => 8,
      BufferTarget::CopyWrite => 9,
      BufferTarget::Query => 10,
    }
  }
}

/// Buffer binding points that also come as indexed arrays of slots.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IndexedBufferTarget {
  /// Transform feedback binding points.
  TransformFeedback,
  /// Uniform block binding points.
  Uniform,
  /// Atomic counter binding points.
  AtomicCounter,
  /// Shader storage binding points.
  ShaderStorage,
}

impl IndexedBufferTarget {
  /// Every indexed buffer target.
  pub const ALL: [IndexedBufferTarget; 4] = [
    IndexedBufferTarget::TransformFeedback,
    IndexedBufferTarget::Uniform,
    IndexedBufferTarget::AtomicCounter,
    IndexedBufferTarget::ShaderStorage,
  ];

  /// The non-indexed binding point sharing the same name.
  ///
  /// Binding a buffer to an indexed slot also binds it to this general binding point.
  pub fn general(self) -> BufferTarget {
    match self {
      IndexedBufferTarget::TransformFeedback => BufferTarget::TransformFeedback,
      IndexedBufferTarget::Uniform => BufferTarget::Uniform,
      IndexedBufferTarget::AtomicCounter => BufferTarget::AtomicCounter,
      IndexedBufferTarget::ShaderStorage => BufferTarget::ShaderStorage,
    }
  }
}

impl fmt::Display for IndexedBufferTarget {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      IndexedBufferTarget::TransformFeedback => f.write_str("transform feedback"),
      IndexedBufferTarget::Uniform => f.write_str("uniform"),
      IndexedBufferTarget::AtomicCounter => f.write_str("atomic counter"),
      IndexedBufferTarget::ShaderStorage => f.write_str("shader storage"),
    }
  }
}

/// Kind of texture; a texture unit holds one binding per kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureKind {
  /// 1D texture.
  Dim1,
  /// 2D texture.
  Dim2,
  /// 3D texture.
  Dim3,
  /// Array of 1D textures.
  Dim1Array,
  /// Array of 2D textures.
  Dim2Array,
  /// Multisampled 2D texture.
  Dim2Multisample,
  /// Array of multisampled 2D textures.
  Dim2MultisampleArray,
  /// Cube map.
  Cubemap,
  /// Array of cube maps.
  CubemapArray,
  /// Texture view over a buffer.
  Buffer,
  /// Rectangle texture (non-normalized coordinates).
  Rectangle,
}

impl TextureKind {
  /// Number of texture kinds.
  pub const COUNT: usize = 11;

  /// Every texture kind.
  pub const ALL: [TextureKind; TextureKind::COUNT] = [
    TextureKind::Dim1,
    TextureKind::Dim2,
    TextureKind::Dim3,
    TextureKind::Dim1Array,
    TextureKind::Dim2Array,
    TextureKind::Dim2Multisample,
    TextureKind::Dim2MultisampleArray,
    TextureKind::Cubemap,
    TextureKind::CubemapArray,
    TextureKind::Buffer,
    TextureKind::Rectangle,
  ];

  pub(crate) fn index(self) -> usize {
    match self {
      TextureKind::Dim1 => 0,
      TextureKind::Dim2 => 1,
      TextureKind::Dim3 => 2,
      TextureKind::Dim1Array => 3,
      TextureKind::Dim2Array => 4,
      TextureKind::Dim2Multisample => 5,
      TextureKind::Dim2MultisampleArray => 6,
      TextureKind::Cubemap => 7,
      TextureKind::CubemapArray => 8,
      TextureKind::Buffer => 9,
      TextureKind::Rectangle => 10,
    }
  }
}

/// Role a framebuffer is bound for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FramebufferRole {
  /// Source of read and blit operations.
  Read,
  /// Destination of draw operations.
  Draw,
}

/// Any binding target tracked by the shadow state.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BindingTarget {
  /// General buffer binding point.
  Buffer(BufferTarget),
  /// Indexed buffer slot.
  IndexedBuffer {
    /// Which array of slots.
    target: IndexedBufferTarget,
    /// Slot in the array.
    index: u32,
  },
  /// Texture bound on a given unit for a given kind.
  Texture {
    /// Texture unit.
    unit: u32,
    /// Texture kind.
    kind: TextureKind,
  },
  /// Framebuffer bound for reading or drawing.
  Framebuffer(FramebufferRole),
  /// Renderbuffer binding point.
  Renderbuffer,
  /// Vertex array binding point.
  VertexArray,
  /// Program in use.
  Program,
}

impl From<BufferTarget> for BindingTarget {
  fn from(target: BufferTarget) -> Self {
    BindingTarget::Buffer(target)
  }
}

impl From<FramebufferRole> for BindingTarget {
  fn from(role: FramebufferRole) -> Self {
    BindingTarget::Framebuffer(role)
  }
}
