pub mod buffer;
pub mod material;

pub use buffer::BufferRef;
pub use material::{FurMaterial, PropertyBlock};
