pub mod entity;
pub mod post;

pub use entity::*;
pub use post::*;
