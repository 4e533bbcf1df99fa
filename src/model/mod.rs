pub mod config;
pub mod container;
pub mod entity;
pub mod item;

pub use config::*;
pub use container::*;
pub use entity::*;
pub use item::*;
