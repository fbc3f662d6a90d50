pub mod kind;
pub mod model;
pub mod reference;

pub use kind::*;
pub use model::*;
pub use reference::*;
