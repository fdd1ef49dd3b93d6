//! Joint hierarchy and skinning palette
//!
//! A [`Skeleton`] owns its [`Joint`]s in a pre-order arena and keeps their
//! global transforms and the skinning matrix palette up to date as poses are
//! applied.

mod hierarchy;
mod iter;
mod joint;
mod palette;

pub use hierarchy::Skeleton;
pub use iter::{Ancestors, Children};
pub use joint::{Joint, SkinningId};
