mod common;
#[cfg(target_arch = "wasm32")]
pub(crate) mod shared;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use common::{CameraParams, LightParams};
#[cfg(target_arch = "wasm32")]
pub use wasm::Renderer;
