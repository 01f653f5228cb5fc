//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and recovering from surface loss

mod gpu;
mod init;
mod surface;

pub use gpu::{FrameAcquire, Gpu, GpuFrame};
pub use init::GpuInit;
