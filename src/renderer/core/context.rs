//! Minimal GPU context: device and queue only.
//!
//! Unlike the teacher's `WgpuContext`, this core owns no window or surface —
//! the host delivers frames as textures via `InputFrame` and only the
//! optional [`crate::renderer::hdr_surface::HdrSurface`] path creates a
//! surface of its own, tied to a host-owned canvas.

use crate::errors::{ChromaError, Result};

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ChromaError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("chromacore-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self { device, queue })
    }
}
