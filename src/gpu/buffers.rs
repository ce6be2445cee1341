use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::config::SHADOW_ALPHA;
use crate::switches::SwitchInstance;
use crate::viewport::ViewportSample;

/// Switch instances and render parameters on the GPU
pub struct SwitchBuffers {
    /// Storage buffer of `SwitchInstance`
    pub instance_buffer: Buffer,
    /// Uniform buffer for render parameters
    pub params_buffer: Buffer,
    /// Instances the storage buffer can hold
    capacity: usize,
    /// Instances written by the last upload
    count: u32,
}

/// Render parameters passed to the switch shader (32 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    /// Drawing buffer size in pixels
    pub viewport: [f32; 2],
    /// 1 when the surface expects linear color
    pub srgb_output: u32,
    pub _padding: u32,
    /// Thumb shadow color, sRGB + alpha
    pub shadow: [f32; 4],
}

impl RenderParams {
    pub fn new(viewport: &ViewportSample, srgb_output: bool) -> Self {
        Self {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            srgb_output: srgb_output as u32,
            _padding: 0,
            shadow: [0.0, 0.0, 0.0, SHADOW_ALPHA],
        }
    }
}

impl SwitchBuffers {
    pub fn new(device: &Device, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("render-params-buffer"),
            size: std::mem::size_of::<RenderParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            instance_buffer: create_instance_buffer(device, capacity),
            params_buffer,
            capacity,
            count: 0,
        }
    }

    /// Write this frame's instances, growing the storage buffer if needed
    pub fn upload(&mut self, device: &Device, queue: &Queue, instances: &[SwitchInstance]) {
        if instances.len() > self.capacity {
            let capacity = grown_capacity(self.capacity, instances.len());
            log::debug!("Instance buffer {} -> {} switches", self.capacity, capacity);
            self.instance_buffer = create_instance_buffer(device, capacity);
            self.capacity = capacity;
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.count = instances.len() as u32;
    }

    pub fn update_params(&self, queue: &Queue, params: &RenderParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

fn create_instance_buffer(device: &Device, capacity: usize) -> Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("switch-instance-buffer"),
        size: (capacity * std::mem::size_of::<SwitchInstance>()) as u64,
        usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Doubles until `needed` fits
fn grown_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < needed {
        capacity *= 2;
    }
    capacity
}
