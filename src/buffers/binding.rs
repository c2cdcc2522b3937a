//! GPU bindings for parameter buffers
//!
//! Thin wgpu layer: each binding owns a `wgpu::Buffer` plus the bind group
//! pair for it. [`UniformBinding`] exposes a [`UniformBuffer`] ring through
//! a dynamic-offset uniform binding; [`StorageBinding`] exposes a
//! [`Buffer`] as read-write storage with a blocking readback path that
//! feeds [`Buffer::sync`].

use crate::buffers::{Buffer, UniformBuffer};

/// Dynamic-offset uniform binding over a [`UniformBuffer`] ring.
pub struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl UniformBinding {
    pub fn new(device: &wgpu::Device, uniforms: &UniformBuffer) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(uniforms.parameters().label()),
            size: uniforms.as_bytes().len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_binding_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE
                    | wgpu::ShaderStages::VERTEX
                    | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniforms.aligned_size() as u64),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_binding"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniforms.aligned_size() as u64),
                }),
            }],
        });

        log::debug!(
            "created uniform binding '{}' ({} x {} bytes)",
            uniforms.parameters().label(),
            uniforms.buffer_count(),
            uniforms.aligned_size()
        );

        Self { buffer, bind_group_layout, bind_group }
    }

    /// Upload the current region at its ring offset.
    pub fn upload(&self, queue: &wgpu::Queue, uniforms: &UniformBuffer) {
        queue.write_buffer(&self.buffer, uniforms.offset() as u64, uniforms.region());
    }

    /// Offset to pass to `set_bind_group` for the current region.
    pub fn dynamic_offset(&self, uniforms: &UniformBuffer) -> u32 {
        uniforms.offset() as u32
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Read-write storage binding over a single-copy [`Buffer`].
pub struct StorageBinding {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl StorageBinding {
    pub fn new(device: &wgpu::Device, packed: &Buffer) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(packed.parameters().label()),
            size: packed.as_bytes().len() as u64,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("storage_binding_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("storage_binding"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { buffer, bind_group_layout, bind_group }
    }

    pub fn upload(&self, queue: &wgpu::Queue, packed: &Buffer) {
        queue.write_buffer(&self.buffer, 0, packed.as_bytes());
    }

    /// Copy the GPU buffer back into `packed` and sync its parameter
    /// values. Blocks until the copy is mapped.
    pub fn download(&self, device: &wgpu::Device, queue: &wgpu::Queue, packed: &mut Buffer) {
        let size = packed.as_bytes().len() as u64;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("storage_readback"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("storage_readback"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        let _ = device.poll(wgpu::PollType::Wait { submission_index: None, timeout: None });

        if let Ok(Ok(())) = rx.recv() {
            {
                let mapped = slice.get_mapped_range();
                packed.bytes_mut().copy_from_slice(&mapped);
            }
            staging.unmap();
            packed.sync();
        } else {
            log::warn!("storage readback failed for '{}'", packed.parameters().label());
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
