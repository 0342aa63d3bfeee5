//! GPU-to-CPU frame readback
//!
//! Flow:
//! 1. The camera renders into an offscreen image
//! 2. `ImageCopyDriver` copies that image into a mappable buffer after the
//!    camera driver node
//! 3. After `RenderSystems::Render` the buffer is mapped and its bytes are
//!    sent to the main world as a [`RenderedFrame`]

use bevy::{
    prelude::*,
    render::{
        render_asset::RenderAssets,
        render_graph::{self, NodeRunError, RenderGraph, RenderGraphContext, RenderLabel},
        render_resource::{
            Buffer, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, Extent3d, MapMode,
            PollType, TexelCopyBufferInfo, TexelCopyBufferLayout,
        },
        renderer::{RenderContext, RenderDevice, RenderQueue},
        texture::GpuImage,
        Extract, Render, RenderApp, RenderSystems,
    },
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{error, warn};

use crate::bevy::resources::{MainWorldReceiver, RenderWorldSender, RenderedFrame};

pub struct ImageCopyPlugin;

impl Plugin for ImageCopyPlugin {
    fn build(&self, app: &mut App) {
        let (s, r) = crossbeam_channel::unbounded();

        let render_app = app
            .insert_resource(MainWorldReceiver(r))
            .sub_app_mut(RenderApp);

        let mut graph = render_app.world_mut().resource_mut::<RenderGraph>();
        graph.add_node(ImageCopy, ImageCopyDriver);
        graph.add_node_edge(bevy::render::graph::CameraDriverLabel, ImageCopy);

        render_app
            .insert_resource(RenderWorldSender(s))
            .add_systems(ExtractSchedule, image_copy_extract)
            .add_systems(
                Render,
                receive_image_from_buffer.after(RenderSystems::Render),
            );
    }
}

#[derive(Clone, Default, Resource, Deref, DerefMut)]
struct ImageCopiers(pub Vec<ImageCopier>);

/// Flags shared between a copier's main-world and render-world clones
#[derive(Debug)]
pub struct CopyState {
    enabled: AtomicBool,
    /// Set when the buffer was filled this frame, cleared by the readback
    copied: AtomicBool,
}

impl Default for CopyState {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            copied: AtomicBool::new(false),
        }
    }
}

impl CopyState {
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn mark_copied(&self) {
        self.copied.store(true, Ordering::Release);
    }

    /// Whether a copy landed since the last call
    pub fn take_copied(&self) -> bool {
        self.copied.swap(false, Ordering::AcqRel)
    }
}

/// Copies one render target into a CPU-readable buffer every frame
#[derive(Clone, Component)]
pub struct ImageCopier {
    buffer: Buffer,
    state: Arc<CopyState>,
    src_image: Handle<Image>,
    size: Extent3d,
}

impl ImageCopier {
    pub fn new(src_image: Handle<Image>, size: Extent3d, render_device: &RenderDevice) -> Self {
        let padded_bytes_per_row = padded_bytes_per_row(size.width);

        let cpu_buffer = render_device.create_buffer(&BufferDescriptor {
            label: Some("moon_frame_readback"),
            size: padded_bytes_per_row as u64 * size.height as u64,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer: cpu_buffer,
            src_image,
            state: Arc::new(CopyState::default()),
            size,
        }
    }

    pub fn enabled(&self) -> bool {
        self.state.enabled()
    }

    /// Stop copying; used when the copier is being replaced after a resize
    pub fn disable(&self) {
        self.state.disable();
    }
}

/// Row stride of an RGBA8 readback, aligned for `copy_texture_to_buffer`
pub fn padded_bytes_per_row(width: u32) -> usize {
    RenderDevice::align_copy_bytes_per_row(width as usize * 4)
}

fn image_copy_extract(mut commands: Commands, image_copiers: Extract<Query<&ImageCopier>>) {
    commands.insert_resource(ImageCopiers(
        image_copiers.iter().cloned().collect::<Vec<ImageCopier>>(),
    ));
}

#[derive(Debug, PartialEq, Eq, Clone, Hash, RenderLabel)]
struct ImageCopy;

#[derive(Default)]
struct ImageCopyDriver;

impl render_graph::Node for ImageCopyDriver {
    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let (Some(image_copiers), Some(gpu_images), Some(render_queue)) = (
            world.get_resource::<ImageCopiers>(),
            world.get_resource::<RenderAssets<GpuImage>>(),
            world.get_resource::<RenderQueue>(),
        ) else {
            return Ok(());
        };

        for image_copier in image_copiers.iter() {
            if !image_copier.enabled() {
                continue;
            }

            // A freshly created target may not be uploaded yet
            let Some(src_image) = gpu_images.get(&image_copier.src_image) else {
                continue;
            };
            if src_image.size.width != image_copier.size.width
                || src_image.size.height != image_copier.size.height
            {
                continue;
            }

            let Some(bytes_per_row) = std::num::NonZero::<u32>::new(
                padded_bytes_per_row(src_image.size.width) as u32,
            ) else {
                continue;
            };

            let mut encoder = render_context
                .render_device()
                .create_command_encoder(&CommandEncoderDescriptor::default());

            encoder.copy_texture_to_buffer(
                src_image.texture.as_image_copy(),
                TexelCopyBufferInfo {
                    buffer: &image_copier.buffer,
                    layout: TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(bytes_per_row.into()),
                        rows_per_image: None,
                    },
                },
                src_image.size,
            );

            render_queue.submit(std::iter::once(encoder.finish()));
            image_copier.state.mark_copied();
        }

        Ok(())
    }
}

fn receive_image_from_buffer(
    image_copiers: Res<ImageCopiers>,
    render_device: Res<RenderDevice>,
    sender: Res<RenderWorldSender>,
) {
    for image_copier in image_copiers.0.iter() {
        // Skipped by the driver: the buffer holds nothing from this frame
        if !image_copier.enabled() || !image_copier.state.take_copied() {
            continue;
        }

        let buffer_slice = image_copier.buffer.slice(..);

        let (s, r) = crossbeam_channel::bounded(1);

        buffer_slice.map_async(MapMode::Read, move |result| {
            let _ = s.send(result);
        });

        if let Err(err) = render_device.poll(PollType::wait()) {
            error!(%err, "failed to poll device for frame readback");
            continue;
        }

        match r.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(%err, "failed to map frame buffer");
                continue;
            }
            Err(_) => {
                warn!("frame buffer map callback dropped");
                continue;
            }
        }

        let _ = sender.send(RenderedFrame {
            width: image_copier.size.width,
            height: image_copier.size.height,
            data: buffer_slice.get_mapped_range().to_vec(),
        });

        image_copier.buffer.unmap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readback_only_follows_a_copy() {
        let state = CopyState::default();
        assert!(state.enabled());
        assert!(!state.take_copied());

        state.mark_copied();
        assert!(state.take_copied());
        // Consumed: the next frame needs its own copy
        assert!(!state.take_copied());
    }

    #[test]
    fn disabled_state_is_shared_between_clones() {
        let state = Arc::new(CopyState::default());
        let render_world = Arc::clone(&state);
        state.disable();
        assert!(!render_world.enabled());
    }

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(800) % 256, 0);
    }
}
