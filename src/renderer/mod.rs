//! wgpu-based renderer for actionviz.
//!
//! The renderer only ever sees a finished `QuadBatch`. Scenes fill the
//! batch through `GeometrySink`, so the same geometry can be drawn here,
//! dumped to JSON, or walked through an immediate-mode canvas.

pub mod camera;
pub mod gpu;
pub mod metrics;
pub mod quads;

use std::sync::Arc;
use winit::window::Window;

use crate::core::error::Result;
use gpu::{GpuContext, QuadBuffers, QuadPipeline};

pub use gpu::BeamBlend;

pub use camera::CameraState;
pub use metrics::RenderMetrics;
pub use quads::{GeometrySink, ImmediateCanvas, QuadBatch, QuadVertex};

const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.04,
    a: 1.0,
};

pub struct Renderer {
    ctx: GpuContext,
    pipeline: QuadPipeline,
    buffers: QuadBuffers,
    metrics: RenderMetrics,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, blend: BeamBlend) -> Result<Self> {
        let ctx = GpuContext::new(window).await?;
        let pipeline = QuadPipeline::new(&ctx, blend);
        let buffers = QuadBuffers::new(&ctx, 4096);

        Ok(Self {
            ctx,
            pipeline,
            buffers,
            metrics: RenderMetrics::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        self.ctx.size()
    }

    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// Draw one frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped;
    /// only out-of-memory is returned to the caller.
    pub fn render(
        &mut self,
        camera: &CameraState,
        batch: &QuadBatch,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.metrics.begin_frame();
        self.metrics.quad_count = batch.quad_count();

        self.pipeline
            .update_camera(&self.ctx.queue, camera.view_projection_matrix());
        let index_count = self.buffers.upload(&self.ctx, batch);
        self.metrics.record_buffer_upload();

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.ctx.reconfigure();
                self.metrics.record_skipped_frame();
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Quad Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if index_count > 0 {
                render_pass.set_pipeline(&self.pipeline.render_pipeline);
                render_pass.set_bind_group(0, &self.pipeline.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.buffers.vertex_buffer.slice(..));
                render_pass.set_index_buffer(
                    self.buffers.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                render_pass.draw_indexed(0..index_count, 0, 0..1);
                self.metrics.record_draw_call();
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.metrics.end_frame();
        Ok(())
    }
}
