/// Represents a single acquired frame.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// frame. Created already cleared by `GraphicsContext::begin_frame` and
/// finished by `GraphicsContext::present`.
pub struct GpuFrame {
    pub(crate) surface_texture: wgpu::SurfaceTexture,
    /// Swap-chain view; the resolve target when multisampling.
    pub view: wgpu::TextureView,
    /// Multisampled color target, when the sample count is above one.
    pub msaa_view: Option<wgpu::TextureView>,
    pub depth_view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Begins a render pass that keeps the cleared color and depth contents.
    pub fn begin_pass(&mut self, label: &str) -> wgpu::RenderPass<'_> {
        encode_pass(
            &mut self.encoder,
            label,
            &self.view,
            self.msaa_view.as_ref(),
            &self.depth_view,
            wgpu::LoadOp::Load,
            wgpu::LoadOp::Load,
        )
    }
}

pub(crate) fn encode_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    msaa_view: Option<&wgpu::TextureView>,
    depth_view: &wgpu::TextureView,
    color_load: wgpu::LoadOp<wgpu::Color>,
    depth_load: wgpu::LoadOp<f32>,
) -> wgpu::RenderPass<'e> {
    // With multisampling the pass draws into the MSAA target and resolves
    // into the swap-chain view.
    let (target, resolve_target) = match msaa_view {
        Some(msaa) => (msaa, Some(view)),
        None => (view, None),
    };

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
