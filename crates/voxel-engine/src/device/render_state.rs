/// Fixed-function state shared by every pipeline the engine's collaborators
/// build.
///
/// wgpu bakes depth, culling and blending into pipelines, so "enabling" them
/// means recording the choice here; pipeline builders read it back through the
/// descriptor helpers. Everything is disabled until
/// [`enable_defaults`](Self::enable_defaults) runs.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    pub cull_back_faces: bool,
    pub alpha_blend: bool,
    /// Poll the device after each present so dropped transient resources are
    /// reclaimed without explicit per-frame teardown.
    pub auto_reclaim: bool,
}

impl RenderState {
    /// Enables depth test, back-face culling, alpha blending and automatic
    /// reclamation. Idempotent.
    pub fn enable_defaults(&mut self) {
        self.depth_test = true;
        self.cull_back_faces = true;
        self.alpha_blend = true;
        self.auto_reclaim = true;
    }

    /// Triangle lists with counter-clockwise front faces.
    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: self.cull_back_faces.then_some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        }
    }

    /// Depth state for the frame's depth attachment, which is always present.
    pub fn depth_stencil(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let depth_compare = if self.depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        };

        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_test,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn blend(&self) -> Option<wgpu::BlendState> {
        self.alpha_blend.then_some(wgpu::BlendState::ALPHA_BLENDING)
    }

    pub fn multisample(&self, count: u32) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }
}
