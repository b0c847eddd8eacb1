//! Module providing the `Scene` trait and the chapters built on it.
//!
//! Every chapter is a scene. The [`SceneManager`] owns the running chapter and rebuilds a new
//! one when the user moves through the sequence; dropping a scene frees all of its GPU
//! resources.

use std::{path::PathBuf, sync::Arc};

use glow::HasContext;
use sdl2::keyboard::Keycode;

use crate::{
    abs::{ShaderProgram, Texture, TextureOptions},
    camera::Camera,
    config::Config,
    input::UpdateContext,
    render::library::ShaderLibrary,
};

pub mod blending;
pub mod framebuffers;
pub mod instancing;
pub mod lighting;
pub mod model_loading;
pub mod normal_visualization;
pub mod point_shadows;
pub mod shadow_mapping;
pub mod skybox;
pub mod stencil_outline;
pub mod textures;

/// Background color shared by most chapters.
pub const CLEAR_COLOR: [f32; 3] = [0.2, 0.3, 0.3];

pub enum SceneSwitch {
    None,
    Next,
    Previous,
    Quit,
}

/// The Scene trait defines the common interface for all chapters.
pub trait Scene {
    /// Handles an event.
    fn handle_event(&mut self, _event: &sdl2::event::Event) {}

    /// Called when the drawable area changes size.
    fn resize(&mut self, _width: u32, _height: u32) -> Result<(), String> {
        Ok(())
    }

    /// Updates the scene state.
    fn update(&mut self, _ctx: &UpdateContext) -> SceneSwitch {
        SceneSwitch::None
    }

    /// Renders the scene into the default framebuffer of the given size.
    fn render(&mut self, size: (u32, u32));
}

/// Everything a chapter needs to build itself.
pub struct SceneContext {
    pub gl: Arc<glow::Context>,
    pub config: Config,
    pub shaders: ShaderLibrary,
    /// Current drawable size in pixels.
    pub size: (u32, u32),
}

impl SceneContext {
    pub fn new(gl: Arc<glow::Context>, config: Config, size: (u32, u32)) -> Self {
        let shaders = ShaderLibrary::new(config.shader_dir.clone());
        Self {
            gl,
            config,
            shaders,
            size,
        }
    }

    pub fn program(&self, name: &str) -> Result<ShaderProgram, String> {
        self.shaders.program(&self.gl, name)
    }

    /// Loads `assets/textures/<file>`, falling back to the checker texture.
    pub fn texture(&self, file: &str) -> Result<Texture, String> {
        self.texture_with(file, TextureOptions::default())
    }

    pub fn texture_with(&self, file: &str, options: TextureOptions) -> Result<Texture, String> {
        Texture::load_or_fallback(&self.gl, &self.asset_path("textures", file), options)
    }

    /// Path of `assets/models/<name>/<name>.obj`.
    pub fn model_path(&self, name: &str) -> PathBuf {
        self.config
            .assets_dir()
            .join("models")
            .join(name)
            .join(format!("{name}.obj"))
    }

    pub fn asset_path(&self, folder: &str, file: &str) -> PathBuf {
        self.config.assets_dir().join(folder).join(file)
    }

    /// A camera at `position` with the configured speed and sensitivity.
    pub fn camera(&self, position: glam::Vec3) -> Camera {
        Camera::new(position).with_config(&self.config.camera)
    }
}

/// An entry of the chapter sequence.
pub struct Chapter {
    pub name: &'static str,
    pub build: fn(&SceneContext) -> Result<Box<dyn Scene>, String>,
}

macro_rules! chapter {
    ($module:ident :: $scene:ident) => {
        Chapter {
            name: stringify!($module),
            build: |ctx| Ok(Box::new($module::$scene::new(ctx)?) as Box<dyn Scene>),
        }
    };
}

/// The chapters in teaching order.
pub const CHAPTERS: [Chapter; 11] = [
    chapter!(textures::TexturesScene),
    chapter!(lighting::LightingScene),
    chapter!(shadow_mapping::ShadowMappingScene),
    chapter!(point_shadows::PointShadowsScene),
    chapter!(stencil_outline::StencilOutlineScene),
    chapter!(blending::BlendingScene),
    chapter!(framebuffers::FramebuffersScene),
    chapter!(normal_visualization::NormalVisualizationScene),
    chapter!(skybox::SkyboxScene),
    chapter!(model_loading::ModelLoadingScene),
    chapter!(instancing::InstancingScene),
];

/// Finds a chapter by name (`-` and `_` are interchangeable, case is ignored) or by its
/// 1-based number.
pub fn chapter_index(query: &str) -> Option<usize> {
    let query = query.trim();
    if let Ok(number) = query.parse::<usize>() {
        return (1..=CHAPTERS.len()).contains(&number).then(|| number - 1);
    }
    let query = query.to_ascii_lowercase().replace('-', "_");
    CHAPTERS.iter().position(|chapter| chapter.name == query)
}

/// Default GL state every chapter starts from.
pub fn reset_gl_state(gl: &glow::Context) {
    unsafe {
        gl.enable(glow::DEPTH_TEST);
        gl.depth_func(glow::LESS);
        gl.depth_mask(true);
        gl.disable(glow::STENCIL_TEST);
        gl.stencil_mask(0xFF);
        gl.disable(glow::BLEND);
        gl.disable(glow::CULL_FACE);
        gl.cull_face(glow::BACK);
        gl.front_face(glow::CCW);
        gl.enable(glow::MULTISAMPLE);
    }
}

/// Restores the viewport to the default framebuffer after an offscreen pass.
pub fn reset_viewport(gl: &glow::Context, size: (u32, u32)) {
    unsafe {
        gl.viewport(0, 0, size.0 as i32, size.1 as i32);
    }
}

pub fn aspect_ratio(size: (u32, u32)) -> f32 {
    size.0.max(1) as f32 / size.1.max(1) as f32
}

pub fn clear(gl: &glow::Context, color: [f32; 3], mask: u32) {
    unsafe {
        gl.clear_color(color[0], color[1], color[2], 1.0);
        gl.clear(mask);
    }
}

/// Manages the running chapter.
pub struct SceneManager {
    ctx: SceneContext,
    index: usize,
    scene: Box<dyn Scene>,
}

impl SceneManager {
    /// Builds the chapter at `index`. Failure here is fatal to the caller.
    pub fn new(ctx: SceneContext, index: usize) -> Result<Self, String> {
        let scene = Self::build(&ctx, index)?;
        Ok(Self { ctx, index, scene })
    }

    fn build(ctx: &SceneContext, index: usize) -> Result<Box<dyn Scene>, String> {
        let chapter = &CHAPTERS[index];
        log::info!("Building chapter {} ({})", index + 1, chapter.name);
        let start = std::time::Instant::now();
        reset_gl_state(&ctx.gl);
        let scene = (chapter.build)(ctx)
            .map_err(|e| format!("chapter '{}' failed to build: {e}", chapter.name))?;
        log::debug!("Chapter {} ready in {:?}", chapter.name, start.elapsed());
        Ok(scene)
    }

    /// Replaces the running chapter. If the new chapter cannot be built the error is logged
    /// and the current one keeps running.
    pub fn switch_to(&mut self, index: usize) {
        match Self::build(&self.ctx, index) {
            Ok(scene) => {
                self.scene = scene;
                self.index = index;
            }
            Err(e) => {
                log::error!("{e}");
                reset_gl_state(&self.ctx.gl);
            }
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        CHAPTERS[self.index].name
    }

    /// Handles an event by passing it to the current scene.
    pub fn handle_event(&mut self, event: &sdl2::event::Event) {
        self.scene.handle_event(event);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.size = (width, height);
        reset_viewport(&self.ctx.gl, self.ctx.size);
        if let Err(e) = self.scene.resize(width, height) {
            log::error!("Resize of chapter {} failed: {e}", self.name());
        }
    }

    /// Updates the current scene and handles chapter navigation. Returns `false` on quit.
    pub fn update(&mut self, ctx: &UpdateContext) -> bool {
        let switch = if ctx.keyboard.was_pressed(Keycode::Escape) {
            SceneSwitch::Quit
        } else if ctx.keyboard.was_pressed(Keycode::PageDown) {
            SceneSwitch::Next
        } else if ctx.keyboard.was_pressed(Keycode::PageUp) {
            SceneSwitch::Previous
        } else {
            self.scene.update(ctx)
        };

        let count = CHAPTERS.len();
        match switch {
            SceneSwitch::None => {}
            SceneSwitch::Next => self.switch_to((self.index + 1) % count),
            SceneSwitch::Previous => self.switch_to((self.index + count - 1) % count),
            SceneSwitch::Quit => return false,
        }
        true
    }

    /// Renders the current scene.
    pub fn render(&mut self) {
        self.scene.render(self.ctx.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_guide_covers_every_chapter() {
        let guide = include_str!("../../assets/README.md");
        for chapter in &CHAPTERS {
            assert!(guide.contains(&format!("| {} |", chapter.name)), "{}", chapter.name);
        }
        for face in skybox::FACES {
            assert!(guide.contains(&format!("skybox/{face}.jpg")), "{face}");
        }
        assert!(guide.contains("models/backpack/backpack.obj"));
    }

    #[test]
    fn chapters_are_found_by_number() {
        assert_eq!(chapter_index("1"), Some(0));
        assert_eq!(chapter_index("11"), Some(10));
        assert_eq!(chapter_index("0"), None);
        assert_eq!(chapter_index("12"), None);
    }

    #[test]
    fn chapters_are_found_by_name() {
        assert_eq!(chapter_index("textures"), Some(0));
        assert_eq!(chapter_index("Shadow-Mapping"), Some(2));
        assert_eq!(chapter_index(" instancing "), Some(10));
        assert_eq!(chapter_index("raytracing"), None);
    }

    #[test]
    fn chapter_names_are_unique() {
        for (i, chapter) in CHAPTERS.iter().enumerate() {
            assert_eq!(chapter_index(chapter.name), Some(i));
        }
    }

    #[test]
    fn aspect_ratio_never_divides_by_zero() {
        assert_eq!(aspect_ratio((1280, 720)), 1280.0 / 720.0);
        assert_eq!(aspect_ratio((100, 0)), 100.0);
    }
}
