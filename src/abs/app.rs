//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use glow::HasContext;

use crate::config::WindowConfig;

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub window: sdl2::video::Window,
    // Must outlive every GL call.
    _video_subsystem: sdl2::VideoSubsystem,
    _gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a new [`App`] from the window section of the configuration.
    ///
    /// The context is OpenGL 3.3 core with a 24-bit depth buffer and an 8-bit stencil buffer.
    /// The width and height options are ignored if `fullscreen` is set.
    pub fn new(config: &WindowConfig) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video_subsystem = sdl.video()?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);
        gl_attr.set_stencil_size(8);
        if config.msaa_samples > 0 {
            gl_attr.set_multisample_buffers(1);
            gl_attr.set_multisample_samples(config.msaa_samples);
        }

        let (width, height) = if config.fullscreen {
            let display_mode = video_subsystem.current_display_mode(0)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (config.width, config.height)
        };
        let mut window = video_subsystem
            .window(&config.title, width, height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        window.set_fullscreen(if config.fullscreen {
            sdl2::video::FullscreenType::Desktop
        } else {
            sdl2::video::FullscreenType::Off
        })?;
        let gl_context = window.gl_create_context()?;
        window.gl_make_current(&gl_context)?;
        let interval = if config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Could not set swap interval: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        unsafe {
            log::info!(
                "OpenGL {} on {} ({})",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VENDOR)
            );
            gl.viewport(0, 0, width as i32, height as i32);
        }
        let event_pump = sdl.event_pump()?;
        let gl = Arc::new(gl);

        Ok(Self {
            sdl,
            _video_subsystem: video_subsystem,
            window,
            _gl_context: gl_context,
            gl,
            event_pump,
        })
    }

    /// Size of the drawable area in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }
}
