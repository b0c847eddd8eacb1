use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use clap::Parser;

use crate::{
    abs::App,
    config::Config,
    input::{InputState, UpdateContext, is_resize},
    scenes::{CHAPTERS, SceneContext, SceneManager},
};

mod abs;
mod camera;
mod config;
mod geometry;
mod input;
mod logging;
mod model;
mod render;
mod scenes;

/// Real-time rendering chapters on OpenGL 3.3.
///
/// PageDown and PageUp move through the chapters, Escape quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Chapter to open, by name or 1-based number.
    chapter: Option<String>,

    /// JSON config file. Defaults to `learnopengl/config.json` in the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the chapters and exit.
    #[arg(long)]
    list: bool,
}

const TITLE_REFRESH: Duration = Duration::from_secs(1);

fn main() {
    let args = Args::parse();

    if args.list {
        for (i, chapter) in CHAPTERS.iter().enumerate() {
            println!("{:>2}  {}", i + 1, chapter.name);
        }
        return;
    }

    if let Err(e) = run(args) {
        if log::max_level() == log::LevelFilter::Off {
            eprintln!("error: {e}");
        } else {
            log::error!("{e}");
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // Still report through the usual channel.
            logging::init(&Config::default())?;
            return Err(e);
        }
    };
    logging::init(&config)?;

    let query = args.chapter.or_else(|| config.chapters.start.clone());
    let index = match query {
        Some(query) => scenes::chapter_index(&query)
            .ok_or_else(|| format!("unknown chapter '{query}', see --list"))?,
        None => 0,
    };

    let mut app = App::new(&config.window)?;
    app.sdl.mouse().set_relative_mouse_mode(true);

    let ctx = SceneContext::new(Arc::clone(&app.gl), config.clone(), app.drawable_size());
    let mut scene_manager = SceneManager::new(ctx, index)?;

    let mut input = InputState::default();
    let mut last_frame_time = Instant::now();
    let mut chapter_start = Instant::now();
    let mut title_timer = Instant::now();
    let mut frames = 0u32;

    'running: loop {
        let now = Instant::now();
        let delta_time = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        input.begin_frame();
        for event in app.event_pump.poll_iter() {
            input.handle_event(&event);
            scene_manager.handle_event(&event);
            if let sdl2::event::Event::Quit { .. } = event {
                break 'running;
            }
            if is_resize(&event) {
                let (width, height) = app.window.drawable_size();
                log::debug!("Resized to {width}x{height}");
                scene_manager.resize(width, height);
            }
        }

        let update_ctx = UpdateContext::new(
            &input,
            delta_time,
            chapter_start.elapsed().as_secs_f32(),
        );
        let chapter = scene_manager.index();
        if !scene_manager.update(&update_ctx) {
            break 'running;
        }
        if scene_manager.index() != chapter {
            chapter_start = Instant::now();
        }

        scene_manager.render();
        app.window.gl_swap_window();

        frames += 1;
        let elapsed = title_timer.elapsed();
        if elapsed >= TITLE_REFRESH {
            let fps = frames as f32 / elapsed.as_secs_f32();
            let title = format!(
                "{} - {}/{} {} - {:.0} FPS",
                config.window.title,
                scene_manager.index() + 1,
                CHAPTERS.len(),
                scene_manager.name(),
                fps
            );
            if let Err(e) = app.window.set_title(&title) {
                log::warn!("Could not set window title: {e}");
            }
            frames = 0;
            title_timer = Instant::now();
        }
    }

    log::info!("Bye");
    Ok(())
}
