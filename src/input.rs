use std::collections::HashSet;

use glam::Vec2;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
};

/// The current state of the keyboard.
///
/// `pressed` and `released` only hold keys whose state changed this frame, so a toggle bound
/// to `pressed` fires once per key press no matter how long the key is held.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

impl KeyboardState {
    pub fn press(&mut self, key: Keycode) {
        if self.down.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Keycode) {
        if self.down.remove(&key) {
            self.released.insert(key);
        }
    }

    pub fn is_down(&self, key: Keycode) -> bool {
        self.down.contains(&key)
    }

    pub fn was_pressed(&self, key: Keycode) -> bool {
        self.pressed.contains(&key)
    }
}

/// Mouse motion and wheel movement accumulated over the current frame.
#[derive(Default)]
pub struct MouseState {
    pub delta: Vec2,
    pub scroll_delta: Vec2,
}

/// Keyboard and mouse state accumulated from SDL events.
#[derive(Default)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputState {
    /// Clears the per-frame deltas and edge sets. Call once before polling events.
    pub fn begin_frame(&mut self) {
        self.mouse.delta = Vec2::ZERO;
        self.mouse.scroll_delta = Vec2::ZERO;
        self.keyboard.pressed.clear();
        self.keyboard.released.clear();
    }

    /// Folds one event into the state.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::MouseMotion { xrel, yrel, .. } => {
                self.mouse.delta += Vec2::new(*xrel as f32, *yrel as f32);
            }
            Event::MouseWheel { x, y, .. } => {
                self.mouse.scroll_delta += Vec2::new(*x as f32, *y as f32);
            }
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => self.keyboard.press(*keycode),
            Event::KeyUp {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => self.keyboard.release(*keycode),
            _ => {}
        }
    }
}

/// Whether the event changes the window size. SDL sends `SizeChanged` for every change,
/// fullscreen switches included, and an extra `Resized` after user or window manager ones, so
/// only the former is reported.
pub fn is_resize(event: &Event) -> bool {
    matches!(
        event,
        Event::Window {
            win_event: WindowEvent::SizeChanged(..),
            ..
        }
    )
}

/// Context provided to scenes during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    pub delta_time: f32,
    /// Seconds since the chapter started.
    pub time: f32,
}

impl<'a> UpdateContext<'a> {
    /// Creates a new `UpdateContext` from the given input state and timings.
    pub fn new(input: &'a InputState, delta_time: f32, time: f32) -> Self {
        Self {
            keyboard: &input.keyboard,
            mouse: &input.mouse,
            delta_time,
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_a_key_reports_one_press() {
        let mut input = InputState::default();
        input.keyboard.press(Keycode::K);
        assert!(input.keyboard.was_pressed(Keycode::K));

        input.begin_frame();
        // Key still held, no new press.
        input.keyboard.press(Keycode::K);
        assert!(input.keyboard.is_down(Keycode::K));
        assert!(!input.keyboard.was_pressed(Keycode::K));
    }

    #[test]
    fn release_only_counts_held_keys() {
        let mut keyboard = KeyboardState::default();
        keyboard.release(Keycode::W);
        assert!(keyboard.released.is_empty());

        keyboard.press(Keycode::W);
        keyboard.release(Keycode::W);
        assert!(!keyboard.is_down(Keycode::W));
        assert!(keyboard.released.contains(&Keycode::W));
    }

    #[test]
    fn only_size_changes_count_as_resizes() {
        let window = |win_event| Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event,
        };
        assert!(is_resize(&window(WindowEvent::SizeChanged(800, 600))));
        assert!(!is_resize(&window(WindowEvent::Resized(800, 600))));
        assert!(!is_resize(&window(WindowEvent::Moved(10, 10))));
        assert!(!is_resize(&Event::Quit { timestamp: 0 }));
    }

    #[test]
    fn begin_frame_resets_deltas_but_keeps_held_state() {
        let mut input = InputState::default();
        input.mouse.delta = Vec2::new(3.0, 4.0);
        input.mouse.scroll_delta = Vec2::Y;
        input.keyboard.press(Keycode::A);

        input.begin_frame();
        assert_eq!(input.mouse.delta, Vec2::ZERO);
        assert_eq!(input.mouse.scroll_delta, Vec2::ZERO);
        assert!(input.keyboard.is_down(Keycode::A));
        assert!(input.keyboard.pressed.is_empty());
    }
}
