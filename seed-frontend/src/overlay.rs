//! The schedule animation: a canvas sitting over the map, stroking the
//! trail each in-service trip covered in the window behind the clock's
//! current time. The frame loop is a stored `requestAnimationFrame` handle —
//! dropping the handle is the cancellation, there is no orphaned callback
//! chain.

use std::collections::HashMap;

use seed::prelude::*;
use seed::util;
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use map_model::clock::{ClockConfig, ScheduleClock, Transition};
use map_model::schedule::{ScheduleTile, TileCoord};

use crate::map::MapView;

/// Data seconds of travel the trail behind each vehicle shows.
const TRAIL_SECONDS: f64 = 180.0;
const TRAIL_COLOR: &str = "rgb(253, 128, 93)";
const TRAIL_WIDTH: f64 = 2.0;

pub struct ScheduleOverlay {
    canvas: ElRef<HtmlCanvasElement>,
    clock: ScheduleClock,
    tiles: HashMap<TileCoord, ScheduleTile>,
    /// Fetch batch the stored tiles belong to; responses from older
    /// batches are dropped instead of racing the current view.
    generation: u64,
    scheduled_frame: Option<util::RequestAnimationFrameHandle>,
}

impl ScheduleOverlay {
    pub fn new() -> Self {
        ScheduleOverlay {
            canvas: ElRef::new(),
            clock: ScheduleClock::new(ClockConfig::default()),
            tiles: HashMap::new(),
            generation: 0,
            scheduled_frame: None,
        }
    }

    pub fn canvas(&self) -> &ElRef<HtmlCanvasElement> {
        &self.canvas
    }

    /// Start a fetch round for the given tile cover, dropping tiles that
    /// scrolled out of view. Returns the round's generation tag.
    pub fn begin_batch(&mut self, cover: &[TileCoord]) -> u64 {
        self.generation += 1;
        self.tiles.retain(|coord, _| cover.contains(coord));
        self.generation
    }

    pub fn needs(&self, coord: TileCoord) -> bool {
        !self.tiles.contains_key(&coord)
    }

    /// Apply a fetched tile unless a newer batch has superseded it.
    pub fn receive(&mut self, generation: u64, coord: TileCoord, tile: ScheduleTile) -> bool {
        if generation != self.generation {
            seed::log!("dropping stale schedule tile", coord);
            return false;
        }
        self.tiles.insert(coord, tile);
        true
    }

    /// Reconcile the clock with "should the animation run". The caller owns
    /// the decision (animate toggle && animation zoom); the returned
    /// transition tells it to schedule the first frame or to tear down.
    pub fn sync_running(&mut self, run: bool) -> Option<Transition> {
        let transition = self.clock.set_running(run);
        if transition == Some(Transition::Stopped) {
            // cancel the pending callback and leave a clean map
            self.scheduled_frame = None;
            self.clear();
        }
        transition
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Store the pending frame callback handle. Overwriting (or stopping)
    /// drops the previous one, which cancels it.
    pub fn frame_scheduled(&mut self, handle: util::RequestAnimationFrameHandle) {
        self.scheduled_frame = Some(handle);
    }

    /// One animation frame: advance the clock and redraw. Returns whether
    /// the loop should continue — false when a stop transition landed
    /// between scheduling and delivery.
    pub fn frame(&mut self, timestamp_ms: f64, map: &MapView) -> bool {
        self.scheduled_frame = None;
        match self.clock.tick(timestamp_ms / 1000.0) {
            None => false,
            Some(current_time) => {
                self.draw(map, current_time);
                true
            }
        }
    }

    fn draw(&self, map: &MapView, current_time: f64) {
        let canvas = match self.canvas.get() {
            None => return,
            Some(canvas) => canvas,
        };
        // match the canvas backing store to the container before painting
        let (width, height) = (canvas.client_width(), canvas.client_height());
        if canvas.width() != width as u32 || canvas.height() != height as u32 {
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
        }

        let ctx = seed::canvas_context_2d(&canvas);
        ctx.clear_rect(0., 0., f64::from(width), f64::from(height));
        ctx.set_stroke_style(&JsValue::from_str(TRAIL_COLOR));
        ctx.set_line_width(TRAIL_WIDTH);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");

        for tile in self.tiles.values() {
            for line in tile.active_lines(current_time) {
                let trail = line.trail(current_time, TRAIL_SECONDS);
                if trail.len() < 2 {
                    continue;
                }
                ctx.begin_path();
                for (i, point) in trail.iter().enumerate() {
                    let (x, y) = map.project(point.x(), point.y());
                    if i == 0 {
                        ctx.move_to(x, y);
                    } else {
                        ctx.line_to(x, y);
                    }
                }
                ctx.stroke();
            }
        }
    }

    fn clear(&self) {
        if let Some(canvas) = self.canvas.get() {
            let ctx = seed::canvas_context_2d(&canvas);
            ctx.clear_rect(0., 0., f64::from(canvas.width()), f64::from(canvas.height()));
        }
    }
}
