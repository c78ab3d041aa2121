#![cfg(target_arch = "wasm32")]

use anyhow::{anyhow, Context, Result};
use js_sys::{Array, Map, Reflect};
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement};

use crate::config::{FieldSource, GameConfig, Resolution};
use crate::game::Game;
use crate::input::InputEvent;
use crate::render::Renderer;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Render target size handed across the module boundary.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenResolution {
    pub x: u32,
    pub y: u32,
}

#[wasm_bindgen]
impl ScreenResolution {
    pub fn new(x: u32, y: u32) -> ScreenResolution {
        Self { x, y }
    }
}

impl From<ScreenResolution> for Resolution {
    fn from(value: ScreenResolution) -> Self {
        Resolution::new(value.x, value.y)
    }
}

/// Running game session owned by the host page.
#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    renderer: Renderer,
}

/// Starts a session. `resolution` must carry numeric `x` and `y` entries and
/// may override `canvas_id`, `scenario` and `substeps`.
#[wasm_bindgen]
pub fn init_game(resolution: Map) -> Result<WebGame, JsValue> {
    WebGame::create(&MapFields(&resolution)).map_err(|err| JsValue::from_str(&format!("{err:#}")))
}

#[wasm_bindgen]
impl WebGame {
    /// Applies the host events collected since the last call, steps the
    /// simulation and draws. Errors are logged rather than thrown so one bad
    /// frame never tears down the animation loop.
    pub fn render_frame(&mut self, events: Array) {
        let events = decode_events(&events);
        let frame = self.game.advance(&events);
        if let Err(err) = self.renderer.render(&frame, self.game.assets()) {
            error!("render failed: {err:#}");
        }
    }
}

impl WebGame {
    fn create(fields: &impl FieldSource) -> Result<Self> {
        let config = GameConfig::from_lookup(fields)?;
        let canvas = find_canvas(&config.canvas_id)?;
        let renderer = Renderer::new(canvas, config.resolution)?;
        let game = Game::new(config).context("failed to start game")?;
        info!(
            "game started at {}x{} with scenario {:?}",
            game.resolution().x,
            game.resolution().y,
            game.library()
                .get(game.current_scenario())
                .map(|scenario| scenario.name.as_str())
                .unwrap_or_default()
        );
        info!("scenarios: {}", game.library().listing());
        Ok(Self { game, renderer })
    }
}

fn find_canvas(id: &str) -> Result<HtmlCanvasElement> {
    let document = window()
        .and_then(|win| win.document())
        .ok_or_else(|| anyhow!("document not available"))?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("canvas element #{id} not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("element #{id} is not a canvas"))
}

fn decode_events(events: &Array) -> Vec<InputEvent> {
    events
        .iter()
        .filter_map(|value| {
            let fields = ObjectFields(&value);
            let Some(kind) = fields.text("type") else {
                warn!("skipping event without a type: {value:?}");
                return None;
            };
            InputEvent::from_fields(&kind, &fields)
                .map_err(|err| warn!("skipping event: {err}"))
                .ok()
        })
        .collect()
}

struct MapFields<'a>(&'a Map);

impl FieldSource for MapFields<'_> {
    fn number(&self, key: &str) -> Option<f64> {
        self.0
            .get(&JsValue::from_str(key))
            .as_f64()
            .filter(|value| value.is_finite())
    }

    fn text(&self, key: &str) -> Option<String> {
        self.0.get(&JsValue::from_str(key)).as_string()
    }
}

struct ObjectFields<'a>(&'a JsValue);

impl FieldSource for ObjectFields<'_> {
    fn number(&self, key: &str) -> Option<f64> {
        Reflect::get(self.0, &JsValue::from_str(key)).ok()?.as_f64()
    }

    fn text(&self, key: &str) -> Option<String> {
        Reflect::get(self.0, &JsValue::from_str(key)).ok()?.as_string()
    }
}
