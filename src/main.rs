mod ai;
mod data;
mod ecs;
mod economy;
mod events;
mod floor;
mod map;
mod render;
mod scripted_input;

use std::{fs, path::Path};

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::*;
use log::{error, info, warn};

use data::{GameConfig, items::ItemDatabase};
use economy::{Session, ShopStock};
use events::{CoreEvent, EventLog};
use floor::{Direction, Floor, MoveOutcome};
use render::{Hud, LogEntry, Tone, draw_game_over, draw_log, draw_map, draw_shop};
use scripted_input::{Intent, ScriptedInput};

const SCREEN_HEIGHT: i32 = 50;
const MAP_ORIGIN_X: i32 = 2;
const MAP_ORIGIN_Y: i32 = 6;
const LOG_RESERVED_ROWS: i32 = 8;
const LOG_PANEL_START: i32 = SCREEN_HEIGHT - 7;
const LOG_MAX_ENTRIES: usize = 8;
const CONFIG_PATH: &str = "keycrawl.json";
const ITEMS_PATH: &str = "keycrawl_items.json";
const FLOOR_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

struct KeycrawlState {
    config: GameConfig,
    db: ItemDatabase,
    session: Session,
    floor: Floor,
    hud: Hud,
    shop: Option<ShopStock>,
    shop_rng: RandomNumberGenerator,
    run_seed: u64,
    message_log: Vec<LogEntry>,
    script: Option<ScriptedInput>,
    quit: bool,
}

impl KeycrawlState {
    fn new(config: GameConfig, db: ItemDatabase, run_seed: u64, script: Option<ScriptedInput>) -> Self {
        let session = Session::new(config.max_item_count);
        let floor = Floor::generate(&config, session.floor, floor_seed(run_seed, session.floor));
        let mut state = Self {
            config,
            db,
            session,
            floor,
            hud: Hud::new(),
            shop: None,
            shop_rng: RandomNumberGenerator::seeded(run_seed ^ 0x5_4077),
            run_seed,
            message_log: Vec::new(),
            script,
            quit: false,
        };
        state.push_log_entry(LogEntry::new("Find the key, then find the door.", Tone::Progress));
        state
    }

    fn read_intent(&mut self, ctx: &BTerm) -> Option<Intent> {
        if let Some(script) = self.script.as_mut() {
            if let Some(intent) = script.next_intent() {
                return Some(intent);
            }
        }
        let key = ctx.key?;
        let digit = match key {
            VirtualKeyCode::Key1 => Some(0),
            VirtualKeyCode::Key2 => Some(1),
            VirtualKeyCode::Key3 => Some(2),
            VirtualKeyCode::Key4 => Some(3),
            VirtualKeyCode::Key5 => Some(4),
            VirtualKeyCode::Key6 => Some(5),
            VirtualKeyCode::Key7 => Some(6),
            VirtualKeyCode::Key8 => Some(7),
            VirtualKeyCode::Key9 => Some(8),
            _ => None,
        };
        if let Some(slot) = digit {
            return Some(if ctx.shift {
                Intent::Sell(slot)
            } else {
                Intent::UseItem(slot)
            });
        }
        let intent = match key {
            VirtualKeyCode::Left | VirtualKeyCode::A | VirtualKeyCode::H => {
                Intent::Move(Direction::West)
            }
            VirtualKeyCode::Right | VirtualKeyCode::D | VirtualKeyCode::L => {
                Intent::Move(Direction::East)
            }
            VirtualKeyCode::Up | VirtualKeyCode::W | VirtualKeyCode::K => {
                Intent::Move(Direction::North)
            }
            VirtualKeyCode::Down | VirtualKeyCode::S | VirtualKeyCode::J => {
                Intent::Move(Direction::South)
            }
            VirtualKeyCode::Y => Intent::Move(Direction::NorthWest),
            VirtualKeyCode::U => Intent::Move(Direction::NorthEast),
            VirtualKeyCode::B => Intent::Move(Direction::SouthWest),
            VirtualKeyCode::N => Intent::Move(Direction::SouthEast),
            VirtualKeyCode::E | VirtualKeyCode::G => Intent::Interact,
            VirtualKeyCode::R => Intent::Reroll,
            VirtualKeyCode::X => Intent::Leave,
            VirtualKeyCode::Z => Intent::Restart,
            VirtualKeyCode::Q | VirtualKeyCode::Escape => Intent::Quit,
            _ => return None,
        };
        Some(intent)
    }

    fn handle_intent(&mut self, intent: Intent) {
        if intent == Intent::Quit {
            self.quit = true;
            return;
        }
        if self.session.game_over {
            if intent == Intent::Restart {
                self.restart();
            }
            return;
        }
        if self.shop.is_some() {
            self.handle_shop_intent(intent);
            return;
        }

        match intent {
            Intent::Move(direction) => {
                let outcome = self.floor.try_move(direction, &mut self.session);
                self.flush_events();
                if matches!(outcome, MoveOutcome::ReachedExit | MoveOutcome::ReachedShop) {
                    self.next_floor();
                }
            }
            Intent::Interact => {
                self.floor.interact(&mut self.session, &self.db);
            }
            Intent::UseItem(slot) => match self.session.inventory.key_at(slot) {
                Some(key) => {
                    let key = key.to_string();
                    self.floor.use_item(&key, &mut self.session, &self.db);
                }
                None => self.push_log_entry(LogEntry::new(format!("Slot {} is empty.", slot + 1), Tone::Info)),
            },
            Intent::Sell(_) | Intent::Reroll | Intent::Leave | Intent::Restart | Intent::Quit => {}
        }
    }

    fn handle_shop_intent(&mut self, intent: Intent) {
        let Some(shop) = self.shop.as_mut() else {
            return;
        };
        let mut sink = EventLog::default();
        match intent {
            Intent::UseItem(slot) => {
                shop.purchase(slot, &mut self.session, &self.db, &mut sink);
            }
            Intent::Sell(slot) => {
                if let Some(key) = self.session.inventory.key_at(slot).map(str::to_string) {
                    shop.sell(&key, &mut self.session, &self.db, &mut sink);
                }
            }
            Intent::Reroll => {
                shop.reroll(&mut self.session, &self.db, &mut self.shop_rng, &mut sink);
            }
            Intent::Leave => {
                self.shop = None;
                self.push_log_entry(LogEntry::new("You leave the shop.", Tone::Info));
            }
            _ => {}
        }
        self.apply_events(sink.drain());
    }

    fn next_floor(&mut self) {
        self.session.advance_floor();
        if self.session.next_stage_is_shop {
            self.session.next_stage_is_shop = false;
            self.shop = Some(ShopStock::roll(
                self.config.shop_slots,
                &self.db,
                &mut self.shop_rng,
            ));
            self.push_log_entry(LogEntry::new("Welcome to the shop!", Tone::Progress));
        }
        self.regenerate();
        self.push_log_entry(LogEntry::new(format!("Floor {}.", self.session.floor), Tone::Progress));
    }

    fn regenerate(&mut self) {
        let seed = floor_seed(self.run_seed, self.session.floor);
        self.floor = Floor::generate(&self.config, self.session.floor, seed);
        if self.floor.report.has_critical() {
            warn!("floor {} may not be solvable", self.session.floor);
        }
        // Construction chatter (tiles, spawns, spawn-area reveal) is not session news.
        self.floor.drain_events();
    }

    fn restart(&mut self) {
        self.session.restart();
        self.shop = None;
        self.run_seed = self.run_seed.wrapping_add(1);
        self.regenerate();
        self.message_log.clear();
        self.push_log_entry(LogEntry::new("A new run begins.", Tone::Progress));
    }

    fn flush_events(&mut self) {
        let events = self.floor.drain_events();
        self.apply_events(events);
    }

    fn apply_events(&mut self, events: Vec<CoreEvent>) {
        for event in events {
            self.session.apply(&event);
            if let Some(entry) = LogEntry::from_event(&event) {
                self.push_log_entry(entry);
            }
        }
    }

    fn push_log_entry(&mut self, entry: LogEntry) {
        self.message_log.insert(0, entry);
        self.message_log.truncate(LOG_MAX_ENTRIES);
    }

    fn draw_scene(&self, ctx: &mut BTerm) {
        self.hud.draw(ctx, &self.session, &self.floor, &self.db);
        draw_map(
            ctx,
            &self.floor,
            Point::new(MAP_ORIGIN_X, MAP_ORIGIN_Y),
            LOG_RESERVED_ROWS,
        );
        if let Some(shop) = &self.shop {
            draw_shop(ctx, shop, &self.session, &self.db);
        }
        if self.session.game_over {
            draw_game_over(ctx, &self.session);
        }
        draw_log(ctx, &self.message_log, LOG_PANEL_START, self.session.stage_score);
    }
}

impl GameState for KeycrawlState {
    fn tick(&mut self, ctx: &mut BTerm) {
        if let Some(intent) = self.read_intent(ctx) {
            self.handle_intent(intent);
        }
        if self.quit {
            info!(
                "quitting on floor {} with {} score",
                self.session.floor, self.session.total_score
            );
            ctx.quitting = true;
            return;
        }
        self.floor.tick(&mut self.session);
        self.flush_events();
        ctx.cls();
        self.draw_scene(ctx);
    }
}

fn floor_seed(run_seed: u64, floor: u32) -> u64 {
    run_seed.wrapping_add(FLOOR_SEED_STRIDE.wrapping_mul(floor as u64))
}

fn load_config() -> GameConfig {
    if !Path::new(CONFIG_PATH).exists() {
        return GameConfig::default();
    }
    match GameConfig::load(CONFIG_PATH) {
        Ok(config) => {
            info!("loaded {CONFIG_PATH}");
            config
        }
        Err(err) => {
            error!("ignoring {CONFIG_PATH}: {err}");
            GameConfig::default()
        }
    }
}

fn load_items() -> ItemDatabase {
    let Ok(text) = fs::read_to_string(ITEMS_PATH) else {
        return ItemDatabase::builtin();
    };
    match ItemDatabase::from_json_str(&text) {
        Ok(db) => {
            info!("loaded {} items from {ITEMS_PATH}", db.items().len());
            db
        }
        Err(err) => {
            error!("ignoring {ITEMS_PATH}: {err}");
            ItemDatabase::builtin()
        }
    }
}

fn main() -> BError {
    env_logger::init();

    let script = match std::env::args().nth(1) {
        Some(path) => match ScriptedInput::from_file(&path) {
            Ok(script) => {
                info!("replaying {} scripted inputs from {path}", script.remaining());
                Some(script)
            }
            Err(err) => {
                error!("{err}");
                None
            }
        },
        None => None,
    };

    let run_seed = chrono::Utc::now().timestamp_millis() as u64;
    info!("run seed {run_seed}");
    let mut game_state = KeycrawlState::new(load_config(), load_items(), run_seed, script);
    game_state.floor.drain_events();

    let context = BTermBuilder::simple80x50()
        .with_title("Keycrawl")
        .build()?;
    main_loop(context, game_state)
}
