#![allow(dead_code)]

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    data::items::ItemDatabase,
    ecs::components::Renderable,
    economy::{Session, ShopStock},
    events::CoreEvent,
    floor::Floor,
    map::{Cell, classify::is_interior_wall},
};

pub struct Hud;

impl Hud {
    pub const fn new() -> Self {
        Self
    }

    pub fn draw(&self, ctx: &mut BTerm, session: &Session, floor: &Floor, db: &ItemDatabase) {
        let (width, _) = ctx.get_char_size();
        ctx.draw_box(0, 0, width - 1, 4, RGB::named(GRAY), RGB::named(BLACK));
        let profile = floor.profile.as_deref().unwrap_or("standard");
        ctx.print_color(
            2,
            1,
            RGB::named(WHITE),
            RGB::named(BLACK),
            format!(
                "Floor {} ({profile}) · Turn {} · Score {} · Points {}",
                session.floor,
                floor.ecs.turn(),
                session.total_score,
                session.points
            ),
        );

        let mut status = String::new();
        if floor.ecs.radar_remaining() > 0 {
            status.push_str(&format!("Radar {} ", floor.ecs.radar_remaining()));
        }
        if floor.is_aiming() {
            status.push_str("Aiming: pick a direction ");
        }
        if floor.is_input_locked() {
            status.push_str("...");
        }
        ctx.print_color(2, 2, RGB::named(LIGHT_BLUE), RGB::named(BLACK), status);

        let mut x = 2;
        for (idx, slot) in session.inventory.slots().iter().enumerate() {
            let label = format!("[{}] {} x{}", idx + 1, db.name(&slot.key), slot.count);
            if x + label.len() as i32 >= width as i32 - 2 {
                break;
            }
            ctx.print_color(x, 3, RGB::named(LIGHT_GREEN), RGB::named(BLACK), &label);
            x += label.len() as i32 + 2;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tone {
    Info,
    Item,
    Alert,
    Progress,
}

impl Tone {
    fn color(self) -> RGB {
        match self {
            Tone::Info => RGB::named(LIGHT_GRAY),
            Tone::Item => RGB::named(LIGHT_GREEN),
            Tone::Alert => RGB::named(RED),
            Tone::Progress => RGB::named(GOLD),
        }
    }
}

/// One line of the message panel.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub tone: Tone,
}

impl LogEntry {
    pub fn new<S: Into<String>>(text: S, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    /// Panel line for a core event. Messages tied to an item are tinted as loot;
    /// score ticks and map bookkeeping stay off the panel.
    pub fn from_event(event: &CoreEvent) -> Option<Self> {
        match event {
            CoreEvent::Message { text, .. } if text.is_empty() => None,
            CoreEvent::Message { text, item: Some(_) } => Some(Self::new(text.clone(), Tone::Item)),
            CoreEvent::Message { text, item: None } => Some(Self::new(text.clone(), Tone::Info)),
            CoreEvent::GameOver => Some(Self::new("You were caught!", Tone::Alert)),
            _ => None,
        }
    }
}

/// Message panel, newest line first. The title carries the floor's running score.
pub fn draw_log(ctx: &mut BTerm, log: &[LogEntry], start_y: i32, stage_score: i64) {
    let (width, _) = ctx.get_char_size();
    let rows = (log.len() as i32).clamp(1, 5);
    let top = (start_y - 1).max(0);
    ctx.draw_box(0, top, width - 1, rows + 1, RGB::named(DARK_GRAY), RGB::named(BLACK));
    ctx.print_color(
        2,
        top,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!(" Messages · floor score {stage_score} "),
    );
    for (row, entry) in log.iter().take(5).enumerate() {
        let color = if row == 0 {
            entry.tone.color()
        } else {
            entry.tone.color().lerp(RGB::named(BLACK), 0.35)
        };
        ctx.print_color(2, top + 1 + row as i32, color, RGB::named(BLACK), &entry.text);
    }
}

fn cell_glyph(floor: &Floor, point: Point) -> Option<(FontCharType, RGB)> {
    match floor.grid.cell_at(point)? {
        Cell::Floor => Some((to_cp437('.'), RGB::from_u8(90, 90, 110))),
        Cell::Wall if is_interior_wall(&floor.grid, point) => None,
        Cell::Wall => Some((to_cp437('#'), RGB::from_u8(150, 150, 170))),
    }
}

/// Entities show on revealed cells, or anywhere when lifted above the fog.
pub fn entity_visible(renderable: &Renderable, revealed: bool) -> bool {
    revealed || renderable.above_fog()
}

pub fn draw_map(ctx: &mut BTerm, floor: &Floor, map_origin: Point, reserved_rows: i32) {
    let (screen_w, screen_h) = ctx.get_char_size();
    let max_draw_y = screen_h as i32 - reserved_rows;
    let max_draw_x = screen_w as i32 - 2;

    for point in floor.grid.points() {
        let screen_x = map_origin.x + point.x;
        let screen_y = map_origin.y + point.y;
        if screen_x >= max_draw_x || screen_y >= max_draw_y {
            continue;
        }
        match cell_glyph(floor, point) {
            Some((glyph, fg)) if floor.fog.is_revealed(point) => {
                ctx.set(screen_x, screen_y, fg, RGB::named(BLACK), glyph);
            }
            _ => ctx.set(
                screen_x,
                screen_y,
                RGB::named(BLACK),
                RGB::named(BLACK),
                to_cp437(' '),
            ),
        }
    }

    floor.ecs.each_renderable(|point, renderable| {
        if !entity_visible(renderable, floor.fog.is_revealed(point)) {
            return;
        }
        let screen_x = map_origin.x + point.x;
        let screen_y = map_origin.y + point.y;
        if screen_x >= max_draw_x || screen_y >= max_draw_y {
            return;
        }
        ctx.set(
            screen_x,
            screen_y,
            renderable.color,
            RGB::named(BLACK),
            renderable.glyph,
        );
    });
}

pub fn draw_shop(ctx: &mut BTerm, stock: &ShopStock, session: &Session, db: &ItemDatabase) {
    let (width, _) = ctx.get_char_size();
    ctx.draw_box(4, 6, width - 9, 16, RGB::named(GOLD), RGB::named(BLACK));
    ctx.print_color_centered(7, RGB::named(YELLOW), RGB::named(BLACK), "~ Shop ~");
    ctx.print_color(
        6,
        9,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!("Points: {}", session.points),
    );
    for (idx, slot) in stock.slots.iter().enumerate() {
        let row = 11 + idx as i32;
        let line = match slot {
            Some(key) => format!("[{}] {:<16} {:>6}", idx + 1, db.name(key), db.price(key)),
            None => format!("[{}] sold out", idx + 1),
        };
        ctx.print(6, row, line);
    }
    ctx.print_color(
        6,
        19,
        RGB::named(GRAY),
        RGB::named(BLACK),
        format!(
            "r: restock ({})  x: leave  shift+1-9: sell",
            db.shop_reset_price
        ),
    );
}

pub fn draw_game_over(ctx: &mut BTerm, session: &Session) {
    ctx.print_color_centered(
        20,
        RGB::named(RED),
        RGB::named(BLACK),
        "You were caught!",
    );
    ctx.print_color_centered(
        22,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!(
            "Reached floor {} with {} score. Press z to try again.",
            session.floor, session.total_score
        ),
    );
}
