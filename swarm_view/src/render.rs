use crate::classify::{ClassifiedSnapshot, TeamEntity};
use crate::color::{color_for, Rgb};
use crate::surface::Surface;
use swarm_proto::Food;

pub const INACTIVE_FOOD_COLOR: Rgb = Rgb::new(0x80, 0x80, 0x80);
pub const ACTIVE_FOOD_COLOR: Rgb = Rgb::new(0x90, 0xee, 0x90);
pub const OVERLAY_TEXT_COLOR: Rgb = Rgb::new(0xff, 0xff, 0xff);

const OVERLAY_X: f64 = 10.0;
const OVERLAY_TOTAL_Y: f64 = 30.0;
const OVERLAY_FIRST_TEAM_Y: f64 = 50.0;
const OVERLAY_LINE_STEP: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStat {
    pub team: u32,
    pub count: usize,
    pub color: Rgb,
}

/// Aggregate counts shown on top of the scene and in the stats table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayStats {
    pub active_total: usize,
    pub teams: Vec<TeamStat>,
}

impl OverlayStats {
    pub fn from_classified(classified: &ClassifiedSnapshot) -> Self {
        let teams = classified
            .per_team_active_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(team, count)| TeamStat {
                team: *team,
                count: *count,
                color: color_for(*team, classified.team_count, false, false),
            })
            .collect();
        Self {
            active_total: classified.active_total(),
            teams,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.teams.len() + 1);
        lines.push(format!("Active Count: {}", self.active_total));
        lines.extend(
            self.teams
                .iter()
                .map(|stat| format!("Team {} Count: {}", stat.team, stat.count)),
        );
        lines
    }
}

/// Paints a classified snapshot back to front:
/// inactive entities, inactive food, active food, active entities, overlay.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer;

impl SceneRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        classified: &ClassifiedSnapshot,
    ) -> OverlayStats {
        surface.clear();

        for entity in &classified.inactive_entities {
            let color = color_for(entity.team, classified.team_count, false, true);
            draw_entity(surface, entity, color);
        }
        for food in &classified.inactive_food {
            draw_food(surface, food, INACTIVE_FOOD_COLOR);
        }
        for food in &classified.active_food {
            draw_food(surface, food, ACTIVE_FOOD_COLOR);
        }
        for entity in &classified.active_entities {
            let color = color_for(
                entity.team,
                classified.team_count,
                entity.invulnerable,
                false,
            );
            draw_entity(surface, entity, color);
        }

        let stats = OverlayStats::from_classified(classified);
        draw_overlay(surface, &stats);
        stats
    }
}

fn draw_entity<S: Surface + ?Sized>(surface: &mut S, entity: &TeamEntity, color: Rgb) {
    surface.fill_circle(entity.x, entity.y, entity.radius, color);
}

fn draw_food<S: Surface + ?Sized>(surface: &mut S, food: &Food, color: Rgb) {
    surface.fill_diamond(food.x, food.y, food.size, color);
}

fn draw_overlay<S: Surface + ?Sized>(surface: &mut S, stats: &OverlayStats) {
    for (index, line) in stats.lines().iter().enumerate() {
        let y = if index == 0 {
            OVERLAY_TOTAL_Y
        } else {
            OVERLAY_FIRST_TEAM_Y + (index - 1) as f64 * OVERLAY_LINE_STEP
        };
        surface.fill_text(line, OVERLAY_X, y, OVERLAY_TEXT_COLOR);
    }
}
