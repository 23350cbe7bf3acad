//! Deterministic team colors.
//!
//! Each team owns an evenly spaced hue on the color wheel; the entity state
//! picks saturation and lightness from a fixed table.

use std::fmt;
use std::num::NonZeroU32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Visual state of an entity. Inactive styling wins over invulnerable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorState {
    Active,
    Invulnerable,
    Inactive,
}

impl ColorState {
    pub fn from_flags(invulnerable: bool, inactive: bool) -> Self {
        match (invulnerable, inactive) {
            (_, true) => ColorState::Inactive,
            (true, false) => ColorState::Invulnerable,
            (false, false) => ColorState::Active,
        }
    }

    /// Saturation and lightness as fractions.
    pub fn saturation_lightness(self) -> (f64, f64) {
        match self {
            ColorState::Active => (0.70, 0.50),
            ColorState::Invulnerable => (0.65, 0.60),
            ColorState::Inactive => (0.55, 0.80),
        }
    }
}

pub fn team_hue(team_id: u32, team_count: NonZeroU32) -> f64 {
    f64::from(team_id) * (360.0 / f64::from(team_count.get()))
}

/// Sector-based HSL to RGB conversion. `h` in degrees, `s` and `l` in `[0, 1]`.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if (0.0..60.0).contains(&h) {
        (c, x, 0.0)
    } else if (60.0..120.0).contains(&h) {
        (x, c, 0.0)
    } else if (120.0..180.0).contains(&h) {
        (0.0, c, x)
    } else if (180.0..240.0).contains(&h) {
        (0.0, x, c)
    } else if (240.0..300.0).contains(&h) {
        (x, 0.0, c)
    } else if (300.0..360.0).contains(&h) {
        (c, 0.0, x)
    } else {
        (0.0, 0.0, 0.0)
    };

    Rgb::new(to_channel(r + m), to_channel(g + m), to_channel(b + m))
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

pub fn color_for(team_id: u32, team_count: NonZeroU32, invulnerable: bool, inactive: bool) -> Rgb {
    let (s, l) = ColorState::from_flags(invulnerable, inactive).saturation_lightness();
    hsl_to_rgb(team_hue(team_id, team_count), s, l)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn reference_colors_for_two_teams() {
        assert_eq!(color_for(0, teams(2), false, false).to_hex(), "#d92626");
        assert_eq!(color_for(1, teams(2), false, false).to_hex(), "#26d9d9");
        assert_eq!(color_for(0, teams(2), true, false).to_hex(), "#db5757");
        assert_eq!(color_for(0, teams(2), false, true).to_hex(), "#e8b0b0");
    }

    #[test]
    fn inactive_overrides_invulnerable() {
        for team in 0..5 {
            assert_eq!(
                color_for(team, teams(5), true, true),
                color_for(team, teams(5), false, true)
            );
        }
        assert_eq!(ColorState::from_flags(true, true), ColorState::Inactive);
    }

    #[test]
    fn colors_are_deterministic() {
        for count in 1..=12 {
            for team in 0..count {
                for (invulnerable, inactive) in [(false, false), (true, false), (false, true)] {
                    let a = color_for(team, teams(count), invulnerable, inactive);
                    let b = color_for(team, teams(count), invulnerable, inactive);
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn hues_are_evenly_spaced_and_increasing() {
        for count in 1..=24u32 {
            let step = 360.0 / f64::from(count);
            let hues: Vec<f64> = (0..count).map(|team| team_hue(team, teams(count))).collect();
            assert_eq!(hues[0], 0.0);
            for pair in hues.windows(2) {
                assert!(pair[1] > pair[0]);
                assert!((pair[1] - pair[0] - step).abs() < 1e-9);
            }
            assert!(*hues.last().unwrap() < 360.0);
        }
    }

    #[test]
    fn distinct_teams_get_distinct_colors() {
        let colors: Vec<Rgb> = (0..6).map(|team| color_for(team, teams(6), false, false)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn primary_sectors() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(hsl_to_rgb(60.0, 0.0, 1.0), Rgb::new(255, 255, 255));
    }
}
