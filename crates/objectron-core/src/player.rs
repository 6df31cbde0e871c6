use serde::{Deserialize, Serialize};

use crate::game_trait::PlayerId;

/// A player seated at an Objectron board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub color: PlayerColor,
}

/// Light-trail color of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Predefined trail colors, assigned in seating order.
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor {
            r: 255,
            g: 87,
            b: 87,
        }, // Red
        PlayerColor {
            r: 83,
            g: 152,
            b: 255,
        }, // Blue
        PlayerColor {
            r: 46,
            g: 213,
            b: 115,
        }, // Green
        PlayerColor {
            r: 255,
            g: 195,
            b: 18,
        }, // Yellow
    ];

    /// Palette color for the seat at `index`, wrapping around.
    pub fn for_seat(index: usize) -> PlayerColor {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>, seat: usize) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            color: PlayerColor::for_seat(seat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_colors_wrap() {
        assert_eq!(
            PlayerColor::for_seat(0),
            PlayerColor::for_seat(PlayerColor::PALETTE.len())
        );
        assert_ne!(PlayerColor::for_seat(0), PlayerColor::for_seat(1));
    }
}
