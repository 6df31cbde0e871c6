//! Whole-game scenarios driven through the public command interface.

use objectron_core::command::Command;
use objectron_core::game_trait::{GameEvent, TurnBasedGame};
use objectron_core::geometry::{Coordinate, Direction};
use objectron_core::test_helpers::{make_players, run_commands};
use objectron_grid::ObjectronGame;
use objectron_grid::builder::BoardBuilder;
use objectron_grid::cell::Cell;
use objectron_grid::config::ObjectronConfig;
use objectron_grid::error::GameError;
use objectron_grid::items::ItemKind;

fn quiet() -> ObjectronConfig {
    ObjectronConfig::default().without_random_failures()
}

fn c(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y)
}

#[test]
fn walking_down_the_east_edge() {
    let mut game = ObjectronGame::standard_with_config(&make_players(2), quiet()).unwrap();
    let north = Command::Move(Direction::North);
    let south = Command::Move(Direction::South);
    // Player 1 climbs the west edge while player 2 descends the east edge.
    let turns = [north, north, north, south, south, south];
    for _ in 0..3 {
        run_commands(&mut game, &turns);
    }

    let board = game.board();
    assert_eq!(board.get_player_at(c(9, 9)), Some(2));
    let trail: Vec<Coordinate> = board.light_trail(2).unwrap().cells().collect();
    assert_eq!(trail, vec![c(9, 6), c(9, 7), c(9, 8)]);
    for y in 0..6 {
        assert!(
            !board.grid().cell(c(9, y)).unwrap().has_light_trail(),
            "(9, {y}) should have faded"
        );
    }
    assert!(!game.is_game_over());
}

fn play(game: &mut ObjectronGame, player: u64, commands: &[Command]) {
    for &command in commands {
        game.execute(player, command)
            .unwrap_or_else(|e| panic!("player {player}: {command:?} failed: {e}"));
    }
}

#[test]
fn grenade_costs_three_actions_and_four_without_power() {
    use Direction::*;
    let step = Command::Move;
    for (power_failure, lost) in [(false, 3u8), (true, 4u8)] {
        let mut builder = BoardBuilder::new(quiet());
        builder.add_rectangle(5, 5).unwrap();
        builder
            .add_player_starting_position(c(0, 0))
            .add_player_starting_position(c(4, 4))
            .place_light_grenade(c(1, 1));
        let mut game = builder.build(&make_players(2)).unwrap();

        // Player 1 arms the grenade and walks off until its trail has left it.
        play(
            &mut game,
            1,
            &[
                step(SouthEast),
                Command::PickUp(1),
                Command::UseItem { item: 1, direction: None },
            ],
        );
        play(&mut game, 2, &[step(West), step(West), step(North)]);
        play(&mut game, 1, &[step(East), step(East), step(North)]);
        play(&mut game, 2, &[step(North), Command::EndTurn]);
        play(&mut game, 1, &[step(West), Command::EndTurn]);
        assert!(!game.board().grid().cell(c(1, 1)).unwrap().has_light_trail());
        if power_failure {
            game.place_power_failure(c(1, 1)).unwrap();
        }

        let events = game.execute(2, step(NorthWest)).unwrap();
        let exploded = events.iter().find_map(|e| match e {
            GameEvent::GrenadeExploded { actions_lost, victim: 2, .. } => Some(*actions_lost),
            _ => None,
        });
        assert_eq!(exploded, Some(lost));
        assert!(game.board().get_items_at(c(1, 1)).is_empty());
    }
}

#[test]
fn walls_reject_players_and_items() {
    let mut wall = Cell::wall();
    assert!(matches!(wall.add_player(1), Err(GameError::InvalidArgument(_))));
    for kind in [
        ItemKind::LightGrenade,
        ItemKind::ChargedIdentityDisk,
        ItemKind::UnchargedIdentityDisk,
        ItemKind::Teleporter,
        ItemKind::ForceFieldGenerator,
    ] {
        assert!(matches!(wall.add_item(1, kind), Err(GameError::Unsupported(_))));
    }
}

#[test]
fn linked_teleporters_hop_once() {
    let mut builder = BoardBuilder::new(quiet());
    builder.add_rectangle(6, 3).unwrap();
    builder
        .add_player_starting_position(c(0, 0))
        .add_player_starting_position(c(5, 2))
        .place_teleporter(c(1, 0), c(4, 0))
        .place_teleporter(c(4, 0), c(1, 0));
    let mut game = builder.build(&make_players(2)).unwrap();

    let events = game.execute(1, Command::Move(Direction::East)).unwrap();
    let hops = events
        .iter()
        .filter(|e| matches!(e, GameEvent::PlayerTeleported { .. }))
        .count();
    assert_eq!(hops, 1);
    assert_eq!(game.board().get_player_at(c(4, 0)), Some(1));
    assert_eq!(game.board().get_player_at(c(1, 0)), None);
    // The arrival pad swallowed its skip flag instead of bouncing back.
    assert!(!game.board().items().teleporter(2).unwrap().is_skipping());
    let trail: Vec<Coordinate> = game.board().light_trail(1).unwrap().cells().collect();
    assert_eq!(trail, vec![c(0, 0), c(1, 0)]);
}

#[test]
fn disk_thrown_along_an_empty_row_lands_four_cells_away() {
    let mut builder = BoardBuilder::new(ObjectronConfig {
        must_move_each_turn: false,
        ..quiet()
    });
    builder.add_rectangle(10, 2).unwrap();
    builder
        .add_player_starting_position(c(0, 0))
        .add_player_starting_position(c(9, 1))
        .place_uncharged_identity_disc(c(0, 0))
        .place_charged_identity_disc(c(0, 0));
    let mut game = builder.build(&make_players(2)).unwrap();

    game.execute(1, Command::PickUp(1)).unwrap();
    game.execute(1, Command::PickUp(2)).unwrap();
    game.execute(
        1,
        Command::UseItem {
            item: 1,
            direction: Some(Direction::East),
        },
    )
    .unwrap();
    assert_eq!(game.board().get_items_at(c(4, 0)), vec![1]);
    assert_eq!(game.board().inventory(1).unwrap(), &[2]);
    assert_eq!(game.current_player(), Some(2));
}

#[test]
fn game_over_rejects_everything() {
    let mut game = ObjectronGame::standard_with_config(&make_players(2), quiet()).unwrap();
    game.execute(1, Command::EndTurn).unwrap();
    assert_eq!(game.winner(), Some(2));
    for player in [1, 2] {
        assert_eq!(
            game.execute(player, Command::EndTurn),
            Err(GameError::GameOver)
        );
    }
}
