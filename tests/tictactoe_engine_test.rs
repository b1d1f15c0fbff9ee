//! Tests for the tic-tac-toe state machine.

use strictly_lobby::{Board, Game, GameError, Identity, Outcome, Square};

fn players() -> (Identity, Identity) {
    (Identity::from("P1"), Identity::from("P2"))
}

#[test]
fn test_self_play_rejected() {
    let p = Identity::from("solo");
    let result = Game::new(p.clone(), p);
    assert!(matches!(result, Err(GameError::InvalidArgument(_))));
}

#[test]
fn test_out_of_turn_on_fresh_game() {
    let (p1, p2) = players();
    let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
    assert_eq!(game.make_move(&p2, 0), Err(GameError::OutOfTurn(p2)));
    assert_eq!(game.turn(), &p1);
    assert!(game.board().is_empty(0));
}

#[test]
fn test_column_win_with_interleaved_moves() {
    let (p1, p2) = players();
    let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
    game.make_move(&p1, 4).unwrap();
    game.make_move(&p2, 0).unwrap();
    game.make_move(&p1, 1).unwrap();
    game.make_move(&p2, 3).unwrap();
    assert_eq!(game.result(), Outcome::InProgress);
    game.make_move(&p1, 7).unwrap();
    assert_eq!(game.result(), Outcome::Won(p1));
}

#[test]
fn test_result_stable_after_win() {
    let (p1, p2) = players();
    let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
    for (player, loc) in [(&p1, 0), (&p2, 3), (&p1, 1), (&p2, 4), (&p1, 2)] {
        game.make_move(player, loc).unwrap();
    }
    let finished = game.clone();

    for loc in 0..10 {
        assert_eq!(game.make_move(&p2, loc), Err(GameError::GameOver));
        assert_eq!(game.make_move(&p1, loc), Err(GameError::GameOver));
    }
    assert_eq!(game, finished);
}

#[test]
fn test_precondition_order() {
    let (p1, p2) = players();
    let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
    game.make_move(&p1, 0).unwrap();
    let before = game.clone();

    // Out of turn and occupied: turn wins.
    assert_eq!(game.make_move(&p1, 0), Err(GameError::OutOfTurn(p1.clone())));
    assert_eq!(game, before);
    // In turn, out of range.
    assert_eq!(game.make_move(&p2, 9), Err(GameError::OutOfRange(9)));
    assert_eq!(game, before);
    // In turn, occupied.
    assert_eq!(game.make_move(&p2, 0), Err(GameError::CellOccupied(0)));
    assert_eq!(game, before);
    assert_eq!(game.turn(), &p2);
}

#[test]
fn test_turn_alternates_and_cells_are_write_once() {
    let (p1, p2) = players();
    let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
    let sequence = [4, 0, 8, 2, 1, 7, 6, 3, 5];
    let mut expected_turn = p1.clone();

    for loc in sequence {
        let before = game.clone();
        // Every already-marked cell rejects the mover.
        for taken in 0..9 {
            if !before.board().is_empty(taken) {
                assert_eq!(
                    game.make_move(&expected_turn, taken),
                    Err(GameError::CellOccupied(taken))
                );
                assert_eq!(game, before);
            }
        }

        if game.result().is_over() {
            break;
        }
        game.make_move(&expected_turn, loc).unwrap();
        assert_eq!(
            game.board().get(loc),
            Some(&Square::Occupied(expected_turn.clone()))
        );
        for cell in 0..9 {
            if let Some(Square::Occupied(owner)) = before.board().get(cell) {
                assert_eq!(game.board().get(cell), Some(&Square::Occupied(owner.clone())));
            }
        }

        expected_turn = if expected_turn == p1 { p2.clone() } else { p1.clone() };
        assert_eq!(game.turn(), &expected_turn);
    }
}

#[test]
fn test_full_board_without_line_is_draw() {
    let (p1, p2) = players();
    let mut game = Game::new(p1.clone(), p2.clone()).unwrap();
    // P1 P2 P1 / P1 P2 P2 / P2 P1 P1
    #[rustfmt::skip]
    let moves = [
        (&p1, 0), (&p2, 1), (&p1, 2),
        (&p2, 4), (&p1, 3), (&p2, 5),
        (&p1, 7), (&p2, 6), (&p1, 8),
    ];
    for (player, loc) in moves {
        game.make_move(player, loc).unwrap();
    }
    assert_eq!(game.result(), Outcome::Draw);
    assert!(game.board().empty_cells().is_empty());
}

#[test]
fn test_board_outcomes() {
    let a = Identity::from("A");
    let occupied = || Square::Occupied(a.clone());

    #[rustfmt::skip]
    let top_row = Board::from_squares([
        occupied(), occupied(), occupied(),
        Square::Empty, Square::Empty, Square::Empty,
        Square::Empty, Square::Empty, Square::Empty,
    ]);
    assert_eq!(top_row.outcome(), Outcome::Won(a.clone()));

    #[rustfmt::skip]
    let partial = Board::from_squares([
        occupied(), occupied(), Square::Empty,
        Square::Empty, Square::Empty, Square::Empty,
        Square::Empty, Square::Empty, Square::Empty,
    ]);
    assert_eq!(partial.outcome(), Outcome::InProgress);
    assert_eq!(partial.empty_cells(), vec![2, 3, 4, 5, 6, 7, 8]);
}
