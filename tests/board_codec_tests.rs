//! The textual board form survives every position reachable by play.

use checkers::validation::{legal_moves, validate_and_apply};
use checkers::{Board, Side};
use proptest::prelude::*;

/// Plays `choices.len()` legal moves from the opening, picking each move by
/// index. Multi-jumps keep the same side on turn.
fn reachable(choices: &[usize]) -> Board {
    let mut board = Board::standard();
    let mut side = Side::Black;
    for &choice in choices {
        let moves = legal_moves(&board, side);
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice % moves.len()];
        let outcome = validate_and_apply(&board, side, mv).unwrap();
        board = outcome.board;
        if !outcome.must_continue_jump {
            side = side.opponent();
        }
    }
    board
}

proptest! {
    #[test]
    fn serialize_then_parse_is_identity(choices in prop::collection::vec(any::<usize>(), 0..120)) {
        let board = reachable(&choices);
        let text = board.to_string();
        prop_assert_eq!(text.parse::<Board>(), Ok(board.clone()));
        prop_assert!(board.count(Side::Black) <= 12);
        prop_assert!(board.count(Side::Red) <= 12);
    }
}
