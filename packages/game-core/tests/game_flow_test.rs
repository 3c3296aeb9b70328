pub mod common;

use common::Harness;
use game_core::models::color::PlayerColor;
use game_core::models::moves::{MoveTag, PieceKind};
use game_core::models::outcome::{GameMethod, GameOutcome};
use game_core::models::position::STARTING_FEN;
use game_core::services::errors::service_errors::ServiceError;

#[tokio::test]
async fn test_play_save_fetch_and_undo() {
    let harness = Harness::new();
    let (white, black, mut game) = harness.new_game(1, 2).await;

    // 1) White opens, then tries to move again out of turn
    game.make_move(&white, "e2e4").await.unwrap();
    assert_eq!(
        game.make_move(&white, "e7e5").await.unwrap_err(),
        ServiceError::Forbidden("Not your turn".to_string()),
        "Second move by white should be refused"
    );
    assert_eq!(harness.store.move_count(game.id()), 1);

    // 2) Black answers and the game is saved
    game.make_move(&black, "e7e5").await.unwrap();
    game.save().await.unwrap();

    let last = game.last_move().expect("A move should have been recorded");
    assert_eq!(last.player, PlayerColor::Black);
    assert_eq!(last.piece, PieceKind::Pawn);
    assert_eq!((last.cell_from.as_str(), last.cell_to.as_str()), ("e7", "e5"));

    // 3) A fresh fetch replays to the same place
    let fetched = harness.games.fetch_game(game.id()).await.unwrap();
    assert_eq!(fetched.fen(), game.fen());
    assert_eq!(fetched.moves().len(), 2);
    assert_eq!(fetched.turn(), PlayerColor::White);
    assert_eq!(fetched.current_mover().onboard_id, white.onboard_id);

    // 4) Undo brings it back to black to move
    let mut fetched = fetched;
    fetched.undo_move().await.unwrap();
    assert_eq!(fetched.turn(), PlayerColor::Black);
    assert_eq!(fetched.moves().len(), 1);
    assert_eq!(harness.store.move_count(game.id()), 1);

    fetched.undo_move().await.unwrap();
    assert_eq!(fetched.fen(), STARTING_FEN);
    assert_eq!(
        fetched.undo_move().await.unwrap_err(),
        ServiceError::Forbidden("No moves to undo".to_string())
    );
}

#[tokio::test]
async fn test_illegal_and_malformed_moves_leave_no_trace() {
    let harness = Harness::new();
    let (white, _black, mut game) = harness.new_game(1, 2).await;

    assert_eq!(
        game.make_move(&white, "e2e5").await.unwrap_err(),
        ServiceError::Forbidden("Move is not valid in current position".to_string())
    );
    assert!(matches!(
        game.make_move(&white, "zz").await.unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
    assert_eq!(game.fen(), STARTING_FEN);
    assert_eq!(harness.store.move_count(game.id()), 0);
}

#[tokio::test]
async fn test_checkmate_is_reproduced_on_fetch() {
    let harness = Harness::new();
    let (white, black, mut game) = harness.new_game(1, 2).await;

    harness
        .play(&mut game, &white, &black, &["f2f3", "e7e5", "g2g4", "d8h4"])
        .await;
    game.save().await.unwrap();

    assert!(game.is_over());
    assert!(game.in_check());
    assert!(game.last_move().unwrap().has_tag(MoveTag::Check));
    assert!(game.legal_moves().is_empty());

    let fetched = harness.games.fetch_game(game.id()).await.unwrap();
    assert_eq!(fetched.outcome(), GameOutcome::BlackWon);
    assert_eq!(fetched.method(), GameMethod::Checkmate);
}

#[tokio::test]
async fn test_resignation_survives_fetch_and_ends_play() {
    let harness = Harness::new();
    let (mut white, mut black, mut game) = harness.new_game(1, 2).await;

    game.make_move(&white, "d2d4").await.unwrap();
    game.resign_game(&black).unwrap();
    game.save().await.unwrap();

    let mut fetched = harness.games.fetch_game(game.id()).await.unwrap();
    assert_eq!(fetched.outcome(), GameOutcome::WhiteWon);
    assert_eq!(fetched.method(), GameMethod::Resignation);
    assert_eq!(
        fetched.make_move(&black, "d7d5").await.unwrap_err(),
        ServiceError::Conflict("Game is already over".to_string())
    );

    // Both players walk away and can be seated again
    harness.chessboards.leave_game(&mut white).await.unwrap();
    harness.chessboards.leave_game(&mut black).await.unwrap();
    assert!(!white.is_in_game());
    assert!(harness
        .games
        .create_game(&mut black, &mut white)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_draw_offer_negotiation() {
    let harness = Harness::new();
    let (white, black, mut game) = harness.new_game(3, 4).await;

    // 1) White offers, cannot answer itself
    game.offer_draw(&white, GameMethod::DrawOffer).await.unwrap();
    assert_eq!(
        game.accept_draw(&white).unwrap_err(),
        ServiceError::Conflict("Cannot respond to your own draw offer".to_string())
    );

    // 2) The offer is visible to a fresh fetch, where black rejects it
    let mut fetched = harness.games.fetch_game(game.id()).await.unwrap();
    assert_eq!(fetched.offered_draw(), GameMethod::DrawOffer);
    assert_eq!(fetched.offering_player(), PlayerColor::White);
    fetched.reject_draw(&black).await.unwrap();
    assert_eq!(fetched.offered_draw(), GameMethod::NoMethod);
    assert_eq!(
        fetched.reject_draw(&black).await.unwrap_err(),
        ServiceError::Conflict("No draw offer is pending".to_string())
    );

    // 3) Black offers, white accepts
    fetched.offer_draw(&black, GameMethod::DrawOffer).await.unwrap();
    fetched.accept_draw(&white).unwrap();
    fetched.save().await.unwrap();

    let finished = harness.games.fetch_game(game.id()).await.unwrap();
    assert_eq!(finished.outcome(), GameOutcome::Draw);
    assert_eq!(finished.method(), GameMethod::DrawOffer);
}

#[tokio::test]
async fn test_outsiders_cannot_resign_or_answer_draws() {
    let harness = Harness::new();
    let (white, _black, mut game) = harness.new_game(1, 2).await;
    let outsider = harness.board(9).await;

    game.offer_draw(&white, GameMethod::DrawOffer).await.unwrap();

    assert_eq!(
        game.accept_draw(&outsider).unwrap_err(),
        ServiceError::Forbidden("Not a player in this game".to_string())
    );
    assert!(matches!(
        game.resign_game(&outsider).unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
    assert!(matches!(
        game.offer_draw(&outsider, GameMethod::DrawOffer).await.unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
}

#[tokio::test]
async fn test_fifty_move_claim() {
    let harness = Harness::new();
    let (opener, _, mut fresh) = harness.new_game(1, 2).await;
    assert!(matches!(
        fresh
            .offer_draw(&opener, GameMethod::FiftyMoveRule)
            .await
            .unwrap_err(),
        ServiceError::Conflict(_)
    ));

    let mut white = harness.board(5).await;
    let mut black = harness.board(6).await;
    let mut game = harness
        .games
        .create_game_from_position(&mut white, &mut black, "4k3/8/8/8/8/8/R7/4K3 w - - 100 80")
        .await
        .unwrap();

    assert!(matches!(
        game.offer_draw(&white, GameMethod::ThreefoldRepetition)
            .await
            .unwrap_err(),
        ServiceError::Conflict(_)
    ));

    game.offer_draw(&white, GameMethod::FiftyMoveRule).await.unwrap();
    assert_eq!(game.offered_draw(), GameMethod::FiftyMoveRule);
    assert_eq!(game.offering_player(), PlayerColor::White);

    game.accept_draw(&black).unwrap();
    assert_eq!(game.outcome(), GameOutcome::Draw);
    assert_eq!(game.method(), GameMethod::FiftyMoveRule);
}

#[tokio::test]
async fn test_undo_clears_pending_offer() {
    let harness = Harness::new();
    let (white, black, mut game) = harness.new_game(1, 2).await;

    game.make_move(&white, "g1f3").await.unwrap();
    game.offer_draw(&black, GameMethod::DrawOffer).await.unwrap();
    game.undo_move().await.unwrap();

    assert_eq!(game.offered_draw(), GameMethod::NoMethod);
    let fetched = harness.games.fetch_game(game.id()).await.unwrap();
    assert_eq!(fetched.offered_draw(), GameMethod::NoMethod);
    assert_eq!(fetched.offering_player(), PlayerColor::White);
}

#[tokio::test]
async fn test_render_board_starting_position() {
    let harness = Harness::new();
    let (_white, _black, game) = harness.new_game(1, 2).await;

    let rows: Vec<String> = game.render_board().lines().map(str::to_string).collect();

    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0], "r n b q k b n r");
    assert_eq!(rows[4], "- - - - - - - -");
    assert_eq!(rows[7], "R N B Q K B N R");
}

#[tokio::test]
async fn test_missing_game_after_save_is_not_found() {
    let harness = Harness::new();
    let (_white, _black, game) = harness.new_game(1, 2).await;

    harness.store.remove_game(game.id());

    assert_eq!(
        game.save().await.unwrap_err(),
        ServiceError::NotFound("Game".to_string())
    );
}

#[tokio::test]
async fn test_moves_leave_pending_offer_in_place() {
    let harness = Harness::new();
    let (white, black, mut game) = harness.new_game(1, 2).await;

    game.offer_draw(&black, GameMethod::DrawOffer).await.unwrap();
    harness
        .play(&mut game, &white, &black, &["e2e4", "c7c5", "g1f3"])
        .await;

    assert_eq!(game.offered_draw(), GameMethod::DrawOffer);
    assert_eq!(game.offering_player(), PlayerColor::Black);

    let fetched = harness.games.fetch_game(game.id()).await.unwrap();
    assert_eq!(fetched.moves().len(), 3);
    assert_eq!(fetched.offered_draw(), GameMethod::DrawOffer);
    assert_eq!(fetched.offering_player(), PlayerColor::Black);
}

#[tokio::test]
async fn test_differing_proposal_waits_for_pending_one() {
    let harness = Harness::new();
    let mut white = harness.board(5).await;
    let mut black = harness.board(6).await;
    let mut game = harness
        .games
        .create_game_from_position(&mut white, &mut black, "4k3/8/8/8/8/8/R7/4K3 w - - 100 80")
        .await
        .unwrap();

    game.offer_draw(&white, GameMethod::DrawOffer).await.unwrap();

    assert!(matches!(
        game.offer_draw(&black, GameMethod::FiftyMoveRule)
            .await
            .unwrap_err(),
        ServiceError::Conflict(_)
    ));
    assert_eq!(game.offered_draw(), GameMethod::DrawOffer);
    assert_eq!(game.offering_player(), PlayerColor::White);

    // Once the pending offer is answered the claim goes through
    game.reject_draw(&black).await.unwrap();
    game.offer_draw(&black, GameMethod::FiftyMoveRule).await.unwrap();
    assert_eq!(game.offering_player(), PlayerColor::Black);
}

#[tokio::test]
async fn test_largest_move_number_keeps_playing() {
    let harness = Harness::new();
    let mut white = harness.board(5).await;
    let mut black = harness.board(6).await;
    let mut game = harness
        .games
        .create_game_from_position(
            &mut white,
            &mut black,
            &format!("4k3/8/8/8/8/8/R7/4K3 b - - 0 {}", u32::MAX),
        )
        .await
        .unwrap();

    game.make_move(&black, "e8d8").await.unwrap();

    assert_eq!(game.turn(), PlayerColor::White);
    assert!(game.fen().ends_with(&format!("w - - 1 {}", u32::MAX)));
}
