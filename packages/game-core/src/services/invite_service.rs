use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    models::{
        chessboard::Chessboard,
        color::PlayerColor,
        invite::{
            code_invite_id, direct_invite_id, generate_invite_code, Invite, InviteSender,
            PendingInvite,
        },
        user::User,
    },
    repositories::{
        chessboard_repository::ChessboardRepository,
        errors::invite_repository_errors::InviteRepositoryError,
        invite_repository::InviteRepository, user_repository::UserRepository,
    },
    services::{
        errors::service_errors::ServiceError, game_session::GameSession,
        game_session_service::GameSessionService,
    },
};

/// Color the recipient plays unless the sender picks otherwise.
pub const DEFAULT_RECIPIENT_COLOR: PlayerColor = PlayerColor::Black;

const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct InviteService {
    invites: Arc<dyn InviteRepository + Send + Sync>,
    chessboards: Arc<dyn ChessboardRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
    games: GameSessionService,
}

impl InviteService {
    pub fn new(
        invites: Arc<dyn InviteRepository + Send + Sync>,
        chessboards: Arc<dyn ChessboardRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
        games: GameSessionService,
    ) -> Self {
        InviteService {
            invites,
            chessboards,
            users,
            games,
        }
    }

    /// Creates an invite anyone holding the returned code can accept.
    pub async fn create_code_invite(&self, board: &Chessboard) -> Result<u32, ServiceError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_invite_code();
            let invite = Invite::with_code(board.onboard_id, code, Some(DEFAULT_RECIPIENT_COLOR));

            match self.invites.create_invite(&invite).await {
                Ok(()) => {
                    info!("Chessboard {} created invite code {}", board.onboard_id, code);
                    return Ok(code);
                }
                Err(InviteRepositoryError::AlreadyExists) => {
                    warn!("Invite code {} is taken, drawing another", code);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::Internal(
            "Could not allocate a free invite code".to_string(),
        ))
    }

    pub async fn cancel_code_invite(&self, code: u32) -> Result<(), ServiceError> {
        let rows = self.invites.delete_invite(&code_invite_id(code)).await?;
        if rows != 1 {
            return Err(ServiceError::NotFound("Invite".to_string()));
        }
        info!("Cancelled invite code {}", code);
        Ok(())
    }

    pub async fn send_invite(&self, sender: &Chessboard, recipient: &User) -> Result<(), ServiceError> {
        self.send_invite_with_color(sender, recipient, Some(DEFAULT_RECIPIENT_COLOR))
            .await
    }

    /// Sends a direct invite. `recipient_color` of `None` lets the recipient
    /// choose.
    pub async fn send_invite_with_color(
        &self,
        sender: &Chessboard,
        recipient: &User,
        recipient_color: Option<PlayerColor>,
    ) -> Result<(), ServiceError> {
        let invite = Invite::direct(sender.onboard_id, &recipient.id, recipient_color);

        self.invites
            .create_invite(&invite)
            .await
            .map_err(|e| match e {
                InviteRepositoryError::AlreadyExists => ServiceError::Conflict(
                    "There is already a pending invite for that user".to_string(),
                ),
                other => ServiceError::from(other),
            })?;

        info!(
            "Chessboard {} invited user {}",
            sender.onboard_id, recipient.id
        );
        Ok(())
    }

    pub async fn cancel_sent_invite(
        &self,
        sender: &Chessboard,
        recipient: &User,
    ) -> Result<(), ServiceError> {
        let rows = self
            .invites
            .delete_invite(&direct_invite_id(sender.onboard_id, &recipient.id))
            .await?;
        if rows != 1 {
            return Err(ServiceError::NotFound("Invite".to_string()));
        }
        Ok(())
    }

    pub async fn reject_invite(&self, invite_id: &str) -> Result<(), ServiceError> {
        let rows = self.invites.decline_invite(invite_id).await?;
        if rows != 1 {
            return Err(ServiceError::NotFound("Invite".to_string()));
        }
        info!("Invite {} rejected", invite_id);
        Ok(())
    }

    /// Invites waiting on `user`, each with the sending board's owner when
    /// one is known.
    pub async fn get_pending_invites(&self, user: &User) -> Result<Vec<PendingInvite>, ServiceError> {
        let invites = self.invites.get_pending_invites(&user.id).await?;

        let mut pending = Vec::with_capacity(invites.len());
        for invite in invites {
            let sender = self.sender_of(invite.sender_board_id).await?;
            pending.push(PendingInvite {
                invite_id: invite.id,
                sender_board_id: invite.sender_board_id,
                sender,
                your_color: invite.recipient_color,
            });
        }
        Ok(pending)
    }

    async fn sender_of(&self, onboard_id: u64) -> Result<Option<InviteSender>, ServiceError> {
        let owner_id = match self.chessboards.get_chessboard(onboard_id).await? {
            Some(Chessboard {
                owner_id: Some(owner_id),
                ..
            }) => owner_id,
            _ => return Ok(None),
        };

        Ok(self
            .users
            .get_user_by_id(&owner_id)
            .await?
            .map(|user| InviteSender {
                user_id: user.id,
                username: user.username,
            }))
    }

    pub async fn accept_invite(
        &self,
        recipient: &mut Chessboard,
        invite_id: &str,
        chosen_color: PlayerColor,
    ) -> Result<GameSession, ServiceError> {
        let invite = self.invites.get_invite(invite_id).await?;
        self.start_game(recipient, invite, chosen_color).await
    }

    pub async fn accept_code_invite(
        &self,
        recipient: &mut Chessboard,
        code: u32,
        chosen_color: PlayerColor,
    ) -> Result<GameSession, ServiceError> {
        let invite = self.invites.get_invite(&code_invite_id(code)).await?;
        self.start_game(recipient, invite, chosen_color).await
    }

    /// Turns an accepted invite into a game. Seating both boards is atomic;
    /// the invite is removed only afterwards.
    async fn start_game(
        &self,
        recipient: &mut Chessboard,
        invite: Option<Invite>,
        chosen_color: PlayerColor,
    ) -> Result<GameSession, ServiceError> {
        let invite = invite
            .filter(|invite| invite.accepts(recipient, chosen_color))
            .ok_or_else(|| ServiceError::NotFound("Invite".to_string()))?;

        let mut sender = self
            .chessboards
            .get_chessboard(invite.sender_board_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invite".to_string()))?;

        if sender.is_in_game() || recipient.is_in_game() {
            return Err(ServiceError::Conflict("Player(s) already in game".to_string()));
        }

        let game = match chosen_color {
            PlayerColor::White => self.games.create_game(recipient, &mut sender).await?,
            PlayerColor::Black => self.games.create_game(&mut sender, recipient).await?,
        };

        // The game is committed at this point and stays even if cleanup fails.
        let rows = self.invites.delete_invite(&invite.id).await.map_err(|e| {
            error!(
                "Game {} started but invite {} could not be deleted: {}",
                game.id(),
                invite.id,
                e
            );
            ServiceError::from(e)
        })?;
        if rows != 1 {
            error!(
                "Game {} started but invite {} was already gone",
                game.id(),
                invite.id
            );
            return Err(ServiceError::Internal(format!(
                "Invite {} deletion affected {} rows",
                invite.id, rows
            )));
        }

        info!(
            "Chessboard {} accepted invite {} as {}",
            recipient.onboard_id, invite.id, chosen_color
        );
        Ok(game)
    }
}
