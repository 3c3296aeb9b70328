use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::chessboard::Chessboard;
use crate::models::color::PlayerColor;

pub const INVITE_CODE_MIN: u32 = 100_000;
pub const INVITE_CODE_MAX: u32 = 999_999;

/// A pending offer to start a game. Direct invites are addressed to a user,
/// code invites to whoever presents the code.
///
/// Ids are derived from what makes an invite unique, so the store can reject
/// a second pending direct invite for the same pair (or a reused code) with a
/// plain conditional insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub id: String,
    pub sender_board_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_color: Option<PlayerColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<u32>,
    pub declined: bool,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn direct(
        sender_board_id: u64,
        recipient_user_id: &str,
        recipient_color: Option<PlayerColor>,
    ) -> Self {
        Invite {
            id: direct_invite_id(sender_board_id, recipient_user_id),
            sender_board_id,
            recipient_user_id: Some(recipient_user_id.to_string()),
            recipient_color,
            invite_code: None,
            declined: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_code(sender_board_id: u64, code: u32, recipient_color: Option<PlayerColor>) -> Self {
        Invite {
            id: code_invite_id(code),
            sender_board_id,
            recipient_user_id: None,
            recipient_color,
            invite_code: Some(code),
            declined: false,
            created_at: Utc::now(),
        }
    }

    /// Whether `recipient` may accept this invite while playing `chosen_color`.
    pub fn accepts(&self, recipient: &Chessboard, chosen_color: PlayerColor) -> bool {
        if self.declined || recipient.onboard_id == self.sender_board_id {
            return false;
        }

        let color_ok = self
            .recipient_color
            .map_or(true, |color| color == chosen_color);

        let recipient_ok = match &self.recipient_user_id {
            Some(user_id) => recipient.is_owned_by(user_id),
            None => true,
        };

        color_ok && recipient_ok
    }
}

pub fn direct_invite_id(sender_board_id: u64, recipient_user_id: &str) -> String {
    format!("direct:{}:{}", sender_board_id, recipient_user_id)
}

pub fn code_invite_id(code: u32) -> String {
    format!("code:{}", code)
}

pub fn generate_invite_code() -> u32 {
    rand::thread_rng().gen_range(INVITE_CODE_MIN..=INVITE_CODE_MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteSender {
    pub user_id: String,
    pub username: String,
}

/// An invite as shown to its recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInvite {
    pub invite_id: String,
    pub sender_board_id: u64,
    pub sender: Option<InviteSender>,
    pub your_color: Option<PlayerColor>,
}

impl PendingInvite {
    pub fn your_color_label(&self) -> &'static str {
        match self.your_color {
            Some(color) => color.as_str(),
            None => "YOUR_CHOICE",
        }
    }
}
