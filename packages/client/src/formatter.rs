//! Message formatting utilities for client display.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kyodo_server::infrastructure::dto::websocket::{ParticipantDto, ServerMessage};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a message received from the server
    ///
    /// # Arguments
    ///
    /// * `message` - The decoded server message
    /// * `own_connection_id` - This client's connection ID (to mark as "me")
    ///
    /// # Returns
    ///
    /// The text to print, or `None` when the message is not shown
    pub fn format_server_message(
        message: &ServerMessage,
        own_connection_id: Option<&str>,
    ) -> Option<String> {
        let text = match message {
            ServerMessage::Connected(_) => return None,
            ServerMessage::RoomState(msg) => format!(
                "\n{}{}",
                Self::format_roster(&msg.participants, &msg.cursors, own_connection_id),
                Self::format_code(&msg.code, &msg.language)
            ),
            ServerMessage::UserJoined(msg) => {
                format!("\n+ {} joined\n", Self::display_name(&msg.participant))
            }
            ServerMessage::UserLeft(msg) => {
                format!("\n- {} left\n", Self::display_name(&msg.participant))
            }
            ServerMessage::ParticipantsUpdated(msg) => {
                let names: Vec<String> =
                    msg.participants.iter().map(Self::display_name).collect();
                format!("\nIn the room: {}\n", names.join(", "))
            }
            ServerMessage::CodeUpdated(msg) => format!(
                "\n~ code updated by {} ({} lines)\n",
                msg.connection_id,
                msg.code.lines().count()
            ),
            ServerMessage::LanguageUpdated(msg) => format!(
                "\n~ language switched to {} by {}\n",
                msg.language, msg.connection_id
            ),
            // Cursor moves are too frequent to print
            ServerMessage::CursorUpdated(_) => return None,
            ServerMessage::SimulationStarted(msg) => {
                let by = if Some(msg.connection_id.as_str()) == own_connection_id {
                    "you".to_string()
                } else {
                    msg.connection_id.clone()
                };
                format!("\n> simulation started by {} ({})\n", by, msg.language)
            }
            ServerMessage::Error(msg) => format!("\n! {}: {}\n", msg.reason, msg.message),
        };
        Some(text)
    }

    /// Format the participant list with each connection's cursor
    pub fn format_roster(
        participants: &[ParticipantDto],
        cursors: &BTreeMap<String, ParticipantDto>,
        own_connection_id: Option<&str>,
    ) -> String {
        let mut output = String::new();
        output.push_str(RULE);
        output.push_str("\nParticipants:\n");

        if participants.is_empty() {
            output.push_str("(No participants)\n");
        }
        for participant in participants {
            output.push_str(&format!("{}\n", Self::display_name(participant)));
            for (connection_id, presence) in cursors.iter().filter(|(_, p)| p.id == participant.id)
            {
                let me_suffix = if Some(connection_id.as_str()) == own_connection_id {
                    " (me)"
                } else {
                    ""
                };
                let position = presence
                    .cursor
                    .map(|c| format!("{}:{}", c.line, c.column))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "  {}{} at {}\n",
                    connection_id, me_suffix, position
                ));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format the code buffer with line numbers
    pub fn format_code(code: &str, language: &str) -> String {
        let mut output = format!("[{}]\n", language);
        if code.is_empty() {
            output.push_str("(empty)\n");
        }
        for (index, line) in code.lines().enumerate() {
            output.push_str(&format!("{:>4} | {}\n", index + 1, line));
        }
        output
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `kind` - The message type that was sent (e.g., "code-change")
    /// * `sent_at` - Unix timestamp when the message was sent (milliseconds)
    pub fn format_sent_confirmation(kind: &str, sent_at: i64) -> String {
        let clock = DateTime::<Utc>::from_timestamp_millis(sent_at)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        format!("{} sent at {}\n", kind, clock)
    }

    /// Format a text frame that could not be decoded
    pub fn format_raw_message(text: &str) -> String {
        format!("\n? {}\n", text)
    }

    fn display_name(participant: &ParticipantDto) -> String {
        if participant.name == participant.id {
            participant.id.clone()
        } else {
            format!("{} ({})", participant.name, participant.id)
        }
    }
}
