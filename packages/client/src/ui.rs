//! UI utilities for the client.

use std::io::Write;

/// Prompt shown by the line editor
pub fn prompt(user_id: &str, room_id: &str) -> String {
    format!("{}@{}> ", user_id, room_id)
}

/// Redisplay the prompt after printing asynchronous output
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}
