use colored::*;
use tether_client::{ConnectionState, ConnectionStatus, SignalingError, SignalingListener};
use tether_core::Client;

/// Prints the events an operator cares about.
pub struct ConsoleListener {
    stream_id: String,
}

impl ConsoleListener {
    pub fn new(stream_id: &str) -> Self {
        Self {
            stream_id: stream_id.to_owned(),
        }
    }
}

impl SignalingListener for ConsoleListener {
    fn on_connection_opened(&self) {
        println!("{} {}", "▲".green(), self.stream_id.bold());
    }

    fn on_connection_error(&self, reason: &str) {
        println!("{} {} {}", "✗".red(), self.stream_id.bold(), reason.dimmed());
    }

    fn on_error(&self, error: &SignalingError) {
        println!("{} {} {}", "!".yellow(), self.stream_id.bold(), error);
    }

    fn on_streamers_available(&self, ids: &[String]) {
        if !ids.contains(&self.stream_id) {
            println!(
                "{} {} not offered by the server ({} available)",
                "?".yellow(),
                self.stream_id.bold(),
                ids.len()
            );
        }
    }

    fn on_client_connected(&self, client: &Client) {
        println!("{} {} media from {}", "●".green(), self.stream_id.bold(), client.id);
    }

    fn on_client_disconnected(&self, client: &Client) {
        println!("{} {} lost {}", "○".yellow(), self.stream_id.bold(), client.id);
    }

    fn on_client_connection_failed(&self, peer_id: &str, reason: &str) {
        println!(
            "{} {} {}: {}",
            "✗".red(),
            self.stream_id.bold(),
            peer_id,
            reason.dimmed()
        );
    }
}

pub fn status_line(stream_id: &str, status: &ConnectionStatus) -> String {
    let state = match status.state {
        ConnectionState::Connected => status.state.to_string().green(),
        ConnectionState::Connecting => status.state.to_string().cyan(),
        ConnectionState::Reconnecting => status.state.to_string().yellow(),
        ConnectionState::Disconnected => status.state.to_string().red(),
    };

    let mut line = format!("{:<20} {}", stream_id, state);
    if status.attempt_count > 0 {
        line.push_str(&format!(" (attempt {})", status.attempt_count));
    }
    if let Some(connected) = status.last_connected_time {
        line.push_str(&format!(", last connected {}s ago", connected.elapsed().as_secs()));
    }
    line
}
