//! Presentation of state machine events.

use crate::domain::Event;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, warn};

/// How a single event is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// JSON line for stdout, when `--print-events` is on.
    pub stdout: Option<String>,
    /// Log level for the human-readable line.
    pub level: Level,
    pub text: String,
}

/// Decide how to show `event`.
///
/// Notifications go to info level when enabled and debug level otherwise;
/// failures are always errors.
pub fn render(
    event: &Event,
    print_events: bool,
    notifications: bool,
) -> Result<Rendered, serde_json::Error> {
    let stdout = if print_events {
        Some(serde_json::to_string(event)?)
    } else {
        None
    };

    let (level, text) = match event {
        Event::Notification { kind, message } => {
            let level = if notifications {
                Level::INFO
            } else {
                Level::DEBUG
            };
            (level, format!("[{}] {}", kind.as_str(), message))
        }
        Event::Failure { context, detail } => {
            (Level::ERROR, format!("Taskbar error ({context}): {detail}"))
        }
    };

    Ok(Rendered {
        stdout,
        level,
        text,
    })
}

/// Render events until the state machine side of the channel closes.
pub async fn present_events(
    mut events: mpsc::UnboundedReceiver<Event>,
    print_events: bool,
    notifications: bool,
) {
    while let Some(event) = events.recv().await {
        let rendered = match render(&event, print_events, notifications) {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to serialize event: {}", e);
                continue;
            }
        };

        if let Some(line) = &rendered.stdout {
            println!("{line}");
        }

        if rendered.level == Level::ERROR {
            error!("{}", rendered.text);
        } else if rendered.level == Level::INFO {
            info!("{}", rendered.text);
        } else {
            debug!("{}", rendered.text);
        }
    }
}
