use tracing::{info, warn};

use oven_common::SessionEvent;

/// Platform notification surface. The engine decides whether and when an
/// event fires; the sink owns display, retry, and dedup policy.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &SessionEvent, detail: &str);
}

/// Default sink: one structured log line per transition event.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &SessionEvent, detail: &str) {
        match event {
            SessionEvent::StartFailed(_)
            | SessionEvent::StopFailed(_)
            | SessionEvent::DeviceUnreachable => warn!("{}: {detail}", label(event)),
            _ => info!("{}: {detail}", label(event)),
        }
    }
}

pub fn dispatch(notifier: &dyn Notifier, events: &[SessionEvent]) {
    for event in events {
        notifier.notify(event, &detail_for(event));
    }
}

fn label(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::CookingStarted => "cooking started",
        SessionEvent::CookingCompleted => "cooking complete",
        SessionEvent::CookingStopped => "cooking stopped",
        SessionEvent::StartFailed(_) => "start failed",
        SessionEvent::StopFailed(_) => "stop failed",
        SessionEvent::DeviceUnreachable => "device unreachable",
    }
}

fn detail_for(event: &SessionEvent) -> String {
    match event {
        SessionEvent::CookingStarted => "Your food is now cooking".to_string(),
        SessionEvent::CookingCompleted => "Your food is ready!".to_string(),
        SessionEvent::CookingStopped => "Cooking has been stopped".to_string(),
        SessionEvent::StartFailed(reason) | SessionEvent::StopFailed(reason) => reason.clone(),
        SessionEvent::DeviceUnreachable => "Lost contact with the oven".to_string(),
    }
}
