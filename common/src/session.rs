use crate::types::{DeviceSnapshot, SessionMode, SessionStatus};

/// Outcome of one status poll. Transport failures and non-success responses
/// collapse into `Unreachable`; the reconciler treats it as a first-class
/// input, not an error path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollResult {
    Snapshot(DeviceSnapshot),
    Unreachable,
}

/// Outcome of a start/stop command against the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Accepted,
    Rejected(String),
}

/// Edge-triggered transition events, emitted at most once per detected edge
/// and handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CookingStarted,
    CookingCompleted,
    CookingStopped,
    StartFailed(String),
    StopFailed(String),
    DeviceUnreachable,
}

/// The reconciled local view of the device, and the only writer of it.
///
/// Polls feed `reconcile`, the per-second ticker feeds `tick`, and command
/// results feed `finish_start`/`finish_stop`. The asymmetry the whole engine
/// exists to preserve: in TIMER mode the device countdown is authoritative
/// and every poll resynchronizes `display_seconds`, while in MANUAL mode the
/// elapsed counter is seeded once on mode entry and then advances locally so
/// poll jitter never makes it jump backward.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    mode: SessionMode,
    relay_on: bool,
    display_seconds: Option<u32>,
    last_temperature: Option<f64>,
    pending_command: bool,
    device_reachable: bool,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Idle,
            relay_on: false,
            display_seconds: None,
            last_temperature: None,
            pending_command: false,
            device_reachable: true,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn relay_on(&self) -> bool {
        self.relay_on
    }

    pub fn display_seconds(&self) -> Option<u32> {
        self.display_seconds
    }

    pub fn last_temperature(&self) -> Option<f64> {
        self.last_temperature
    }

    pub fn is_running(&self) -> bool {
        self.mode.is_running()
    }

    pub fn is_pending_command(&self) -> bool {
        self.pending_command
    }

    /// Applies one poll outcome and returns the transition events it caused.
    pub fn reconcile(&mut self, poll: PollResult) -> Vec<SessionEvent> {
        match poll {
            PollResult::Unreachable => self.reconcile_unreachable(),
            PollResult::Snapshot(snapshot) => self.reconcile_snapshot(snapshot),
        }
    }

    fn reconcile_unreachable(&mut self) -> Vec<SessionEvent> {
        let was_running = self.mode != SessionMode::Idle;

        self.mode = SessionMode::Idle;
        self.relay_on = false;
        self.display_seconds = None;
        self.device_reachable = false;

        if was_running {
            vec![SessionEvent::DeviceUnreachable]
        } else {
            Vec::new()
        }
    }

    fn reconcile_snapshot(&mut self, snapshot: DeviceSnapshot) -> Vec<SessionEvent> {
        let previous_mode = self.mode;
        self.device_reachable = true;

        if let Some(temperature) = snapshot.temperature {
            self.last_temperature = Some(temperature);
        }

        let next_mode = if snapshot.manual_mode {
            SessionMode::Manual
        } else if !snapshot.relay || snapshot.time_left == 0 {
            // Relay and mode are the primary signals; a lingering `cooking`
            // flag with the relay off still reconciles to idle.
            SessionMode::Idle
        } else {
            SessionMode::Timer
        };

        self.mode = next_mode;
        self.relay_on = snapshot.relay;

        match next_mode {
            SessionMode::Manual => {
                // Seed the elapsed counter on entry only; later polls must
                // not rewind a locally advancing count-up.
                if previous_mode != SessionMode::Manual {
                    self.display_seconds = Some(snapshot.time_left);
                }
            }
            SessionMode::Timer => {
                self.display_seconds = Some(snapshot.time_left);
            }
            SessionMode::Idle => {
                self.display_seconds = None;
            }
        }

        if previous_mode.is_running() && next_mode == SessionMode::Idle {
            // The device has no distinct abort signal; a relay drop without
            // an observed `cooking:false` counts as completion too.
            vec![SessionEvent::CookingCompleted]
        } else {
            Vec::new()
        }
    }

    /// One-second local interpolation between polls. A no-op outside the
    /// running modes, so a stray tick after teardown cannot mutate state.
    pub fn tick(&mut self) {
        match self.mode {
            SessionMode::Timer => {
                self.display_seconds = self.display_seconds.map(|s| s.saturating_sub(1));
            }
            SessionMode::Manual => {
                self.display_seconds = self.display_seconds.map(|s| s.saturating_add(1));
            }
            SessionMode::Idle => {}
        }
    }

    /// Records an independent temperature poll. Failures clear the reading
    /// and never touch cooking state.
    pub fn update_temperature(&mut self, reading: Option<f64>) {
        self.last_temperature = reading;
    }

    pub fn begin_command(&mut self) {
        self.pending_command = true;
    }

    /// Resolves an in-flight start command. A rejection surfaces the remote
    /// reason and leaves session state untouched; the next poll, not the
    /// command, moves the mode.
    pub fn finish_start(&mut self, outcome: CommandOutcome) -> Vec<SessionEvent> {
        self.pending_command = false;
        match outcome {
            CommandOutcome::Accepted => vec![SessionEvent::CookingStarted],
            CommandOutcome::Rejected(reason) => vec![SessionEvent::StartFailed(reason)],
        }
    }

    pub fn finish_stop(&mut self, outcome: CommandOutcome) -> Vec<SessionEvent> {
        self.pending_command = false;
        match outcome {
            CommandOutcome::Accepted => vec![SessionEvent::CookingStopped],
            CommandOutcome::Rejected(reason) => vec![SessionEvent::StopFailed(reason)],
        }
    }

    pub fn status(&self, now_epoch: i64) -> SessionStatus {
        SessionStatus {
            mode: self.mode.as_str(),
            relay_on: self.relay_on,
            display_seconds: self.display_seconds,
            temperature: self.last_temperature,
            pending_command: self.pending_command,
            device_reachable: self.device_reachable,
            now_epoch,
        }
    }
}
