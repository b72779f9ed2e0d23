use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::error::AppError;

/// Request families throttled independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Prices,
    News,
    Ask,
}

impl RequestKind {
    fn noun(self) -> &'static str {
        match self {
            RequestKind::Prices => "prices",
            RequestKind::News => "news",
            RequestKind::Ask => "an answer",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Client-side cooldown between same-kind requests.
///
/// Best-effort only: it lowers the chance of tripping the upstream rate limit
/// and knows nothing about server-side budgets.
#[derive(Debug, Clone)]
pub struct RequestGate {
    cooldown: Duration,
    last_accepted: HashMap<RequestKind, Instant>,
}

impl RequestGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: HashMap::new(),
        }
    }

    /// Accept and stamp `now`, or reject without touching the stored stamp.
    pub fn try_acquire(&mut self, kind: RequestKind, now: Instant) -> Result<(), AppError> {
        if let Some(last) = self.last_accepted.get(&kind) {
            if now.saturating_duration_since(*last) < self.cooldown {
                return Err(AppError::Throttled(self.wait_message(kind)));
            }
        }
        self.last_accepted.insert(kind, now);
        Ok(())
    }

    pub fn wait_message(&self, kind: RequestKind) -> String {
        format!(
            "Please wait {} before requesting {} again.",
            format_cooldown(self.cooldown),
            kind
        )
    }
}

fn format_cooldown(cooldown: Duration) -> String {
    if cooldown.subsec_millis() == 0 {
        format!("{}s", cooldown.as_secs())
    } else {
        format!("{}ms", cooldown.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> RequestGate {
        RequestGate::new(Duration::from_millis(1000))
    }

    #[test]
    fn first_request_is_accepted() {
        let mut gate = gate();
        assert!(gate.try_acquire(RequestKind::Prices, Instant::now()).is_ok());
    }

    #[test]
    fn rejects_inside_window_with_wait_message() {
        let mut gate = gate();
        let start = Instant::now();
        gate.try_acquire(RequestKind::Prices, start).unwrap();

        let err = gate
            .try_acquire(RequestKind::Prices, start + Duration::from_millis(400))
            .unwrap_err();

        assert!(matches!(err, AppError::Throttled(_)));
        assert_eq!(
            err.to_string(),
            "Please wait 1s before requesting prices again."
        );
    }

    #[test]
    fn rejection_does_not_extend_the_window() {
        let mut gate = gate();
        let start = Instant::now();
        gate.try_acquire(RequestKind::News, start).unwrap();
        gate.try_acquire(RequestKind::News, start + Duration::from_millis(900))
            .unwrap_err();

        assert!(gate
            .try_acquire(RequestKind::News, start + Duration::from_millis(1000))
            .is_ok());
    }

    #[test]
    fn kinds_are_independent() {
        let mut gate = gate();
        let start = Instant::now();
        gate.try_acquire(RequestKind::Prices, start).unwrap();

        assert!(gate
            .try_acquire(RequestKind::News, start + Duration::from_millis(10))
            .is_ok());
        assert!(gate
            .try_acquire(RequestKind::Ask, start + Duration::from_millis(20))
            .is_ok());
        assert!(gate
            .try_acquire(RequestKind::Prices, start + Duration::from_millis(30))
            .is_err());
    }

    #[test]
    fn sub_second_cooldowns_render_in_millis() {
        let gate = RequestGate::new(Duration::from_millis(1500));
        assert_eq!(
            gate.wait_message(RequestKind::News),
            "Please wait 1500ms before requesting news again."
        );
    }
}
