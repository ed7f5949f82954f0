/// How long a load must run before the spinner is worth showing.
pub const SHOW_DELAY_MS: u32 = 400;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadingPhase {
    #[default]
    Idle,
    /// Busy, but still inside the grace window.
    PendingShow,
    Showing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateTimer {
    Start,
    Cancel,
}

/// Debounce machine for a loading spinner: short loads finish inside the
/// grace window and never flash the indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadingGate {
    phase: LoadingPhase,
}

impl LoadingGate {
    /// Feed the current busy flag. Returns what to do with the delay timer,
    /// if anything.
    pub fn on_navigation(&mut self, busy: bool) -> Option<GateTimer> {
        match (self.phase, busy) {
            (LoadingPhase::Idle, true) => {
                self.phase = LoadingPhase::PendingShow;
                Some(GateTimer::Start)
            }
            (LoadingPhase::PendingShow | LoadingPhase::Showing, false) => {
                self.phase = LoadingPhase::Idle;
                Some(GateTimer::Cancel)
            }
            _ => None,
        }
    }

    /// Delay timer fired. Late fires after a cancel race are harmless.
    pub fn on_timer(&mut self) {
        if self.phase == LoadingPhase::PendingShow {
            self.phase = LoadingPhase::Showing;
        }
    }

    pub fn is_showing(&self) -> bool {
        self.phase == LoadingPhase::Showing
    }

    pub fn phase(&self) -> LoadingPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_loads_never_show_the_spinner() {
        let mut gate = LoadingGate::default();
        assert_eq!(gate.on_navigation(true), Some(GateTimer::Start));
        assert!(!gate.is_showing());
        assert_eq!(gate.on_navigation(false), Some(GateTimer::Cancel));
        // a timer that lost the cancel race changes nothing
        gate.on_timer();
        assert_eq!(gate.phase(), LoadingPhase::Idle);
        assert!(!gate.is_showing());
    }

    #[test]
    fn slow_loads_show_after_the_delay() {
        let mut gate = LoadingGate::default();
        gate.on_navigation(true);
        gate.on_timer();
        assert!(gate.is_showing());
        assert_eq!(gate.on_navigation(false), Some(GateTimer::Cancel));
        assert!(!gate.is_showing());
    }

    #[test]
    fn repeated_busy_reports_never_stack_timers() {
        let mut gate = LoadingGate::default();
        assert_eq!(gate.on_navigation(true), Some(GateTimer::Start));
        assert_eq!(gate.on_navigation(true), None);
        gate.on_timer();
        assert_eq!(gate.on_navigation(true), None);
        assert!(gate.is_showing());
    }

    #[test]
    fn idle_reports_while_idle_are_no_ops() {
        let mut gate = LoadingGate::default();
        assert_eq!(gate.on_navigation(false), None);
        gate.on_timer();
        assert_eq!(gate.phase(), LoadingPhase::Idle);
    }
}
