/// Inactivity window after a first digit before the field reverts to
/// fresh-entry mode.
pub const DIGIT_RESET_MS: u32 = 2_000;

/// Time-of-day value edited one component at a time. Hours are stored on the
/// 24-hour clock regardless of how a field displays them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Am,
    Pm,
}

/// One editable segment of a [`ClockTime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Hours24,
    Hours12,
    Minutes,
    Seconds,
    Period,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRange {
    pub min: u8,
    pub max: u8,
}

impl FieldKind {
    /// Inclusive value range; numeric writes clamp into it and arrow steps
    /// wrap around it.
    pub const fn range(self) -> FieldRange {
        match self {
            FieldKind::Hours24 => FieldRange { min: 0, max: 23 },
            FieldKind::Hours12 => FieldRange { min: 1, max: 12 },
            FieldKind::Minutes | FieldKind::Seconds => FieldRange { min: 0, max: 59 },
            FieldKind::Period => FieldRange { min: 0, max: 1 },
        }
    }
}

impl ClockTime {
    pub fn period(self) -> Period {
        if self.hour >= 12 {
            Period::Pm
        } else {
            Period::Am
        }
    }

    /// Switch AM/PM while keeping the displayed 12-hour value.
    pub fn with_period(self, period: Period) -> Self {
        let hour = match period {
            Period::Pm if self.hour < 12 => self.hour + 12,
            Period::Am if self.hour >= 12 => self.hour - 12,
            _ => self.hour,
        };
        Self { hour, ..self }
    }

    /// The field's value on its own scale (12-hour fields report 1-12).
    fn field_value(self, kind: FieldKind) -> u8 {
        match kind {
            FieldKind::Hours24 => self.hour,
            FieldKind::Hours12 => {
                let h = self.hour % 12;
                if h == 0 {
                    12
                } else {
                    h
                }
            }
            FieldKind::Minutes => self.minute,
            FieldKind::Seconds => self.second,
            FieldKind::Period => match self.period() {
                Period::Am => 0,
                Period::Pm => 1,
            },
        }
    }

    /// Two-character display derived fresh from the composite value.
    pub fn read(self, kind: FieldKind) -> String {
        match kind {
            FieldKind::Period => match self.period() {
                Period::Am => "AM".to_string(),
                Period::Pm => "PM".to_string(),
            },
            _ => format!("{:02}", self.field_value(kind)),
        }
    }

    /// Write one field, clamping into its range. 12-hour writes honor the
    /// current period (7 while PM lands on 19; 12 while AM lands on 0).
    pub fn write(self, kind: FieldKind, value: u8) -> Self {
        let range = kind.range();
        let value = value.clamp(range.min, range.max);
        match kind {
            FieldKind::Hours24 => Self { hour: value, ..self },
            FieldKind::Hours12 => {
                let hour = match (value, self.period()) {
                    (12, Period::Am) => 0,
                    (12, Period::Pm) => 12,
                    (v, Period::Am) => v,
                    (v, Period::Pm) => v + 12,
                };
                Self { hour, ..self }
            }
            FieldKind::Minutes => Self { minute: value, ..self },
            FieldKind::Seconds => Self { second: value, ..self },
            FieldKind::Period => self.with_period(if value == 0 { Period::Am } else { Period::Pm }),
        }
    }

    /// Step one field by `delta` with wraparound; the period field toggles.
    pub fn step(self, kind: FieldKind, delta: i8) -> Self {
        if kind == FieldKind::Period {
            let flipped = match self.period() {
                Period::Am => Period::Pm,
                Period::Pm => Period::Am,
            };
            return self.with_period(flipped);
        }
        let range = kind.range();
        let span = (range.max - range.min + 1) as i16;
        let offset = self.field_value(kind) as i16 - range.min as i16 + delta as i16;
        let wrapped = offset.rem_euclid(span) + range.min as i16;
        self.write(kind, wrapped as u8)
    }

    /// Seconds since local midnight.
    pub fn seconds_of_day(self) -> u32 {
        self.hour as u32 * 3_600 + self.minute as u32 * 60 + self.second as u32
    }
}

/// Keys the field machine distinguishes; everything else is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKey {
    Digit(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    /// Arm (or re-arm) the digit-reset timer.
    Restart,
    /// Drop any pending digit-reset timer.
    Cancel,
}

/// What the hosting component should do with a keystroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Leave the event alone (Tab keeps default focus traversal).
    PassThrough,
    /// Swallow the event without any change.
    Suppressed,
    FocusLeft,
    FocusRight,
    Update {
        time: ClockTime,
        timer: TimerAction,
        advance: bool,
    },
}

/// Two-keystroke entry machine for one time field. The first digit writes a
/// provisional `0d` value; a second digit within the reset window combines
/// with the displayed ones digit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeFieldState {
    kind: FieldKind,
    pending: bool,
    last_digit: char,
}

impl TimeFieldState {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            pending: false,
            last_digit: '0',
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn on_key(&mut self, key: FieldKey, time: ClockTime) -> KeyOutcome {
        match key {
            FieldKey::Tab => KeyOutcome::PassThrough,
            FieldKey::ArrowLeft => KeyOutcome::FocusLeft,
            FieldKey::ArrowRight => KeyOutcome::FocusRight,
            FieldKey::ArrowUp | FieldKey::ArrowDown => {
                self.pending = false;
                let delta = if key == FieldKey::ArrowUp { 1 } else { -1 };
                KeyOutcome::Update {
                    time: time.step(self.kind, delta),
                    timer: TimerAction::Cancel,
                    advance: false,
                }
            }
            FieldKey::Digit(d) => self.on_digit(d, time),
            FieldKey::Other => KeyOutcome::Suppressed,
        }
    }

    fn on_digit(&mut self, d: char, time: ClockTime) -> KeyOutcome {
        if self.kind == FieldKind::Period || !d.is_ascii_digit() {
            return KeyOutcome::Suppressed;
        }
        let shown = time.read(self.kind);
        // A leading "0" on a 12-hour field displays as "01"; combining its
        // ones digit with the next keystroke would fabricate hours 13-19, so
        // that second digit restarts from zero instead.
        let ambiguous = self.kind == FieldKind::Hours12
            && self.pending
            && shown.as_bytes()[1] == b'1'
            && self.last_digit == '0';
        let composed = if !self.pending || ambiguous {
            format!("0{d}")
        } else {
            format!("{}{d}", &shown[1..2])
        };
        let value: u8 = composed.parse().unwrap_or(0);

        let finished = self.pending;
        self.pending = !self.pending;
        self.last_digit = d;

        KeyOutcome::Update {
            time: time.write(self.kind, value),
            timer: if finished {
                TimerAction::Cancel
            } else {
                TimerAction::Restart
            },
            advance: finished,
        }
    }

    /// Digit-reset timer fired: revert to fresh entry without touching the
    /// value.
    pub fn on_timeout(&mut self) {
        self.pending = false;
    }
}
