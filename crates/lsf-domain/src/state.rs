use crate::error::DomainError;

/// Canonical scheduler job states. The discriminant is the persisted state code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleState {
    Pend = 0,
    Psusp = 1,
    Run = 2,
    Ssusp = 3,
    Ususp = 4,
    Wait = 5,
    Unkwn = 6,
    Pdone = 7,
    Perr = 8,
    DonePdone = 9,
    DoneWait = 10,
    DonePerr = 11,
    Error = 12,
    Done = 13,
    Exit = 14,
}

impl LifecycleState {
    pub const ALL: [Self; 15] = [
        Self::Pend,
        Self::Psusp,
        Self::Run,
        Self::Ssusp,
        Self::Ususp,
        Self::Wait,
        Self::Unkwn,
        Self::Pdone,
        Self::Perr,
        Self::DonePdone,
        Self::DoneWait,
        Self::DonePerr,
        Self::Error,
        Self::Done,
        Self::Exit,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// A job first seen in one of these states is not tracked, and a
    /// transition into one ends tracking for that job.
    pub fn is_terminal_class(self) -> bool {
        matches!(
            self,
            Self::Unkwn
                | Self::Pdone
                | Self::Perr
                | Self::DonePdone
                | Self::DoneWait
                | Self::DonePerr
                | Self::Error
                | Self::Done
                | Self::Exit
        )
    }

    /// States whose status reports may carry an exit reason.
    pub fn carries_exit_reason(self) -> bool {
        self.is_terminal_class()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pend => "PEND",
            Self::Psusp => "PSUSP",
            Self::Run => "RUN",
            Self::Ssusp => "SSUSP",
            Self::Ususp => "USUSP",
            Self::Wait => "WAIT",
            Self::Unkwn => "UNKWN",
            Self::Pdone => "PDONE",
            Self::Perr => "PERR",
            Self::DonePdone => "DONE+PDONE",
            Self::DoneWait => "DONE+WAIT",
            Self::DonePerr => "DONE+PERR",
            Self::Error => "ERROR",
            Self::Done => "DONE",
            Self::Exit => "EXIT",
        }
    }
}

/// Output name for a stored state code; unknown codes map to `""`.
pub fn state_name(code: i64) -> &'static str {
    LifecycleState::from_code(code).map_or("", LifecycleState::as_str)
}

impl std::str::FromStr for LifecycleState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| DomainError::UnknownState(s.to_string()))
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_enumeration_order() {
        for (i, state) in LifecycleState::ALL.iter().enumerate() {
            assert_eq!(state.code(), i as i64);
            assert_eq!(LifecycleState::from_code(i as i64), Some(*state));
        }
        assert_eq!(LifecycleState::from_code(15), None);
        assert_eq!(LifecycleState::from_code(-1), None);
    }

    #[test]
    fn terminal_class_is_code_six_and_above() {
        for state in LifecycleState::ALL {
            assert_eq!(state.is_terminal_class(), state.code() >= 6, "{state}");
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for state in LifecycleState::ALL {
            assert_eq!(state.as_str().parse::<LifecycleState>().unwrap(), state);
        }
        assert!("BOGUS".parse::<LifecycleState>().is_err());
        assert!("done".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn state_name_falls_back_to_empty() {
        assert_eq!(state_name(0), "PEND");
        assert_eq!(state_name(9), "DONE+PDONE");
        assert_eq!(state_name(14), "EXIT");
        assert_eq!(state_name(99), "");
        assert_eq!(state_name(-1), "");
    }
}
