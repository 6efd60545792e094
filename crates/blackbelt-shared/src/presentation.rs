use std::str::FromStr;

/// Where the "add quest" control sits: centered on an empty board, tucked
/// into the corner once there is at least one quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddButtonPlacement {
    Center,
    Corner,
}

impl AddButtonPlacement {
    pub fn for_quest_count(count: usize) -> Self {
        if count > 0 { Self::Corner } else { Self::Center }
    }

    pub fn is_moved(self) -> bool {
        self == Self::Corner
    }
}

/// How a rejected duplicate name is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateNotice {
    /// Inline message, falling back to a blocking alert when there is no
    /// inline message area.
    #[default]
    Alert,
    /// Inline message only.
    Inline,
}

impl DuplicateNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::Alert => "A quest with this name already exists!",
            Self::Inline => "A quest with this name already exists 💀💀!",
        }
    }

    pub fn falls_back_to_alert(self) -> bool {
        self == Self::Alert
    }
}

impl FromStr for DuplicateNotice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alert" => Ok(Self::Alert),
            "inline" => Ok(Self::Inline),
            other => Err(format!("invalid duplicate notice: {other}")),
        }
    }
}
