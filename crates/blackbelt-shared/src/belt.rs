use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Belt {
    pub name: &'static str,
    /// CSS hex color, `#rrggbb`.
    pub color: &'static str,
}

impl Belt {
    /// The belt color as an `(r, g, b)` triple.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.color.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
                .unwrap_or(0)
        };
        (channel(0..2), channel(2..4), channel(4..6))
    }
}

pub const BELTS: [Belt; 5] = [
    Belt {
        name: "White Belt",
        color: "#ffffff",
    },
    Belt {
        name: "Blue Belt",
        color: "#1E3A8A",
    },
    Belt {
        name: "Purple Belt",
        color: "#800080",
    },
    Belt {
        name: "Brown Belt",
        color: "#8B4513",
    },
    Belt {
        name: "Black Belt",
        color: "#000000",
    },
];

/// Index into [`BELTS`] for a progress percentage.
pub fn belt_index(progress: u8) -> usize {
    belt_index_of(progress, BELTS.len())
}

/// Splits `0..=100` into `belt_count - 1` equal steps. Each belt covers
/// `[step * i, step * (i + 1))`; the last belt is reached only at 100.
pub fn belt_index_of(progress: u8, belt_count: usize) -> usize {
    if belt_count <= 1 {
        return 0;
    }
    let last = belt_count - 1;
    let step = 100.0 / last as f64;
    let index = (f64::from(progress) / step).floor() as usize;
    index.min(last)
}

/// Lower bound of each belt's range, in percent.
pub fn belt_threshold(index: usize) -> u8 {
    let last = BELTS.len() - 1;
    let step = 100.0 / last as f64;
    (step * index.min(last) as f64).ceil() as u8
}

/// Text and color shown under a quest's slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeltLabel {
    pub belt: &'static Belt,
    pub percent: u8,
}

impl BeltLabel {
    pub fn for_progress(progress: u8) -> Self {
        Self {
            belt: &BELTS[belt_index(progress)],
            percent: progress,
        }
    }

    pub fn color(&self) -> &'static str {
        self.belt.color
    }
}

impl fmt::Display for BeltLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}%", self.belt.name, self.percent)
    }
}
