//! Per-frame results emitted by the detection loop

use std::fmt;

use crate::config::LANE_COUNT;

/// Set of lane indices, iterated left to right
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LaneSet(u8);

impl LaneSet {
    pub const EMPTY: LaneSet = LaneSet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Build a set from lane indices; out-of-range indices are ignored
    pub fn from_lanes(lanes: &[usize]) -> Self {
        let mut set = Self::new();
        for &lane in lanes {
            set.insert(lane);
        }
        set
    }

    pub fn insert(&mut self, lane: usize) {
        if lane < LANE_COUNT {
            self.0 |= 1 << lane;
        }
    }

    pub fn contains(&self, lane: usize) -> bool {
        lane < LANE_COUNT && self.0 & (1 << lane) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Lane indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..LANE_COUNT).filter(move |&lane| self.contains(lane))
    }
}

/// What the loop measured for one lane in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneSample {
    /// Skew-corrected sample x within the capture band
    pub x: i64,
    /// Mean saturation of the patch
    pub saturation: f64,
    /// Mean value of the patch
    pub value: f64,
    /// Color currently meets the note threshold
    pub active: bool,
    /// Lane is inside its debounce window
    pub debounced: bool,
}

/// Result of processing one captured frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Zero-based index of the processed frame
    pub frame_index: u64,
    /// Per-lane measurements, left to right
    pub lanes: [LaneSample; LANE_COUNT],
    /// Lanes that fired this frame (after debounce)
    pub detected: LaneSet,
    /// Lanes to press now, leaving the delay buffer
    pub actuated: Option<LaneSet>,
}

/// Fixed-width status line such as `[A _ D _]`
pub fn format_status(keys: &[char; LANE_COUNT], lanes: LaneSet) -> String {
    StatusLine { keys, lanes }.to_string()
}

struct StatusLine<'a> {
    keys: &'a [char; LANE_COUNT],
    lanes: LaneSet,
}

impl fmt::Display for StatusLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if self.lanes.contains(i) {
                for upper in key.to_uppercase() {
                    write!(f, "{}", upper)?;
                }
            } else {
                write!(f, "_")?;
            }
        }
        write!(f, "]")
    }
}
