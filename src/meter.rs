use std::fmt;

pub const NUM_CELLS: usize = 32;

// Cell thresholds span [0, CELL_RANGE).
const CELL_RANGE: f32 = 0.8;
const RED_THRESHOLD: f32 = 0.75;
const YELLOW_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeterCellState {
    #[default]
    Inactive,
    Green,
    Yellow,
    Red,
}

impl MeterCellState {
    pub fn is_active(self) -> bool {
        self != MeterCellState::Inactive
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MeterCellState::Inactive => "inactive",
            MeterCellState::Green => "green",
            MeterCellState::Yellow => "yellow",
            MeterCellState::Red => "red",
        }
    }
}

impl fmt::Display for MeterCellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level a cell needs before it lights up.
pub fn cell_threshold(index: usize) -> f32 {
    (index as f32 / NUM_CELLS as f32) * CELL_RANGE
}

/// Maps a normalized level onto the meter cells, lowest cell first.
///
/// Active cells always form a prefix. A level of zero or below lights nothing.
pub fn calculate_cell_colors(level: f32) -> [MeterCellState; NUM_CELLS] {
    let mut cells = [MeterCellState::Inactive; NUM_CELLS];
    if !(level > 0.0) {
        return cells;
    }

    for (index, cell) in cells.iter_mut().enumerate() {
        let threshold = cell_threshold(index);
        if level < threshold {
            break;
        }
        *cell = if threshold > RED_THRESHOLD {
            MeterCellState::Red
        } else if threshold > YELLOW_THRESHOLD {
            MeterCellState::Yellow
        } else {
            MeterCellState::Green
        };
    }
    cells
}
