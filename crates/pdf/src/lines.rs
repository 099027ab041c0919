use crate::layout::TextRun;

/// Runs whose baselines differ by less than this fraction of the font size
/// share a line.
const BASELINE_TOLERANCE_EM: f32 = 0.5;

/// A horizontal gap wider than this (in ems) starts a new cell.
const CELL_GAP_EM: f32 = 1.5;

/// A gap wider than this (in ems) between runs is rendered as a space.
const WORD_GAP_EM: f32 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Left edge of the cell.
    pub x: f32,
    pub text: String,
}

/// One visual line, with its text split into cells at wide gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub y: f32,
    pub font_size: f32,
    pub cells: Vec<Cell>,
}

impl Line {
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_multi_cell(&self) -> bool {
        self.cells.len() >= 2
    }
}

/// Group runs into lines, top of the page first, and split each line into cells.
pub fn build_lines(mut runs: Vec<TextRun>) -> Vec<Line> {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut grouped: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match grouped.last_mut() {
            Some(current) if same_baseline(&current[0], &run) => current.push(run),
            _ => grouped.push(vec![run]),
        }
    }

    grouped.into_iter().map(split_cells).collect()
}

fn same_baseline(anchor: &TextRun, run: &TextRun) -> bool {
    let size = anchor.font_size.max(run.font_size).max(1.0);
    (anchor.y - run.y).abs() <= BASELINE_TOLERANCE_EM * size
}

fn split_cells(mut runs: Vec<TextRun>) -> Line {
    runs.sort_by(|a, b| a.x.total_cmp(&b.x));
    let y = runs[0].y;
    let font_size = runs.iter().map(|r| r.font_size).fold(1.0f32, f32::max);

    let mut cells: Vec<Cell> = Vec::new();
    let mut cell_end = f32::NEG_INFINITY;
    for run in runs {
        let gap = run.x - cell_end;
        match cells.last_mut() {
            Some(cell) if gap <= CELL_GAP_EM * font_size => {
                let needs_space = gap > WORD_GAP_EM * font_size
                    && !cell.text.ends_with(' ')
                    && !run.text.starts_with(' ');
                if needs_space {
                    cell.text.push(' ');
                }
                cell.text.push_str(&run.text);
            }
            _ => cells.push(Cell { x: run.x, text: run.text.clone() }),
        }
        cell_end = cell_end.max(run.end_x());
    }

    for cell in &mut cells {
        cell.text = cell.text.trim().to_string();
    }
    Line { y, font_size, cells }
}
