use docsift_core::Table;

use crate::lines::Line;

/// Cells whose left edges are within this many ems of an anchor share a column.
const COLUMN_TOLERANCE_EM: f32 = 1.0;

/// Cells a line must share with the current table's columns to join it.
const MIN_SHARED_COLUMNS: usize = 2;

const MIN_TABLE_ROWS: usize = 2;

struct Candidate<'a> {
    anchors: Vec<f32>,
    rows: Vec<&'a Line>,
}

impl<'a> Candidate<'a> {
    fn start(line: &'a Line) -> Self {
        Self { anchors: line.cells.iter().map(|c| c.x).collect(), rows: vec![line] }
    }

    fn accepts(&self, line: &Line) -> bool {
        let tolerance = COLUMN_TOLERANCE_EM * line.font_size.max(1.0);
        let shared = line
            .cells
            .iter()
            .filter(|cell| self.anchors.iter().any(|a| (a - cell.x).abs() <= tolerance))
            .count();
        shared >= MIN_SHARED_COLUMNS
    }

    fn push(&mut self, line: &'a Line) {
        let tolerance = COLUMN_TOLERANCE_EM * line.font_size.max(1.0);
        for cell in &line.cells {
            if !self.anchors.iter().any(|a| (a - cell.x).abs() <= tolerance) {
                self.anchors.push(cell.x);
            }
        }
        self.rows.push(line);
    }

    fn finish(mut self) -> Option<Table> {
        if self.rows.len() < MIN_TABLE_ROWS {
            return None;
        }
        self.anchors.sort_by(f32::total_cmp);

        let rows = self
            .rows
            .iter()
            .map(|line| {
                let mut slots = vec![String::new(); self.anchors.len()];
                for cell in &line.cells {
                    let slot = nearest(&self.anchors, cell.x);
                    if !slots[slot].is_empty() {
                        slots[slot].push(' ');
                    }
                    slots[slot].push_str(&cell.text);
                }
                slots
            })
            .collect();
        Some(Table::new(rows))
    }
}

fn nearest(anchors: &[f32], x: f32) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - x).abs().total_cmp(&(*b - x).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find tables among a page's lines (top-down order).
///
/// A table is a maximal run of consecutive multi-cell lines that keep
/// sharing at least two column positions. Single-cell lines end a table.
pub fn detect_tables(lines: &[Line]) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Option<Candidate<'_>> = None;

    for line in lines {
        if !line.is_multi_cell() {
            if let Some(table) = current.take().and_then(Candidate::finish) {
                tables.push(table);
            }
            continue;
        }
        match current.as_mut() {
            Some(candidate) if candidate.accepts(line) => candidate.push(line),
            _ => {
                if let Some(table) = current.take().and_then(Candidate::finish) {
                    tables.push(table);
                }
                current = Some(Candidate::start(line));
            }
        }
    }
    if let Some(table) = current.and_then(Candidate::finish) {
        tables.push(table);
    }
    tables
}
