/// Grid model and the grouping pass that turns labelled cells into placements

use crate::{Error, Resolution, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// Layout grid as received from callers. `None` and `""` are empty cells.
pub type LayoutGrid = Vec<Vec<Option<String>>>;

/// How cells that share an element id are merged into placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Every cell carrying a key widens one box for that key, even when the
    /// cells are disjoint.
    #[default]
    BoundingHull,
    /// Each 4-connected region of equal keys becomes its own placement.
    Contiguous,
}

impl std::str::FromStr for MergePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hull" | "bounding-hull" => Ok(MergePolicy::BoundingHull),
            "contiguous" => Ok(MergePolicy::Contiguous),
            other => Err(Error::ConfigError(format!("unknown merge policy '{}'", other))),
        }
    }
}

/// Minimal rectangle in grid coordinates covering a set of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl BoundingBox {
    pub fn at(row: usize, col: usize) -> Self {
        Self { min_row: row, max_row: row, min_col: col, max_col: col }
    }

    /// Widen the box so it also covers `(row, col)`.
    pub fn include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }

    pub fn rows(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn cols(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Pixel rectangle of this box for the given cell size.
    pub fn to_rect(&self, cell: CellSize) -> Rect {
        Rect {
            top: self.min_row as u64 * cell.height as u64,
            left: self.min_col as u64 * cell.width as u64,
            width: self.cols() as u64 * cell.width as u64,
            height: self.rows() as u64 * cell.height as u64,
        }
    }
}

/// Pixel geometry of one placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub top: u64,
    pub left: u64,
    pub width: u64,
    pub height: u64,
}

/// Pixel size of one grid unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

/// One element to emit: which key, which tag, which cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub element_id: String,
    pub tag: String,
    pub bounds: BoundingBox,
}

/// Output of the grouping pass.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    /// Placements in encounter order (row-major position of their first cell)
    pub placements: Vec<Placement>,
    /// Distinct tags in first-encounter order
    pub tags: Vec<String>,
    pub cells_visited: usize,
    pub cells_occupied: usize,
}

/// Tag part of a cell key: everything before the first `.`.
pub fn tag_of(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}

/// Rejects only tags that would break the element syntax; anything else is emitted as-is.
fn is_usable_tag(tag: &str) -> bool {
    !tag.is_empty()
        && !tag
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='))
}

fn cell_key(grid: &LayoutGrid, row: usize, col: usize) -> Option<&str> {
    grid[row][col].as_deref().filter(|k| !k.is_empty())
}

/// Check the grid is a non-empty rectangle.
/// Returns `(rows, cols)`.
pub fn validate(grid: &LayoutGrid) -> Result<(usize, usize)> {
    let rows = grid.len();
    if rows == 0 {
        return Err(Error::MalformedLayout("layout has no rows".into()));
    }
    let cols = grid[0].len();
    if cols == 0 {
        return Err(Error::MalformedLayout("layout has no columns".into()));
    }
    for (i, row) in grid.iter().enumerate() {
        if row.len() != cols {
            return Err(Error::MalformedLayout(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                cols
            )));
        }
    }
    Ok((rows, cols))
}

/// Check every non-empty key yields a tag that can be written as `<tag ...>`.
pub fn check_tags(grid: &LayoutGrid) -> Result<()> {
    for key in grid.iter().flatten().flatten().filter(|k| !k.is_empty()) {
        if !is_usable_tag(tag_of(key)) {
            return Err(Error::MalformedLayout(format!(
                "cell key '{}' does not start with a usable element name",
                key
            )));
        }
    }
    Ok(())
}

/// Integer cell size; the canvas remainder is left unfilled.
pub fn cell_size(resolution: Resolution, rows: usize, cols: usize) -> Result<CellSize> {
    let height = resolution.height as usize / rows;
    let width = resolution.width as usize / cols;
    if height == 0 {
        return Err(Error::MalformedLayout(format!(
            "{} rows do not fit in a height of {}px",
            rows, resolution.height
        )));
    }
    if width == 0 {
        return Err(Error::MalformedLayout(format!(
            "{} columns do not fit in a width of {}px",
            cols, resolution.width
        )));
    }
    // Both quotients are bounded by the u32 dimensions they came from.
    Ok(CellSize { width: width as u32, height: height as u32 })
}

/// Group the cells of an already validated grid into placements.
pub fn group(grid: &LayoutGrid, policy: MergePolicy) -> Grouping {
    let grouping = match policy {
        MergePolicy::BoundingHull => group_hull(grid),
        MergePolicy::Contiguous => group_contiguous(grid),
    };
    log::debug!(
        "grouped {} cells ({} occupied) into {} placements using {} tags",
        grouping.cells_visited,
        grouping.cells_occupied,
        grouping.placements.len(),
        grouping.tags.len()
    );
    grouping
}

fn record_tag(tag: &str, seen: &mut HashSet<String>, tags: &mut Vec<String>) {
    if seen.insert(tag.to_string()) {
        tags.push(tag.to_string());
    }
}

fn group_hull(grid: &LayoutGrid) -> Grouping {
    let mut out = Grouping::default();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut seen_tags = HashSet::new();

    for (row, cells) in grid.iter().enumerate() {
        for col in 0..cells.len() {
            out.cells_visited += 1;
            let Some(key) = cell_key(grid, row, col) else { continue };
            out.cells_occupied += 1;
            match index.get(key) {
                Some(&i) => out.placements[i].bounds.include(row, col),
                None => {
                    let tag = tag_of(key);
                    record_tag(tag, &mut seen_tags, &mut out.tags);
                    index.insert(key, out.placements.len());
                    out.placements.push(Placement {
                        element_id: key.to_string(),
                        tag: tag.to_string(),
                        bounds: BoundingBox::at(row, col),
                    });
                }
            }
        }
    }
    out
}

fn group_contiguous(grid: &LayoutGrid) -> Grouping {
    let mut out = Grouping::default();
    let mut seen_tags = HashSet::new();
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    let mut visited = vec![vec![false; cols]; rows];

    for row in 0..rows {
        for col in 0..cols {
            out.cells_visited += 1;
            let Some(key) = cell_key(grid, row, col) else { continue };
            out.cells_occupied += 1;
            if visited[row][col] {
                continue;
            }

            // Flood the 4-connected region sharing this key.
            let mut bounds = BoundingBox::at(row, col);
            let mut queue = VecDeque::from([(row, col)]);
            visited[row][col] = true;
            while let Some((r, c)) = queue.pop_front() {
                bounds.include(r, c);
                let mut neighbours = Vec::with_capacity(4);
                if r > 0 {
                    neighbours.push((r - 1, c));
                }
                if r + 1 < rows {
                    neighbours.push((r + 1, c));
                }
                if c > 0 {
                    neighbours.push((r, c - 1));
                }
                if c + 1 < cols {
                    neighbours.push((r, c + 1));
                }
                for (nr, nc) in neighbours {
                    if !visited[nr][nc] && cell_key(grid, nr, nc) == Some(key) {
                        visited[nr][nc] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }

            let tag = tag_of(key);
            record_tag(tag, &mut seen_tags, &mut out.tags);
            out.placements.push(Placement {
                element_id: key.to_string(),
                tag: tag.to_string(),
                bounds,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> LayoutGrid {
        rows.iter()
            .map(|r| r.iter().map(|k| Some(k.to_string())).collect())
            .collect()
    }

    #[test]
    fn tag_is_prefix_before_first_dot() {
        assert_eq!(tag_of("h2.0"), "h2");
        assert_eq!(tag_of("section.a.b"), "section");
        assert_eq!(tag_of("footer"), "footer");
    }

    #[test]
    fn hull_folds_disjoint_cells_into_one_box() {
        let g = grid(&[&["p.0", "", "p.0"], &["", "", ""], &["", "div.1", ""]]);
        let out = group(&g, MergePolicy::BoundingHull);
        assert_eq!(out.placements.len(), 2);
        assert_eq!(out.placements[0].element_id, "p.0");
        assert_eq!(
            out.placements[0].bounds,
            BoundingBox { min_row: 0, max_row: 0, min_col: 0, max_col: 2 }
        );
        assert_eq!(out.tags, vec!["p".to_string(), "div".to_string()]);
        assert_eq!(out.cells_visited, 9);
        assert_eq!(out.cells_occupied, 3);
    }

    #[test]
    fn contiguous_splits_disjoint_regions() {
        let g = grid(&[&["p.0", "", "p.0"], &["p.0", "", "p.0"]]);
        let out = group(&g, MergePolicy::Contiguous);
        assert_eq!(out.placements.len(), 2);
        assert_eq!(
            out.placements[0].bounds,
            BoundingBox { min_row: 0, max_row: 1, min_col: 0, max_col: 0 }
        );
        assert_eq!(
            out.placements[1].bounds,
            BoundingBox { min_row: 0, max_row: 1, min_col: 2, max_col: 2 }
        );
        assert_eq!(out.tags, vec!["p".to_string()]);
    }

    #[test]
    fn contiguous_follows_l_shapes() {
        let g = grid(&[&["nav.0", "nav.0"], &["nav.0", "main.0"]]);
        let out = group(&g, MergePolicy::Contiguous);
        assert_eq!(out.placements.len(), 2);
        assert_eq!(
            out.placements[0].bounds,
            BoundingBox { min_row: 0, max_row: 1, min_col: 0, max_col: 1 }
        );
    }

    #[test]
    fn validate_rejects_ragged_and_empty_grids() {
        assert!(matches!(validate(&vec![]), Err(Error::MalformedLayout(_))));
        assert!(matches!(validate(&vec![vec![]]), Err(Error::MalformedLayout(_))));
        let ragged = grid(&[&["p.0", "p.0"], &["p.1"]]);
        let err = validate(&ragged).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn check_tags_rejects_tags_that_break_markup() {
        for key in ["<script>.0", ".0", "my widget.0", "a\"b.1", "p/x.2"] {
            let g = grid(&[&[key]]);
            assert!(validate(&g).is_ok());
            assert!(matches!(check_tags(&g), Err(Error::MalformedLayout(_))), "{} accepted", key);
        }
    }

    #[test]
    fn check_tags_accepts_custom_element_names() {
        let g = grid(&[&["my_widget.0", "x-foo_bar.1", "caf\u{e9}.2", "P.3"]]);
        assert!(check_tags(&g).is_ok());
    }

    #[test]
    fn cell_size_truncates_and_rejects_zero() {
        let res = Resolution { width: 1000, height: 700 };
        assert_eq!(cell_size(res, 3, 3).unwrap(), CellSize { width: 333, height: 233 });
        let tiny = Resolution { width: 2, height: 2 };
        assert!(matches!(cell_size(tiny, 3, 1), Err(Error::MalformedLayout(_))));
    }

    #[test]
    fn rect_is_a_multiple_of_cell_size() {
        let b = BoundingBox { min_row: 1, max_row: 2, min_col: 0, max_col: 2 };
        let r = b.to_rect(CellSize { width: 10, height: 7 });
        assert_eq!(r, Rect { top: 7, left: 0, width: 30, height: 14 });
        assert!(b.contains(2, 2));
        assert!(!b.contains(0, 0));
    }
}
