//! Byte offset to line/column mapping.

use quill_ir::Position;

/// Start offsets of every line.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { starts }
    }

    /// One-based position of `offset`. Columns count characters, so a tab
    /// is one column.
    pub(crate) fn position(&self, source: &str, offset: usize) -> Position {
        let line = self
            .starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.starts.get(line).copied().unwrap_or(0);
        let column = source
            .get(line_start..offset)
            .map_or(0, |text| text.chars().count());
        Position::new(to_u32(line + 1), to_u32(column + 1))
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let source = "ab\n\ncé d";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source, 0), Position::new(1, 1));
        assert_eq!(index.position(source, 1), Position::new(1, 2));
        assert_eq!(index.position(source, 3), Position::new(2, 1));
        assert_eq!(index.position(source, 4), Position::new(3, 1));
        // `é` is two bytes but one column.
        assert_eq!(index.position(source, 8), Position::new(3, 4));
    }
}
