//! Per-file context and position bookkeeping.

use std::path::{Path, PathBuf};

/// Byte offsets of line starts, for line/column ↔ offset conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Indexes the line starts of `content`.
    #[must_use]
    pub fn new(content: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Whether the index is empty. Never true; an empty text has one line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Byte offset of a 1-indexed line and 1-indexed column.
    ///
    /// `column` counts characters; `content` must be the text this index was built from.
    #[must_use]
    pub fn offset(&self, content: &str, line: usize, column: usize) -> usize {
        let Some(&start) = line.checked_sub(1).and_then(|l| self.starts.get(l)) else {
            return 0;
        };
        let rest = content.get(start..).unwrap_or_default();
        let within = rest
            .char_indices()
            .nth(column.saturating_sub(1))
            .map_or(rest.len(), |(i, _)| i);
        start + within
    }

    /// 1-indexed line and column (characters) of a byte offset.
    #[must_use]
    pub fn position(&self, content: &str, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset);
        let start = self.starts.get(line.saturating_sub(1)).copied().unwrap_or(0);
        let column = content
            .get(start..offset)
            .map_or(offset - start, |s| s.chars().count());
        (line.max(1), column + 1)
    }
}

/// Context provided for one scanned file.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the scan root; used in findings.
    pub relative_path: PathBuf,
    lines: LineIndex,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
            lines: LineIndex::new(content),
        }
    }

    /// Calculates byte offset for a given line and column.
    ///
    /// # Arguments
    ///
    /// * `line` - 1-indexed line number
    /// * `column` - 1-indexed column number
    ///
    /// # Returns
    ///
    /// Byte offset from the start of the file, or 0 if out of bounds.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        self.lines.offset(self.content, line, column)
    }

    /// Text of a 1-indexed line, without the newline.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&'a str> {
        self.content.lines().nth(line.checked_sub(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_calculation() {
        let content = "line1\nline2\nline3";
        let ctx = FileContext::new(Path::new("/p/test.js"), content, Path::new("/p"));

        assert_eq!(ctx.offset_for(1, 1), 0);
        assert_eq!(ctx.offset_for(2, 1), 6);
        assert_eq!(ctx.offset_for(2, 3), 8);
        assert_eq!(ctx.offset_for(0, 1), 0);
        assert_eq!(ctx.relative_path, PathBuf::from("test.js"));
    }

    #[test]
    fn columns_count_characters() {
        let content = "let é = 1;\nx";
        let index = LineIndex::new(content);
        // 'é' is two bytes
        assert_eq!(index.offset(content, 1, 6), 6);
        assert_eq!(index.position(content, 6), (1, 6));
        assert_eq!(index.position(content, content.len() - 1), (2, 1));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn single_file_root_keeps_name() {
        let path = Path::new("/p/app.js");
        let ctx = FileContext::new(path, "", path);
        assert_eq!(ctx.relative_path, PathBuf::from("/p/app.js"));
        assert_eq!(ctx.line(1), None);
    }
}
