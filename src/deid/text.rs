//! Code-point indexing over UTF-8 text
//!
//! Regex engines report byte offsets while entity spans are counted in code
//! points. [`TextIndex`] converts between the two and slices by code point.

/// Code-point offset table for a borrowed text
#[derive(Debug, Clone)]
pub struct TextIndex<'a> {
    text: &'a str,
    /// Byte offset of every code point, plus `text.len()` as sentinel
    boundaries: Vec<usize>,
}

impl<'a> TextIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Number of code points
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Byte offset of a code-point offset, `None` past the end
    pub fn byte_offset(&self, char_offset: usize) -> Option<usize> {
        self.boundaries.get(char_offset).copied()
    }

    /// Code-point offset of a byte offset on a char boundary
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        match self.boundaries.binary_search(&byte_offset) {
            Ok(i) | Err(i) => i,
        }
    }

    /// Convert a byte range reported by a regex into a code-point range
    pub fn char_span(&self, byte_start: usize, byte_end: usize) -> (usize, usize) {
        (self.char_offset(byte_start), self.char_offset(byte_end))
    }

    /// Slice by code points; `None` when the range is inverted or out of bounds
    pub fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        if start > end {
            return None;
        }
        let s = self.byte_offset(start)?;
        let e = self.byte_offset(end)?;
        Some(&self.text[s..e])
    }

    /// Slice by code points, clamping the range to the text
    pub fn slice_clamped(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.char_len());
        let start = start.min(end);
        self.slice(start, end).unwrap_or_default()
    }

    /// Up to `width` code points ending at `offset`
    pub fn before(&self, offset: usize, width: usize) -> &'a str {
        self.slice_clamped(offset.saturating_sub(width), offset)
    }

    /// Up to `width` code points starting at `offset`
    pub fn after(&self, offset: usize, width: usize) -> &'a str {
        self.slice_clamped(offset, offset.saturating_add(width))
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.slice(offset, offset + 1).and_then(|s| s.chars().next())
    }

    /// Whether `expected` is exactly the text at `[start, end)`
    pub fn matches_at(&self, start: usize, end: usize, expected: &str) -> bool {
        self.slice(start, end) == Some(expected)
    }

    /// Code-point span of the first occurrence of `needle`
    pub fn find_first(&self, needle: &str) -> Option<(usize, usize)> {
        if needle.is_empty() {
            return None;
        }
        let byte_start = self.text.find(needle)?;
        Some(self.char_span(byte_start, byte_start + needle.len()))
    }
}

/// Whether a character is in the Thai block used for Thai words (ก-๙)
pub fn is_thai_letter(c: char) -> bool {
    ('\u{0E01}'..='\u{0E59}').contains(&c)
}
