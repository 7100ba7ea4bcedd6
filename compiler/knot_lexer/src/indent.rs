//! Indentation stack.
//!
//! Each level is tracked twice: once with tabs advancing to the next
//! multiple of eight, once with tabs counting as a single column. A line
//! whose two measures disagree with the stack in different directions mixes
//! tabs and spaces ambiguously.

use knot_ir::LexErrorKind;

/// Indentation levels the stack can hold, counting the base level.
pub(crate) const MAX_INDENT: usize = 100;

const TAB_SIZE: usize = 8;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub(crate) struct Measure {
    col: usize,
    alt_col: usize,
}

impl Measure {
    pub(crate) const ZERO: Measure = Measure { col: 0, alt_col: 0 };
}

/// Measure the leading whitespace of `line`. Returns the measure and the
/// number of bytes it covers.
pub(crate) fn measure(line: &str) -> (Measure, usize) {
    let mut m = Measure::ZERO;
    let mut len = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                m.col += 1;
                m.alt_col += 1;
            }
            b'\t' => {
                m.col = (m.col / TAB_SIZE + 1) * TAB_SIZE;
                m.alt_col += 1;
            }
            // Form feed restarts the count.
            b'\x0c' => m = Measure::ZERO,
            _ => break,
        }
        len += 1;
    }
    (m, len)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Change {
    Same,
    Indent,
    Dedent(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct IndentStack {
    cols: Vec<usize>,
    alt_cols: Vec<usize>,
}

impl IndentStack {
    pub(crate) fn new() -> Self {
        IndentStack {
            cols: vec![0],
            alt_cols: vec![0],
        }
    }

    /// Open levels above the base.
    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.cols.len() - 1
    }

    pub(crate) fn reset(&mut self) {
        self.cols.truncate(1);
        self.alt_cols.truncate(1);
    }

    fn top(&self) -> Measure {
        Measure {
            col: self.cols.last().copied().unwrap_or_default(),
            alt_col: self.alt_cols.last().copied().unwrap_or_default(),
        }
    }

    /// Compare a logical line's indentation against the stack and update it.
    pub(crate) fn apply(&mut self, m: Measure) -> Result<Change, LexErrorKind> {
        let top = self.top();
        if m.col == top.col {
            if m.alt_col != top.alt_col {
                return Err(LexErrorKind::TabSpace);
            }
            Ok(Change::Same)
        } else if m.col > top.col {
            if self.cols.len() >= MAX_INDENT {
                return Err(LexErrorKind::TooDeep);
            }
            if m.alt_col <= top.alt_col {
                return Err(LexErrorKind::TabSpace);
            }
            self.cols.push(m.col);
            self.alt_cols.push(m.alt_col);
            Ok(Change::Indent)
        } else {
            let mut count = 0;
            while self.cols.len() > 1 && m.col < self.top().col {
                self.cols.pop();
                self.alt_cols.pop();
                count += 1;
            }
            let top = self.top();
            if m.col != top.col {
                return Err(LexErrorKind::Dedent);
            }
            if m.alt_col != top.alt_col {
                return Err(LexErrorKind::TabSpace);
            }
            Ok(Change::Dedent(count))
        }
    }
}
