//! Stack-based cursor over nested datalists.
//!
//! Each frame is a `{list, index}` pair held by value. `push` descends into the
//! sublist under the cursor, `pop` discards the top frame. Spliced frames are
//! transparent once exhausted: reads fall through to the frame below.
//!
//! The cursor never reports errors. Running out of data is a `None`; whether
//! that is fine is up to the caller.

use std::rc::Rc;

use super::{Constant, Datalist, Value};
use crate::invariants::{ensure_pop_balanced, ensure_push_on_sublist};

#[derive(Clone, Debug)]
struct Frame {
    list: Rc<Datalist>,
    index: usize,
    spliced: bool,
}

impl Frame {
    fn new(list: Rc<Datalist>, spliced: bool) -> Self {
        Self {
            list,
            index: 0,
            spliced,
        }
    }

    fn current(&self) -> Option<&Constant> {
        self.list.get(self.index)
    }
}

#[derive(Clone, Debug)]
pub struct Datasrc {
    frames: Vec<Frame>,
    /// Line of the last constant handed out, for diagnostics.
    last_line: u32,
}

impl Datasrc {
    pub fn new(list: Rc<Datalist>) -> Self {
        let last_line = list.line();
        Self {
            frames: vec![Frame::new(list, false)],
            last_line,
        }
    }

    /// Current element without advancing.
    pub fn peek(&self) -> Option<&Constant> {
        for frame in self.frames.iter().rev() {
            if let Some(con) = frame.current() {
                return Some(con);
            }
            if !frame.spliced {
                return None;
            }
        }
        None
    }

    /// Current element, advancing past it.
    pub fn next(&mut self) -> Option<Constant> {
        loop {
            let top = self.frames.last_mut()?;
            if let Some(con) = top.current() {
                let con = con.clone();
                top.index += 1;
                self.last_line = con.line;
                return Some(con);
            }
            if !top.spliced {
                return None;
            }
            self.frames.pop();
        }
    }

    pub fn more(&self) -> bool {
        self.peek().is_some()
    }

    /// Descend into the sublist under the cursor, consuming it at this level.
    ///
    /// # Panics
    /// If the cursor is not positioned on a sublist.
    pub fn push(&mut self) {
        let con = self.next();
        let list = ensure_push_on_sublist(con, self.last_line);
        self.frames.push(Frame::new(list, false));
    }

    /// Descend into an external list without consuming anything.
    pub fn push_list(&mut self, list: Rc<Datalist>) {
        self.frames.push(Frame::new(list, false));
    }

    /// Insert `list` at the cursor; once exhausted, reads continue below it.
    pub fn splice(&mut self, list: Rc<Datalist>) {
        self.frames.push(Frame::new(list, true));
    }

    /// Return to the frame saved by the matching `push`.
    ///
    /// # Panics
    /// If there is no pushed frame left.
    pub fn pop(&mut self) {
        ensure_pop_balanced(self.frames.len());
        self.frames.pop();
        while self
            .frames
            .last()
            .is_some_and(|f| f.spliced && f.current().is_none())
        {
            self.frames.pop();
        }
    }

    /// Number of frames, including the root.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_sublist(&self) -> bool {
        matches!(self.peek(), Some(Constant { value: Value::List(_), .. }))
    }

    pub fn is_fill(&self) -> bool {
        matches!(self.peek(), Some(Constant { value: Value::Fill, .. }))
    }

    /// Line of the constant under the cursor, or of the last one consumed.
    pub fn line(&self) -> u32 {
        self.peek().map_or(self.last_line, |c| c.line)
    }
}
