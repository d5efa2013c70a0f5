use std::collections::BTreeMap;

use crate::lang::ast::Identifier;

pub type Frame<T> = BTreeMap<Identifier, T>;

/// Stack of call frames
///
/// Only the innermost frame is ever visible: there is no fall through to enclosing frames, so a
/// function body sees its parameters and its own assignments and nothing else. The bottom frame
/// holds the top level program's variables and is never popped.
pub struct Variables<T> {
    inner: Vec<Frame<T>>,
}

impl<T> Variables<T> {
    pub fn new() -> Self {
        Variables {
            inner: vec![Frame::default()],
        }
    }

    pub fn push_frame(&mut self, frame: Frame<T>) {
        self.inner.push(frame);
    }

    pub fn pop_frame(&mut self) {
        debug_assert!(self.inner.len() > 1, "popped the top level frame");
        if self.inner.len() > 1 {
            self.inner.pop();
        }
    }

    /// Number of frames pushed on top of the top level frame
    pub fn depth(&self) -> usize {
        self.inner.len() - 1
    }

    pub fn get(&self, ident: &Identifier) -> Option<&T> {
        self.inner.last().and_then(|frame| frame.get(ident))
    }

    pub fn insert(&mut self, ident: Identifier, val: T) {
        if let Some(frame) = self.inner.last_mut() {
            frame.insert(ident, val);
        }
    }
}

impl<T> Default for Variables<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn ident(s: &str) -> Identifier {
    Identifier(s.to_string())
}

#[test]
fn test_frames_do_not_leak() {
    let mut vars = Variables::new();
    vars.insert(ident("x"), 1);
    vars.insert(ident("y"), 2);

    let mut frame = Frame::new();
    frame.insert(ident("x"), 10);
    vars.push_frame(frame);
    assert_eq!(vars.depth(), 1);
    assert_eq!(vars.get(&ident("x")), Some(&10));
    assert_eq!(vars.get(&ident("y")), None);

    vars.insert(ident("z"), 3);
    vars.pop_frame();

    assert_eq!(vars.depth(), 0);
    assert_eq!(vars.get(&ident("x")), Some(&1));
    assert_eq!(vars.get(&ident("y")), Some(&2));
    assert_eq!(vars.get(&ident("z")), None);
}

#[test]
fn test_insert_overwrites() {
    let mut vars = Variables::new();
    vars.insert(ident("ফল"), "a");
    vars.insert(ident("ফল"), "b");
    assert_eq!(vars.get(&ident("ফল")), Some(&"b"));
}
