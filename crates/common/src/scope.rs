//! Lexical scope chain.
//!
//! A [`Scope`] is a shared handle to one environment frame: a vector of
//! indexed slots plus a link to the enclosing frame. Frames are shared
//! between activation records, the operand stack and closures, so the handle
//! is reference counted. Frames only ever point outward, which keeps the
//! chain acyclic; the one way to close a loop is to store a closure in the
//! frame it captured, and [`Scope::clear`] exists to break that at teardown.

use crate::datum::Datum;
use crate::error::ScopeError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct Frame {
    slots: RefCell<Vec<Option<Datum>>>,
    parent: Option<Scope>,
    /// Holds no bindings of its own; see [`Scope::transparent_child`].
    transparent: bool,
}

/// Shared handle to an environment frame.
#[derive(Clone)]
pub struct Scope(Rc<Frame>);

impl Scope {
    /// Create a root frame with no enclosing scope.
    pub fn global() -> Self {
        Self::with_parent(None, false)
    }

    /// Create an empty frame enclosed by `self`.
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()), false)
    }

    /// Create a frame enclosed by `self` that does not count as a level.
    ///
    /// Activations of parameterless functions get one: the compiler numbers
    /// their free variables against the enclosing frame, so [`Scope::get_at`]
    /// skips the frame and [`Scope::set`] writes past it.
    pub fn transparent_child(&self) -> Self {
        Self::with_parent(Some(self.clone()), true)
    }

    fn with_parent(parent: Option<Scope>, transparent: bool) -> Self {
        Scope(Rc::new(Frame {
            slots: RefCell::new(Vec::new()),
            parent,
            transparent,
        }))
    }

    /// Returns true for frames made by [`Scope::transparent_child`].
    pub fn is_transparent(&self) -> bool {
        self.0.transparent
    }

    /// The enclosing frame, `None` for a root.
    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// Number of enclosing frames between this one and the root.
    pub fn depth(&self) -> usize {
        self.chain().count() - 1
    }

    /// Number of slots allocated in this frame (written or not).
    pub fn len(&self) -> usize {
        self.0.slots.borrow().len()
    }

    /// Returns true if this frame has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if both handles refer to the same frame.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// This frame followed by every enclosing frame, innermost first.
    fn chain(&self) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(self), |scope| scope.parent())
    }

    fn covers(&self, index: usize) -> bool {
        index < self.0.slots.borrow().len()
    }

    /// Resolve `index` by walking outward.
    ///
    /// The first frame whose slot vector reaches `index` answers the lookup,
    /// even if that slot was never written.
    pub fn get(&self, index: usize) -> Result<Datum, ScopeError> {
        for scope in self.chain() {
            let slots = scope.0.slots.borrow();
            if let Some(slot) = slots.get(index) {
                return slot.clone().ok_or(ScopeError::Uninitialized { index });
            }
        }
        Err(ScopeError::Unresolved { index })
    }

    /// Read `index` from the frame exactly `depth` links outward, not
    /// counting transparent frames.
    pub fn get_at(&self, depth: usize, index: usize) -> Result<Datum, ScopeError> {
        let scope = self
            .chain()
            .filter(|scope| !scope.is_transparent())
            .nth(depth)
            .ok_or(ScopeError::Unresolved { index })?;
        let slots = scope.0.slots.borrow();
        let result = match slots.get(index) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(ScopeError::Uninitialized { index }),
            None => Err(ScopeError::Unresolved { index }),
        };
        result
    }

    /// Write `index` in the nearest frame that already has it, or create it
    /// in the nearest frame that is not transparent.
    pub fn set(&self, index: usize, value: Datum) {
        let owner = self
            .chain()
            .find(|scope| scope.covers(index))
            .or_else(|| self.chain().find(|scope| !scope.is_transparent()))
            .unwrap_or(self);
        owner.define(index, value);
    }

    /// Write `index` in this frame, shadowing any outer slot with the same index.
    pub fn define(&self, index: usize, value: Datum) {
        let previous = {
            let mut slots = self.0.slots.borrow_mut();
            if slots.len() <= index {
                slots.resize(index + 1, None);
            }
            slots[index].replace(value)
        };
        drop(previous);
    }

    /// Return a slot of this frame to the uninitialised state.
    pub fn unset(&self, index: usize) {
        let previous = self
            .0
            .slots
            .borrow_mut()
            .get_mut(index)
            .and_then(Option::take);
        drop(previous);
    }

    /// Drop every slot of this frame.
    pub fn clear(&self) {
        let slots = std::mem::take(&mut *self.0.slots.borrow_mut());
        drop(slots);
    }
}

impl fmt::Debug for Scope {
    // Slots may hold closures over this very frame, so only the shape is shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("depth", &self.depth())
            .field("slots", &self.len())
            .finish()
    }
}
