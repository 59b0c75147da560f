use core::fmt;
use core::mem;
use core::ptr;

/// A node in the recency list.
///
/// Contains a value and pointers to the previous and next entries. Nodes are
/// heap-allocated by [`RankList`] and referenced from the outside only through
/// the raw pointers handed out by [`RankList::push_front`].
pub(crate) struct ListEntry<T> {
    /// The value stored in this entry. Uses MaybeUninit to allow for sigil nodes.
    val: mem::MaybeUninit<T>,
    /// Pointer to the previous entry in the list.
    prev: *mut ListEntry<T>,
    /// Pointer to the next entry in the list.
    next: *mut ListEntry<T>,
}

impl<T> ListEntry<T> {
    /// Creates a new entry with the given value.
    fn new(val: T) -> Self {
        ListEntry {
            val: mem::MaybeUninit::new(val),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Creates a new sigil (sentinel) entry without initializing the value.
    ///
    /// Sigil entries are used as head and tail markers in the list.
    fn new_sigil() -> Self {
        ListEntry {
            val: mem::MaybeUninit::uninit(),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Extracts the value from this entry.
    ///
    /// # Safety
    ///
    /// The value must be initialized, i.e. this must not be a sigil node.
    unsafe fn into_value(self) -> T {
        self.val.assume_init()
    }
}

/// A doubly linked list ordered by recency: front = most recently used,
/// back = least recently used.
///
/// The list uses sentinel nodes (sigils) at the head and tail to simplify
/// pointer surgery, and is deliberately unbounded: capacity is enforced by
/// its owner, which pops the back when the population exceeds its budget.
/// All operations are O(1).
pub(crate) struct RankList<T> {
    /// Current number of items in the list.
    len: usize,
    /// Pointer to the head sentinel node.
    head: *mut ListEntry<T>,
    /// Pointer to the tail sentinel node.
    tail: *mut ListEntry<T>,
}

// SAFETY: RankList owns every node it links; the raw pointers never alias
// another list. Moving the list to another thread moves sole ownership.
unsafe impl<T: Send> Send for RankList<T> {}

impl<T> RankList<T> {
    /// Creates an empty list with linked sentinel nodes.
    pub(crate) fn new() -> RankList<T> {
        let head = Box::into_raw(Box::new(ListEntry::new_sigil()));
        let tail = Box::into_raw(Box::new(ListEntry::new_sigil()));

        let list = RankList { len: 0, head, tail };

        unsafe {
            // SAFETY: head and tail are newly allocated and valid pointers
            (*list.head).next = list.tail;
            (*list.tail).prev = list.head;
        }

        list
    }

    /// Returns the current number of items in the list.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list contains no items.
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Detaches a node from its neighbors without deallocating it.
    ///
    /// # Safety
    ///
    /// `node` must be a valid, non-sigil node currently linked into this list.
    unsafe fn detach(&mut self, node: *mut ListEntry<T>) {
        // SAFETY: a linked node has valid prev and next pointers.
        (*(*node).prev).next = (*node).next;
        (*(*node).next).prev = (*node).prev;
    }

    /// Links a node in directly behind the head sentinel.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node that is not currently linked into any list.
    unsafe fn attach(&mut self, node: *mut ListEntry<T>) {
        // SAFETY: head is a valid sentinel; node is unlinked per the contract.
        (*node).next = (*self.head).next;
        (*node).prev = self.head;
        (*self.head).next = node;
        (*(*node).next).prev = node;
    }

    /// Adds a value at the front of the list, returning a handle to its node.
    ///
    /// The handle stays valid until the node is removed via
    /// [`RankList::unlink`] or [`RankList::pop_back`], or the list is dropped.
    pub(crate) fn push_front(&mut self, v: T) -> *mut ListEntry<T> {
        let node = Box::into_raw(Box::new(ListEntry::new(v)));
        // SAFETY: node is newly allocated and not part of any list yet.
        unsafe { self.attach(node) };
        self.len += 1;
        node
    }

    /// Moves a node to the front of the list.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node currently linked into this list.
    pub(crate) unsafe fn move_to_front(&mut self, node: *mut ListEntry<T>) {
        if node.is_null() || node == self.head || node == self.tail {
            return;
        }

        // Already the first item.
        if (*self.head).next == node {
            return;
        }

        self.detach(node);
        self.attach(node);
    }

    /// Removes a node from the list, reclaiming it and returning its value.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node currently linked into this list. The
    /// pointer is dangling after this call.
    pub(crate) unsafe fn unlink(&mut self, node: *mut ListEntry<T>) -> Option<T> {
        if node.is_null() || node == self.head || node == self.tail {
            return None;
        }

        self.detach(node);
        self.len -= 1;
        // SAFETY: node was allocated by push_front and holds an initialized value.
        Some(Box::from_raw(node).into_value())
    }

    /// Removes the last (least recently used) item, returning its value.
    pub(crate) fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is non-empty, so the tail sentinel's predecessor
        // is a real node.
        unsafe {
            let node = (*self.tail).prev;
            debug_assert!(node != self.head);
            self.detach(node);
            self.len -= 1;
            Some(Box::from_raw(node).into_value())
        }
    }

    /// Removes all items from the list.
    pub(crate) fn clear(&mut self) {
        while self.pop_back().is_some() {}
    }
}

impl<T> Drop for RankList<T> {
    fn drop(&mut self) {
        self.clear();

        // SAFETY: the sentinels were allocated in `new` and are not freed
        // anywhere else. Their values are uninitialized and must not drop.
        unsafe {
            let _ = Box::from_raw(self.head);
            let _ = Box::from_raw(self.tail);
        }
    }
}

impl<T> fmt::Debug for RankList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankList").field("len", &self.len).finish()
    }
}
