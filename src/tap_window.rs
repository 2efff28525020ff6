use std::time::Instant;

/// Number of taps the tempo estimate is computed over.
pub const DEFAULT_WINDOW_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TapEvent {
    at: Instant,
}

impl TapEvent {
    pub fn new(at: Instant) -> Self {
        Self { at }
    }

    pub fn now() -> Self {
        Self::new(Instant::now())
    }

    pub fn at(&self) -> Instant {
        self.at
    }
}

/// Circular buffer with a write cursor and a sticky "full" flag.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    cursor: usize,
    full: bool,
}

pub type TapWindow = RingBuffer<TapEvent>;

impl<T> RingBuffer<T> {
    /// Creates an empty ring. Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
            full: false,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
        } else {
            self.slots[self.cursor] = value;
        }

        self.cursor = (self.cursor + 1) % self.capacity;
        if self.cursor == 0 {
            self.full = true;
        }
    }

    /// Iterates from the oldest to the newest entry.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        // Before the first wrap the cursor sits at `slots.len()`, so `older` is empty.
        let (newer, older) = self.slots.split_at(self.cursor.min(self.slots.len()));
        older.iter().chain(newer.iter())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the ring has wrapped at least once.
    pub fn is_full(&self) -> bool {
        self.full
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
