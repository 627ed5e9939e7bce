//! Piece-supply simulator core.
//!
//! Models the upcoming-piece pipeline of a block-stacking game as four
//! fixed-capacity containers plus a generator, all owned by a single
//! [`Supply`] state struct:
//!
//! - a circular **queue** of the next pieces (capacity 10, FIFO),
//! - a **reservation stack** for temporarily parked pieces (capacity 10, LIFO),
//! - an append-only **play history** (capacity 100, lossy at the cap),
//! - a single-level **undo slot** holding the most recently played piece.
//!
//! # Queue layout
//!
//! ```text
//! slots:   [ .  .  P7 P8 P9 P10 .  .  .  . ]
//!                  ^front          ^back (derived)
//!
//! logical slot k (0-indexed from the front) lives at physical index
//! (front + k) % CAPACITY, valid only for 0 <= k < len.
//! ```
//!
//! Positions in the public API are 1-indexed from the front, matching what
//! the shell shows the player.
//!
//! Every mutating operation is atomic: arguments and capacities are checked
//! before anything is touched, so an `Err` always leaves the whole state
//! exactly as it was.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capacity of the circular queue of upcoming pieces.
pub const QUEUE_CAPACITY: usize = 10;

/// Capacity of the reservation stack.
pub const STACK_CAPACITY: usize = 10;

/// Capacity of the play history. Once full, further plays are not recorded.
pub const HISTORY_CAPACITY: usize = 100;

// ============================================================================
// PIECES
// ============================================================================

/// The seven piece shapes. Shapes are opaque here: no geometry, just identity.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    const ALPHABET: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// One-letter display name.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
        }
    }

    /// Parse a one-letter name (uppercase). Returns `None` for anything else.
    #[inline]
    pub fn from_char(c: char) -> Option<PieceKind> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Iterate over all seven kinds.
    pub fn all() -> impl Iterator<Item = PieceKind> {
        Self::ALPHABET.into_iter()
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A piece in flight through the supply: a kind plus a unique id.
///
/// Ids are assigned by [`PieceGenerator`] in strictly increasing order, so a
/// piece's identity survives any amount of reordering. Immutable once made.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub id: u32,
}

impl Piece {
    #[inline]
    pub fn new(kind: PieceKind, id: u32) -> Piece {
        Piece { kind, id }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}]", self.kind.as_char(), self.id)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Everything that can go wrong with a supply operation.
///
/// All of these are recoverable, user-facing conditions: the shell prints the
/// message and keeps going, and the operation that failed has not changed any
/// state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum SupplyError {
    #[error("the queue is full")]
    QueueFull,
    #[error("the queue is empty")]
    QueueEmpty,
    #[error("the reservation stack is full")]
    StackFull,
    #[error("the reservation stack is empty")]
    StackEmpty,
    #[error("position {pos} is invalid (queue holds {len} pieces)")]
    InvalidPosition { pos: usize, len: usize },
    #[error("there is no play to undo")]
    NothingToUndo,
    #[error("inversion would overflow a container")]
    InversionOverflow,
}

// ============================================================================
// PIECE GENERATOR
// ============================================================================

/// Produces pieces with a random kind and a strictly increasing id.
///
/// Owns its RNG so a seeded generator yields a reproducible stream. Typed
/// insertions draw from the same id counter as random ones, so ids stay
/// unique across both paths.
pub struct PieceGenerator {
    rng: StdRng,
    next_id: u32,
}

impl PieceGenerator {
    /// Generator seeded from the OS.
    pub fn new() -> PieceGenerator {
        PieceGenerator {
            rng: StdRng::from_os_rng(),
            next_id: 0,
        }
    }

    /// Deterministic generator for tests and `--seed` runs.
    pub fn seeded(seed: u64) -> PieceGenerator {
        PieceGenerator {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
        }
    }

    /// Next piece with a uniformly random kind.
    pub fn generate(&mut self) -> Piece {
        let kind = PieceKind::ALPHABET[self.rng.random_range(0..PieceKind::ALPHABET.len())];
        Piece::new(kind, self.take_id())
    }

    /// Next piece with a caller-chosen kind. Shares the id counter with
    /// [`generate`](Self::generate).
    pub fn mint(&mut self, kind: PieceKind) -> Piece {
        Piece::new(kind, self.take_id())
    }

    #[inline]
    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CIRCULAR QUEUE
// ============================================================================

/// Fixed-capacity ring buffer of upcoming pieces.
///
/// Stores pieces in a plain array with an explicit front index and length;
/// the back index is always `(front + len) % QUEUE_CAPACITY`. No allocation,
/// O(1) enqueue/dequeue, O(k) positional removal.
#[derive(Clone, Debug)]
pub struct PieceQueue {
    slots: [Option<Piece>; QUEUE_CAPACITY],
    front: usize,
    len: usize,
}

impl PieceQueue {
    /// Empty queue with the front at physical index 0.
    pub const fn new() -> PieceQueue {
        PieceQueue {
            slots: [None; QUEUE_CAPACITY],
            front: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == QUEUE_CAPACITY
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        QUEUE_CAPACITY
    }

    /// Physical index of logical slot `offset` (0-indexed from the front).
    #[inline]
    fn physical(&self, offset: usize) -> usize {
        (self.front + offset) % QUEUE_CAPACITY
    }

    /// Pieces from front to back. Empty iterator when the queue is empty.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> + '_ {
        (0..self.len).map(move |k| {
            self.slots[self.physical(k)]
                .as_ref()
                .expect("slot within len is occupied")
        })
    }

    /// Add a piece at the back.
    pub fn enqueue(&mut self, piece: Piece) -> Result<(), SupplyError> {
        if self.is_full() {
            return Err(SupplyError::QueueFull);
        }
        let back = self.physical(self.len);
        self.slots[back] = Some(piece);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the front piece.
    pub fn dequeue(&mut self) -> Result<Piece, SupplyError> {
        if self.is_empty() {
            return Err(SupplyError::QueueEmpty);
        }
        let piece = self.slots[self.front]
            .take()
            .expect("front slot of a non-empty queue is occupied");
        self.front = (self.front + 1) % QUEUE_CAPACITY;
        self.len -= 1;
        Ok(piece)
    }

    /// Re-insert a piece at the logical front, receding the front index by
    /// one. This is the undo path: it puts a just-played piece back where it
    /// came from.
    pub fn push_front(&mut self, piece: Piece) -> Result<(), SupplyError> {
        if self.is_full() {
            return Err(SupplyError::QueueFull);
        }
        self.front = (self.front + QUEUE_CAPACITY - 1) % QUEUE_CAPACITY;
        self.slots[self.front] = Some(piece);
        self.len += 1;
        Ok(())
    }

    /// Exchange the pieces at two 1-indexed positions. Self-inverse; front,
    /// back and length are unchanged. Returns the pieces that were at
    /// `pos1` and `pos2` before the exchange.
    pub fn swap(&mut self, pos1: usize, pos2: usize) -> Result<(Piece, Piece), SupplyError> {
        if self.len < 2 {
            return Err(SupplyError::InvalidPosition {
                pos: pos1,
                len: self.len,
            });
        }
        self.check_position(pos1)?;
        self.check_position(pos2)?;
        let i = self.physical(pos1 - 1);
        let j = self.physical(pos2 - 1);
        let a = self.slots[i].expect("slot within len is occupied");
        let b = self.slots[j].expect("slot within len is occupied");
        self.slots[i] = Some(b);
        self.slots[j] = Some(a);
        Ok((a, b))
    }

    /// Remove the piece at a 1-indexed position, shifting every piece behind
    /// it one slot toward the front. Relative order of the remaining pieces
    /// is preserved; the back index recedes by one.
    pub fn remove_at(&mut self, pos: usize) -> Result<Piece, SupplyError> {
        if self.is_empty() {
            return Err(SupplyError::QueueEmpty);
        }
        self.check_position(pos)?;
        let removed = self.slots[self.physical(pos - 1)]
            .take()
            .expect("slot within len is occupied");
        for k in (pos - 1)..(self.len - 1) {
            let next = self.physical(k + 1);
            let here = self.physical(k);
            let moved = self.slots[next].take();
            self.slots[here] = moved;
        }
        self.len -= 1;
        Ok(removed)
    }

    #[inline]
    fn check_position(&self, pos: usize) -> Result<(), SupplyError> {
        if pos == 0 || pos > self.len {
            return Err(SupplyError::InvalidPosition { pos, len: self.len });
        }
        Ok(())
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RESERVATION STACK
// ============================================================================

/// Fixed-capacity LIFO for temporarily parked pieces.
///
/// `len` counts occupied slots; the top element sits at `len - 1` (the
/// classic top index, shifted by one so an empty stack needs no sentinel).
#[derive(Clone, Debug)]
pub struct ReserveStack {
    slots: [Option<Piece>; STACK_CAPACITY],
    len: usize,
}

impl ReserveStack {
    pub const fn new() -> ReserveStack {
        ReserveStack {
            slots: [None; STACK_CAPACITY],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == STACK_CAPACITY
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        STACK_CAPACITY
    }

    pub fn push(&mut self, piece: Piece) -> Result<(), SupplyError> {
        if self.is_full() {
            return Err(SupplyError::StackFull);
        }
        self.slots[self.len] = Some(piece);
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Piece, SupplyError> {
        if self.is_empty() {
            return Err(SupplyError::StackEmpty);
        }
        self.len -= 1;
        Ok(self.slots[self.len]
            .take()
            .expect("slot within len is occupied"))
    }

    /// Top piece without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&Piece> {
        if self.is_empty() {
            None
        } else {
            self.slots[self.len - 1].as_ref()
        }
    }

    /// Pieces from top to bottom.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &Piece> + '_ {
        (0..self.len)
            .rev()
            .map(move |k| self.slots[k].as_ref().expect("slot within len is occupied"))
    }
}

impl Default for ReserveStack {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PLAY HISTORY
// ============================================================================

/// Append-only log of pieces that left the queue by being played or removed.
///
/// Bounded at [`HISTORY_CAPACITY`]: once full, further entries are silently
/// dropped rather than evicting old ones. The only way an entry ever leaves
/// is the single-step retraction performed by undo.
#[derive(Clone, Debug, Default)]
pub struct PlayHistory {
    entries: Vec<Piece>,
}

impl PlayHistory {
    pub fn new() -> PlayHistory {
        PlayHistory {
            entries: Vec::with_capacity(HISTORY_CAPACITY),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a piece. No-op once the log is at capacity; that loss is
    /// accepted, not an error.
    pub fn record(&mut self, piece: Piece) {
        if self.entries.len() < HISTORY_CAPACITY {
            self.entries.push(piece);
        }
    }

    /// Drop the most recent entry, if any. Undo support only.
    pub fn retract_last(&mut self) {
        self.entries.pop();
    }

    /// Entries in play order.
    #[inline]
    pub fn view(&self) -> &[Piece] {
        &self.entries
    }
}

// ============================================================================
// SUPPLY — the whole simulator state
// ============================================================================

/// Sizes of both containers after an inversion. Both zero means there was
/// nothing to invert and the state was left alone.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InvertOutcome {
    pub queue_len: usize,
    pub stack_len: usize,
}

impl InvertOutcome {
    /// True when both containers were empty and nothing moved.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.queue_len == 0 && self.stack_len == 0
    }
}

/// The complete simulator state: queue, reservation stack, history, undo
/// slot and the piece generator, behind the operations the shell drives.
///
/// Construction pre-fills the queue to capacity. All composite operations
/// validate before mutating, so any `Err` leaves every container untouched.
pub struct Supply {
    queue: PieceQueue,
    stack: ReserveStack,
    history: PlayHistory,
    last_played: Option<Piece>,
    generator: PieceGenerator,
}

impl Supply {
    /// Fresh supply with an OS-seeded generator and a full queue.
    pub fn new() -> Supply {
        Supply::with_generator(PieceGenerator::new())
    }

    /// Fresh supply with a deterministic piece stream.
    pub fn with_seed(seed: u64) -> Supply {
        Supply::with_generator(PieceGenerator::seeded(seed))
    }

    fn with_generator(mut generator: PieceGenerator) -> Supply {
        let mut queue = PieceQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            queue
                .enqueue(generator.generate())
                .expect("filling an empty queue to capacity");
        }
        Supply {
            queue,
            stack: ReserveStack::new(),
            history: PlayHistory::new(),
            last_played: None,
            generator,
        }
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Play the front piece: dequeue it, record it in the history and arm
    /// the undo slot with it.
    pub fn play(&mut self) -> Result<Piece, SupplyError> {
        let piece = self.queue.dequeue()?;
        self.history.record(piece);
        self.last_played = Some(piece);
        Ok(piece)
    }

    /// Generate a random piece and enqueue it at the back.
    ///
    /// Fullness is checked before a piece is generated, so a failed insert
    /// never consumes an id.
    pub fn insert_random(&mut self) -> Result<Piece, SupplyError> {
        if self.queue.is_full() {
            return Err(SupplyError::QueueFull);
        }
        let piece = self.generator.generate();
        self.queue.enqueue(piece)?;
        Ok(piece)
    }

    /// Enqueue a piece of a caller-chosen kind. Same id counter and same
    /// fullness pre-check as [`insert_random`](Self::insert_random).
    pub fn insert_kind(&mut self, kind: PieceKind) -> Result<Piece, SupplyError> {
        if self.queue.is_full() {
            return Err(SupplyError::QueueFull);
        }
        let piece = self.generator.mint(kind);
        self.queue.enqueue(piece)?;
        Ok(piece)
    }

    /// Exchange the pieces at two 1-indexed queue positions. Returns the
    /// pieces as they stood before the exchange.
    pub fn swap(&mut self, pos1: usize, pos2: usize) -> Result<(Piece, Piece), SupplyError> {
        self.queue.swap(pos1, pos2)
    }

    /// Remove the piece at a 1-indexed queue position. The removed piece has
    /// left the queue for good, so it is recorded in the history; removal is
    /// not a play and does not arm the undo slot.
    pub fn remove_at(&mut self, pos: usize) -> Result<Piece, SupplyError> {
        let piece = self.queue.remove_at(pos)?;
        self.history.record(piece);
        Ok(piece)
    }

    /// Park the front piece on the reservation stack.
    pub fn reserve(&mut self) -> Result<Piece, SupplyError> {
        if self.queue.is_empty() {
            return Err(SupplyError::QueueEmpty);
        }
        if self.stack.is_full() {
            return Err(SupplyError::StackFull);
        }
        let piece = self.queue.dequeue()?;
        self.stack.push(piece)?;
        Ok(piece)
    }

    /// Move the reserved top piece back to the queue's back.
    pub fn use_reserved(&mut self) -> Result<Piece, SupplyError> {
        if self.stack.is_empty() {
            return Err(SupplyError::StackEmpty);
        }
        if self.queue.is_full() {
            return Err(SupplyError::QueueFull);
        }
        let piece = self.stack.pop()?;
        self.queue.enqueue(piece)?;
        Ok(piece)
    }

    /// Reverse the most recent play: put the piece back at the queue front
    /// and retract its history entry. One level only; a second consecutive
    /// undo fails. A full queue blocks the undo and leaves the slot armed.
    pub fn undo(&mut self) -> Result<Piece, SupplyError> {
        let piece = self.last_played.ok_or(SupplyError::NothingToUndo)?;
        if self.queue.is_full() {
            return Err(SupplyError::QueueFull);
        }
        self.queue.push_front(piece)?;
        self.history.retract_last();
        self.last_played = None;
        Ok(piece)
    }

    /// Swap the entire contents of the queue and the reservation stack.
    ///
    /// The former stack top becomes the new queue front; the former queue
    /// front ends up deepest in the new stack. With both containers empty
    /// this is a no-op reported through [`InvertOutcome::is_noop`]. Sizes
    /// are checked against the target capacities before anything moves.
    pub fn invert(&mut self) -> Result<InvertOutcome, SupplyError> {
        if self.queue.is_empty() && self.stack.is_empty() {
            return Ok(InvertOutcome {
                queue_len: 0,
                stack_len: 0,
            });
        }
        let from_queue: Vec<Piece> = self.queue.iter().copied().collect();
        let from_stack: Vec<Piece> = self.stack.iter_top_down().copied().collect();
        if from_queue.len() > STACK_CAPACITY || from_stack.len() > QUEUE_CAPACITY {
            return Err(SupplyError::InversionOverflow);
        }
        let mut queue = PieceQueue::new();
        for &piece in &from_stack {
            queue.enqueue(piece)?;
        }
        let mut stack = ReserveStack::new();
        for &piece in &from_queue {
            stack.push(piece)?;
        }
        self.queue = queue;
        self.stack = stack;
        Ok(InvertOutcome {
            queue_len: self.queue.len(),
            stack_len: self.stack.len(),
        })
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    /// Queue contents from front to back.
    pub fn queue_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.queue.iter()
    }

    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Top of the reservation stack, if any.
    #[inline]
    pub fn reserved_top(&self) -> Option<&Piece> {
        self.stack.peek()
    }

    /// Reservation stack contents from top to bottom.
    pub fn reserved_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.stack.iter_top_down()
    }

    #[inline]
    pub fn reserved_len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn reserved_capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// Played/removed pieces in the order they left the queue.
    #[inline]
    pub fn history(&self) -> &[Piece] {
        self.history.view()
    }

    /// The piece the undo slot is armed with, if any.
    #[inline]
    pub fn last_played(&self) -> Option<&Piece> {
        self.last_played.as_ref()
    }
}

impl Default for Supply {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
