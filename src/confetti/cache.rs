//! Invalidation cache for the derived per-instance arrays
//!
//! Every derived quantity is one entry. An entry is either `Stale` or
//! `Valid(len)`, where `len` is the number of slots that were computed. A
//! valid entry still needs recomputing once the active quantity grows past
//! its length.
//!
//! ## Dependency graph
//!
//! Invalidating an entry also invalidates everything downstream of it:
//!
//! ```text
//! Transforms ──┬─> TransformedShapes ──> Specular
//!              ├─> LightMetrics ──┬─> Lightness ──> Color
//!              │                  └─> Specular
//!              ├─> FillGradients
//!              └─> Specular
//! Hue, Saturation ──> Color ──┬─> FillGradients
//!                             └─> Specular
//! ```

use flagset::{flags, FlagSet};

flags! {
    /// One derived per-instance array
    pub enum Derived: u16 {
        /// Affine transform per instance
        Transforms,
        /// Catalog shape mapped through its transform
        TransformedShapes,
        /// Light distance, illuminance and shadow offset
        LightMetrics,
        /// Hue within the configured range
        Hue,
        /// Saturation within the configured range
        Saturation,
        /// Lightness within the configured range
        Lightness,
        /// Final lit color
        Color,
        /// Linear alpha gradient across each shape
        FillGradients,
        /// Specular highlight and bevel gradients
        Specular,
    }
}

/// Number of cache entries
pub const ENTRY_COUNT: usize = 9;

impl Derived {
    /// Position of this entry in per-entry tables
    pub fn index(self) -> usize {
        match self {
            Derived::Transforms => 0,
            Derived::TransformedShapes => 1,
            Derived::LightMetrics => 2,
            Derived::Hue => 3,
            Derived::Saturation => 4,
            Derived::Lightness => 5,
            Derived::Color => 6,
            Derived::FillGradients => 7,
            Derived::Specular => 8,
        }
    }

    /// Entries directly invalidated when this one is
    pub fn downstream(self) -> FlagSet<Derived> {
        match self {
            Derived::Transforms => {
                Derived::TransformedShapes
                    | Derived::LightMetrics
                    | Derived::FillGradients
                    | Derived::Specular
            }
            Derived::TransformedShapes => Derived::Specular.into(),
            Derived::LightMetrics => Derived::Lightness | Derived::Specular,
            Derived::Hue | Derived::Saturation | Derived::Lightness => Derived::Color.into(),
            Derived::Color => Derived::FillGradients | Derived::Specular,
            Derived::FillGradients | Derived::Specular => FlagSet::default(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Derived::Transforms => "transforms",
            Derived::TransformedShapes => "transformed shapes",
            Derived::LightMetrics => "light metrics",
            Derived::Hue => "hue",
            Derived::Saturation => "saturation",
            Derived::Lightness => "lightness",
            Derived::Color => "color",
            Derived::FillGradients => "fill gradients",
            Derived::Specular => "specular",
        }
    }
}

/// Roots plus everything reachable downstream of them
pub fn closure(roots: impl Into<FlagSet<Derived>>) -> FlagSet<Derived> {
    let mut reached = roots.into();
    let mut frontier = reached;
    while !frontier.is_empty() {
        let mut next = FlagSet::default();
        for entry in frontier {
            next |= entry.downstream();
        }
        frontier = next - reached;
        reached |= next;
    }
    reached
}

/// Validity of one cache entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    Stale,
    /// Computed for this many slots
    Valid(usize),
}

/// Per-entry validity plus recompute counters
#[derive(Clone, Debug)]
pub struct InvalidationCache {
    states: [EntryState; ENTRY_COUNT],
    recomputes: [u64; ENTRY_COUNT],
}

impl Default for InvalidationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationCache {
    /// Everything starts stale
    pub fn new() -> Self {
        Self {
            states: [EntryState::Stale; ENTRY_COUNT],
            recomputes: [0; ENTRY_COUNT],
        }
    }

    pub fn state(&self, entry: Derived) -> EntryState {
        self.states[entry.index()]
    }

    /// Valid and long enough to cover `quantity` slots
    pub fn is_valid(&self, entry: Derived, quantity: usize) -> bool {
        matches!(self.state(entry), EntryState::Valid(len) if len >= quantity)
    }

    /// Mark `roots` and everything downstream stale
    ///
    /// Returns the full set that was invalidated.
    pub fn invalidate(&mut self, roots: impl Into<FlagSet<Derived>>) -> FlagSet<Derived> {
        let stale = closure(roots);
        for entry in stale {
            self.states[entry.index()] = EntryState::Stale;
        }
        stale
    }

    pub fn invalidate_all(&mut self) {
        self.states = [EntryState::Stale; ENTRY_COUNT];
    }

    /// Record a completed recompute of `len` slots
    pub fn mark_valid(&mut self, entry: Derived, len: usize) {
        self.states[entry.index()] = EntryState::Valid(len);
        self.recomputes[entry.index()] += 1;
        log::trace!("Recomputed {} for {} slots", entry.name(), len);
    }

    /// How many times `entry` has been recomputed
    pub fn recompute_count(&self, entry: Derived) -> u64 {
        self.recomputes[entry.index()]
    }
}
