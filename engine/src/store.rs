use space_salvagers_core::Outcome;

/// External state manager that persists finished sessions.
pub trait OutcomeStore {
    /// Persists the outcome of a session that just ended.
    fn save(&mut self, outcome: &Outcome);
}

/// Store that keeps outcomes in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryOutcomeStore {
    outcomes: Vec<Outcome>,
}

impl MemoryOutcomeStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    /// Outcomes saved so far, oldest first.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}

impl OutcomeStore for MemoryOutcomeStore {
    fn save(&mut self, outcome: &Outcome) {
        self.outcomes.push(outcome.clone());
    }
}

impl<S: OutcomeStore + ?Sized> OutcomeStore for &mut S {
    fn save(&mut self, outcome: &Outcome) {
        (**self).save(outcome);
    }
}
