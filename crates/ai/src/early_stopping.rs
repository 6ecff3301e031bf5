//! Patience-based early stopping on a validation loss (lower is better).

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Rounds without improvement tolerated before stopping.
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
        }
    }

    /// Record this round's loss. Returns `true` when training should stop.
    pub fn should_stop(&mut self, value: f64) -> bool {
        let improved = match self.best_value {
            None => value.is_finite(),
            Some(best) => value < best,
        };

        if improved {
            self.best_value = Some(value);
            self.best_round = self.current_round;
        }

        self.current_round += 1;
        self.current_round - self.best_round > self.patience
    }

    /// Whether the most recent [`should_stop`](Self::should_stop) call set a new best.
    pub fn improved_last_round(&self) -> bool {
        self.best_value.is_some() && self.current_round == self.best_round + 1
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    pub fn best_round(&self) -> usize {
        self.best_round
    }

    pub fn rounds_seen(&self) -> usize {
        self.current_round
    }
}
