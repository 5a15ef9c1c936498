/// Exponentially weighted moving average, used to track a provider's
/// observed uptime and compute latency from the ledger's side of the
/// accounting without keeping a full sample history.
#[derive(Debug, Clone, Copy)]
pub struct Ewma {
    alpha: f64,
    value: f64,
    initialized: bool,
}

impl Ewma {
    pub fn new(alpha: f64) -> Self {
        Ewma {
            alpha,
            value: 0.0,
            initialized: false,
        }
    }

    pub fn update(&mut self, sample: f64) {
        if !self.initialized {
            self.value = sample;
            self.initialized = true;
        } else {
            self.value = self.alpha * self.value + (1.0 - self.alpha) * sample;
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ewma_seeds_from_first_sample() {
        let mut e = Ewma::new(0.9);
        e.update(42.0);
        assert_eq!(e.value(), 42.0);
    }
}
