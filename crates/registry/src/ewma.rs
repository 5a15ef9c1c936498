/// Exponentially weighted moving average, used to track a provider's uptime
/// percentage and result latency without keeping a full sample history.
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

impl Default for Ewma {
    fn default() -> Self {
        Self::new(0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_seeds_the_value() {
        let mut ewma = Ewma::new(0.5);
        ewma.update(10.0);
        assert_eq!(ewma.value(), 10.0);
        assert!(ewma.initialized());
    }

    #[test]
    fn ewma_updates_toward_new_samples() {
        let mut ewma = Ewma::new(0.5);
        ewma.update(0.0);
        ewma.update(100.0);
        assert_eq!(ewma.value(), 50.0);
    }
}
