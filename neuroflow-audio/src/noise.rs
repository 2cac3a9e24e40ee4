//! Noise sources for the ambient and rhythm layers

/// xorshift64 PRNG (no allocation, fast enough for the audio callback)
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0xDEADBEEF_CAFEBABE } else { seed },
        }
    }

    /// Next value in [0, 1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Next value in [-1, 1)
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }
}

/// Pink noise via the Paul Kellet filter over white xorshift noise
///
/// Three-pole approximation, within ±0.5 dB of true 1/f over the audio band.
#[derive(Debug, Clone)]
pub struct PinkNoise {
    rng: XorShift64,
    b0: f32,
    b1: f32,
    b2: f32,
}

impl PinkNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: XorShift64::new(seed),
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
        }
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        let white = self.rng.next_bipolar();
        self.b0 = 0.99765 * self.b0 + white * 0.0990460;
        self.b1 = 0.96300 * self.b1 + white * 0.2965164;
        self.b2 = 0.57000 * self.b2 + white * 1.0526913;
        (self.b0 + self.b1 + self.b2 + white * 0.1848) * 0.25
    }

    pub fn reset(&mut self) {
        self.b0 = 0.0;
        self.b1 = 0.0;
        self.b2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xorshift_range() {
        let mut rng = XorShift64::new(42);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_xorshift_deterministic() {
        let mut a = XorShift64::new(7);
        let mut b = XorShift64::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn test_pink_noise_bounded() {
        let mut pink = PinkNoise::new(1);
        for _ in 0..48_000 {
            let v = pink.next();
            assert!(v.abs() < 1.0, "pink sample {} out of range", v);
        }
    }
}
