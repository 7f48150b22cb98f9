use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CONFETTI_SYMBOLS: [char; 6] = ['*', '+', '•', '◆', '▪', '✦'];
const GRAVITY: f64 = 12.0;
const DRAG: f64 = 0.97;

/// One piece of confetti, in terminal cell coordinates
#[derive(Debug, Clone)]
pub struct Confetti {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
}

impl Confetti {
    fn launch(rng: &mut StdRng, origin_x: f64, origin_y: f64) -> Self {
        Self {
            x: origin_x,
            y: origin_y,
            vel_x: rng.gen_range(-18.0..18.0),
            vel_y: rng.gen_range(-16.0..-4.0),
            symbol: *CONFETTI_SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
        }
    }

    fn update(&mut self, dt: f64) {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_x *= DRAG;
        self.vel_y += GRAVITY * dt;
    }
}

/// Confetti burst shown when a workout is finished. Driven by the same ticks
/// as the timer.
#[derive(Debug)]
pub struct Celebration {
    pub pieces: Vec<Confetti>,
    pub is_active: bool,
    elapsed_ms: u64,
    duration_ms: u64,
    width: f64,
    height: f64,
    rng: StdRng,
}

impl Celebration {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            pieces: Vec::new(),
            is_active: false,
            elapsed_ms: 0,
            duration_ms: 3000,
            width: 80.0,
            height: 24.0,
            rng,
        }
    }

    /// Fire two bursts from the lower corners of a `width` x `height` area
    pub fn start(&mut self, width: u16, height: u16) {
        self.width = width as f64;
        self.height = height as f64;
        self.elapsed_ms = 0;
        self.is_active = true;
        self.pieces.clear();

        let origins = [(self.width * 0.2, self.height), (self.width * 0.8, self.height)];
        for (ox, oy) in origins {
            for _ in 0..40 {
                let piece = Confetti::launch(&mut self.rng, ox, oy);
                self.pieces.push(piece);
            }
        }
    }

    pub fn update(&mut self, step_ms: u64) {
        if !self.is_active {
            return;
        }
        self.elapsed_ms += step_ms;
        if self.elapsed_ms >= self.duration_ms {
            self.stop();
            return;
        }

        let dt = step_ms as f64 / 1000.0;
        let (width, height) = (self.width, self.height);
        self.pieces.retain_mut(|piece| {
            piece.update(dt);
            piece.y <= height + 2.0 && piece.x >= -2.0 && piece.x <= width + 2.0
        });
        if self.pieces.is_empty() {
            self.stop();
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.pieces.clear();
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}
