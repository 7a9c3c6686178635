// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Looping horizontal scroll for titles wider than their container.
//!
//! The animator drives a single offset from `0` to `-title_width` over a fixed
//! cycle, then snaps back to `0` and repeats. The label is drawn twice, the
//! second copy exactly `title_width` behind the first, so the copy scrolling
//! in lands precisely where the first one started and the snap is not visible.
//!
//! The animator has no clock of its own; the event loop advances it with the
//! real time elapsed between frames.

use std::time::Duration;

pub(crate) struct MarqueeAnimator {
    cycle: Duration,
    title_width: f64,
    phase: Duration,
    offset: f64,
    running: bool,
}

impl MarqueeAnimator {
    /// Creates an idle animator scrolling one title width per `cycle`.
    pub(crate) fn new(cycle: Duration) -> Self {
        Self {
            cycle: cycle.max(Duration::from_millis(1)),
            title_width: 0.0,
            phase: Duration::ZERO,
            offset: 0.0,
            running: false,
        }
    }

    /// Resets the offset to `0` and (re)starts the scroll loop.
    pub(crate) fn start(&mut self, title_width: u16) {
        self.title_width = f64::from(title_width);
        self.phase = Duration::ZERO;
        self.offset = 0.0;
        self.running = true;
    }

    /// Holds the current frame.
    pub(crate) fn freeze(&mut self) {
        self.running = false;
    }

    /// Stops the loop and returns the label to its resting position.
    pub(crate) fn release(&mut self) {
        self.running = false;
        self.phase = Duration::ZERO;
        self.offset = 0.0;
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub(crate) fn offset(&self) -> f64 {
        self.offset
    }

    /// Advances the animation by `elapsed`.
    pub(crate) fn tick(&mut self, elapsed: Duration) {
        if !self.running {
            return;
        }

        self.phase += elapsed;
        if self.phase >= self.cycle {
            let wrapped = self.phase.as_nanos() % self.cycle.as_nanos();
            self.phase = Duration::from_nanos(wrapped as u64);
        }

        let progress = self.phase.as_secs_f64() / self.cycle.as_secs_f64();
        self.offset = -progress * self.title_width;
    }

    /// Horizontal positions of the two label copies.
    pub(crate) fn label_offsets(&self) -> [f64; 2] {
        [self.offset, self.offset + self.title_width]
    }

    /// Lays both label copies out on a band `width` cells wide, clipping
    /// whatever falls outside it.
    pub(crate) fn compose(&self, label: &str, width: u16) -> String {
        let width = usize::from(width);
        let mut band = vec![' '; width];

        for start in self.label_offsets() {
            let start = start.round() as i64;
            for (i, c) in label.chars().enumerate() {
                let col = start + i as i64;
                if (0..width as i64).contains(&col) {
                    band[col as usize] = c;
                }
            }
        }

        band.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE: Duration = Duration::from_secs(10);

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn idle_animator_does_not_move() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.tick(Duration::from_secs(3));

        assert!(!marquee.is_running());
        assert_close(marquee.offset(), 0.0);
    }

    #[test]
    fn scrolls_one_title_width_per_cycle() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.start(400);

        marquee.tick(Duration::from_millis(2_500));
        assert_close(marquee.offset(), -100.0);

        marquee.tick(Duration::from_millis(2_500));
        assert_close(marquee.offset(), -200.0);

        marquee.tick(Duration::from_millis(4_999));
        assert!(marquee.offset() > -400.0 && marquee.offset() < -399.0);
    }

    #[test]
    fn snaps_back_to_the_start_after_each_cycle() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.start(400);

        marquee.tick(CYCLE);
        assert_close(marquee.offset(), 0.0);

        marquee.tick(Duration::from_millis(12_500));
        assert_close(marquee.offset(), -100.0);
        assert!(marquee.is_running());
    }

    #[test]
    fn start_resets_from_any_prior_offset() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.start(400);
        marquee.tick(Duration::from_millis(7_300));
        assert!(marquee.offset() < 0.0);

        marquee.start(400);
        assert_close(marquee.offset(), 0.0);

        marquee.freeze();
        marquee.tick(Duration::from_secs(1));
        marquee.start(400);
        assert_close(marquee.offset(), 0.0);
        assert!(marquee.is_running());
    }

    #[test]
    fn freeze_holds_the_current_frame() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.start(400);
        marquee.tick(Duration::from_secs(5));

        marquee.freeze();
        marquee.tick(Duration::from_secs(2));

        assert!(!marquee.is_running());
        assert_close(marquee.offset(), -200.0);
    }

    #[test]
    fn release_returns_to_rest() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.start(400);
        marquee.tick(Duration::from_secs(5));

        marquee.release();

        assert!(!marquee.is_running());
        assert_close(marquee.offset(), 0.0);
    }

    #[test]
    fn second_copy_trails_by_one_title_width() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.start(340);
        marquee.tick(Duration::from_millis(9_990));

        let [first, second] = marquee.label_offsets();
        assert_close(second - first, 340.0);
        // Just before the snap the second copy is where the first one began.
        assert!(second.abs() < 0.5);
    }

    #[test]
    fn compose_places_both_copies() {
        let mut marquee = MarqueeAnimator::new(CYCLE);
        marquee.start(8);

        assert_eq!(marquee.compose("abc", 12), "abc     abc ");

        marquee.tick(Duration::from_millis(2_500));
        assert_eq!(marquee.compose("abc", 12), "c     abc   ");
    }
}
