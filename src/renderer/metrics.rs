//! Frame timing and per-frame counters.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: usize = 120;

/// Tracks render performance over the last 120 frames.
pub struct RenderMetrics {
    frame_times: VecDeque<Duration>,
    frame_start: Instant,
    pub quad_count: usize,
    pub draw_calls: u32,
    pub buffer_uploads: u32,
    /// Frames skipped because the surface was lost or outdated.
    pub skipped_frames: u64,
}

impl Default for RenderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderMetrics {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(WINDOW),
            frame_start: Instant::now(),
            quad_count: 0,
            draw_calls: 0,
            buffer_uploads: 0,
            skipped_frames: 0,
        }
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
        self.draw_calls = 0;
        self.buffer_uploads = 0;
    }

    pub fn end_frame(&mut self) {
        self.record_frame_time(self.frame_start.elapsed());
    }

    fn record_frame_time(&mut self, elapsed: Duration) {
        self.frame_times.push_back(elapsed);
        if self.frame_times.len() > WINDOW {
            self.frame_times.pop_front();
        }
    }

    pub fn record_draw_call(&mut self) {
        self.draw_calls += 1;
    }

    pub fn record_buffer_upload(&mut self) {
        self.buffer_uploads += 1;
    }

    pub fn record_skipped_frame(&mut self) {
        self.skipped_frames += 1;
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let sum: Duration = self.frame_times.iter().sum();
        sum.as_secs_f32() * 1000.0 / self.frame_times.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let ms = self.avg_frame_time_ms();
        if ms > 0.0 {
            1000.0 / ms
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_reset_each_frame() {
        let mut metrics = RenderMetrics::new();
        metrics.begin_frame();
        metrics.record_draw_call();
        metrics.record_buffer_upload();
        metrics.end_frame();
        assert_eq!(metrics.draw_calls, 1);

        metrics.begin_frame();
        assert_eq!(metrics.draw_calls, 0);
        assert_eq!(metrics.buffer_uploads, 0);
    }

    #[test]
    fn test_fps_from_fixed_frame_times() {
        let mut metrics = RenderMetrics::new();
        for _ in 0..(WINDOW + 10) {
            metrics.record_frame_time(Duration::from_millis(20));
        }
        assert_eq!(metrics.frame_times.len(), WINDOW);
        assert!((metrics.avg_frame_time_ms() - 20.0).abs() < 0.01);
        assert!((metrics.fps() - 50.0).abs() < 0.1);
    }
}
