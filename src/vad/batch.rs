//! Batch segmentation state machine.
//!
//! Converts the per-frame probability stream into well-formed segments
//! under hysteresis and duration rules:
//!
//! 1. `p >= threshold` opens (or keeps) a segment and clears any pending
//!    silence run.
//! 2. An open segment longer than `max_speech_samples` is force-split,
//!    preferring the checkpoint left by the last qualifying silence run.
//! 3. `p < threshold - 0.15` starts/extends a silence run; once the run
//!    reaches `min_silence_samples` the segment closes at the run start and
//!    is emitted if it exceeds `min_speech_samples`.
//! 4. Probabilities between the two thresholds while open count as speech
//!    and do not advance silence accounting.
//!
//! The rules are evaluated in sequence on every frame, so the max-speech
//! split fires even during uninterrupted speech.

use tracing::debug;

use super::{VadConfig, VadSegment, HYSTERESIS, SPLIT_SILENCE_MS};

/// The in-progress segment, present iff the machine is triggered.
struct OpenSegment {
    start_sample: u64,
    confidence_accum: f32,
    frames: u32,
}

impl OpenSegment {
    fn starting_at(start_sample: u64, prob: f32) -> Self {
        Self {
            start_sample,
            confidence_accum: prob,
            frames: 1,
        }
    }

    fn confidence(&self) -> f32 {
        if self.frames == 0 {
            0.0
        } else {
            (self.confidence_accum / self.frames as f32).clamp(0.0, 1.0)
        }
    }
}

pub(crate) struct BatchSegmenter {
    sample_rate: u32,
    window: u64,
    threshold: f32,
    min_speech_samples: u64,
    min_silence_samples: u64,
    min_silence_samples_at_max_speech: u64,
    max_speech_samples: u64,

    /// Sample index where the current silence run began; 0 ⇔ not set.
    temp_end: u64,
    /// Split checkpoint: end of the last silence run longer than 98 ms.
    prev_end: u64,
    /// Split checkpoint: start of speech after that silence run.
    next_start: u64,
    open: Option<OpenSegment>,
    segments: Vec<VadSegment>,
}

impl BatchSegmenter {
    pub fn new(config: &VadConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            window: config.window_size() as u64,
            threshold: config.threshold,
            min_speech_samples: config.min_speech_samples(),
            min_silence_samples: config.min_silence_samples(),
            min_silence_samples_at_max_speech: config.sr_per_ms() * SPLIT_SILENCE_MS,
            max_speech_samples: config.max_speech_samples(),
            temp_end: 0,
            prev_end: 0,
            next_start: 0,
            open: None,
            segments: Vec::new(),
        }
    }

    /// Feed one frame. `current_sample` is the clock *after* the frame was
    /// consumed, so the frame itself spans `[current_sample - window,
    /// current_sample)`.
    pub fn observe(&mut self, prob: f32, current_sample: u64) {
        let frame_start = current_sample - self.window;

        if let Some(open) = &mut self.open {
            open.confidence_accum += prob;
            open.frames += 1;
        }

        // Speech: clear silence accounting, open if needed.
        if prob >= self.threshold {
            if self.temp_end != 0 {
                self.temp_end = 0;
                if self.next_start < self.prev_end {
                    self.next_start = frame_start;
                }
            }
            if self.open.is_none() {
                debug!(frame_start, prob, "speech onset");
                self.open = Some(OpenSegment::starting_at(frame_start, prob));
            }
        }

        // Forced split once the open segment outgrows the max duration.
        if self
            .open
            .as_ref()
            .is_some_and(|open| current_sample - open.start_sample > self.max_speech_samples)
        {
            if self.prev_end > 0 {
                self.close_at(self.prev_end, false);
                if self.next_start >= self.prev_end {
                    // Speech resumed after the checkpoint; keep going from there.
                    self.open = Some(OpenSegment::starting_at(self.next_start, 0.0));
                }
            } else {
                self.close_at(current_sample, false);
            }
            self.prev_end = 0;
            self.next_start = 0;
            self.temp_end = 0;
        }

        // Deep silence (below the hysteresis band): run the silence clock.
        if prob < self.threshold - HYSTERESIS && self.open.is_some() {
            if self.temp_end == 0 {
                self.temp_end = current_sample;
            }
            if current_sample - self.temp_end > self.min_silence_samples_at_max_speech {
                self.prev_end = self.temp_end;
            }
            if current_sample - self.temp_end >= self.min_silence_samples {
                self.close_at(self.temp_end, true);
                self.prev_end = 0;
                self.next_start = 0;
                self.temp_end = 0;
            }
        }
    }

    /// Close the pass: an open segment is emitted unconditionally, ending at
    /// the end of the buffer (`total_samples`, including any unframed tail).
    pub fn finalize(&mut self, total_samples: u64) {
        if self.open.is_some() {
            self.close_at(total_samples, false);
        }
        self.prev_end = 0;
        self.next_start = 0;
        self.temp_end = 0;
    }

    pub fn segments(&self) -> &[VadSegment] {
        &self.segments
    }

    pub fn reset(&mut self) {
        self.temp_end = 0;
        self.prev_end = 0;
        self.next_start = 0;
        self.open = None;
        self.segments.clear();
    }

    /// Close the open segment at `end_sample`. With `filter_short`, too-short
    /// segments are dropped rather than emitted; the machine resets either way.
    fn close_at(&mut self, end_sample: u64, filter_short: bool) {
        let Some(open) = self.open.take() else {
            return;
        };
        let long_enough = end_sample.saturating_sub(open.start_sample) > self.min_speech_samples;
        if filter_short && !long_enough {
            debug!(
                start = open.start_sample,
                end = end_sample,
                "dropping short segment"
            );
            return;
        }
        let segment = VadSegment {
            start_time_s: open.start_sample as f32 / self.sample_rate as f32,
            end_time_s: end_sample as f32 / self.sample_rate as f32,
            confidence: open.confidence(),
            is_speech: true,
        };
        debug!(
            start_s = segment.start_time_s,
            end_s = segment.end_time_s,
            confidence = segment.confidence,
            "segment emitted"
        );
        self.segments.push(segment);
    }
}
