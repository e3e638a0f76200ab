//! Double-buffered audio mixing.
//!
//! Two output buffers alternate between the mixer and the playback engine.
//! [`AudioMixer::on_buffer_done`] runs in the playback engine's completion
//! context, not on the frame loop. It only touches voice state through the
//! [`VoiceBank`] lock, which the main context also takes to start a voice.
//!
//! # Buffer Cycle
//!
//! ```text
//!   Queued --(engine reports done)--> Filling --(mixed, published, submitted)--> Queued
//! ```
//!
//! Both buffers are primed with silence and queued at start-up. After that
//! the buffer at [`AudioMixer::fill_block`] is the only one that may be
//! filled, and it is handed back before the index flips.
//!
//! `Filling` is only ever observed from inside
//! [`AudioMixer::on_buffer_done`]: the mixer takes a buffer, mixes it and
//! queues it again in one call. Outside that call both buffers read
//! `Queued`, including before [`AudioMixer::prime`].

use crate::error::{EmuError, Result};
use std::sync::Arc;
use varvara::VoiceBank;

/// Ownership state of one output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Owned by the playback engine.
    Queued,
    /// Owned by the mixer.
    Filling,
}

/// Hardware playback queue.
///
/// Implemented by the platform audio driver. `submit` hands a buffer's
/// samples to the engine; the engine reports `is_done` once it has played
/// them and the buffer may be refilled.
///
/// The mixer performs no cache maintenance. An engine whose hardware reads
/// the samples outside the CPU's coherent view must copy them into its own
/// memory or flush the data cache inside `submit`.
pub trait PlaybackEngine {
    /// Whether buffer `index` has finished playing.
    fn is_done(&self, index: usize) -> bool;

    /// Queue buffer `index` for playback.
    ///
    /// `samples` is only borrowed for the call; copy or flush before returning.
    fn submit(&mut self, index: usize, samples: &[i16]);
}

/// Mixes the shared voices into two alternating output buffers.
#[derive(Debug)]
pub struct AudioMixer {
    bank: Arc<VoiceBank>,
    buffers: [Vec<i16>; 2],
    states: [BufferState; 2],
    fill_block: usize,
}

impl AudioMixer {
    /// Allocate two buffers of `frames` stereo frames each.
    ///
    /// # Errors
    ///
    /// `FatalInit` when `frames` is zero.
    pub fn new(bank: Arc<VoiceBank>, frames: usize) -> Result<Self> {
        if frames == 0 {
            tracing::error!("audio buffers cannot be empty");
            return Err(EmuError::FatalInit {
                subsystem: "audio",
                reason: "zero-length buffer".into(),
            });
        }
        let samples = frames * 2;
        Ok(Self {
            bank,
            buffers: [vec![0; samples], vec![0; samples]],
            states: [BufferState::Queued; 2],
            fill_block: 0,
        })
    }

    /// Submit both buffers as silence so the engine starts with a full queue.
    pub fn prime(&mut self, engine: &mut dyn PlaybackEngine) {
        for (index, buffer) in self.buffers.iter_mut().enumerate() {
            buffer.fill(0);
            self.states[index] = BufferState::Queued;
            engine.submit(index, buffer.as_slice());
        }
        self.fill_block = 0;
        tracing::debug!(samples = self.buffers[0].len(), "audio buffers primed");
    }

    /// Completion handler: refill and resubmit the next buffer if it is free.
    ///
    /// Returns whether a buffer was mixed.
    pub fn on_buffer_done(&mut self, engine: &mut dyn PlaybackEngine) -> bool {
        let index = self.fill_block;
        if !engine.is_done(index) {
            return false;
        }

        self.states[index] = BufferState::Filling;
        let buffer = &mut self.buffers[index];
        buffer.fill(0);
        let active = self.bank.mix_into(buffer);

        self.states[index] = BufferState::Queued;
        engine.submit(index, buffer.as_slice());
        self.fill_block ^= 1;

        tracing::trace!(index, active, "audio buffer mixed");
        true
    }

    /// State of buffer `index`.
    pub fn state(&self, index: usize) -> BufferState {
        self.states[index & 1]
    }

    /// Index of the next buffer to fill.
    pub fn fill_block(&self) -> usize {
        self.fill_block
    }

    /// Samples of buffer `index`.
    pub fn buffer(&self, index: usize) -> &[i16] {
        &self.buffers[index & 1]
    }

    /// Shared voices this mixer renders.
    pub fn voices(&self) -> &Arc<VoiceBank> {
        &self.bank
    }
}
