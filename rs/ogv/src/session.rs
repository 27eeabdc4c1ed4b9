use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::{AudioPacket, Error, Result, VideoFrame};

/// State shared between the decode thread and any number of consumers.
///
/// Both queues and the completion flags live behind one lock; every operation under it is O(1).
#[derive(Default)]
pub(crate) struct Session {
	state: Mutex<State>,

	// Notified when a video frame is dequeued or a halt is requested.
	space: Condvar,

	// Never cleared once set.
	halt: AtomicBool,
}

#[derive(Default)]
struct State {
	video: VecDeque<VideoFrame>,
	audio: VecDeque<AudioPacket>,

	// The decode thread has exited.
	done: bool,

	// The reason the decode thread exited early, if it wasn't asked to.
	error: Option<Error>,
}

impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_video(&self, frame: VideoFrame) {
		self.state.lock().video.push_back(frame);
	}

	pub fn push_audio(&self, packet: AudioPacket) {
		self.state.lock().audio.push_back(packet);
	}

	pub fn pop_video(&self) -> Option<VideoFrame> {
		let frame = self.state.lock().video.pop_front()?;
		self.space.notify_all();
		Some(frame)
	}

	pub fn pop_audio(&self) -> Option<AudioPacket> {
		self.state.lock().audio.pop_front()
	}

	pub fn video_count(&self) -> usize {
		self.state.lock().video.len()
	}

	#[cfg(test)]
	pub fn audio_count(&self) -> usize {
		self.state.lock().audio.len()
	}

	/// Block while at least `max` video frames are queued.
	///
	/// Wakes up on every dequeue, and rechecks at least once per `interval` regardless.
	/// Returns an error if a halt was requested.
	pub fn wait_for_space(&self, max: usize, interval: Duration) -> Result<()> {
		let mut state = self.state.lock();

		loop {
			if self.is_halted() {
				return Err(Error::Cancel);
			}

			if state.video.len() < max {
				return Ok(());
			}

			self.space.wait_for(&mut state, interval);
		}
	}

	/// Ask the decode thread to stop at its next opportunity.
	pub fn halt(&self) {
		// Hold the lock so a waiter can't miss the notification between its check and its wait.
		let _state = self.state.lock();
		self.halt.store(true, Ordering::SeqCst);
		self.space.notify_all();
	}

	pub fn is_halted(&self) -> bool {
		self.halt.load(Ordering::SeqCst)
	}

	/// Return an error if a halt was requested.
	pub fn check(&self) -> Result<()> {
		match self.is_halted() {
			true => Err(Error::Cancel),
			false => Ok(()),
		}
	}

	/// Mark the decode thread as exited, recording why.
	///
	/// Errors are dropped if a halt was requested; a deliberate stop is never a failure.
	pub fn finish(&self, result: Result<()>) {
		let mut state = self.state.lock();
		state.done = true;

		if let Err(err) = result {
			if !self.is_halted() && state.error.is_none() {
				state.error = Some(err);
			}
		}
	}

	#[cfg(test)]
	pub fn is_done(&self) -> bool {
		self.state.lock().done
	}

	/// True while there is anything left to consume or produce.
	pub fn is_active(&self) -> bool {
		let state = self.state.lock();
		!state.video.is_empty() || !state.audio.is_empty() || !state.done
	}

	pub fn error(&self) -> Option<Error> {
		self.state.lock().error.clone()
	}

	/// Release everything still queued, returning the number of video frames and audio packets dropped.
	pub fn drain(&self) -> (usize, usize) {
		let mut state = self.state.lock();
		let video = std::mem::take(&mut state.video);
		let audio = std::mem::take(&mut state.audio);
		drop(state);

		(video.len(), audio.len())
	}
}
