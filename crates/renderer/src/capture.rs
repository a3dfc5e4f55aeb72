//! Deterministic frame capture.
//!
//! The stepping loop is generic over the frame producer and the sink so
//! its ordering, abort, and finalize guarantees are testable without a
//! GPU; the engine plugs in an offscreen render + PNG encode closure.

use std::sync::atomic::{AtomicBool, Ordering};

use framesink::{FrameSink, SinkError};

/// Fixed capture frame rate; frame `i` renders at manual time `i / 60`.
pub const CAPTURE_FPS: u32 = 60;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The external store rejected a frame. `index` is the frame that
    /// failed; every index below it was submitted successfully.
    #[error("frame {index} submission failed")]
    Submission {
        index: u32,
        #[source]
        source: SinkError,
    },
    #[error("rendering frame {index} failed")]
    Render {
        index: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("capture aborted before frame {index}")]
    Aborted { index: u32 },
    #[error("capture finalize failed")]
    Finalize(#[source] SinkError),
}

/// Runs the capture loop: for each frame index in order, produce the
/// encoded frame at its manual time, submit it, and wait for the
/// submission before continuing. Returns the number of frames stored.
///
/// Partial frames already stored are left in place on failure; cleanup is
/// the external service's concern.
pub fn run_capture<F>(
    duration_seconds: f32,
    abort: &AtomicBool,
    sink: &mut dyn FrameSink,
    mut render_frame: F,
) -> Result<u32, CaptureError>
where
    F: FnMut(u32, f32) -> anyhow::Result<Vec<u8>>,
{
    let total = (duration_seconds * CAPTURE_FPS as f32).round().max(0.0) as u32;
    tracing::info!(total, duration_seconds, "capture started");

    for index in 0..total {
        if abort.load(Ordering::Relaxed) {
            tracing::warn!(index, "capture aborted");
            return Err(CaptureError::Aborted { index });
        }
        let time = index as f32 / CAPTURE_FPS as f32;
        let png = render_frame(index, time)
            .map_err(|source| CaptureError::Render { index, source })?;
        sink.store(index, &png)
            .map_err(|source| CaptureError::Submission { index, source })?;
    }

    sink.finalize().map_err(CaptureError::Finalize)?;
    tracing::info!(total, "capture finished");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records calls; optionally fails `store` at one index.
    #[derive(Default)]
    struct RecordingSink {
        stored: Vec<u32>,
        finalized: u32,
        fail_at: Option<u32>,
    }

    impl FrameSink for RecordingSink {
        fn store(&mut self, index: u32, _png: &[u8]) -> Result<(), SinkError> {
            if self.fail_at == Some(index) {
                return Err(SinkError::Other(format!("injected failure at {index}")));
            }
            self.stored.push(index);
            Ok(())
        }

        fn finalize(&mut self) -> Result<(), SinkError> {
            self.finalized += 1;
            Ok(())
        }
    }

    fn frame(_index: u32, _time: f32) -> anyhow::Result<Vec<u8>> {
        Ok(vec![0u8; 4])
    }

    #[test]
    fn two_seconds_at_sixty_fps_stores_120_frames_in_order() {
        let mut sink = RecordingSink::default();
        let abort = AtomicBool::new(false);
        let total = run_capture(2.0, &abort, &mut sink, frame).unwrap();

        assert_eq!(total, 120);
        assert_eq!(sink.stored.len(), 120);
        assert!(sink.stored.windows(2).all(|pair| pair[1] == pair[0] + 1));
        assert_eq!(sink.stored.first(), Some(&0));
        assert_eq!(sink.stored.last(), Some(&119));
        assert_eq!(sink.finalized, 1);
    }

    #[test]
    fn store_failure_aborts_without_finalize() {
        let mut sink = RecordingSink {
            fail_at: Some(40),
            ..Default::default()
        };
        let abort = AtomicBool::new(false);
        let err = run_capture(2.0, &abort, &mut sink, frame).unwrap_err();

        assert!(matches!(err, CaptureError::Submission { index: 40, .. }));
        assert_eq!(sink.stored.len(), 40);
        assert_eq!(sink.finalized, 0);
    }

    #[test]
    fn manual_times_follow_the_frame_index() {
        let mut sink = RecordingSink::default();
        let abort = AtomicBool::new(false);
        let mut times = Vec::new();
        run_capture(0.1, &abort, &mut sink, |_index, time| {
            times.push(time);
            Ok(vec![])
        })
        .unwrap();
        assert_eq!(times.len(), 6);
        assert_eq!(times[0], 0.0);
        assert!((times[5] - 5.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn abort_flag_stops_between_frames() {
        let mut sink = RecordingSink::default();
        let abort = AtomicBool::new(false);
        let err = run_capture(2.0, &abort, &mut sink, |index, _time| {
            if index == 10 {
                abort.store(true, Ordering::Relaxed);
            }
            Ok(vec![])
        })
        .unwrap_err();

        // Frame 10 still completes; the flag is honored before frame 11.
        assert!(matches!(err, CaptureError::Aborted { index: 11 }));
        assert_eq!(sink.stored.len(), 11);
        assert_eq!(sink.finalized, 0);
    }

    #[test]
    fn render_failure_carries_its_index() {
        let mut sink = RecordingSink::default();
        let abort = AtomicBool::new(false);
        let err = run_capture(1.0, &abort, &mut sink, |index, _time| {
            if index == 3 {
                anyhow::bail!("readback failed");
            }
            Ok(vec![])
        })
        .unwrap_err();
        assert!(matches!(err, CaptureError::Render { index: 3, .. }));
        assert_eq!(sink.stored.len(), 3);
    }
}
