//! NeuroFlow - therapeutic generative-audio engine
//!
//! Headless binary. A host process drives it with JSON lines on stdin
//! and reads engine events as JSON lines from stdout; audio goes
//! straight to the default output device.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use neuroflow_audio::LayerStack;
use neuroflow_bridge::{decode, encode, resolve, LogThrottle};
use neuroflow_engine::{EngineCommand, EngineEvent, SessionEngine, SessionSummary};
use neuroflow_session::{SessionRecord, SessionStore};

/// Engine tick cadence on the control thread
const TICK: Duration = Duration::from_millis(50);
/// Command/event channel capacity
const CHANNEL_CAP: usize = 1024;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the host protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let (cmd_tx, cmd_rx) = bounded::<EngineCommand>(CHANNEL_CAP);
    let (evt_tx, evt_rx) = bounded::<EngineEvent>(CHANNEL_CAP);

    let shutdown = Arc::new(AtomicBool::new(false));

    let engine_shutdown = shutdown.clone();
    let engine_handle = thread::spawn(move || {
        run_engine_thread(cmd_rx, evt_tx, engine_shutdown);
    });

    let event_handle = thread::spawn(move || {
        run_event_loop(evt_rx);
    });

    // stdin drives everything; EOF means the host went away
    run_stdin_loop(&cmd_tx);

    let _ = cmd_tx.try_send(EngineCommand::Shutdown);
    shutdown.store(true, Ordering::SeqCst);
    let _ = engine_handle.join();
    let _ = event_handle.join();
    Ok(())
}

/// Read host messages line by line, decode and resolve them, and hand
/// the resulting commands to the control thread. Bad lines are dropped
/// with a warning; the loop only ends on EOF.
fn run_stdin_loop(cmd_tx: &Sender<EngineCommand>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!(%err, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let Ok(message) = decode(&line) else {
            continue;
        };
        match resolve(message) {
            Ok(command) => {
                if cmd_tx.try_send(command).is_err() {
                    warn!("command channel full, dropping host message");
                }
            }
            Err(err) => warn!(%err, "dropping unresolvable host message"),
        }
    }
    info!("stdin closed, shutting down");
}

/// Control + audio thread: owns the cpal stream, the shared layer
/// stack, and the session engine that ticks against a monotonic clock.
fn run_engine_thread(
    cmd_rx: Receiver<EngineCommand>,
    evt_tx: Sender<EngineEvent>,
    shutdown: Arc<AtomicBool>,
) {
    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        let _ = evt_tx.try_send(EngineEvent::Error("no audio output device found".into()));
        return;
    };
    let config = match device.default_output_config() {
        Ok(config) => config,
        Err(err) => {
            let _ = evt_tx.try_send(EngineEvent::Error(format!("no output config: {err}")));
            return;
        }
    };
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "audio device ready");

    let stack = Arc::new(Mutex::new(LayerStack::new(sample_rate)));
    let stack_for_callback = stack.clone();

    // Pre-allocated downmix buffer keeps the callback allocation-free
    let mut stereo_buffer = vec![0.0f32; downmix_capacity(config.buffer_size())];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Never block the real-time thread: on contention, silence
            if let Some(mut stack) = stack_for_callback.try_lock() {
                if channels == 2 {
                    stack.process(data);
                } else {
                    let frames = data.len() / channels;
                    // A burst larger than the scratch cannot be
                    // downmixed in place; silence it instead of
                    // panicking on the real-time thread.
                    if frames * 2 > stereo_buffer.len() {
                        data.fill(0.0);
                        return;
                    }
                    let stereo = &mut stereo_buffer[..frames * 2];
                    stack.process(stereo);
                    for (i, frame) in data.chunks_exact_mut(channels).enumerate() {
                        let mono = (stereo[i * 2] + stereo[i * 2 + 1]) * 0.5;
                        for sample in frame.iter_mut() {
                            *sample = mono;
                        }
                    }
                }
            } else {
                data.fill(0.0);
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    );
    let stream = match stream {
        Ok(stream) => stream,
        Err(err) => {
            let _ = evt_tx.try_send(EngineEvent::Error(format!("stream build failed: {err}")));
            return;
        }
    };
    if let Err(err) = stream.play() {
        let _ = evt_tx.try_send(EngineEvent::Error(format!("stream start failed: {err}")));
        return;
    }

    let store = match SessionStore::open_default() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(%err, "session history unavailable");
            None
        }
    };

    let started = Instant::now();
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut engine = SessionEngine::new(stack, evt_tx, seed);

    while !shutdown.load(Ordering::Relaxed) {
        let now_secs = started.elapsed().as_secs_f64();
        match cmd_rx.recv_timeout(TICK) {
            Ok(command) => {
                let is_shutdown = matches!(command, EngineCommand::Shutdown);
                if let Some(summary) = engine.handle_command(command, now_secs) {
                    persist(&store, summary);
                }
                if is_shutdown {
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
        engine.tick(started.elapsed().as_secs_f64());
    }
}

/// Saving history is best-effort: a failure is a warning, never a crash
fn persist(store: &Option<SessionStore>, summary: SessionSummary) {
    let Some(store) = store else { return };
    if let Err(err) = store.save(&record_from_summary(summary)) {
        warn!(%err, "failed to save session record");
    }
}

/// Tasks map 1:1 to target states, so the task id is recovered from
/// the summary's target rather than threaded through the engine.
fn record_from_summary(summary: SessionSummary) -> SessionRecord {
    let task_id = summary
        .target_state_id
        .as_deref()
        .and_then(neuroflow_catalog::task_for_target)
        .map(|t| t.id.to_string());
    SessionRecord {
        initial_state_id: summary.initial_state_id,
        task_id,
        target_state_id: summary.target_state_id,
        duration_secs: summary.duration_secs,
        completed: summary.completed,
    }
}

/// Stereo samples to pre-allocate for the non-stereo downmix path.
/// Sized from the device's advertised maximum so the callback never
/// sees a burst it cannot hold.
fn downmix_capacity(buffer_size: &cpal::SupportedBufferSize) -> usize {
    const FALLBACK_FRAMES: usize = 16384;
    match buffer_size {
        cpal::SupportedBufferSize::Range { max, .. } => {
            (*max as usize).max(FALLBACK_FRAMES) * 2
        }
        cpal::SupportedBufferSize::Unknown => FALLBACK_FRAMES * 2,
    }
}

/// Forward engine events to stdout as JSON lines, rate-limiting LOG
/// chatter so a noisy source cannot flood the host.
fn run_event_loop(evt_rx: Receiver<EngineEvent>) {
    let mut throttle = LogThrottle::new();
    let started = Instant::now();
    let stdout = io::stdout();
    for event in evt_rx.iter() {
        if let EngineEvent::Log { message, .. } = &event {
            let source = message.split(':').next().unwrap_or("engine").to_string();
            if !throttle.allow(&source, started.elapsed().as_secs_f64()) {
                continue;
            }
        }
        let mut out = stdout.lock();
        if writeln!(out, "{}", encode(&event)).and_then(|_| out.flush()).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_session_records_its_task() {
        let summary = SessionSummary {
            initial_state_id: "RAIVA".to_string(),
            target_state_id: Some("FOCO".to_string()),
            duration_secs: 300,
            completed: true,
        };
        let record = record_from_summary(summary);
        assert_eq!(record.task_id.as_deref(), Some("ESTUDAR"));
        assert_eq!(record.target_state_id.as_deref(), Some("FOCO"));

        let store = SessionStore::open_in_memory().unwrap();
        store.save(&record).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.most_used_task.as_deref(), Some("ESTUDAR"));
    }

    #[test]
    fn test_session_without_target_has_no_task() {
        let summary = SessionSummary {
            initial_state_id: "NEUTRO".to_string(),
            target_state_id: None,
            duration_secs: 12,
            completed: false,
        };
        assert!(record_from_summary(summary).task_id.is_none());
    }

    #[test]
    fn test_downmix_scratch_covers_device_maximum() {
        let large = cpal::SupportedBufferSize::Range {
            min: 64,
            max: 32768,
        };
        assert_eq!(downmix_capacity(&large), 32768 * 2);

        // Small advertised maxima still get the generous default.
        let small = cpal::SupportedBufferSize::Range { min: 16, max: 512 };
        assert_eq!(downmix_capacity(&small), 16384 * 2);

        assert_eq!(
            downmix_capacity(&cpal::SupportedBufferSize::Unknown),
            16384 * 2
        );
    }
}
