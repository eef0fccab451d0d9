//! Server-less backend driven by a plain thread.
//!
//! Useful headless and in tests: blocks are clocked at a fixed interval, and
//! a [`DummyHandle`] lets a test change the buffer size or sample rate, kill
//! the "server", or wait for a number of processed blocks. Each step of the
//! lifecycle can be told to fail.

use super::{
    AudioBackend, BackendError, BufferSizeCallback, Callbacks, ProcessCallback, Result,
    SampleRateCallback, ShutdownCallback,
};
use atomic_float::AtomicF64;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DummyConfig {
    pub buffer_size: u32,
    pub sample_rate: f64,
    /// Pause between blocks. `None` paces blocks in real time.
    pub block_interval: Option<Duration>,
    /// Client name the fake server hands back instead of the requested one.
    pub assigned_name: Option<String>,
    pub fail_open: bool,
    pub fail_activate: bool,
    pub fail_deactivate: bool,
    pub fail_close: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            buffer_size: 512,
            sample_rate: 48_000.0,
            block_interval: None,
            assigned_name: None,
            fail_open: false,
            fail_activate: false,
            fail_deactivate: false,
            fail_close: false,
        }
    }
}

#[derive(Default)]
struct Pending {
    buffer_size: Option<u32>,
    sample_rate: Option<f64>,
    shutdown: bool,
}

struct Shared {
    callbacks: Mutex<Callbacks>,
    pending: Mutex<Pending>,
    running: AtomicBool,
    blocks: AtomicU64,
    buffer_size: AtomicU32,
    sample_rate: AtomicF64,
}

pub struct DummyBackend {
    config: DummyConfig,
    shared: Arc<Shared>,
    client_name: Option<String>,
    thread: Option<JoinHandle<()>>,
}

impl DummyBackend {
    pub fn new(config: DummyConfig) -> Self {
        let shared = Arc::new(Shared {
            callbacks: Mutex::new(Callbacks::default()),
            pending: Mutex::new(Pending::default()),
            running: AtomicBool::new(false),
            blocks: AtomicU64::new(0),
            buffer_size: AtomicU32::new(config.buffer_size),
            sample_rate: AtomicF64::new(config.sample_rate),
        });

        Self {
            config,
            shared,
            client_name: None,
            thread: None,
        }
    }

    /// Remote control for the fake server. Stays valid across reconnects.
    pub fn handle(&self) -> DummyHandle {
        DummyHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn stop_thread(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("dummy audio thread panicked");
            }
        }
    }

    fn drive(shared: Arc<Shared>, fixed_interval: Option<Duration>) {
        while shared.running.load(Ordering::Acquire) {
            let pending = std::mem::take(&mut *shared.pending.lock());
            let mut callbacks = shared.callbacks.lock();

            if let Some(frames) = pending.buffer_size {
                shared.buffer_size.store(frames, Ordering::Relaxed);
                if let Some(callback) = callbacks.buffer_size.as_mut() {
                    callback(frames);
                }
            }
            if let Some(rate) = pending.sample_rate {
                shared.sample_rate.store(rate, Ordering::Relaxed);
                if let Some(callback) = callbacks.sample_rate.as_mut() {
                    callback(rate);
                }
            }
            if pending.shutdown {
                shared.running.store(false, Ordering::Release);
                if let Some(callback) = callbacks.shutdown.as_mut() {
                    callback();
                }
                break;
            }

            let frames = shared.buffer_size.load(Ordering::Relaxed);
            if let Some(process) = callbacks.process.as_mut() {
                process(frames);
                shared.blocks.fetch_add(1, Ordering::Release);
            }
            drop(callbacks);

            let interval = fixed_interval.unwrap_or_else(|| {
                let rate = shared.sample_rate.load(Ordering::Relaxed).max(1.0);
                Duration::from_secs_f64(f64::from(frames) / rate)
            });
            thread::sleep(interval);
        }
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new(DummyConfig::default())
    }
}

impl AudioBackend for DummyBackend {
    fn open(&mut self, client_name: &str) -> Result<()> {
        if self.client_name.is_some() {
            return Err(BackendError::AlreadyConnected);
        }
        if self.config.fail_open {
            return Err(BackendError::Connect("server refused connection".into()));
        }

        self.shared
            .buffer_size
            .store(self.config.buffer_size, Ordering::Relaxed);
        self.shared
            .sample_rate
            .store(self.config.sample_rate, Ordering::Relaxed);
        *self.shared.pending.lock() = Pending::default();
        self.client_name = Some(
            self.config
                .assigned_name
                .clone()
                .unwrap_or_else(|| client_name.to_string()),
        );
        Ok(())
    }

    fn client_name(&self) -> Option<String> {
        self.client_name.clone()
    }

    fn buffer_size(&self) -> u32 {
        self.shared.buffer_size.load(Ordering::Relaxed)
    }

    fn sample_rate(&self) -> f64 {
        self.shared.sample_rate.load(Ordering::Relaxed)
    }

    fn set_process_callback(&mut self, callback: ProcessCallback) {
        self.shared.callbacks.lock().process = Some(callback);
    }

    fn set_buffer_size_callback(&mut self, callback: BufferSizeCallback) {
        self.shared.callbacks.lock().buffer_size = Some(callback);
    }

    fn set_sample_rate_callback(&mut self, callback: SampleRateCallback) {
        self.shared.callbacks.lock().sample_rate = Some(callback);
    }

    fn set_shutdown_callback(&mut self, callback: ShutdownCallback) {
        self.shared.callbacks.lock().shutdown = Some(callback);
    }

    fn activate(&mut self) -> Result<()> {
        if self.client_name.is_none() {
            return Err(BackendError::NotConnected);
        }
        if self.config.fail_activate {
            return Err(BackendError::Activate("server rejected activation".into()));
        }
        if self.thread.is_some() {
            return Ok(());
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let interval = self.config.block_interval;
        let thread = thread::Builder::new()
            .name("consort-dummy-audio".to_string())
            .spawn(move || Self::drive(shared, interval))
            .map_err(|e| {
                self.shared.running.store(false, Ordering::Release);
                BackendError::Activate(e.to_string())
            })?;
        self.thread = Some(thread);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<()> {
        self.stop_thread();
        if self.config.fail_deactivate {
            return Err(BackendError::Deactivate("server did not answer".into()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.stop_thread();
        *self.shared.callbacks.lock() = Callbacks::default();
        if self.client_name.take().is_none() {
            return Err(BackendError::NotConnected);
        }
        if self.config.fail_close {
            return Err(BackendError::Close("server did not answer".into()));
        }
        Ok(())
    }
}

impl Drop for DummyBackend {
    fn drop(&mut self) {
        self.stop_thread();
    }
}

/// Test-side control over a [`DummyBackend`].
#[derive(Clone)]
pub struct DummyHandle {
    shared: Arc<Shared>,
}

impl DummyHandle {
    /// Takes effect before the next block.
    pub fn set_buffer_size(&self, frames: u32) {
        self.shared.pending.lock().buffer_size = Some(frames);
    }

    /// Takes effect before the next block.
    pub fn set_sample_rate(&self, rate: f64) {
        self.shared.pending.lock().sample_rate = Some(rate);
    }

    /// Simulate the server going away.
    pub fn trigger_shutdown(&self) {
        self.shared.pending.lock().shutdown = true;
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn blocks_processed(&self) -> u64 {
        self.shared.blocks.load(Ordering::Acquire)
    }

    /// Poll until at least `count` blocks were processed in total.
    pub fn wait_for_blocks(&self, count: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.blocks_processed() < count {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }
}
