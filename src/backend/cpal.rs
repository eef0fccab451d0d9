//! Backend on the system's default output device.

use super::{
    AudioBackend, BackendError, BufferSizeCallback, Callbacks, ProcessCallback, Result,
    SampleRateCallback, ShutdownCallback,
};
use ::cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::Arc;

/// Holds a `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` because of platform internals. The stream is
/// created, played and dropped only through `&mut CpalBackend`, which the
/// engine keeps behind its state mutex.
struct StreamHandle(::cpal::Stream);

// SAFETY: never accessed concurrently; see `StreamHandle`.
unsafe impl Send for StreamHandle {}

struct Connection {
    config: ::cpal::SupportedStreamConfig,
    client_name: String,
}

pub struct CpalBackend {
    connection: Option<Connection>,
    callbacks: Arc<Mutex<Callbacks>>,
    stream: Option<StreamHandle>,
    /// Frames per block assumed until the device reports otherwise.
    nominal_buffer_size: u32,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            connection: None,
            callbacks: Arc::new(Mutex::new(Callbacks::default())),
            stream: None,
            nominal_buffer_size: 512,
        }
    }

    fn output_device() -> std::result::Result<::cpal::Device, String> {
        ::cpal::default_host()
            .default_output_device()
            .ok_or_else(|| "no output device available".to_string())
    }

    fn build_stream<T>(
        &self,
        device: &::cpal::Device,
        config: &::cpal::StreamConfig,
    ) -> std::result::Result<::cpal::Stream, ::cpal::BuildStreamError>
    where
        T: ::cpal::SizedSample + ::cpal::FromSample<f32>,
    {
        let channels = usize::from(config.channels).max(1);
        let callbacks = Arc::clone(&self.callbacks);
        let error_callbacks = Arc::clone(&self.callbacks);
        let mut last_frames = self.nominal_buffer_size;

        device.build_output_stream(
            config,
            move |data: &mut [T], _: &::cpal::OutputCallbackInfo| {
                let frames = (data.len() / channels) as u32;
                let mut callbacks = callbacks.lock();

                if frames != last_frames {
                    last_frames = frames;
                    if let Some(callback) = callbacks.buffer_size.as_mut() {
                        callback(frames);
                    }
                }
                if let Some(process) = callbacks.process.as_mut() {
                    process(frames);
                }

                // Plugins render into their own ports; the device gets silence.
                for sample in data.iter_mut() {
                    *sample = T::from_sample(0.0);
                }
            },
            move |err| {
                if let ::cpal::StreamError::DeviceNotAvailable = err {
                    if let Some(callback) = error_callbacks.lock().shutdown.as_mut() {
                        callback();
                    }
                }
            },
            None,
        )
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn open(&mut self, client_name: &str) -> Result<()> {
        if self.connection.is_some() {
            return Err(BackendError::AlreadyConnected);
        }

        let device = Self::output_device().map_err(BackendError::Connect)?;
        let config = device
            .default_output_config()
            .map_err(|e| BackendError::Connect(e.to_string()))?;

        if let ::cpal::SupportedBufferSize::Range { min, max } = config.buffer_size() {
            self.nominal_buffer_size = self.nominal_buffer_size.clamp(*min, *max);
        }

        self.connection = Some(Connection {
            config,
            client_name: client_name.to_string(),
        });
        Ok(())
    }

    fn client_name(&self) -> Option<String> {
        self.connection.as_ref().map(|c| c.client_name.clone())
    }

    fn buffer_size(&self) -> u32 {
        self.nominal_buffer_size
    }

    fn sample_rate(&self) -> f64 {
        self.connection
            .as_ref()
            .map_or(0.0, |c| f64::from(c.config.sample_rate().0))
    }

    fn set_process_callback(&mut self, callback: ProcessCallback) {
        self.callbacks.lock().process = Some(callback);
    }

    fn set_buffer_size_callback(&mut self, callback: BufferSizeCallback) {
        self.callbacks.lock().buffer_size = Some(callback);
    }

    /// The device rate is fixed for the stream's lifetime, so this is never called.
    fn set_sample_rate_callback(&mut self, callback: SampleRateCallback) {
        self.callbacks.lock().sample_rate = Some(callback);
    }

    fn set_shutdown_callback(&mut self, callback: ShutdownCallback) {
        self.callbacks.lock().shutdown = Some(callback);
    }

    fn activate(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let connection = self.connection.as_ref().ok_or(BackendError::NotConnected)?;
        let config: ::cpal::StreamConfig = connection.config.clone().into();
        let device = Self::output_device().map_err(BackendError::Activate)?;

        let stream = match connection.config.sample_format() {
            ::cpal::SampleFormat::F32 => self.build_stream::<f32>(&device, &config),
            ::cpal::SampleFormat::I16 => self.build_stream::<i16>(&device, &config),
            ::cpal::SampleFormat::U16 => self.build_stream::<u16>(&device, &config),
            format => {
                return Err(BackendError::Activate(format!(
                    "unsupported sample format: {format:?}"
                )))
            }
        }
        .map_err(|e| BackendError::Activate(e.to_string()))?;

        stream
            .play()
            .map_err(|e| BackendError::Activate(e.to_string()))?;
        self.stream = Some(StreamHandle(stream));
        Ok(())
    }

    fn deactivate(&mut self) -> Result<()> {
        if let Some(StreamHandle(stream)) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| BackendError::Deactivate(e.to_string()))?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.stream = None;
        *self.callbacks.lock() = Callbacks::default();
        self.connection
            .take()
            .map(|_| ())
            .ok_or(BackendError::NotConnected)
    }
}
