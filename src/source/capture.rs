//! Live capture from an audio input device via cpal.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};

use super::{mix_to_mono, SampleSource, SourceError};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Callback chunks buffered between the audio thread and the pipeline.
const CHANNEL_CAPACITY: usize = 64;

type Chunk = Result<Vec<f32>, String>;

/// Captures mono samples from an input device.
///
/// The audio callback mixes each buffer to mono and hands it over a bounded
/// channel. `read_block` blocks on that channel until a full block is
/// available or the read timeout elapses. Chunks that arrive while the
/// channel is full are dropped and counted.
pub struct CaptureSource {
    /// Kept alive for the lifetime of the source.
    _stream: cpal::Stream,
    receiver: Receiver<Chunk>,
    pending: VecDeque<f32>,
    sample_rate: u32,
    timeout: Duration,
    dropped: Arc<AtomicU64>,
}

impl CaptureSource {
    /// Opens `device_spec` and starts capturing.
    ///
    /// Uses `requested_rate` when the device supports it and the device's
    /// default rate otherwise.
    ///
    /// # Arguments
    /// * `device_spec` - "default", a numeric index, or a device name
    /// * `requested_rate` - Preferred sample rate in Hz
    /// * `timeout` - Longest wait for audio in `read_block`
    ///
    /// # Errors
    /// - If the device cannot be found or has no usable input config
    /// - If the stream cannot be built or started
    pub fn open(device_spec: &str, requested_rate: u32, timeout: Duration) -> Result<Self, SourceError> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            if device_spec == "default" {
                host.default_input_device()
                    .ok_or_else(|| SourceError::Device("no audio input device available".to_string()))
            } else {
                find_device_by_name(&host, device_spec)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let supported = pick_input_config(&device, requested_rate)?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let sample_format = supported.sample_format();

        if sample_rate != requested_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Analyzing at device rate.",
                requested_rate,
                sample_rate
            );
        }
        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            channels,
            sample_format
        );

        let (sender, receiver) = mpsc::sync_channel(CHANNEL_CAPACITY);
        let dropped = Arc::new(AtomicU64::new(0));
        let config: cpal::StreamConfig = supported.into();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, sender, &dropped),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, sender, &dropped),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, sender, &dropped),
            SampleFormat::I32 => build_stream::<i32>(&device, &config, channels, sender, &dropped),
            other => {
                return Err(SourceError::Device(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }?;

        stream
            .play()
            .map_err(|e| SourceError::Device(format!("failed to start stream: {e}")))?;
        tracing::debug!("Audio stream started");

        Ok(Self {
            _stream: stream,
            receiver,
            pending: VecDeque::new(),
            sample_rate,
            timeout,
            dropped,
        })
    }
}

impl SampleSource for CaptureSource {
    fn read_block(&mut self, count: usize) -> Result<Vec<f32>, SourceError> {
        while self.pending.len() < count {
            match self.receiver.recv_timeout(self.timeout) {
                Ok(Ok(chunk)) => self.pending.extend(chunk),
                Ok(Err(msg)) => return Err(SourceError::Stream(msg)),
                Err(RecvTimeoutError::Timeout) => return Err(SourceError::Timeout(self.timeout)),
                Err(RecvTimeoutError::Disconnected) => return Err(SourceError::Disconnected),
            }
        }

        Ok(self.pending.drain(..count).collect())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            tracing::warn!("Dropped {} audio chunks while the display lagged", dropped);
        }
        tracing::debug!("Audio stream stopped");
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    sender: SyncSender<Chunk>,
    dropped: &Arc<AtomicU64>,
) -> Result<cpal::Stream, SourceError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let error_sender = sender.clone();
    let dropped = Arc::clone(dropped);
    let mut converted: Vec<f32> = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                converted.clear();
                converted.extend(data.iter().map(|&s| s.to_sample::<f32>()));

                let mut mono = Vec::with_capacity(converted.len() / channels.max(1));
                mix_to_mono(&converted, channels, &mut mono);

                if let Err(TrySendError::Full(_)) = sender.try_send(Ok(mono)) {
                    dropped.fetch_add(1, Ordering::Relaxed);
                }
            },
            move |err| {
                tracing::error!("Audio stream error: {}", err);
                let _ = error_sender.try_send(Err(err.to_string()));
            },
            None,
        )
        .map_err(|e| SourceError::Device(format!("failed to build input stream: {e}")))
}

/// Picks an input config at `requested_rate`, falling back to the default config.
fn pick_input_config(
    device: &cpal::Device,
    requested_rate: u32,
) -> Result<cpal::SupportedStreamConfig, SourceError> {
    let default = device
        .default_input_config()
        .map_err(|e| SourceError::Device(format!("no default input config: {e}")))?;

    let matching = device.supported_input_configs().ok().and_then(|mut configs| {
        configs.find(|range| {
            range.sample_format() == default.sample_format()
                && range.min_sample_rate().0 <= requested_rate
                && requested_rate <= range.max_sample_rate().0
        })
    });

    Ok(match matching {
        Some(range) => range.with_sample_rate(cpal::SampleRate(requested_rate)),
        None => default,
    })
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device, SourceError> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| SourceError::Device(format!("failed to enumerate devices: {e}")))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            SourceError::Device(format!(
                "device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            ))
        });
    }

    devices
        .into_iter()
        .find(|device| device.name().is_ok_and(|name| name == device_spec))
        .ok_or_else(|| {
            SourceError::Device(format!(
                "input device '{device_spec}' not found. Use 'specbars list-devices' to see available devices."
            ))
        })
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T, E>(f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let Ok(dev_null) = OpenOptions::new().write(true).open("/dev/null") else {
        return f();
    };

    // Save the current stderr file descriptor
    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return f();
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return f();
    }

    let result = f();

    // Restore the original stderr
    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T, E>(f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    f()
}
