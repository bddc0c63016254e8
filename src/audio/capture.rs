use crate::error::{FilterError, Result};
use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

/// Live input stream delivering mono buffers over a channel
pub struct AudioCapture {
    stream: cpal::Stream,
    _rt_handle: Option<RtPriorityHandle>,
}

impl AudioCapture {
    /// Open an input device and start streaming
    ///
    /// Multi-channel devices are reduced to their first channel.
    pub fn new(
        sample_rate: u32,
        channels: u16,
        buffer_frames: u32,
        tx: Sender<Vec<f32>>,
        device_name: Option<&str>,
    ) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| FilterError::AudioDevice(format!("{}", e)))?
                .find(|d| {
                    d.description()
                        .map(|desc| format!("{:?}", desc).contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| FilterError::AudioDevice(format!("No input device {:?}", name)))?,
            None => host
                .default_input_device()
                .ok_or_else(|| FilterError::AudioDevice("No input device found".into()))?,
        };

        match device.description() {
            Ok(desc) => log::info!("Input device: {:?}", desc),
            Err(_) => log::info!("Input device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Fixed(buffer_frames),
        };

        let stride = channels.max(1) as usize;
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono: Vec<f32> = data.iter().step_by(stride).copied().collect();
                    if tx.send(mono).is_err() {
                        log::warn!("Audio receiver dropped");
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| FilterError::AudioStream(format!("{}", e)))?;

        // Attempt to promote to real-time priority
        let rt_handle =
            audio_thread_priority::promote_current_thread_to_real_time(buffer_frames, sample_rate);

        let rt_handle = match rt_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Could not set real-time priority: {}", e);
                None
            }
        };

        stream
            .play()
            .map_err(|e| FilterError::AudioStream(format!("{}", e)))?;

        Ok(Self {
            stream,
            _rt_handle: rt_handle,
        })
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}
