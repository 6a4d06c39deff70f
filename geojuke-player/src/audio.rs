//! rodio audio backend
//!
//! The two engine channels map onto two rodio sinks sharing one output
//! stream. rodio's output stream is not `Send`, so the stream and sinks
//! live on a dedicated audio thread and the [`Channel`] handles talk to it
//! through a command queue. Transport commands are fire-and-forget;
//! decoding errors surface synchronously from `load`, before the source
//! ever reaches the audio thread, so a bad file can never interrupt the
//! channel that is already playing.

use crate::error::{Error, Result};
use crate::playback::channel::Channel;
use geojuke_common::model::AudioSource;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type BoxedSource = Box<dyn Source<Item = f32> + Send>;

enum AudioCmd {
    Load { channel: usize, source: BoxedSource },
    Play { channel: usize },
    Pause { channel: usize },
    SetVolume { channel: usize, volume: f32 },
    Shutdown,
}

/// Owner of the audio thread; keep it alive for the whole session.
pub struct AudioBackend {
    tx: mpsc::UnboundedSender<AudioCmd>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioBackend {
    /// Open the default output device and start the audio thread.
    pub fn start() -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        let thread = thread::Builder::new()
            .name("geojuke-audio".to_string())
            .spawn(move || audio_thread(rx, ready_tx))
            .map_err(|e| Error::Audio(format!("cannot spawn audio thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("audio output started");
                Ok(Self {
                    tx,
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::Audio("audio thread exited during startup".to_string())),
        }
    }

    /// The engine's channel pair, both backed by this output.
    pub fn channels(&self) -> [Box<dyn Channel>; 2] {
        [
            Box::new(RodioChannel {
                index: 0,
                tx: self.tx.clone(),
            }),
            Box::new(RodioChannel {
                index: 1,
                tx: self.tx.clone(),
            }),
        ]
    }
}

impl Drop for AudioBackend {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// One engine channel backed by a rodio sink.
struct RodioChannel {
    index: usize,
    tx: mpsc::UnboundedSender<AudioCmd>,
}

impl Channel for RodioChannel {
    fn load(&self, source: &AudioSource) -> Result<()> {
        let file = File::open(source.key())
            .map_err(|e| Error::Load(format!("cannot open {source}: {e}")))?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| Error::Load(format!("cannot decode {source}: {e}")))?;
        let boxed: BoxedSource = Box::new(decoder.convert_samples());

        self.tx
            .send(AudioCmd::Load {
                channel: self.index,
                source: boxed,
            })
            .map_err(|_| Error::Audio("audio thread is gone".to_string()))
    }

    fn play(&self) {
        let _ = self.tx.send(AudioCmd::Play {
            channel: self.index,
        });
    }

    fn pause(&self) {
        let _ = self.tx.send(AudioCmd::Pause {
            channel: self.index,
        });
    }

    fn set_volume(&self, volume: f32) {
        let _ = self.tx.send(AudioCmd::SetVolume {
            channel: self.index,
            volume,
        });
    }
}

fn audio_thread(
    mut rx: mpsc::UnboundedReceiver<AudioCmd>,
    ready_tx: std::sync::mpsc::Sender<Result<()>>,
) {
    // The stream must outlive the sinks; dropping it silences everything.
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready_tx.send(Err(Error::Audio(format!("no output device: {e}"))));
            return;
        }
    };
    let _ = ready_tx.send(Ok(()));

    let mut sinks: [Option<Sink>; 2] = [None, None];
    // Last requested volume per channel, re-applied when a sink is rebuilt
    let mut volumes = [1.0f32; 2];

    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            AudioCmd::Load { channel, source } => {
                // Replace-by-rebuild: a fresh paused sink takes the new
                // source; the old sink is stopped and dropped.
                match Sink::try_new(&handle) {
                    Ok(sink) => {
                        sink.pause();
                        sink.set_volume(volumes[channel]);
                        sink.append(source);
                        if let Some(old) = sinks[channel].replace(sink) {
                            old.stop();
                        }
                        debug!("channel {channel} loaded new source");
                    }
                    Err(e) => {
                        warn!("channel {channel} sink creation failed: {e}");
                        // Drop the stale sink too, or a following play()
                        // would restart the previous track on this channel
                        if let Some(old) = sinks[channel].take() {
                            old.stop();
                        }
                    }
                }
            }
            AudioCmd::Play { channel } => {
                if let Some(sink) = &sinks[channel] {
                    sink.play();
                }
            }
            AudioCmd::Pause { channel } => {
                if let Some(sink) = &sinks[channel] {
                    sink.pause();
                }
            }
            AudioCmd::SetVolume { channel, volume } => {
                volumes[channel] = volume;
                if let Some(sink) = &sinks[channel] {
                    sink.set_volume(volume);
                }
            }
            AudioCmd::Shutdown => break,
        }
    }

    debug!("audio thread stopped");
}
