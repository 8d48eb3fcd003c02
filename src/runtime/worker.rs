//! Native worker thread that owns a `SimulationLoop`.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::schema::{Command, Event, FluidConfig};

use super::{Compositor, DEFAULT_QUEUE_CAPACITY, SimulationLoop};

/// Roughly 60 frames per second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Handle to a simulation running on its own thread.
///
/// Communication is message passing only. Dropping the handle shuts the
/// thread down and joins it.
pub struct FluidWorker {
    commands: Option<SyncSender<Command>>,
    events: Receiver<Event>,
    handle: Option<JoinHandle<()>>,
}

impl FluidWorker {
    pub fn spawn<C>(compositor: C, config: FluidConfig, frame_interval: Duration) -> Result<Self, WorkerError>
    where
        C: Compositor + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::sync_channel(DEFAULT_QUEUE_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("ether-fluid".to_string())
            .spawn(move || {
                run(SimulationLoop::new(compositor, config), command_rx, event_tx, frame_interval)
            })
            .map_err(WorkerError::Spawn)?;

        Ok(Self {
            commands: Some(command_tx),
            events: event_rx,
            handle: Some(handle),
        })
    }

    /// Send a command without blocking.
    pub fn send(&self, command: Command) -> Result<(), WorkerError> {
        let sender = self.commands.as_ref().ok_or(WorkerError::Stopped)?;
        sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => WorkerError::Busy,
            TrySendError::Disconnected(_) => WorkerError::Stopped,
        })
    }

    /// Next event, if one is waiting.
    pub fn try_recv(&self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Event, WorkerError> {
        self.events.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => WorkerError::Timeout,
            RecvTimeoutError::Disconnected => WorkerError::Stopped,
        })
    }

    /// Send `cleanup` and wait for the thread to exit.
    pub fn shutdown(mut self) -> Result<(), WorkerError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), WorkerError> {
        if let Some(sender) = self.commands.take() {
            // A full channel is fine: dropping the sender also ends the loop
            let _ = sender.try_send(Command::Cleanup);
        }
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked),
            None => Ok(()),
        }
    }
}

impl Drop for FluidWorker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Worker did not shut down cleanly: {}", e);
        }
    }
}

fn forward(sim: &mut SimulationLoop<impl Compositor>, command: Command) {
    if let Err(e) = sim.post(command) {
        warn!("{}", e);
    }
}

fn run<C: Compositor>(
    mut sim: SimulationLoop<C>,
    commands: Receiver<Command>,
    events: mpsc::Sender<Event>,
    frame_interval: Duration,
) {
    let clock = Instant::now();
    let mut disconnected = false;
    debug!("Worker started");

    loop {
        let frame_start = Instant::now();

        // Block while nothing is scheduled; otherwise only take what is waiting
        if !sim.is_scheduled() {
            match commands.recv() {
                Ok(command) => forward(&mut sim, command),
                Err(_) => disconnected = true,
            }
        }
        while !disconnected {
            match commands.try_recv() {
                Ok(command) => forward(&mut sim, command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => disconnected = true,
            }
        }

        sim.tick(clock.elapsed().as_secs_f64() * 1000.0);
        for event in sim.take_events() {
            if events.send(event).is_err() {
                debug!("Event receiver gone");
            }
        }

        if sim.is_closed() || disconnected {
            break;
        }
        if sim.is_scheduled() {
            if let Some(remaining) = frame_interval.checked_sub(frame_start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }
    info!("Worker stopped");
}

/// Worker errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Worker command channel is full")]
    Busy,
    #[error("Worker has stopped")]
    Stopped,
    #[error("Timed out waiting for worker event")]
    Timeout,
    #[error("Worker thread panicked")]
    Panicked,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::NullCompositor;
    use crate::schema::SurfaceSize;

    fn config() -> FluidConfig {
        FluidConfig {
            random_seed: Some(3),
            ..FluidConfig::default()
        }
    }

    #[test]
    fn test_worker_reports_ready_and_shuts_down() {
        let worker = FluidWorker::spawn(NullCompositor, config(), Duration::from_millis(1)).unwrap();
        worker
            .send(Command::Init {
                surface: SurfaceSize::new(64.0, 48.0),
                pixel_ratio: 1.0,
                initial_colors: Vec::new(),
            })
            .unwrap();
        worker.send(Command::Start).unwrap();

        let event = worker.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, Event::Ready);

        worker.send(Command::Pointer { x: 10.0, y: 10.0 }).unwrap();
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_failed_init_sends_nothing() {
        let worker = FluidWorker::spawn(NullCompositor, config(), Duration::from_millis(1)).unwrap();
        worker
            .send(Command::Init {
                surface: SurfaceSize::new(0.0, 0.0),
                pixel_ratio: 1.0,
                initial_colors: Vec::new(),
            })
            .unwrap();
        assert!(matches!(
            worker.recv_timeout(Duration::from_millis(100)),
            Err(WorkerError::Timeout)
        ));
    }

    #[test]
    fn test_drop_joins_idle_worker() {
        let worker = FluidWorker::spawn(NullCompositor, config(), DEFAULT_FRAME_INTERVAL).unwrap();
        drop(worker);
    }
}
