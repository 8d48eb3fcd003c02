//! Per-frame orchestration: drain commands, step the pointer and the solver,
//! hand the result to the compositor.

use log::{debug, error, info, warn};

use crate::compute::{FluidSolver, ForceInput, Grid};
use crate::control::{PointerController, device_to_ndc};
use crate::schema::{Command, Event, FluidConfig, Palette, SurfaceSize};

use super::{CommandQueue, Compositor, FrameView, QueueError};

/// Everything that exists only between `init` and `cleanup`.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub solver: FluidSolver,
    pub pointer: PointerController,
    pub surface: SurfaceSize,
    pub pixel_ratio: f32,
}

impl SimulationState {
    /// Grid for the current surface at `resolution`.
    pub fn target_grid(&self, resolution: f32) -> Grid {
        Grid::from_surface(self.surface.width, self.surface.height, resolution)
    }
}

/// Single-threaded frame driver.
///
/// The host posts commands at any time and calls `tick` once per display
/// frame. Commands are applied at the start of the next tick, in order.
pub struct SimulationLoop<C: Compositor> {
    compositor: C,
    config: FluidConfig,
    palette: Palette,
    queue: CommandQueue,
    state: Option<SimulationState>,
    events: Vec<Event>,
    running: bool,
    visible: bool,
    closed: bool,
}

impl<C: Compositor> SimulationLoop<C> {
    pub fn new(compositor: C, config: FluidConfig) -> Self {
        Self {
            compositor,
            config,
            palette: Palette::default(),
            queue: CommandQueue::default(),
            state: None,
            events: Vec::new(),
            running: false,
            visible: true,
            closed: false,
        }
    }

    /// Queue a command for the next tick. Commands after `cleanup` are dropped.
    pub fn post(&mut self, command: Command) -> Result<(), QueueError> {
        if self.closed {
            debug!("Ignoring '{}' after cleanup", command.kind());
            return Ok(());
        }
        self.queue.push(command)
    }

    /// Whether a tick would step the simulation.
    pub fn is_scheduled(&self) -> bool {
        self.state.is_some() && self.running && self.visible && !self.closed
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Outbound events since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> Option<&SimulationState> {
        self.state.as_ref()
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Apply pending commands, then run one frame if scheduled.
    ///
    /// `now_ms` is wall-clock time and only drives pointer timers. Returns
    /// whether a frame was produced.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let commands: Vec<Command> = self.queue.drain().collect();
        for command in commands {
            if self.closed {
                break;
            }
            self.apply(command, now_ms);
        }

        if !self.is_scheduled() {
            return false;
        }
        let Some(state) = self.state.as_mut() else {
            return false;
        };

        let force: ForceInput = state.pointer.update(now_ms);
        state.solver.step(&self.config, &force);
        self.compositor.present(&FrameView {
            velocity: state.solver.velocity(),
            palette: &self.palette,
            boundary: self.config.boundary_mode(),
            frame: state.solver.frame,
        });
        true
    }

    fn apply(&mut self, command: Command, now: f64) {
        debug!("Applying '{}'", command.kind());
        match command {
            Command::Init {
                surface,
                pixel_ratio,
                initial_colors,
            } => self.init(surface, pixel_ratio, &initial_colors, now),
            Command::Start => self.running = true,
            Command::Stop => self.running = false,
            Command::Visibility { visible } => self.visible = visible,
            Command::Resize { width, height } => {
                let surface = SurfaceSize::new(width, height);
                let Some(state) = self.state.as_mut() else {
                    warn!("Resize before init ignored");
                    return;
                };
                state.surface = surface;
                self.compositor.resize(surface);
                self.regrid();
            }
            Command::Pointer { x, y } => {
                if let Some(state) = self.state.as_mut() {
                    let ndc = device_to_ndc(x, y, state.surface, state.pixel_ratio);
                    state.pointer.pointer_moved(ndc, now);
                }
            }
            Command::PointerInside { inside } => {
                if let Some(state) = self.state.as_mut() {
                    state.pointer.set_hovering(inside, now);
                }
            }
            Command::Props(update) => {
                let change = self.config.apply(&update);
                if let Some(state) = self.state.as_mut() {
                    if change.pointer {
                        state.pointer.apply_config(&self.config);
                    }
                }
                if change.regrid {
                    self.regrid();
                }
            }
            Command::Palette { colors } => self.set_palette(&colors),
            Command::Cleanup => {
                info!("Cleanup: releasing simulation state");
                self.state = None;
                self.running = false;
                self.closed = true;
            }
        }
    }

    fn init(&mut self, surface: SurfaceSize, pixel_ratio: f32, colors: &[String], now: f64) {
        if self.state.is_some() {
            warn!("Already initialized, ignoring init");
            return;
        }
        self.set_palette(colors);

        if let Err(e) = self.compositor.prepare(surface, pixel_ratio) {
            error!("Initialization failed: {}", e);
            return;
        }

        let grid = Grid::from_surface(surface.width, surface.height, self.config.resolution);
        info!(
            "Initialized {}x{} grid for {}x{} surface @ {}",
            grid.width, grid.height, surface.width, surface.height, pixel_ratio
        );
        self.state = Some(SimulationState {
            solver: FluidSolver::new(grid),
            pointer: PointerController::new(&self.config, now),
            surface,
            pixel_ratio,
        });
        self.events.push(Event::Ready);
    }

    fn set_palette(&mut self, colors: &[String]) {
        match Palette::from_hex(colors) {
            Ok(palette) => self.palette = palette,
            Err(e) => warn!("Keeping previous palette: {}", e),
        }
    }

    fn regrid(&mut self) {
        let resolution = self.config.resolution;
        if let Some(state) = self.state.as_mut() {
            let grid = state.target_grid(resolution);
            if state.solver.resize(grid) {
                info!("Grid resized to {}x{}", grid.width, grid.height);
            }
        }
    }
}
