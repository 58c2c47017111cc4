/// Per-tick context handed to every task update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Monotonic tick counter, starting at 0 on the tree's first update.
    pub tick: u64,
    /// Wall-clock time covered by this tick; 0.0 when the host ticks without
    /// a timestep.
    pub dt_seconds: f32,
}
