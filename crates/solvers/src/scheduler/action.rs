/// Control actions supported by the Parareal scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop harvesting iterations and cancel the work that has not started.
    StopEarly,
}
