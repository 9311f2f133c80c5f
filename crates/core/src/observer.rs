/// Receives solver events and optionally returns a control action.
///
/// Solvers call [`Observer::observe`] at well-defined points and act on any
/// returned action. `()` is an observer that never acts, and any closure
/// `FnMut(&E) -> Option<A>` is an observer.
pub trait Observer<E, A> {
    /// Observes an event, returning an action for the solver to take.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
