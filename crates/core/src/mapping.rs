/// Transforms a state between two representations.
///
/// Parareal solvers use a pair of mappings when the coarse and fine integrators
/// work on different state spaces, such as a coarse and a fine mesh. The
/// mapping is pure and total over the states it is applied to. A pair of
/// mappings need not be exact inverses of each other.
///
/// Any closure `Fn(&V) -> V` is a mapping. Use [`Identity`] when both
/// integrators share a representation.
pub trait Mapping<V> {
    /// Maps `state` into the target representation.
    #[must_use]
    fn map(&self, state: &V) -> V;
}

impl<V, F> Mapping<V> for F
where
    F: Fn(&V) -> V,
{
    fn map(&self, state: &V) -> V {
        self(state)
    }
}

/// The mapping that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<V: Clone> Mapping<V> for Identity {
    fn map(&self, state: &V) -> V {
        state.clone()
    }
}
