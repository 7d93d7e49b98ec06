/// Single-slot selection over two entity kinds.
///
/// At most one of the two kinds is ever selected; selecting one clears the
/// other. Screens with one selectable kind use `Infallible` for the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection<P, S> {
    None,
    Primary(P),
    Secondary(S),
}

// Manual impl so `Infallible` slots need no `Default`.
impl<P, S> Default for Selection<P, S> {
    fn default() -> Self {
        Self::None
    }
}

impl<P, S> Selection<P, S> {
    pub fn select_primary(&mut self, value: P) {
        *self = Self::Primary(value);
    }

    pub fn select_secondary(&mut self, value: S) {
        *self = Self::Secondary(value);
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }

    pub fn primary(&self) -> Option<&P> {
        match self {
            Self::Primary(p) => Some(p),
            _ => None,
        }
    }

    pub fn secondary(&self) -> Option<&S> {
        match self {
            Self::Secondary(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn with_primary(value: P) -> Self {
        Self::Primary(value)
    }
}
