//! Graph change notifications

/// Events emitted around a bulk modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphEvent {
    /// A bulk modification is about to start
    StartRead,
    /// The bulk modification finished, successfully or not
    FinishRead,
}

/// Receives events for a graph store
pub trait GraphEventListener: Send {
    /// Called with the model name of the store that emitted `event`
    fn on_event(&self, model_name: &str, event: GraphEvent);
}

impl<F> GraphEventListener for F
where
    F: Fn(&str, GraphEvent) + Send,
{
    fn on_event(&self, model_name: &str, event: GraphEvent) {
        self(model_name, event)
    }
}
