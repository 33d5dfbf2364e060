//! Application state for the web layer.

use std::sync::Arc;

use crate::board::BoardLoader;

/// Shared application state.
pub struct AppState<A> {
    /// The board loader and its latest snapshot
    pub board: Arc<BoardLoader<A>>,
}

impl<A> AppState<A> {
    /// Create a new app state.
    pub fn new(board: Arc<BoardLoader<A>>) -> Self {
        Self { board }
    }
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            board: self.board.clone(),
        }
    }
}
