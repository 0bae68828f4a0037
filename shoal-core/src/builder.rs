//! Builder utilities for configuring clustering runs.
//!
//! Exposes the component-mode selection surface and the validation applied
//! before constructing [`Clustering`] instances.

use std::{num::NonZeroUsize, thread};

use crate::{Result, clustering::Clustering, error::ShoalError};

/// Selects which kind of components a [`Clustering`] run extracts.
///
/// # Examples
/// ```
/// use shoal_core::ComponentMode;
///
/// assert_eq!(ComponentMode::default(), ComponentMode::Undirected);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ComponentMode {
    /// Connected components, ignoring edge direction.
    #[default]
    Undirected,
    /// Strongly connected components of the directed graph.
    StronglyConnected,
}

/// Configures and constructs [`Clustering`] instances.
///
/// # Examples
/// ```
/// use shoal_core::{ClusteringBuilder, ComponentMode};
///
/// let clustering = ClusteringBuilder::new()
///     .with_threads(4)
///     .with_mode(ComponentMode::StronglyConnected)
///     .build()?;
/// assert_eq!(clustering.threads().get(), 4);
/// assert_eq!(clustering.mode(), ComponentMode::StronglyConnected);
/// # Ok::<(), shoal_core::ShoalError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClusteringBuilder {
    threads: Option<usize>,
    mode: ComponentMode,
}

impl ClusteringBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of graph-building worker threads.
    ///
    /// Without an override the available parallelism is used.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Returns the explicit thread count, if one was set.
    #[must_use]
    pub fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Sets the component mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ComponentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the configured component mode.
    #[must_use]
    pub fn mode(&self) -> ComponentMode {
        self.mode
    }

    /// Validates the configuration and constructs a [`Clustering`] instance.
    ///
    /// # Errors
    /// Returns [`ShoalError::InvalidThreadCount`] when the thread count is
    /// zero.
    ///
    /// # Examples
    /// ```
    /// use shoal_core::{ClusteringBuilder, ShoalErrorCode};
    ///
    /// let error = ClusteringBuilder::new().with_threads(0).build().unwrap_err();
    /// assert_eq!(error.code(), ShoalErrorCode::InvalidThreadCount);
    /// ```
    pub fn build(self) -> Result<Clustering> {
        let threads = match self.threads {
            Some(requested) => NonZeroUsize::new(requested)
                .ok_or(ShoalError::InvalidThreadCount { got: requested })?,
            None => thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        };
        Ok(Clustering::new(threads, self.mode))
    }
}
