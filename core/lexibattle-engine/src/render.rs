//! The shared render target plugins mount into.

use lexibattle_types::{Difficulty, InstanceId, QuestionTypeId};
use std::sync::Mutex;

/// What the player needs to retry a failed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadAffordance {
    pub type_id: QuestionTypeId,
    pub difficulty: Difficulty,
}

/// Content of the render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderView {
    Empty,
    /// A plugin instance owns the target.
    Question {
        instance: InstanceId,
        type_id: QuestionTypeId,
        plugin: String,
    },
    /// Minimal failure view with a reload affordance.
    Failure {
        message: String,
        detail: String,
        reload: ReloadAffordance,
    },
}

/// The single surface every question instance renders into.
pub trait RenderTarget: Send + Sync {
    /// Replaces the content of the container.
    fn show(&self, container_id: &str, view: RenderView);
}

/// Render target that keeps every view it was asked to show.
#[derive(Debug, Default)]
pub struct MemoryRenderTarget {
    views: Mutex<Vec<RenderView>>,
}

impl MemoryRenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RenderView {
        self.views()
            .last()
            .cloned()
            .unwrap_or(RenderView::Empty)
    }

    pub fn views(&self) -> Vec<RenderView> {
        self.views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl RenderTarget for MemoryRenderTarget {
    fn show(&self, _container_id: &str, view: RenderView) {
        self.views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(view);
    }
}
