//! Console render target and battle tally.

use lexibattle_engine::{BattleSink, RenderTarget, RenderView};
use lexibattle_types::RoundOutcome;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

/// Prints render views to stdout.
#[derive(Debug, Default)]
pub struct ConsoleRender;

impl RenderTarget for ConsoleRender {
    fn show(&self, container_id: &str, view: RenderView) {
        debug!(container = container_id, ?view, "Render");
        match view {
            RenderView::Empty => {}
            RenderView::Question { plugin, type_id, .. } => {
                println!("\n── {plugin} (type {type_id}) ──");
            }
            RenderView::Failure {
                message,
                detail,
                reload,
            } => {
                println!("\n!! {message}");
                println!("   {detail}");
                println!(
                    "   Reload with: --question-type {} --difficulty {}",
                    reload.type_id, reload.difficulty
                );
            }
        }
    }
}

/// Counts battle rounds.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    hits: AtomicU32,
    misses: AtomicU32,
    advances: AtomicU32,
}

impl ScoreBoard {
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u32 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn advances(&self) -> u32 {
        self.advances.load(Ordering::Relaxed)
    }
}

impl BattleSink for ScoreBoard {
    fn process_battle_round(&self, outcome: RoundOutcome) {
        self.hits.fetch_add(outcome.hits, Ordering::Relaxed);
        self.misses.fetch_add(outcome.misses, Ordering::Relaxed);
        if outcome.advance_next {
            self.advances.fetch_add(1, Ordering::Relaxed);
        }
    }
}
