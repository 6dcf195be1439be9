// Per-frame render argument cache
//
// Several render passes can draw the same character within one frame
// (shadow maps, reflections, the main view). Animation selection and argument
// construction run once per frame; later passes reuse the result.

use crate::engine::frame::FrameTimestamp;
use crate::engine::render::RenderArgs;

/// Render arguments stamped with the frame they were computed for
#[derive(Debug, Clone, Default)]
pub struct RenderArgsCache {
    stamp: Option<FrameTimestamp>,
    args: Option<RenderArgs>,
}

impl RenderArgsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cache holds arguments computed for frame `now`
    pub fn is_fresh(&self, now: FrameTimestamp) -> bool {
        self.stamp == Some(now) && self.args.is_some()
    }

    /// Cached arguments for frame `now`; stale entries are never returned
    pub fn get(&self, now: FrameTimestamp) -> Option<&RenderArgs> {
        if self.stamp == Some(now) {
            self.args.as_ref()
        } else {
            None
        }
    }

    /// Replace the cached arguments with ones computed for `now`
    pub fn store(&mut self, now: FrameTimestamp, args: RenderArgs) -> &RenderArgs {
        self.stamp = Some(now);
        self.args.insert(args)
    }

    /// Drop any cached arguments
    pub fn invalidate(&mut self) {
        self.stamp = None;
        self.args = None;
    }

    /// Frame the cached arguments belong to
    pub fn stamp(&self) -> Option<FrameTimestamp> {
        self.stamp
    }
}
