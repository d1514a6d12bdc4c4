//! Update Dispatcher
//!
//! `update` is the only path that writes to the data store. For each key in
//! the batch, in batch order:
//!
//! 1. If the new value is strictly equal to the stored one, the key is dropped.
//! 2. Otherwise the value is stored, `update.<key>` handlers fire with it, and
//!    the key's render functions join one pending set shared by the batch.
//!
//! Then every pending render function runs exactly once, in first-seen
//! order, and `update` handlers fire with the keys that actually changed.
//!
//! A failing handler aborts the rest of the batch: keys already stored stay
//! stored, but nothing pending is rendered.

use indexmap::IndexSet;
use tracing::{debug, debug_span, trace};

use super::Engine;
use crate::binding::RenderId;
use crate::error::Result;
use crate::events::{key_event, UPDATE_EVENT};
use crate::value::{batch_to_object, Batch};

impl Engine {
    /// Apply a batch of values.
    ///
    /// Returns the reduced batch holding only the keys that changed.
    pub fn update(&mut self, batch: Batch) -> Result<Batch> {
        let _span = debug_span!("update", keys = batch.len()).entered();

        let mut changed = Batch::with_capacity(batch.len());
        let mut pending: IndexSet<RenderId> = IndexSet::new();

        for (key, value) in batch {
            if !self.store.replace(&key, &value) {
                trace!(%key, "unchanged");
                continue;
            }

            self.handlers.call(&key_event(&key), &value)?;
            pending.extend(self.bindings.consumers(&key));
            changed.insert(key, value);
        }

        for id in &pending {
            if let Some(render) = self.bindings.get(*id) {
                self.apply(render);
            }
        }

        debug!(changed = changed.len(), rendered = pending.len(), "batch applied");
        self.handlers.call(UPDATE_EVENT, &batch_to_object(&changed))?;
        Ok(changed)
    }
}
