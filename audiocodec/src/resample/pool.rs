//! Keyed free-lists of idle resamplers.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;
use tracing::{trace, warn};

use super::engine::EngineKind;
use super::resampler::Resampler;
use super::ResamplerParams;
use crate::config::PoolOptions;
use crate::error::ResampleError;

/// A value that can be parked in a [`Pool`] between uses.
pub trait Reusable: Send + Sized {
    /// Key the value is pooled under.
    type Params: Clone + Eq + Hash + fmt::Debug + Send;

    fn params(&self) -> Self::Params;

    /// Clears per-use state. A failed reset keeps the value out of the pool.
    fn reset(&mut self) -> Result<(), ResampleError>;
}

impl Reusable for Resampler {
    type Params = ResamplerParams;

    fn params(&self) -> ResamplerParams {
        Resampler::params(self)
    }

    fn reset(&mut self) -> Result<(), ResampleError> {
        Resampler::reset(self)
    }
}

type Constructor<R> = dyn Fn(&<R as Reusable>::Params) -> Result<R, ResampleError> + Send + Sync;

/// Thread-safe pool of reusable resamplers.
///
/// The lock covers only the free-list lookup, pop and push. Construction on
/// a miss runs outside it, so two callers racing on a new key may both
/// construct; both instances end up pooled.
pub struct Pool<R: Reusable = Resampler> {
    idle: Mutex<HashMap<R::Params, Vec<R>>>,
    ctor: Box<Constructor<R>>,
    options: PoolOptions,
}

impl Pool<Resampler> {
    /// Pool constructing resamplers with the given engine kind.
    pub fn for_engine(kind: EngineKind) -> Self {
        Self::new(move |params: &ResamplerParams| Resampler::new(*params, kind))
    }
}

impl<R: Reusable> Pool<R> {
    pub fn new<F>(ctor: F) -> Self
    where
        F: Fn(&R::Params) -> Result<R, ResampleError> + Send + Sync + 'static,
    {
        Self::with_options(ctor, PoolOptions::default())
    }

    pub fn with_options<F>(ctor: F, options: PoolOptions) -> Self
    where
        F: Fn(&R::Params) -> Result<R, ResampleError> + Send + Sync + 'static,
    {
        Self {
            idle: Mutex::new(HashMap::new()),
            ctor: Box::new(ctor),
            options,
        }
    }

    /// Takes the most recently returned idle value for `params`, or
    /// constructs a new one.
    pub fn get(&self, params: R::Params) -> Result<R, ResampleError> {
        let hit = self.idle.lock().get_mut(&params).and_then(Vec::pop);
        if let Some(item) = hit {
            trace!(?params, "pool hit");
            return Ok(item);
        }
        trace!(?params, "pool miss");
        (self.ctor)(&params)
    }

    /// Resets `item` and parks it for reuse.
    ///
    /// If the reset fails the item is dropped and the error returned. If
    /// the free-list for its key is full the item is dropped.
    pub fn put(&self, mut item: R) -> Result<(), ResampleError> {
        let params = item.params();
        if let Err(e) = item.reset() {
            warn!(?params, error = %e, "reset failed, discarding");
            return Err(e);
        }

        let mut idle = self.idle.lock();
        let list = idle.entry(params).or_default();
        if let Some(max) = self.options.max_idle_per_key {
            if list.len() >= max {
                drop(idle);
                warn!(max, "free-list full, discarding");
                return Ok(());
            }
        }
        list.push(item);
        Ok(())
    }

    /// Like [`Pool::get`], but returns the value to the pool when the lease
    /// is dropped.
    pub fn checkout(&self, params: R::Params) -> Result<Lease<'_, R>, ResampleError> {
        let item = self.get(params)?;
        Ok(Lease {
            pool: self,
            item: Some(item),
        })
    }

    /// Number of idle values for `params`.
    pub fn idle_count(&self, params: &R::Params) -> usize {
        self.idle.lock().get(params).map_or(0, Vec::len)
    }

    pub fn total_idle(&self) -> usize {
        self.idle.lock().values().map(Vec::len).sum()
    }

    /// Drops every idle value.
    pub fn clear(&self) {
        let drained: Vec<_> = self.idle.lock().drain().collect();
        drop(drained);
    }
}

impl<R: Reusable> fmt::Debug for Pool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("total_idle", &self.total_idle())
            .field("options", &self.options)
            .finish()
    }
}

/// Pooled value on loan. Goes back to the pool on drop.
pub struct Lease<'a, R: Reusable = Resampler> {
    pool: &'a Pool<R>,
    item: Option<R>,
}

impl<R: Reusable> Lease<'_, R> {
    /// Keeps the value instead of returning it to the pool.
    pub fn into_inner(mut self) -> R {
        match self.item.take() {
            Some(item) => item,
            None => unreachable!("lease holds its item until dropped"),
        }
    }
}

impl<R: Reusable> Deref for Lease<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        match &self.item {
            Some(item) => item,
            None => unreachable!("lease holds its item until dropped"),
        }
    }
}

impl<R: Reusable> DerefMut for Lease<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("lease holds its item until dropped"),
        }
    }
}

impl<R: Reusable> Drop for Lease<'_, R> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            // put already logs the failure; the item is gone either way.
            let _ = self.pool.put(item);
        }
    }
}
