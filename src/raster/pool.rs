use std::collections::HashMap;

/// Pool configuration for recycled scratch buffers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BufferPoolOpts {
    /// Maximum elements retained across all buckets.
    pub(crate) max_pool_elems: usize,
    /// Maximum number of retained buffers per `(w, h, channels)` bucket.
    pub(crate) max_buffers_per_bucket: usize,
}

impl Default for BufferPoolOpts {
    fn default() -> Self {
        Self {
            max_pool_elems: 64 * 1024 * 1024,
            max_buffers_per_bucket: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BufferKey {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) channels: usize,
}

impl BufferKey {
    pub(crate) fn new(w: u32, h: u32, channels: usize) -> Self {
        Self { w, h, channels }
    }

    fn elem_len(self) -> usize {
        (self.w as usize)
            .saturating_mul(self.h as usize)
            .saturating_mul(self.channels)
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct BufferPoolStats {
    pub(crate) retained_buffers: usize,
    pub(crate) retained_elems: usize,
    pub(crate) alloc_buffers: u64,
    pub(crate) dropped_on_release: u64,
}

/// Bounded pool of per-frame scratch buffers keyed by `(width, height, channels)`.
///
/// Borrowed buffers come back filled with `fill`; output images never pass through here.
pub struct BufferPool<T> {
    opts: BufferPoolOpts,
    stats: BufferPoolStats,
    buckets: HashMap<BufferKey, Vec<Vec<T>>>,
}

impl<T: Copy> BufferPool<T> {
    pub(crate) fn new(opts: BufferPoolOpts) -> Self {
        Self {
            opts,
            stats: BufferPoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> BufferPoolStats {
        self.stats.clone()
    }

    pub(crate) fn borrow(&mut self, key: BufferKey, fill: T) -> Vec<T> {
        if let Some(bucket) = self.buckets.get_mut(&key)
            && let Some(mut buf) = bucket.pop()
        {
            self.stats.retained_buffers = self.stats.retained_buffers.saturating_sub(1);
            self.stats.retained_elems = self.stats.retained_elems.saturating_sub(key.elem_len());
            buf.fill(fill);
            return buf;
        }

        self.stats.alloc_buffers = self.stats.alloc_buffers.saturating_add(1);
        vec![fill; key.elem_len()]
    }

    pub(crate) fn release(&mut self, key: BufferKey, buf: Vec<T>) {
        let len = key.elem_len();
        if buf.len() != len
            || self.opts.max_buffers_per_bucket == 0
            || self.stats.retained_elems.saturating_add(len) > self.opts.max_pool_elems
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(key).or_default();
        if bucket.len() >= self.opts.max_buffers_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(buf);
        self.stats.retained_buffers = self.stats.retained_buffers.saturating_add(1);
        self.stats.retained_elems = self.stats.retained_elems.saturating_add(len);
    }
}

impl<T: Copy> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new(BufferPoolOpts::default())
    }
}
