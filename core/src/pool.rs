// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};

type Make<T> = Box<dyn Fn() -> T + Send + Sync>;
type Recycle<T> = Box<dyn Fn(&mut T) -> bool + Send + Sync>;

/// Pool keeps idle objects around so concurrent calls can reuse them.
///
/// Every [`Pool::checkout`] hands out an object exclusively; the returned
/// [`Pooled`] guard gives it back when dropped. Since the return happens in
/// `Drop`, it also runs when a future holding the guard is cancelled or the
/// call fails halfway.
///
/// Before an object is kept, `recycle` resets it and decides whether it is
/// still worth keeping (for example, a buffer that lost its capacity isn't).
pub struct Pool<T> {
    items: Mutex<Vec<T>>,
    max_idle: usize,
    make: Make<T>,
    recycle: Recycle<T>,
}

impl<T> Pool<T> {
    /// Create a new pool that keeps at most `max_idle` objects.
    pub fn new(
        max_idle: usize,
        make: impl Fn() -> T + Send + Sync + 'static,
        recycle: impl Fn(&mut T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
            make: Box::new(make),
            recycle: Box::new(recycle),
        }
    }

    /// Take an object out of the pool, creating one if the pool is empty.
    pub fn checkout(&self) -> Pooled<'_, T> {
        let item = self.items.lock().pop().unwrap_or_else(|| (self.make)());

        Pooled {
            pool: self,
            item: Some(item),
        }
    }

    /// Number of idle objects.
    pub fn idle(&self) -> usize {
        self.items.lock().len()
    }

    fn give_back(&self, mut item: T) {
        if !(self.recycle)(&mut item) {
            return;
        }

        let mut items = self.items.lock();
        if items.len() < self.max_idle {
            items.push(item);
        }
        // Otherwise, item is dropped
    }
}

impl<T> Debug for Pool<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

/// Exclusive handle to an object checked out from a [`Pool`].
pub struct Pooled<'a, T> {
    pool: &'a Pool<T>,
    item: Option<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().expect("pooled item is present until drop")
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("pooled item is present until drop")
    }
}

impl<T: Debug> Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pooled").field(&self.item).finish()
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.give_back(item);
        }
    }
}
