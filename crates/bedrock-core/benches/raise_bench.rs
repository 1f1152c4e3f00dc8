// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bedrock_core::{Broadcast, Listener, ListenerRegistry};
use criterion::{criterion_group, criterion_main, Criterion};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

fn bench_raise(c: &mut Criterion) {
    let counter = Rc::new(Cell::new(0u64));

    let mut registry = ListenerRegistry::<u64>::new();
    let broadcast = Broadcast::<u64>::new();
    for _ in 0..64 {
        let sink = Rc::clone(&counter);
        let listener = Listener::new(move |v: &u64| sink.set(sink.get().wrapping_add(*v)));
        registry.add(listener.clone()).unwrap();
        broadcast.add(listener).unwrap();
    }

    let mut group = c.benchmark_group("Raise");

    group.bench_function("Registry (64 listeners)", |b| {
        b.iter(|| registry.raise(black_box(&1)));
    });

    group.bench_function("Broadcast snapshot (64 listeners)", |b| {
        b.iter(|| broadcast.raise(black_box(&1)));
    });

    group.finish();
    black_box(counter.get());
}

fn bench_churn(c: &mut Criterion) {
    let listeners: Vec<Listener<()>> = (0..32).map(|_| Listener::new(|_| {})).collect();

    c.bench_function("Add/remove churn (32 listeners)", |b| {
        b.iter(|| {
            let mut registry = ListenerRegistry::new();
            for listener in &listeners {
                registry.add(listener.clone()).unwrap();
            }
            // Front removals exercise the shift-left path.
            for listener in &listeners {
                registry.remove(listener);
            }
            black_box(registry.len());
        });
    });
}

criterion_group!(benches, bench_raise, bench_churn);
criterion_main!(benches);
