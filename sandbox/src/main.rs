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

use anyhow::{Context, Result};
use bedrock_core::condition::{Condition, ConditionExt, Statement};
use bedrock_core::event::EventQueue;
use bedrock_core::lock::Lock;
use bedrock_core::state::{State, StateMachine};
use bedrock_core::value::Observable;
use bedrock_core::{Broadcast, Listener, MediatorContext, MediatorSettings, Stopwatch};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

const FRAME_COUNT: u64 = 12;
const TARGET_FRAME: Duration = Duration::from_millis(16);

/// A stand-in for a game subsystem registered as a service.
struct Player {
    health: Observable<i32>,
    input_lock: RefCell<Lock<&'static str>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Exploring,
    Cutscene,
}

impl State for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Exploring => "exploring",
            Phase::Cutscene => "cutscene",
        }
    }

    fn on_enter(&self, previous: Option<&Self>) {
        log::info!(
            "Entered {} (was {}).",
            self.name(),
            previous.map_or("nothing", State::name)
        );
    }
}

fn load_settings() -> Result<MediatorSettings> {
    match std::env::args().nth(1) {
        Some(path) => MediatorSettings::from_json_file(&path)
            .with_context(|| format!("Failed to load settings from '{path}'")),
        None => Ok(MediatorSettings::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = load_settings()?;
    let context = Rc::new(
        MediatorContext::builder()
            .settings(settings)
            .services(|services| {
                if let Err(e) = services.add_singleton(Player {
                    health: Observable::new(100),
                    input_lock: RefCell::new(Lock::new()),
                }) {
                    log::error!("{e}");
                }
            })
            .build(),
    );
    let player = context.services().resolve::<Player>()?;

    player.health.subscribe_changed(Listener::new(|hp: &i32| {
        log::info!("Player health is now {hp}.");
    }))?;

    // Damage computed off-thread comes back through a queue.
    let damage_queue = EventQueue::<i32>::new();
    let on_damage: Broadcast<i32> = context.broadcast();
    let target = Rc::clone(&player);
    on_damage.listen(move |amount| target.health.set(target.health.get() - amount));

    let sender = damage_queue.sender();
    let worker = thread::spawn(move || {
        for amount in [5, 15, 30] {
            sender.publish(amount);
        }
    });
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("Damage worker panicked"))?;

    let weak_player = Rc::downgrade(&player);
    let can_act = Statement::is(move || {
        weak_player
            .upgrade()
            .is_some_and(|p| p.input_lock.borrow().has_none())
    })
    .and(Statement::is(true));

    let mut phases = StateMachine::new();
    phases.add_unique_state(Phase::Exploring)?;
    phases.add_unique_state(Phase::Cutscene)?;
    let phases = Rc::new(phases);
    let lock_target = Rc::clone(&player);
    phases
        .state_changed()
        .listen(move |(_, next): &(Option<Phase>, Option<Phase>)| {
            let mut lock = lock_target.input_lock.borrow_mut();
            if *next == Some(Phase::Cutscene) {
                lock.add("cutscene");
            } else {
                lock.remove(&"cutscene");
            }
        });
    phases.set_active(Phase::Exploring);

    let scheduler = context.scheduler();
    let cutscene = Rc::clone(&phases);
    scheduler.after(TARGET_FRAME * 3, move || {
        cutscene.set_active_registered("cutscene");
    });
    let exploring = Rc::clone(&phases);
    scheduler.after(TARGET_FRAME * 8, move || {
        exploring.set_active_registered("exploring");
    });
    scheduler.every(TARGET_FRAME * 4, || log::info!("Autosave."))?;

    scheduler.late_update().listen(move |time| {
        log::debug!(
            "Frame {} done after {:?} (can act: {}).",
            time.frame,
            time.elapsed,
            can_act.check()
        );
    });

    let mut pool = context.pool(|| String::with_capacity(64)).build();
    let mut stopwatch = Stopwatch::new();
    for _ in 0..FRAME_COUNT {
        thread::sleep(TARGET_FRAME);
        damage_queue.flush_into(&on_damage);

        let mut line = pool.get();
        line.push_str("hit marker");
        pool.release(line);

        context.tick(stopwatch.lap());
    }

    log::info!(
        "Ran {} frames in {:?}; pool holds {} buffer(s).",
        context.scheduler().frame(),
        stopwatch.elapsed(),
        pool.count_all()
    );

    context
        .on_shutdown(Listener::new(|_| log::info!("Goodbye.")))
        .context("Failed to register shutdown listener")?;
    drop(pool);
    match Rc::try_unwrap(context) {
        Ok(mut context) => context.shutdown(),
        Err(_) => log::warn!("Context still shared at exit; it shuts down when dropped."),
    }
    Ok(())
}
