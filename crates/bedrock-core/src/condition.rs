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

//! Composable boolean conditions.

use crate::lock::Lock;
use crate::value::Observable;
use std::hash::Hash;

/// A boolean query evaluated on demand.
pub trait Condition {
    /// Evaluates the condition.
    fn check(&self) -> bool;
}

impl Condition for bool {
    fn check(&self) -> bool {
        *self
    }
}

impl<F: Fn() -> bool> Condition for F {
    fn check(&self) -> bool {
        self()
    }
}

impl Condition for Observable<bool> {
    fn check(&self) -> bool {
        self.get()
    }
}

impl<K: Eq + Hash> Condition for Lock<K> {
    /// A lock is satisfied while it is held.
    fn check(&self) -> bool {
        self.has_any()
    }
}

/// A boxed condition.
pub type BoxedCondition = Box<dyn Condition>;

/// Satisfied when every inner condition is. An empty set is satisfied.
pub struct All(pub Vec<BoxedCondition>);

impl Condition for All {
    fn check(&self) -> bool {
        self.0.iter().all(|c| c.check())
    }
}

/// Satisfied when at least one inner condition is. An empty set is not.
pub struct Any(pub Vec<BoxedCondition>);

impl Condition for Any {
    fn check(&self) -> bool {
        self.0.iter().any(|c| c.check())
    }
}

/// Satisfied when no inner condition is. An empty set is satisfied.
pub struct NoneOf(pub Vec<BoxedCondition>);

impl Condition for NoneOf {
    fn check(&self) -> bool {
        !self.0.iter().any(|c| c.check())
    }
}

/// Inverts an inner condition.
pub struct Not(pub BoxedCondition);

impl Condition for Not {
    fn check(&self) -> bool {
        !self.0.check()
    }
}

/// A condition compared against an expected outcome.
pub struct Statement {
    condition: BoxedCondition,
    expected: bool,
}

impl Statement {
    /// A statement satisfied when `condition` holds.
    pub fn is(condition: impl Condition + 'static) -> Self {
        Self {
            condition: Box::new(condition),
            expected: true,
        }
    }

    /// A statement satisfied when `condition` does not hold.
    pub fn is_not(condition: impl Condition + 'static) -> Self {
        Self {
            condition: Box::new(condition),
            expected: false,
        }
    }
}

impl Condition for Statement {
    fn check(&self) -> bool {
        self.condition.check() == self.expected
    }
}

/// Combinator methods available on every sized condition.
pub trait ConditionExt: Condition + Sized + 'static {
    /// Satisfied when both `self` and `other` are.
    fn and(self, other: impl Condition + 'static) -> All {
        All(vec![Box::new(self), Box::new(other)])
    }

    /// Satisfied when `self` or `other` is.
    fn or(self, other: impl Condition + 'static) -> Any {
        Any(vec![Box::new(self), Box::new(other)])
    }

    /// Satisfied when `self` is not.
    fn negate(self) -> Not {
        Not(Box::new(self))
    }

    /// Boxes the condition.
    fn boxed(self) -> BoxedCondition {
        Box::new(self)
    }
}

impl<C: Condition + Sized + 'static> ConditionExt for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_empty_sets() {
        assert!(All(vec![]).check());
        assert!(!Any(vec![]).check());
        assert!(NoneOf(vec![]).check());
    }

    #[test]
    fn test_combinators() {
        assert!(true.and(true).check());
        assert!(!true.and(false).check());
        assert!(false.or(true).check());
        assert!(false.negate().check());
        assert!(NoneOf(vec![false.boxed(), false.boxed()]).check());
        assert!(!NoneOf(vec![false.boxed(), true.boxed()]).check());
    }

    #[test]
    fn test_closure_conditions_are_live() {
        let flag = Rc::new(Cell::new(false));
        let probe = Rc::clone(&flag);
        let condition = Statement::is(move || probe.get());

        assert!(!condition.check());
        flag.set(true);
        assert!(condition.check());
    }

    #[test]
    fn test_statement_is_not() {
        assert!(Statement::is_not(false).check());
        assert!(!Statement::is_not(true).check());
    }

    #[test]
    fn test_shared_observable_condition() {
        let paused = Rc::new(Observable::new(false));
        let probe = Rc::clone(&paused);
        let can_move = Statement::is_not(move || probe.check());
        assert!(can_move.check());
        paused.set(true);
        assert!(!can_move.check());
    }

    #[test]
    fn test_lock_condition() {
        let mut lock = Lock::new();
        assert!(!lock.check());
        lock.add("cutscene");
        assert!(lock.check());
    }
}
