use arbor_core::{
    AbortCondition, Blackboard, Composition, Decorate, EventAwake, Task, TaskStatus, TickContext,
};

type UpdateFn = Box<dyn FnMut(&TickContext, &mut Blackboard) -> TaskStatus>;
type AwakeFn = Box<dyn FnMut()>;
type PredicateFn = Box<dyn FnMut(&TickContext, &Blackboard) -> bool>;

/// Closure-driven leaf action.
pub struct GenericAction {
    update_logic: UpdateFn,
    awake_logic: Option<AwakeFn>,
    enabled: bool,
}

impl GenericAction {
    pub fn new(update_logic: impl FnMut(&TickContext, &mut Blackboard) -> TaskStatus + 'static) -> Self {
        Self {
            update_logic: Box::new(update_logic),
            awake_logic: None,
            enabled: true,
        }
    }

    /// Add a one-time awake hook; the action then joins the tree's awake
    /// sequence when attached.
    pub fn with_awake(mut self, awake_logic: impl FnMut() + 'static) -> Self {
        self.awake_logic = Some(Box::new(awake_logic));
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl EventAwake for GenericAction {
    fn awake(&mut self) {
        if let Some(hook) = self.awake_logic.as_mut() {
            hook();
        }
    }
}

impl Task for GenericAction {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn update(&mut self, ctx: &TickContext, bb: &mut Blackboard) -> TaskStatus {
        (self.update_logic)(ctx, bb)
    }

    fn as_awake(&mut self) -> Option<&mut dyn EventAwake> {
        if self.awake_logic.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

/// Predicate leaf: `Success` when the predicate holds, `Failure` otherwise.
pub struct GenericCondition {
    predicate: PredicateFn,
    enabled: bool,
}

impl GenericCondition {
    pub fn new(predicate: impl FnMut(&TickContext, &Blackboard) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Task for GenericCondition {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn update(&mut self, ctx: &TickContext, bb: &mut Blackboard) -> TaskStatus {
        if (self.predicate)(ctx, &*bb) {
            TaskStatus::Success
        } else {
            TaskStatus::Failure
        }
    }
}

enum WaitSpan {
    Ticks { total: u32, elapsed: u32 },
    Seconds { total: f32, elapsed: f32 },
}

/// Leaf that reports `Continue` for a span of ticks or accumulated
/// `dt_seconds`, then succeeds.
pub struct Wait {
    span: WaitSpan,
}

impl Wait {
    /// Continue for `total` ticks, then succeed.
    pub fn ticks(total: u32) -> Self {
        Self {
            span: WaitSpan::Ticks { total, elapsed: 0 },
        }
    }

    /// Continue until `total` seconds of timestep have accumulated.
    pub fn seconds(total: f32) -> Self {
        Self {
            span: WaitSpan::Seconds {
                total,
                elapsed: 0.0,
            },
        }
    }
}

impl Task for Wait {
    fn update(&mut self, ctx: &TickContext, _bb: &mut Blackboard) -> TaskStatus {
        match &mut self.span {
            WaitSpan::Ticks { total, elapsed } => {
                *elapsed += 1;
                if *elapsed > *total {
                    TaskStatus::Success
                } else {
                    TaskStatus::Continue
                }
            }
            WaitSpan::Seconds { total, elapsed } => {
                *elapsed += ctx.dt_seconds;
                if *elapsed >= *total {
                    TaskStatus::Success
                } else {
                    TaskStatus::Continue
                }
            }
        }
    }

    fn reset(&mut self) {
        match &mut self.span {
            WaitSpan::Ticks { elapsed, .. } => *elapsed = 0,
            WaitSpan::Seconds { elapsed, .. } => *elapsed = 0.0,
        }
    }
}

/// Ordered composite: advances on child `Success`, fails on the first child
/// `Failure`. With no enabled children it vacuously succeeds.
pub struct Sequence {
    abort: Option<PredicateFn>,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    pub fn new() -> Self {
        Self { abort: None }
    }

    /// Guard this branch with an abort condition, re-evaluated every tick
    /// while lower-priority work runs.
    pub fn with_abort_condition(
        mut self,
        condition: impl FnMut(&TickContext, &Blackboard) -> bool + 'static,
    ) -> Self {
        self.abort = Some(Box::new(condition));
        self
    }
}

impl AbortCondition for Sequence {
    fn evaluate(&mut self, ctx: &TickContext, bb: &Blackboard) -> bool {
        match self.abort.as_mut() {
            Some(condition) => condition(ctx, bb),
            None => false,
        }
    }
}

impl Task for Sequence {
    fn update(&mut self, _ctx: &TickContext, _bb: &mut Blackboard) -> TaskStatus {
        TaskStatus::Success
    }

    fn composition(&self) -> Option<Composition> {
        Some(Composition::Sequence)
    }

    fn as_abort(&mut self) -> Option<&mut dyn AbortCondition> {
        if self.abort.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

/// Ordered composite: advances on child `Failure`, succeeds on the first
/// child `Success`. With no enabled children it vacuously fails.
pub struct Selector {
    abort: Option<PredicateFn>,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector {
    pub fn new() -> Self {
        Self { abort: None }
    }

    pub fn with_abort_condition(
        mut self,
        condition: impl FnMut(&TickContext, &Blackboard) -> bool + 'static,
    ) -> Self {
        self.abort = Some(Box::new(condition));
        self
    }
}

impl AbortCondition for Selector {
    fn evaluate(&mut self, ctx: &TickContext, bb: &Blackboard) -> bool {
        match self.abort.as_mut() {
            Some(condition) => condition(ctx, bb),
            None => false,
        }
    }
}

impl Task for Selector {
    fn update(&mut self, _ctx: &TickContext, _bb: &mut Blackboard) -> TaskStatus {
        TaskStatus::Failure
    }

    fn composition(&self) -> Option<Composition> {
        Some(Composition::Selector)
    }

    fn as_abort(&mut self) -> Option<&mut dyn AbortCondition> {
        if self.abort.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

/// Ticks every enabled child each tick; fails as soon as any child fails and
/// succeeds once all enabled children have succeeded. Finished children are
/// not re-ticked while siblings continue.
#[derive(Debug, Default)]
pub struct Parallel;

impl Parallel {
    pub fn new() -> Self {
        Self
    }
}

impl Task for Parallel {
    fn update(&mut self, _ctx: &TickContext, _bb: &mut Blackboard) -> TaskStatus {
        TaskStatus::Success
    }

    fn composition(&self) -> Option<Composition> {
        Some(Composition::Parallel)
    }
}

macro_rules! decorator {
    ($(#[$doc:meta])* $name:ident, $decorate:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name;

        impl $name {
            pub fn new() -> Self {
                Self
            }
        }

        impl Decorate for $name {
            fn decorate(&mut self, child: TaskStatus) -> TaskStatus {
                $decorate(child)
            }
        }

        impl Task for $name {
            fn update(&mut self, _ctx: &TickContext, _bb: &mut Blackboard) -> TaskStatus {
                // A decorator with no enabled child has nothing to gate.
                TaskStatus::Failure
            }

            fn as_decorator(&mut self) -> Option<&mut dyn Decorate> {
                Some(self)
            }
        }
    };
}

decorator!(
    /// Flips terminal child statuses; `Continue` passes through.
    Inverter,
    |child| match child {
        TaskStatus::Success => TaskStatus::Failure,
        TaskStatus::Failure => TaskStatus::Success,
        TaskStatus::Continue => TaskStatus::Continue,
    }
);

decorator!(
    /// Reports `Success` for any terminal child status.
    AlwaysSucceed,
    |child| match child {
        TaskStatus::Continue => TaskStatus::Continue,
        _ => TaskStatus::Success,
    }
);

decorator!(
    /// Reports `Failure` for any terminal child status.
    AlwaysFail,
    |child| match child {
        TaskStatus::Continue => TaskStatus::Continue,
        _ => TaskStatus::Failure,
    }
);

decorator!(
    /// Re-runs its child forever; every terminal status becomes `Continue`.
    RepeatForever,
    |_child| TaskStatus::Continue
);

decorator!(
    /// Re-runs its child until it succeeds.
    RepeatUntilSuccess,
    |child| match child {
        TaskStatus::Success => TaskStatus::Success,
        _ => TaskStatus::Continue,
    }
);

decorator!(
    /// Re-runs its child until it fails.
    RepeatUntilFailure,
    |child| match child {
        TaskStatus::Failure => TaskStatus::Failure,
        _ => TaskStatus::Continue,
    }
);
