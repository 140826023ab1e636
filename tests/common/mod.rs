#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vr_bac::config::EngineSettings;
use vr_bac::controller::input_table::ButtonSample;
use vr_bac::mapping::engine::Running;
use vr_bac::mapping::{
    Backend, BacEngine, BindingConfig, EngineContext, EventContext, FeatureBinding,
    FeatureListener, FrameReport, Hand, LogicalButton, SemanticEvent, Subscription,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub feature: String,
    pub event: SemanticEvent,
    pub frame: u64,
    pub timer_elapsed: Option<f32>,
}

#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Recorded>,
}

impl Recorder {
    fn push(&mut self, event: SemanticEvent, ctx: &EventContext<'_>) {
        self.events.push(Recorded {
            feature: ctx.feature.to_string(),
            event,
            frame: ctx.frame,
            timer_elapsed: ctx.timer_elapsed,
        });
    }
}

impl FeatureListener for Recorder {
    fn on_start_click(&mut self, ctx: &EventContext<'_>) {
        self.push(SemanticEvent::StartClick, ctx);
    }
    fn on_is_clicking(&mut self, ctx: &EventContext<'_>) {
        self.push(SemanticEvent::IsClicking, ctx);
    }
    fn on_stop_click(&mut self, ctx: &EventContext<'_>) {
        self.push(SemanticEvent::StopClick, ctx);
    }
    fn on_start_touch(&mut self, ctx: &EventContext<'_>) {
        self.push(SemanticEvent::StartTouch, ctx);
    }
    fn on_is_touching(&mut self, ctx: &EventContext<'_>) {
        self.push(SemanticEvent::IsTouching, ctx);
    }
    fn on_stop_touch(&mut self, ctx: &EventContext<'_>) {
        self.push(SemanticEvent::StopTouch, ctx);
    }
}

/// Engine plus context plus a recorder subscribed to every pair
pub struct Harness {
    pub ctx: EngineContext,
    pub engine: BacEngine<Running>,
    pub recorder: Rc<RefCell<Recorder>>,
    subscriptions: Vec<Subscription>,
}

impl Harness {
    pub fn new(backend: Backend, bindings: Vec<BindingConfig>) -> Self {
        let settings = EngineSettings {
            initial_backend: backend,
            ..EngineSettings::default()
        };
        Self::with_settings(settings, bindings)
    }

    pub fn with_settings(settings: EngineSettings, bindings: Vec<BindingConfig>) -> Self {
        let ctx = EngineContext::new(settings);
        let mut engine = BacEngine::create();
        for binding in bindings {
            engine.register_binding(binding).expect("register binding");
        }
        let engine = engine.activate(&ctx);

        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut subscriptions = Vec::new();
        for hand in [Hand::Left, Hand::Right, Hand::Gaze] {
            for button in LogicalButton::ALL {
                subscriptions.push(engine.registry().subscribe_shared(
                    hand,
                    button,
                    recorder.clone(),
                ));
            }
        }

        Self {
            ctx,
            engine,
            recorder,
            subscriptions,
        }
    }

    pub fn publish(&mut self, hand: Hand, button: LogicalButton, sample: ButtonSample) {
        self.ctx.input_mut().publish(hand, button, sample);
    }

    pub fn tick(&mut self, dt: f32) -> FrameReport {
        self.engine.tick(&self.ctx, dt)
    }

    /// Holds the sample for `frames` ticks
    pub fn hold(&mut self, hand: Hand, button: LogicalButton, sample: ButtonSample, frames: usize, dt: f32) {
        self.publish(hand, button, sample);
        for _ in 0..frames {
            self.tick(dt);
        }
    }

    pub fn binding(&self, feature: &str) -> &FeatureBinding {
        let id = self.engine.find(feature).expect("binding registered");
        self.engine.binding(id).expect("binding exists")
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.recorder.borrow().events.clone()
    }

    pub fn kinds(&self) -> Vec<SemanticEvent> {
        self.recorder.borrow().events.iter().map(|r| r.event).collect()
    }

    pub fn count(&self, feature: &str, event: SemanticEvent) -> usize {
        self.recorder
            .borrow()
            .events
            .iter()
            .filter(|r| r.feature == feature && r.event == event)
            .count()
    }

    pub fn clear_events(&self) {
        self.recorder.borrow_mut().events.clear();
    }
}
