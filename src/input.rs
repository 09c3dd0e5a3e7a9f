//! In-process input source.
//!
//! Holds the latest continuous move/look values and fans discrete events
//! out to every subscribed channel.

use crossbeam_channel::Sender;
use nalgebra::Vector2;

use crate::locomotion::{InputEvent, InputSource, SubscriptionId};

#[derive(Debug, Default)]
pub struct InputBus {
    move_vector: Vector2<f32>,
    look_delta: Vector2<f32>,
    subscribers: Vec<(SubscriptionId, Sender<InputEvent>)>,
    next_id: u64,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_move(&mut self, move_vector: Vector2<f32>) {
        self.move_vector = move_vector;
    }

    pub fn set_look(&mut self, look_delta: Vector2<f32>) {
        self.look_delta = look_delta;
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every live subscriber. Subscribers whose receiver
    /// has been dropped are pruned. Returns the number of deliveries.
    pub fn emit(&mut self, event: InputEvent) -> usize {
        self.subscribers
            .retain(|(_, sink)| sink.send(event).is_ok());
        self.subscribers.len()
    }
}

impl InputSource for InputBus {
    fn move_vector(&self) -> Vector2<f32> {
        self.move_vector
    }

    fn look_delta(&self) -> Vector2<f32> {
        self.look_delta
    }

    fn subscribe(&mut self, sink: Sender<InputEvent>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, sink));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }
}
