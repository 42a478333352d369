//! [`CanBus`] that releases timed frames as simulated time advances.

use std::collections::VecDeque;

use gearview_common::{CanBus, RawFrame};

use crate::candump::TimedFrame;

pub struct ReplayBus {
    queue: VecDeque<TimedFrame>,
    now_ms: u64,
    delivered: usize,
}

impl ReplayBus {
    /// `frames` must be sorted by time.
    pub fn new(frames: Vec<TimedFrame>) -> Self {
        Self {
            queue: frames.into(),
            now_ms: 0,
            delivered: 0,
        }
    }

    /// Release every frame stamped at or before `now_ms`.
    pub fn advance_to(
        &mut self,
        now_ms: u64,
    ) {
        self.now_ms = now_ms;
    }

    pub fn is_exhausted(&self) -> bool { self.queue.is_empty() }

    pub fn delivered(&self) -> usize { self.delivered }

    /// Time of the last queued frame.
    pub fn last_frame_ms(&self) -> Option<u64> { self.queue.back().map(|f| f.at_ms) }
}

impl CanBus for ReplayBus {
    fn try_receive_frame(&mut self) -> Option<RawFrame> {
        if self.queue.front()?.at_ms > self.now_ms {
            return None;
        }
        let timed = self.queue.pop_front()?;
        self.delivered += 1;
        Some(timed.frame)
    }

    fn has_activity_alert(&mut self) -> bool { self.queue.front().is_some_and(|f| f.at_ms <= self.now_ms) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(
        at_ms: u64,
        id: u16,
    ) -> TimedFrame {
        TimedFrame {
            at_ms,
            frame: RawFrame::standard(id, &[0; 8]).unwrap(),
        }
    }

    #[test]
    fn test_releases_by_time() {
        let mut bus = ReplayBus::new(vec![timed(10, 0x100), timed(10, 0x101), timed(30, 0x102)]);
        assert!(!bus.has_activity_alert());
        assert_eq!(bus.try_receive_frame(), None);

        bus.advance_to(10);
        assert!(bus.has_activity_alert());
        assert_eq!(bus.try_receive_frame().unwrap().identifier(), 0x100);
        assert_eq!(bus.try_receive_frame().unwrap().identifier(), 0x101);
        assert_eq!(bus.try_receive_frame(), None);

        bus.advance_to(50);
        assert_eq!(bus.try_receive_frame().unwrap().identifier(), 0x102);
        assert!(bus.is_exhausted());
        assert_eq!(bus.delivered(), 3);
    }
}
