use pulsetrack_core::command::RawCommand;

/// Pre-boot command buffer.
///
/// The host page queues `[name, value]` commands here before the
/// tracker has booted. [`crate::tracker::Tracker::boot`] consumes the
/// buffer by value and replays it in order — the flush-then-rebind
/// lifecycle. Ownership transfer makes replaying the same buffer twice
/// unrepresentable; once booted, commands go straight to
/// [`crate::tracker::Tracker::push`] and are dispatched immediately.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    pending: Vec<RawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, raw: RawCommand) {
        self.pending.push(raw);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take the buffered commands, preserving original order.
    pub(crate) fn drain(self) -> Vec<RawCommand> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drain_preserves_push_order() {
        let mut buffer = CommandBuffer::new();
        buffer.push(RawCommand::new("init", json!("acct_1")));
        buffer.push(RawCommand::new("event", json!("signup")));
        buffer.push(RawCommand::new("event", json!("purchase")));
        assert_eq!(buffer.len(), 3);

        let drained = buffer.drain();
        let names: Vec<_> = drained.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["init", "event", "event"]);
        assert_eq!(drained[1].value, json!("signup"));
    }
}
