/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub(crate) fn work_signal() -> (WorkNotifier, WorkWaiter) {
    let (sender, receiver) = kanal::unbounded();
    (WorkNotifier { sender }, WorkWaiter { receiver })
}

/// Wakes the worker, carries no data.
#[derive(Clone)]
pub(crate) struct WorkNotifier {
    sender: kanal::Sender<()>,
}

impl WorkNotifier {
    /// Returns false if the worker side has gone.
    pub(crate) fn post(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

pub(crate) struct WorkWaiter {
    receiver: kanal::Receiver<()>,
}

impl WorkWaiter {
    /// Block until at least one post arrives.
    ///
    /// Posts queued at the same time are merged into this wake, as the
    /// worker scans the whole query table on each wake.
    pub(crate) fn wait(&self) -> bool {
        if self.receiver.recv().is_err() {
            return false;
        }
        while let Ok(Some(_)) = self.receiver.try_recv() {}
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_wait() {
        let (notifier, waiter) = work_signal();
        assert!(notifier.post());
        assert!(notifier.post());
        assert!(waiter.wait());

        let n2 = notifier.clone();
        let t = std::thread::spawn(move || waiter.wait());
        assert!(n2.post());
        assert!(t.join().unwrap());
    }

    #[test]
    fn closed() {
        let (notifier, waiter) = work_signal();
        drop(waiter);
        assert!(!notifier.post());

        let (notifier, waiter) = work_signal();
        drop(notifier);
        assert!(!waiter.wait());
    }
}
