use tokio::task::JoinHandle;

use super::{WalkEvent, WalkHandle, WalkOutcome, WalkResult};

/// Callback interface for walk events.
///
/// All methods default to doing nothing.
pub trait WalkListener: Send {
    fn on_address_resolved(&mut self, _input: &str, _canonical: &str) {}

    fn on_result(&mut self, _result: &WalkResult) {}

    /// Called once per walk; `message` is empty unless the walk failed.
    fn on_terminated(&mut self, _message: &str) {}
}

fn deliver(listener: &mut dyn WalkListener, event: &WalkEvent) {
    match event {
        WalkEvent::AddressResolved { input, canonical } => {
            listener.on_address_resolved(input, canonical)
        }
        WalkEvent::Result(result) => listener.on_result(result),
        WalkEvent::Terminated { message } => listener.on_terminated(message),
    }
}

/// Forward every event of `handle` to `listeners`, in registration order,
/// from a single task.
///
/// The returned task ends with the walk's outcome once the terminal event
/// was delivered. Take a [`cancellation_token`](WalkHandle::cancellation_token)
/// first to keep the ability to cancel.
pub fn dispatch(
    mut handle: WalkHandle,
    mut listeners: Vec<Box<dyn WalkListener>>,
) -> JoinHandle<WalkOutcome> {
    tokio::spawn(async move {
        while let Some(event) = handle.events().recv().await {
            for listener in listeners.iter_mut() {
                deliver(listener.as_mut(), &event);
            }
        }
        handle.join().await
    })
}
