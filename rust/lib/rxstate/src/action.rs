use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Anything that can travel as an action payload.
///
/// Payloads must be `Debug` so dispatches can be logged.
pub trait Payload: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug> Payload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A typed action creator.
///
/// Actions are identified by their tag alone: two actions defined with the
/// same tag are indistinguishable to reducer rules. Define them once, as
/// constants:
///
/// ```ignore
/// pub const INCREMENT: Action<u32> = Action::define("counter.increment");
/// pub const RESET: Action = Action::define("counter.reset");
///
/// rx.dispatch(INCREMENT.create(3))?;
/// rx.dispatch(RESET.create(()))?;
/// ```
pub struct Action<P = ()> {
    tag: &'static str,
    _payload: PhantomData<fn(P)>,
}

impl<P> Action<P> {
    pub const fn define(tag: &'static str) -> Self {
        Self {
            tag,
            _payload: PhantomData,
        }
    }

    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Wrap `payload` in an envelope ready for dispatch.
    pub fn create(&self, payload: P) -> Envelope<P> {
        Envelope {
            type_tag: self.tag,
            payload,
        }
    }

    /// True if `event` was dispatched with this action's tag.
    pub fn matches(&self, event: &ActionEvent) -> bool {
        event.tag == self.tag
    }
}

impl<P> Clone for Action<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Action<P> {}

impl<P> fmt::Debug for Action<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.tag)
    }
}

/// An action tag paired with its payload, produced by [`Action::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<P> {
    pub type_tag: &'static str,
    pub payload: P,
}

/// A dispatched envelope as seen on the dispatch bus.
///
/// The payload is type-erased; rules downcast it back to the type their
/// action declares.
#[derive(Clone)]
pub struct ActionEvent {
    /// Dispatch sequence number, starting at 1.
    pub seq: u64,
    pub tag: &'static str,
    payload: Rc<dyn Payload>,
}

impl ActionEvent {
    pub(crate) fn new(seq: u64, tag: &'static str, payload: Rc<dyn Payload>) -> Self {
        Self { seq, tag, payload }
    }

    /// Downcast the payload to a concrete type.
    pub fn payload<P: Any>(&self) -> Option<&P> {
        (*self.payload).as_any().downcast_ref::<P>()
    }

    /// `Debug` rendering of the payload.
    pub fn payload_debug(&self) -> String {
        format!("{:?}", self.payload)
    }
}

impl fmt::Debug for ActionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEvent")
            .field("seq", &self.seq)
            .field("tag", &self.tag)
            .field("payload", &self.payload)
            .finish()
    }
}
