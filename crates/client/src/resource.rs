//! Asynchronous resource state for views that fetch on mount.
//!
//! [`Tickets`] guards against out-of-order responses: every request takes a
//! ticket, and only the response holding the most recently issued ticket may
//! update the view.

/// State of data a view is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resource<T, E> {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(E),
}

impl<T, E> Resource<T, E> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub const fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Consume the resource, yielding the loaded value if there is one.
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Map a loaded value, leaving every other state as is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U, E> {
        match self {
            Self::Idle => Resource::Idle,
            Self::Loading => Resource::Loading,
            Self::Ready(value) => Resource::Ready(f(value)),
            Self::Failed(error) => Resource::Failed(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Resource<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues tickets and remembers the latest one.
#[derive(Debug, Default)]
pub struct Tickets {
    latest: u64,
}

impl Tickets {
    /// Issue a ticket newer than every ticket issued before.
    pub const fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// `true` if no newer ticket has been issued since `ticket`.
    #[must_use]
    pub const fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let resource: Resource<u8, String> = Resource::default();
        assert_eq!(resource, Resource::Idle);
        assert!(resource.ready().is_none());
    }

    #[test]
    fn test_from_result() {
        let ok: Resource<u8, String> = Ok(3).into();
        assert_eq!(ok.ready(), Some(&3));
        let failed: Resource<u8, String> = Err("boom".to_owned()).into();
        assert_eq!(failed.error().map(String::as_str), Some("boom"));
    }

    #[test]
    fn test_map_keeps_state() {
        let loading: Resource<u8, ()> = Resource::Loading;
        assert!(loading.map(|v| v * 2).is_loading());
        assert_eq!(Resource::<u8, ()>::Ready(2).map(|v| v * 2), Resource::Ready(4));
    }

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut tickets = Tickets::default();
        let first = tickets.issue();
        assert!(tickets.is_current(first));

        let second = tickets.issue();
        assert!(!tickets.is_current(first));
        assert!(tickets.is_current(second));
        assert!(first < second);
    }
}
