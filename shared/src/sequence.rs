/// Identifies one outgoing request of a single view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Issues increasing tickets for one view and tells whether a response
/// still belongs to the newest request.
///
/// Responses of overlapping requests can arrive in any order; only the one
/// answering the last issued ticket may update the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.latest == ticket.0
    }

    /// Retire every ticket issued so far, e.g. when the view is cleared
    /// without a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}
