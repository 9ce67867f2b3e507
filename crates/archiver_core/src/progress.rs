/// How a single attempted post ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Saved,
    AlreadyArchived,
    Paywalled,
    Unextractable,
    Failed,
}

/// Bookkeeping for one archiving run: the attempt cap, the progress total
/// shown to the user, and a tally of outcomes.
///
/// Every attempt counts towards the cap, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunProgress {
    limit: Option<usize>,
    total: usize,
    attempts: usize,
    saved: usize,
    already_archived: usize,
    paywalled: usize,
    unextractable: usize,
    failed: usize,
}

impl RunProgress {
    /// `limit` of `None` or `Some(0)` means every discovered URL.
    pub fn new(discovered: usize, limit: Option<usize>) -> Self {
        let limit = limit.filter(|&n| n > 0);
        let total = limit.map_or(discovered, |n| n.min(discovered));
        Self {
            limit,
            total,
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Estimated number of posts this run will get through.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.attempts >= limit)
    }

    pub fn record(&mut self, outcome: PostOutcome) {
        self.attempts += 1;
        match outcome {
            PostOutcome::Saved => self.saved += 1,
            PostOutcome::AlreadyArchived => self.already_archived += 1,
            PostOutcome::Paywalled => self.paywalled += 1,
            PostOutcome::Unextractable => self.unextractable += 1,
            PostOutcome::Failed => self.failed += 1,
        }
        // Keep the estimate honest when posts drop out of an unbounded run.
        if self.limit.is_none()
            && matches!(outcome, PostOutcome::Paywalled | PostOutcome::Unextractable)
        {
            self.total = self.total.saturating_sub(1);
        }
    }

    pub fn count(&self, outcome: PostOutcome) -> usize {
        match outcome {
            PostOutcome::Saved => self.saved,
            PostOutcome::AlreadyArchived => self.already_archived,
            PostOutcome::Paywalled => self.paywalled,
            PostOutcome::Unextractable => self.unextractable,
            PostOutcome::Failed => self.failed,
        }
    }
}
