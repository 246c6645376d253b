//! Acquisition tiers and the success counters that order them.

/// The three escalating acquisition strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Plain HTTP fetch through the synchronized jar.
    Fetch,
    /// Real browser navigation in the current context.
    Browser,
    /// Browser navigation after a hard context reset.
    BrowserRetry,
}

impl Tier {
    pub fn name(self) -> &'static str {
        match self {
            Tier::Fetch => "fetch",
            Tier::Browser => "browser",
            Tier::BrowserRetry => "browser-retry",
        }
    }

    /// First tier to try for a URL, given the process-wide counters.
    pub fn first(counters: &StrategyCounters) -> Self {
        if counters.prefer_fetch() {
            Tier::Fetch
        } else {
            Tier::Browser
        }
    }

    /// Escalation order. `None` means every tier is exhausted.
    pub fn next(self) -> Option<Self> {
        match self {
            Tier::Fetch => Some(Tier::Browser),
            Tier::Browser => Some(Tier::BrowserRetry),
            Tier::BrowserRetry => None,
        }
    }
}

/// Per-process success counts, one per tier. Monotonic; never reset except
/// by dropping the orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyCounters {
    pub fetch: u64,
    pub browser: u64,
    pub browser_retry: u64,
}

impl StrategyCounters {
    /// Record one success for a tier.
    pub fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Fetch => self.fetch += 1,
            Tier::Browser => self.browser += 1,
            Tier::BrowserRetry => self.browser_retry += 1,
        }
    }

    /// Exploit-biased heuristic: try HTTP first while history is thin, or
    /// while HTTP is outright winning. Ties favor the cheaper path only in
    /// the low-sample regime.
    pub fn prefer_fetch(&self) -> bool {
        self.fetch + self.browser < 10 || self.fetch > self.browser
    }
}
