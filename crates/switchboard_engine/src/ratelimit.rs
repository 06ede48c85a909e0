//! Sliding-window rate limiting.
//!
//! Each key owns a bucket of invocation timestamps. A check prunes stamps
//! older than the window, then either records `now` or reports how long
//! until the oldest remaining stamp leaves the window. Buckets are created
//! on first use and discarded by [`RateLimiter::sweep`] once empty.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use switchboard_foundation::{CommandPath, GuildId, UserId};
use switchboard_parser::{RateLimitScope, RateLimitSpec};

use crate::keyed::KeyedState;

/// Who a bucket counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
    /// A single user.
    User(UserId),
    /// A whole guild.
    Guild(GuildId),
}

/// Bucket key: subject plus command path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RateKey {
    /// Who is counted.
    pub subject: Subject,
    /// Which command.
    pub path: CommandPath,
}

impl RateKey {
    /// Builds the key for one invocation under `spec`.
    ///
    /// Guild-scoped limits fall back to the user outside guilds.
    #[must_use]
    pub fn for_invocation(
        spec: &RateLimitSpec,
        user: UserId,
        guild: Option<GuildId>,
        path: &CommandPath,
    ) -> Self {
        let subject = match (spec.scope, guild) {
            (RateLimitScope::Guild, Some(guild)) => Subject::Guild(guild),
            _ => Subject::User(user),
        };
        Self {
            subject,
            path: path.clone(),
        }
    }
}

/// A rejected invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimited {
    /// Time until the next invocation would be allowed.
    pub retry_after: Duration,
}

impl RateLimited {
    /// Returns `retry_after` rounded up to whole seconds.
    #[must_use]
    pub fn retry_after_secs(&self) -> u64 {
        whole_secs(self.retry_after)
    }
}

/// Returns `duration` rounded up to whole seconds.
#[must_use]
pub fn whole_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[derive(Debug, Default)]
struct Bucket {
    stamps: VecDeque<Instant>,
    window: Duration,
}

impl Bucket {
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.stamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
    }
}

/// In-memory sliding-window limiter.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: KeyedState<RateKey, Bucket>,
}

impl RateLimiter {
    /// Creates an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks and records an invocation now.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] if the key is at its limit.
    pub fn check(&self, key: &RateKey, spec: Option<&RateLimitSpec>) -> Result<(), RateLimited> {
        self.check_at(key, spec, Instant::now())
    }

    /// Checks and records an invocation at `now`.
    ///
    /// A missing spec always allows and records nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] if the key is at its limit.
    pub fn check_at(
        &self,
        key: &RateKey,
        spec: Option<&RateLimitSpec>,
        now: Instant,
    ) -> Result<(), RateLimited> {
        let Some(spec) = spec else {
            return Ok(());
        };

        self.buckets.with(key, |bucket| {
            bucket.window = spec.window;
            bucket.prune(now);

            if bucket.stamps.len() < spec.max as usize {
                bucket.stamps.push_back(now);
                return Ok(());
            }

            let retry_after = bucket.stamps.front().map_or(spec.window, |&oldest| {
                spec.window
                    .saturating_sub(now.saturating_duration_since(oldest))
            });
            Err(RateLimited { retry_after })
        })
    }

    /// Discards buckets that are empty after pruning. Returns how many.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Discards buckets that are empty after pruning at `now`.
    pub fn sweep_at(&self, now: Instant) -> usize {
        self.buckets.retain(|_, bucket| {
            bucket.prune(now);
            !bucket.stamps.is_empty()
        })
    }

    /// Returns the number of live buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no buckets exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
