use crate::models::reward::RewardTier;
use std::time::Duration;

const CACHE_PROBABILITY: f64 = 0.25;
const COLLECTED_SKIP_PROBABILITY: f64 = 0.45;
const VERIFICATION_RADIUS_KM: f64 = 5.0;
const MAX_GENERATION_RETRIES: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 250;
const GENERATION_TIMEOUT_SECS: u64 = 20;
const VERIFICATION_TIMEOUT_SECS: u64 = 10;
const REQUEST_DEADLINE_SECS: u64 = 90;
const BACKFILL_ATTEMPT_FACTOR: usize = 3;
const MAX_INVENTORY_SLOTS: usize = 30;
const REWARD_VALIDITY_DAYS: u32 = 30;

pub const MIN_ITEM_COUNT: usize = 5;
pub const MAX_ITEM_COUNT: usize = 12;

/// Business tuning values for a discovery run. Every field can be overridden
/// through `DISCOVERY_*` environment variables.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Chance a slot consults the knowledge cache before generating.
    pub cache_probability: f64,
    /// Chance a cached place the user already collected is skipped.
    pub collected_skip_probability: f64,
    pub verification_radius_km: f64,
    /// Extra generation attempts after the first one.
    pub max_generation_retries: u32,
    pub retry_backoff: Duration,
    pub generation_timeout: Duration,
    pub verification_timeout: Duration,
    pub request_deadline: Duration,
    /// Backfill gives up after `factor * shortfall` attempts.
    pub backfill_attempt_factor: usize,
    pub max_inventory_slots: usize,
    pub default_reward_validity_days: u32,
    /// Drop probability per tier, rarest first.
    pub reward_tiers: Vec<(RewardTier, f64)>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            cache_probability: CACHE_PROBABILITY,
            collected_skip_probability: COLLECTED_SKIP_PROBABILITY,
            verification_radius_km: VERIFICATION_RADIUS_KM,
            max_generation_retries: MAX_GENERATION_RETRIES,
            retry_backoff: Duration::from_millis(RETRY_BACKOFF_MS),
            generation_timeout: Duration::from_secs(GENERATION_TIMEOUT_SECS),
            verification_timeout: Duration::from_secs(VERIFICATION_TIMEOUT_SECS),
            request_deadline: Duration::from_secs(REQUEST_DEADLINE_SECS),
            backfill_attempt_factor: BACKFILL_ATTEMPT_FACTOR,
            max_inventory_slots: MAX_INVENTORY_SLOTS,
            default_reward_validity_days: REWARD_VALIDITY_DAYS,
            reward_tiers: vec![
                (RewardTier::SP, 0.01),
                (RewardTier::SSR, 0.04),
                (RewardTier::SR, 0.10),
                (RewardTier::S, 0.20),
                (RewardTier::R, 0.30),
            ],
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl DiscoveryConfig {
    /// Create config from environment variables or use defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let reward_tiers = defaults
            .reward_tiers
            .iter()
            .map(|(tier, probability)| {
                let key = format!("DISCOVERY_TIER_{:?}", tier);
                (*tier, env_or(&key, *probability))
            })
            .collect();

        Self {
            cache_probability: env_or("DISCOVERY_CACHE_PROBABILITY", defaults.cache_probability),
            collected_skip_probability: env_or(
                "DISCOVERY_COLLECTED_SKIP_PROBABILITY",
                defaults.collected_skip_probability,
            ),
            verification_radius_km: env_or(
                "DISCOVERY_VERIFICATION_RADIUS_KM",
                defaults.verification_radius_km,
            ),
            max_generation_retries: env_or(
                "DISCOVERY_MAX_GENERATION_RETRIES",
                defaults.max_generation_retries,
            ),
            retry_backoff: Duration::from_millis(env_or(
                "DISCOVERY_RETRY_BACKOFF_MS",
                RETRY_BACKOFF_MS,
            )),
            generation_timeout: Duration::from_secs(env_or(
                "DISCOVERY_GENERATION_TIMEOUT_SECS",
                GENERATION_TIMEOUT_SECS,
            )),
            verification_timeout: Duration::from_secs(env_or(
                "DISCOVERY_VERIFICATION_TIMEOUT_SECS",
                VERIFICATION_TIMEOUT_SECS,
            )),
            request_deadline: Duration::from_secs(env_or(
                "DISCOVERY_REQUEST_DEADLINE_SECS",
                REQUEST_DEADLINE_SECS,
            )),
            backfill_attempt_factor: env_or(
                "DISCOVERY_BACKFILL_ATTEMPT_FACTOR",
                defaults.backfill_attempt_factor,
            ),
            max_inventory_slots: env_or(
                "DISCOVERY_MAX_INVENTORY_SLOTS",
                defaults.max_inventory_slots,
            ),
            default_reward_validity_days: env_or(
                "DISCOVERY_REWARD_VALIDITY_DAYS",
                defaults.default_reward_validity_days,
            ),
            reward_tiers,
        }
    }

    /// Total attempts a resolver makes for one slot.
    pub fn max_generation_attempts(&self) -> u32 {
        self.max_generation_retries.saturating_add(1)
    }
}
