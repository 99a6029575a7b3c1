//! Candidate Resolver
//!
//! Turns one slot into a candidate POI:
//! 1. Sometimes (`cache_probability`) reuse a verified place from the knowledge
//!    cache. Places the user already collected are skipped with
//!    `collected_skip_probability`.
//! 2. Otherwise ask the AI service for a place, filter templated non-answers,
//!    and verify the name against the map.
//! 3. Retry with every rejected name excluded. After the last attempt, return
//!    an unverified candidate carrying a warning instead of failing the slot.

use crate::models::candidate::{Candidate, GeneratedCandidate, GenerationOutcome, RejectReason};
use crate::models::location::{DistrictContext, Language};
use crate::models::slot::Slot;
use crate::services::ai_generation_service::{build_prompt, parse_completion};
use crate::services::cache_store_service::CacheStoreAdapter;
use crate::services::collaborators::TextGenerator;
use crate::services::dedup_service::normalize_name;
use crate::services::discovery_config::DiscoveryConfig;
use crate::services::place_verification_service::{Verification, VerificationGate};
use crate::services::retry::{retry_with_exclusions, ExcludableFailure, RetryPolicy};
use log::{debug, info, warn};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// Per-call inputs. `exclusions` is the caller's snapshot; the resolver
/// never writes back to it.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub district: &'a DistrictContext,
    pub language: Language,
    /// Normalized names the user already collected.
    pub collected: &'a HashSet<String>,
    pub exclusions: &'a [String],
}

/// Why one generate-and-verify attempt did not produce a verified place.
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    Rejected {
        reason: RejectReason,
        proposed: Option<String>,
    },
    /// The AI repeated a name it was told to avoid.
    Repeated { name: String },
    Unverified {
        candidate: GeneratedCandidate,
        verification: Verification,
    },
}

impl ExcludableFailure for AttemptFailure {
    fn rejected_name(&self) -> Option<&str> {
        match self {
            AttemptFailure::Rejected { proposed, .. } => proposed.as_deref(),
            AttemptFailure::Repeated { name } => Some(name),
            AttemptFailure::Unverified { candidate, .. } => Some(&candidate.name),
        }
    }
}

impl AttemptFailure {
    fn describe(&self) -> String {
        match self {
            AttemptFailure::Rejected { reason, .. } => reason.as_str().to_string(),
            AttemptFailure::Repeated { name } => format!("repeated '{}'", name),
            AttemptFailure::Unverified { candidate, verification } => match verification {
                Verification::NotFound => format!("'{}' not found", candidate.name),
                Verification::OutOfRange { distance_km } => {
                    format!("'{}' is {:.1} km away", candidate.name, distance_km)
                }
                Verification::Timeout => format!("'{}' verification timed out", candidate.name),
                Verification::Failed(e) => format!("'{}' verification failed: {}", candidate.name, e),
                Verification::Matched(_) => format!("'{}' matched", candidate.name),
            },
        }
    }
}

fn roll(probability: f64) -> bool {
    if !(probability > 0.0) {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    rand::thread_rng().gen_bool(probability)
}

pub struct CandidateResolver {
    cache: CacheStoreAdapter,
    generator: Arc<dyn TextGenerator>,
    gate: VerificationGate,
    config: Arc<DiscoveryConfig>,
}

impl CandidateResolver {
    pub fn new(
        cache: CacheStoreAdapter,
        generator: Arc<dyn TextGenerator>,
        gate: VerificationGate,
        config: Arc<DiscoveryConfig>,
    ) -> Self {
        Self {
            cache,
            generator,
            gate,
            config,
        }
    }

    pub async fn resolve(&self, slot: &Slot, ctx: &ResolveContext<'_>) -> Candidate {
        let Some(subcategory) = slot.subcategory.as_deref() else {
            return Candidate::placeholder(
                ctx.district,
                slot.macro_category.as_str(),
                "Slot had no subcategory assigned".to_string(),
                slot,
            );
        };

        if roll(self.config.cache_probability) {
            if let Some(candidate) = self.try_cache(slot, subcategory, ctx).await {
                return candidate;
            }
        }

        let mut exclusions = ctx.exclusions.to_vec();
        for name in self.cache.rejected_names(subcategory, ctx.district).await {
            if !exclusions.contains(&name) {
                exclusions.push(name);
            }
        }

        let policy = RetryPolicy::new(
            self.config.max_generation_attempts(),
            self.config.retry_backoff,
        );
        let result = retry_with_exclusions(&policy, exclusions, move |attempt, exclusions| {
            self.attempt(slot, subcategory, ctx, exclusions, attempt)
        })
        .await;

        match result {
            Ok(candidate) => {
                self.cache.store(subcategory, ctx.district, &candidate).await;
                candidate
            }
            Err(failures) => self.degrade(slot, subcategory, ctx, failures),
        }
    }

    async fn try_cache(&self, slot: &Slot, subcategory: &str, ctx: &ResolveContext<'_>) -> Option<Candidate> {
        let entry = self.cache.lookup(subcategory, ctx.district).await?;
        let key = normalize_name(&entry.name);

        if ctx.exclusions.iter().any(|n| normalize_name(n) == key) {
            debug!("Cached '{}' is excluded for this run", entry.name);
            return None;
        }
        if ctx.collected.contains(&key) && roll(self.config.collected_skip_probability) {
            debug!("Skipping already collected '{}'", entry.name);
            return None;
        }

        Some(Candidate::from_cache(entry, slot))
    }

    async fn attempt(
        &self,
        slot: &Slot,
        subcategory: &str,
        ctx: &ResolveContext<'_>,
        exclusions: Vec<String>,
        attempt: u32,
    ) -> Result<Candidate, AttemptFailure> {
        let prompt = build_prompt(ctx.district, subcategory, &exclusions, ctx.language);

        let completion =
            tokio::time::timeout(self.config.generation_timeout, self.generator.complete(&prompt)).await;
        let outcome = match completion {
            Err(_) => GenerationOutcome::Rejected {
                reason: RejectReason::Timeout,
                proposed: None,
            },
            Ok(Err(e)) => {
                warn!("Generation for {} failed on attempt {}: {}", subcategory, attempt, e);
                GenerationOutcome::Rejected {
                    reason: RejectReason::Unavailable,
                    proposed: None,
                }
            }
            Ok(Ok(raw)) => parse_completion(&raw, ctx.district, subcategory),
        };

        let generated = match outcome {
            GenerationOutcome::Candidate(generated) => generated,
            GenerationOutcome::Rejected { reason, proposed } => {
                debug!("Attempt {} for {} rejected: {}", attempt, subcategory, reason.as_str());
                return Err(AttemptFailure::Rejected { reason, proposed });
            }
        };

        let key = normalize_name(&generated.name);
        if exclusions.iter().any(|n| normalize_name(n) == key) {
            return Err(AttemptFailure::Repeated {
                name: generated.name,
            });
        }

        match self.gate.verify(&generated.name, ctx.district).await {
            Verification::Matched(place) => {
                info!(
                    "Verified '{}' as '{}' for {} in {}",
                    generated.name, place.name, subcategory, ctx.district.district_name
                );
                Ok(Candidate::verified(generated, place, slot))
            }
            verification => {
                if matches!(
                    verification,
                    Verification::NotFound | Verification::OutOfRange { .. }
                ) {
                    self.cache
                        .record_rejection(subcategory, ctx.district, &generated.name)
                        .await;
                }
                Err(AttemptFailure::Unverified {
                    candidate: generated,
                    verification,
                })
            }
        }
    }

    fn degrade(
        &self,
        slot: &Slot,
        subcategory: &str,
        ctx: &ResolveContext<'_>,
        failures: Vec<AttemptFailure>,
    ) -> Candidate {
        let reasons: Vec<String> = failures.iter().map(AttemptFailure::describe).collect();
        warn!(
            "No verified {} in {} after {} attempts: {}",
            subcategory,
            ctx.district.district_name,
            failures.len(),
            reasons.join("; ")
        );

        let last_named = failures.into_iter().rev().find_map(|failure| match failure {
            AttemptFailure::Unverified { candidate, .. } => Some(candidate),
            _ => None,
        });

        match last_named {
            Some(generated) => {
                let warning = format!(
                    "'{}' could not be confirmed on the map; check before visiting.",
                    generated.name
                );
                Candidate::unverified(generated.name, generated.description, warning, slot)
            }
            None => Candidate::placeholder(
                ctx.district,
                subcategory,
                format!("No usable {} suggestion: {}", subcategory, reasons.join("; ")),
                slot,
            ),
        }
    }
}
