//! Match engine (C6): tolerance-match Quick-Call tones against a profile catalog.

use crate::cooldown::CooldownStore;
use crate::model::{CooldownEntry, DetectedTone, MatchRecord, ToneProfile};

fn in_tolerance(value: f64, target: f64, tolerance_percent: f64) -> bool {
    let tol = target * tolerance_percent / 100.0;
    value >= target - tol && value <= target + tol
}

/// Match extracted Quick-Call tones against `profiles`, consulting and
/// updating `store` for `scope`'s cooldown state.
pub fn match_quick_calls(
    quick_calls: &[DetectedTone],
    profiles: &[ToneProfile],
    store: &dyn CooldownStore,
    scope: &str,
    now: f64,
) -> Vec<MatchRecord> {
    let calls: Vec<(u32, (f64, f64), f64)> = quick_calls
        .iter()
        .filter_map(|t| match t {
            DetectedTone::QuickCall {
                tone_id,
                actual,
                start_time_s,
                ..
            } => Some((*tone_id, *actual, *start_time_s)),
            _ => None,
        })
        .collect();

    let mut records = Vec::new();
    let mut excluded: Vec<String> = Vec::new();

    for profile in profiles {
        for i in 0..calls.len() {
            let (tone_id, actual, _start) = calls[i];

            if !in_tolerance(actual.0, profile.a_tone, profile.tone_tolerance_percent)
                || !in_tolerance(actual.1, profile.b_tone, profile.tone_tolerance_percent)
            {
                continue;
            }

            let (tones_matched, tone_ids) = if profile.has_four_tone_extension() {
                let Some(&(next_id, next_actual, _)) = calls.get(i + 1) else {
                    continue;
                };
                if !in_tolerance(next_actual.0, profile.c_tone, profile.tone_tolerance_percent)
                    || !in_tolerance(next_actual.1, profile.d_tone, profile.tone_tolerance_percent)
                {
                    continue;
                }
                (
                    vec![profile.a_tone, profile.b_tone, profile.c_tone, profile.d_tone],
                    vec![tone_id, next_id],
                )
            } else {
                (vec![profile.a_tone, profile.b_tone], vec![tone_id])
            };

            let already_suppressed_this_clip = excluded.contains(&profile.profile_id);
            let suppressed_by_store = !already_suppressed_this_clip
                && store
                    .snapshot(scope)
                    .unwrap_or_else(|e| {
                        tracing::warn!(error = %e, scope, "cooldown store unavailable, treating as no active cooldowns");
                        Vec::new()
                    })
                    .iter()
                    .any(|e| e.profile_id == profile.profile_id && e.is_active(now));

            let was_suppressed = already_suppressed_this_clip || suppressed_by_store;

            if !was_suppressed {
                if let Err(e) = store.add(
                    scope,
                    CooldownEntry {
                        profile_id: profile.profile_id.clone(),
                        last_detected: now,
                        ignore_seconds: profile.ignore_seconds,
                    },
                ) {
                    tracing::warn!(error = %e, scope, profile_id = %profile.profile_id, "cooldown store unavailable, could not record detection");
                }
                excluded.push(profile.profile_id.clone());
            }

            records.push(MatchRecord {
                profile_id: profile.profile_id.clone(),
                profile_name: profile.profile_name.clone(),
                tones_matched,
                tone_ids,
                was_suppressed,
            });
        }
    }

    records
}
