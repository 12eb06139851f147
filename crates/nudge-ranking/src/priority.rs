use nudge_core::OutreachPriority;

const HIGH_MIN_SCORE: f64 = 0.55;
const HIGH_MIN_ACTIVITY: f64 = 0.7;
const HIGH_MIN_FREQUENCY: f64 = 0.55;
const HIGH_MIN_NICHE_FIT: f64 = 0.55;

const MEDIUM_MIN_SCORE: f64 = 0.30;
const MEDIUM_MIN_ACTIVITY: f64 = 0.4;
const MEDIUM_MIN_NICHE_FIT: f64 = 0.45;

/// Label a scored show. `score` is the combined score after any contact
/// penalty; `High` additionally requires a contact address.
#[must_use]
pub fn classify_outreach_priority(
    score: f64,
    activity_score: f64,
    frequency: f64,
    niche_fit: f64,
    has_contact_email: bool,
) -> OutreachPriority {
    let high_signal = score >= HIGH_MIN_SCORE
        && activity_score >= HIGH_MIN_ACTIVITY
        && frequency >= HIGH_MIN_FREQUENCY
        && niche_fit >= HIGH_MIN_NICHE_FIT;
    if high_signal && has_contact_email {
        return OutreachPriority::High;
    }

    if score >= MEDIUM_MIN_SCORE
        && activity_score >= MEDIUM_MIN_ACTIVITY
        && niche_fit >= MEDIUM_MIN_NICHE_FIT
    {
        return OutreachPriority::Medium;
    }

    OutreachPriority::Low
}
