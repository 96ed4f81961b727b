//! Insight derivation
//!
//! A fixed battery of threshold rules evaluated against an aggregated
//! snapshot. Each rule is an independent evaluator over the snapshot and
//! profile; rules never see each other's output and their relative order
//! carries no meaning. A metric absent from the snapshot skips its rules.

use crate::types::{
    AggregatedSnapshot, Category, Insight, InsightKind, InsightSet, Priority, UserProfile,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

// Threshold table. These values are the contract the rule battery implements.
const BMI_UNDERWEIGHT: f64 = 18.5;
const BMI_OVERWEIGHT: f64 = 25.0;
const BMI_OBESE: f64 = 30.0;
const SYSTOLIC_HIGH: f64 = 140.0;
const DIASTOLIC_HIGH: f64 = 90.0;
const SYSTOLIC_ELEVATED: f64 = 130.0;
const DIASTOLIC_ELEVATED: f64 = 85.0;
const RESTING_HR_HIGH: f64 = 100.0;
const RESTING_HR_LOW: f64 = 40.0;
const SLEEP_MIN_HOURS: f64 = 7.0;
const SLEEP_MAX_HOURS: f64 = 9.0;
const STEPS_GOAL: u32 = 10_000;
const STEPS_LOW: u32 = 5_000;

/// Namespace for deriving stable insight ids from their content
const INSIGHT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x9f2c_4b1e_7d63_4a8a_b05e_1c9d_83f6_2e71);

/// Rule-battery evaluator producing insights from a snapshot
pub struct InsightEngine;

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every rule against the snapshot.
    ///
    /// Fully deterministic: identical (snapshot, profile, now) produce
    /// byte-identical output, insight ids included.
    pub fn evaluate(
        &self,
        snapshot: &AggregatedSnapshot,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> Vec<Insight> {
        let mut insights = Vec::new();
        insights.extend(check_bmi(snapshot, profile, now));
        insights.extend(check_blood_pressure(snapshot, now));
        insights.extend(check_resting_heart_rate(snapshot, now));
        insights.extend(check_sleep(snapshot, now));
        insights.extend(check_steps(snapshot, now));
        insights
    }
}

/// Derive the caller's "next steps" list from a grouped insight set.
///
/// Alerts always come first, then high-priority recommendations, then the
/// two standing directives.
pub fn derive_next_steps(insights: &InsightSet) -> Vec<String> {
    let mut steps = Vec::new();
    if !insights.alerts.is_empty() {
        steps.push("Address your health alerts first".to_string());
    }
    if insights
        .recommendations
        .iter()
        .any(|i| i.priority == Some(Priority::High))
    {
        steps.push("Focus on high-priority recommendations".to_string());
    }
    steps.push("Keep monitoring your daily metrics".to_string());
    steps.push("Set weekly goals and review your progress".to_string());
    steps
}

fn make_insight(
    kind: InsightKind,
    title: &str,
    description: String,
    priority: Option<Priority>,
    category: Category,
    now: DateTime<Utc>,
) -> Insight {
    // Ids are derived from the insight's content and evaluation time, so
    // re-running the engine over the same inputs reproduces them exactly
    let id = Uuid::new_v5(
        &INSIGHT_ID_NAMESPACE,
        format!(
            "{kind:?}|{category:?}|{priority:?}|{title}|{description}|{}",
            now.to_rfc3339()
        )
        .as_bytes(),
    );
    Insight {
        id,
        kind,
        title: title.to_string(),
        description,
        priority,
        category,
        is_read: false,
        created_at: now,
    }
}

/// BMI rules. Skipped unless both weight and height are known.
fn check_bmi(
    snapshot: &AggregatedSnapshot,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Option<Insight> {
    let weight_kg = snapshot.weight_kg?;
    let height_cm = profile.height_cm?;
    if height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);

    if bmi < BMI_UNDERWEIGHT {
        Some(make_insight(
            InsightKind::Recommendation,
            "Weight Management",
            format!(
                "Your BMI is {bmi:.1}, below the healthy range. Consider a nutrition plan \
                 that supports gradual weight gain."
            ),
            Some(Priority::Medium),
            Category::Nutrition,
            now,
        ))
    } else if bmi >= BMI_OBESE {
        Some(make_insight(
            InsightKind::Recommendation,
            "Weight Management",
            format!(
                "Your BMI is {bmi:.1}, well above the healthy range. A structured nutrition \
                 and activity plan is strongly recommended."
            ),
            Some(Priority::High),
            Category::Nutrition,
            now,
        ))
    } else if bmi >= BMI_OVERWEIGHT {
        Some(make_insight(
            InsightKind::Recommendation,
            "Weight Management",
            format!(
                "Your BMI is {bmi:.1}, above the healthy range. Small adjustments to diet \
                 and activity can bring it back down."
            ),
            Some(Priority::Medium),
            Category::Nutrition,
            now,
        ))
    } else {
        None
    }
}

/// Blood pressure rules: at most one insight, the most severe that applies
fn check_blood_pressure(snapshot: &AggregatedSnapshot, now: DateTime<Utc>) -> Option<Insight> {
    let bp = snapshot.blood_pressure?;

    if bp.systolic >= SYSTOLIC_HIGH || bp.diastolic >= DIASTOLIC_HIGH {
        Some(make_insight(
            InsightKind::Alert,
            "High Blood Pressure",
            format!(
                "Your blood pressure reading of {:.0}/{:.0} mmHg is in the hypertensive \
                 range. Consider consulting a healthcare provider.",
                bp.systolic, bp.diastolic
            ),
            Some(Priority::High),
            Category::Cardiovascular,
            now,
        ))
    } else if bp.systolic >= SYSTOLIC_ELEVATED || bp.diastolic >= DIASTOLIC_ELEVATED {
        Some(make_insight(
            InsightKind::Recommendation,
            "Elevated Blood Pressure",
            format!(
                "Your blood pressure reading of {:.0}/{:.0} mmHg is elevated. Reducing \
                 sodium intake and regular aerobic exercise can help.",
                bp.systolic, bp.diastolic
            ),
            Some(Priority::Medium),
            Category::Cardiovascular,
            now,
        ))
    } else {
        None
    }
}

fn check_resting_heart_rate(snapshot: &AggregatedSnapshot, now: DateTime<Utc>) -> Option<Insight> {
    let hr = f64::from(snapshot.heart_rate_bpm?);

    if hr > RESTING_HR_HIGH {
        Some(make_insight(
            InsightKind::Alert,
            "Elevated Resting Heart Rate",
            format!(
                "Your resting heart rate of {hr:.0} bpm is above the typical range. \
                 Stress, illness, or overtraining can all contribute."
            ),
            Some(Priority::Medium),
            Category::Cardiovascular,
            now,
        ))
    } else if hr < RESTING_HR_LOW {
        Some(make_insight(
            InsightKind::Alert,
            "Low Resting Heart Rate",
            format!(
                "Your resting heart rate of {hr:.0} bpm is unusually low. Unless you are \
                 a trained endurance athlete, consider a medical check."
            ),
            Some(Priority::High),
            Category::Cardiovascular,
            now,
        ))
    } else {
        None
    }
}

fn check_sleep(snapshot: &AggregatedSnapshot, now: DateTime<Utc>) -> Option<Insight> {
    let sleep = snapshot.sleep_hours?;

    if sleep < SLEEP_MIN_HOURS {
        Some(make_insight(
            InsightKind::Recommendation,
            "Improve Sleep Duration",
            format!(
                "You slept {sleep:.1} hours, below the recommended 7-9. Consistent short \
                 sleep affects recovery, mood, and long-term health."
            ),
            Some(Priority::High),
            Category::Sleep,
            now,
        ))
    } else if sleep <= SLEEP_MAX_HOURS {
        Some(make_insight(
            InsightKind::Achievement,
            "Optimal Sleep",
            format!("You slept {sleep:.1} hours, right in the optimal 7-9 hour range."),
            None,
            Category::Sleep,
            now,
        ))
    } else {
        None
    }
}

fn check_steps(snapshot: &AggregatedSnapshot, now: DateTime<Utc>) -> Option<Insight> {
    let steps = snapshot.steps?;

    if steps >= STEPS_GOAL {
        Some(make_insight(
            InsightKind::Achievement,
            "Daily Step Goal",
            format!("You hit {steps} steps today, clearing the 10,000 step goal."),
            None,
            Category::Fitness,
            now,
        ))
    } else if steps < STEPS_LOW {
        Some(make_insight(
            InsightKind::Recommendation,
            "Increase Daily Activity",
            format!(
                "You logged {steps} steps today. Working toward 10,000 daily steps \
                 supports cardiovascular and metabolic health."
            ),
            Some(Priority::Medium),
            Category::Fitness,
            now,
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BloodPressure;
    use pretty_assertions::assert_eq;

    fn snapshot() -> AggregatedSnapshot {
        AggregatedSnapshot::empty(Utc::now())
    }

    fn profile_with_height(height_cm: f64) -> UserProfile {
        UserProfile {
            height_cm: Some(height_cm),
        }
    }

    #[test]
    fn test_underweight_bmi_single_medium_recommendation() {
        let mut snap = snapshot();
        // 49.7 kg at 171 cm -> BMI 17.0
        snap.weight_kg = Some(49.7);
        let insights = InsightEngine::new().evaluate(&snap, &profile_with_height(171.0), Utc::now());

        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.kind, InsightKind::Recommendation);
        assert_eq!(insight.title, "Weight Management");
        assert_eq!(insight.priority, Some(Priority::Medium));
        assert_eq!(insight.category, Category::Nutrition);
    }

    #[test]
    fn test_bmi_skipped_without_height() {
        let mut snap = snapshot();
        snap.weight_kg = Some(49.7);
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_healthy_bmi_emits_nothing() {
        let mut snap = snapshot();
        // 70 kg at 175 cm -> BMI 22.9
        snap.weight_kg = Some(70.0);
        let insights = InsightEngine::new().evaluate(&snap, &profile_with_height(175.0), Utc::now());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_hypertensive_reading_single_high_alert() {
        let mut snap = snapshot();
        snap.blood_pressure = Some(BloodPressure {
            systolic: 145.0,
            diastolic: 95.0,
        });
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());

        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.kind, InsightKind::Alert);
        assert_eq!(insight.priority, Some(Priority::High));
        assert_eq!(insight.category, Category::Cardiovascular);

        let set = InsightSet::from_insights(insights);
        let steps = derive_next_steps(&set);
        assert_eq!(steps[0], "Address your health alerts first");
    }

    #[test]
    fn test_elevated_blood_pressure_recommendation_not_alert() {
        let mut snap = snapshot();
        snap.blood_pressure = Some(BloodPressure {
            systolic: 134.0,
            diastolic: 82.0,
        });
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Recommendation);
        assert_eq!(insights[0].priority, Some(Priority::Medium));
    }

    #[test]
    fn test_optimal_sleep_achievement_no_recommendation() {
        let mut snap = snapshot();
        snap.sleep_hours = Some(8.5);
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Achievement);
        assert_eq!(insights[0].title, "Optimal Sleep");
        assert_eq!(insights[0].priority, None);
    }

    #[test]
    fn test_short_sleep_high_priority_recommendation() {
        let mut snap = snapshot();
        snap.sleep_hours = Some(5.5);
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Recommendation);
        assert_eq!(insights[0].priority, Some(Priority::High));
        assert_eq!(insights[0].category, Category::Sleep);
    }

    #[test]
    fn test_step_goal_achievement() {
        let mut snap = snapshot();
        snap.steps = Some(10_500);
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Achievement);
        assert_eq!(insights[0].category, Category::Fitness);
    }

    #[test]
    fn test_low_steps_medium_recommendation() {
        let mut snap = snapshot();
        snap.steps = Some(4_000);
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Recommendation);
        assert_eq!(insights[0].priority, Some(Priority::Medium));
    }

    #[test]
    fn test_moderate_steps_no_insight() {
        let mut snap = snapshot();
        snap.steps = Some(7_000);
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_absent_metrics_skip_rules() {
        let insights =
            InsightEngine::new().evaluate(&snapshot(), &UserProfile::default(), Utc::now());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_reevaluation_is_byte_identical() {
        let mut snap = snapshot();
        snap.steps = Some(4_000);
        snap.sleep_hours = Some(6.0);
        snap.blood_pressure = Some(BloodPressure {
            systolic: 150.0,
            diastolic: 92.0,
        });

        let now: chrono::DateTime<Utc> = "2024-06-01T08:00:00Z".parse().unwrap();
        let engine = InsightEngine::new();
        let first =
            serde_json::to_string(&engine.evaluate(&snap, &UserProfile::default(), now)).unwrap();
        let second =
            serde_json::to_string(&engine.evaluate(&snap, &UserProfile::default(), now)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_insights_get_distinct_ids() {
        let mut snap = snapshot();
        snap.steps = Some(4_000);
        snap.sleep_hours = Some(6.0);

        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());
        assert_eq!(insights.len(), 2);
        assert_ne!(insights[0].id, insights[1].id);
    }

    #[test]
    fn test_next_steps_standing_directives_always_present() {
        let steps = derive_next_steps(&InsightSet::default());
        assert_eq!(
            steps,
            vec![
                "Keep monitoring your daily metrics".to_string(),
                "Set weekly goals and review your progress".to_string(),
            ]
        );
    }

    #[test]
    fn test_next_steps_high_priority_recommendation() {
        let mut snap = snapshot();
        snap.sleep_hours = Some(5.0);
        let insights = InsightEngine::new().evaluate(&snap, &UserProfile::default(), Utc::now());
        let set = InsightSet::from_insights(insights);
        let steps = derive_next_steps(&set);
        assert_eq!(steps[0], "Focus on high-priority recommendations");
        assert_eq!(steps.len(), 3);
    }
}
