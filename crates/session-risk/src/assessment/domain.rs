use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Numeric session attributes. They feed only the advisory classifier; the rule-based
/// tier never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub session_length_minutes: f64,
    pub bets_placed: f64,
    pub avg_bet_amount: f64,
    pub total_loss: f64,
    pub deposit_frequency: f64,
}

/// Behavioral flags collected for a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehaviorIndicators {
    pub chasing_losses: bool,
    pub rapid_bet_increase: bool,
    pub long_session: bool,
    pub frequent_deposits: bool,
    pub emotional_tilt: bool,
}

impl BehaviorIndicators {
    /// Flag backing a given factor.
    pub fn flag(&self, factor: RiskFactor) -> bool {
        match factor {
            RiskFactor::LossChasing => self.chasing_losses,
            RiskFactor::BetEscalation => self.rapid_bet_increase,
            RiskFactor::SessionIntensity => self.long_session,
            RiskFactor::DepositStress => self.frequent_deposits,
            RiskFactor::EmotionalTilt => self.emotional_tilt,
        }
    }
}

/// Validated inputs for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionInputs {
    pub metrics: SessionMetrics,
    pub indicators: BehaviorIndicators,
}

/// Named behavioral risk factors, one per indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    LossChasing,
    BetEscalation,
    SessionIntensity,
    DepositStress,
    EmotionalTilt,
}

impl RiskFactor {
    /// Canonical order used for scoring, feature vectors, and explanations.
    pub const ALL: [RiskFactor; 5] = [
        RiskFactor::LossChasing,
        RiskFactor::BetEscalation,
        RiskFactor::SessionIntensity,
        RiskFactor::DepositStress,
        RiskFactor::EmotionalTilt,
    ];

    /// Human-readable reason shown in explanations.
    pub fn label(self) -> &'static str {
        match self {
            RiskFactor::LossChasing => "chasing losses",
            RiskFactor::BetEscalation => "rapid bet escalation",
            RiskFactor::SessionIntensity => "long sessions",
            RiskFactor::DepositStress => "frequent deposits",
            RiskFactor::EmotionalTilt => "emotional tilt behavior",
        }
    }

    /// Name of the derived sub-score column.
    pub fn score_name(self) -> &'static str {
        match self {
            RiskFactor::LossChasing => "loss_chasing_score",
            RiskFactor::BetEscalation => "bet_escalation_risk",
            RiskFactor::SessionIntensity => "session_intensity",
            RiskFactor::DepositStress => "deposit_stress",
            RiskFactor::EmotionalTilt => "emotional_tilt",
        }
    }

    /// Name of the raw indicator the sub-score is derived from.
    pub fn indicator_name(self) -> &'static str {
        match self {
            RiskFactor::LossChasing => "chasing_losses",
            RiskFactor::BetEscalation => "rapid_bet_increase",
            RiskFactor::SessionIntensity => "long_session",
            RiskFactor::DepositStress => "frequent_deposits",
            RiskFactor::EmotionalTilt => "emotional_tilt",
        }
    }
}

/// Per-factor 0/1 sub-scores. Only [`FeatureDeriver`](super::FeatureDeriver) builds these,
/// so every score is either 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RiskSubScores {
    loss_chasing: bool,
    bet_escalation: bool,
    session_intensity: bool,
    deposit_stress: bool,
    emotional_tilt: bool,
}

impl RiskSubScores {
    pub(crate) fn from_indicators(indicators: &BehaviorIndicators) -> Self {
        Self {
            loss_chasing: indicators.chasing_losses,
            bet_escalation: indicators.rapid_bet_increase,
            session_intensity: indicators.long_session,
            deposit_stress: indicators.frequent_deposits,
            emotional_tilt: indicators.emotional_tilt,
        }
    }

    pub fn fired(&self, factor: RiskFactor) -> bool {
        match factor {
            RiskFactor::LossChasing => self.loss_chasing,
            RiskFactor::BetEscalation => self.bet_escalation,
            RiskFactor::SessionIntensity => self.session_intensity,
            RiskFactor::DepositStress => self.deposit_stress,
            RiskFactor::EmotionalTilt => self.emotional_tilt,
        }
    }

    pub fn get(&self, factor: RiskFactor) -> u8 {
        u8::from(self.fired(factor))
    }

    /// Unweighted sum of all sub-scores.
    pub fn composite(&self) -> u8 {
        RiskFactor::ALL
            .into_iter()
            .filter(|factor| self.fired(*factor))
            .fold(0, |total, _| total + 1)
    }

    /// Factors whose sub-score fired, in canonical order.
    pub fn triggered(&self) -> impl Iterator<Item = RiskFactor> + '_ {
        RiskFactor::ALL
            .into_iter()
            .filter(move |factor| self.fired(*factor))
    }
}

impl Serialize for RiskSubScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RiskSubScores", RiskFactor::ALL.len())?;
        for factor in RiskFactor::ALL {
            state.serialize_field(factor.score_name(), &self.get(factor))?;
        }
        state.end()
    }
}

/// Discrete risk bucket. Ordering follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    High,
    Severe,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "LOW RISK",
            RiskTier::High => "HIGH RISK",
            RiskTier::Severe => "SEVERE RISK",
        }
    }

    pub fn recommended_action(self) -> &'static str {
        match self {
            RiskTier::Severe => "Temporary account suspension + counseling recommended.",
            RiskTier::High => "Cooling-off period + responsible gambling messages.",
            RiskTier::Low => "No action required.",
        }
    }
}

/// Rendered when no factor fired.
pub const NO_RISK_EXPLANATION: &str = "No risky behavior detected.";

/// Ordered reasons behind an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Explanation {
    reasons: Vec<String>,
}

impl Explanation {
    pub fn from_sub_scores(sub_scores: &RiskSubScores) -> Self {
        Self {
            reasons: sub_scores
                .triggered()
                .map(|factor| factor.label().to_string())
                .collect(),
        }
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn render(&self) -> String {
        if self.reasons.is_empty() {
            NO_RISK_EXPLANATION.to_string()
        } else {
            self.reasons.join(", ")
        }
    }
}

/// Rule-based outcome for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub composite_score: u8,
    pub tier: RiskTier,
    pub recommended_action: String,
    pub explanation: Explanation,
}
