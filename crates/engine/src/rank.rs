use intent_protocol::{
    Area, BonusKind, Candidate, CandidateSource, RankedCandidate, ScoreAdjustment,
};

use crate::config::ScoringConfig;

/// Three decimals keep float noise away from threshold comparisons.
pub(crate) fn round_score(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub struct Ranker<'a> {
    scoring: &'a ScoringConfig,
}

impl<'a> Ranker<'a> {
    pub fn new(scoring: &'a ScoringConfig) -> Self {
        Self { scoring }
    }

    /// Score every candidate and sort descending. The sort is stable, so
    /// candidates with equal scores keep their production order.
    pub fn rank(&self, candidates: &[Candidate], area: Area) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .map(|candidate| self.score(candidate, area))
            .collect();

        ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

        for (idx, r) in ranked.iter().enumerate() {
            log::debug!(
                "Rank {}: {} ({:?}) confidence={:.2} final={:.3}",
                idx + 1,
                r.candidate.action.as_str(),
                r.candidate.source,
                r.candidate.confidence,
                r.final_score
            );
        }

        ranked
    }

    fn score(&self, candidate: &Candidate, area: Area) -> RankedCandidate {
        let mut breakdown = Vec::new();

        if candidate.source == CandidateSource::AiEnhanced {
            breakdown.push(ScoreAdjustment {
                kind: BonusKind::AiEnhanced,
                amount: self.scoring.ai_bonus,
            });
        }
        if candidate.category.matches_area(area) {
            breakdown.push(ScoreAdjustment {
                kind: BonusKind::CategoryMatch,
                amount: self.scoring.category_bonus,
            });
        }
        if candidate.suggested_actions.len() > self.scoring.specificity_min_actions {
            breakdown.push(ScoreAdjustment {
                kind: BonusKind::Specificity,
                amount: self.scoring.specificity_bonus,
            });
        }

        let bonus: f64 = breakdown.iter().map(|adj| adj.amount).sum();
        let final_score = round_score((candidate.confidence + bonus).min(1.0));

        RankedCandidate {
            candidate: candidate.clone(),
            final_score,
            score_breakdown: breakdown,
        }
    }
}
