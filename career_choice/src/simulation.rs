//! Monte-Carlo simulation of career-track choice.
//!
//! Track j pays v_j + ε with ε ~ N(0, σ²). Graduates do not know v_j; they
//! average the draws of their friends in each track, pick the track with the
//! best prior and then experience their own draw. In the switching variant
//! they may move to another track after one year at a utility cost.
//!
//! Draws come from a `StdRng` seeded by the caller, in the order draw k,
//! graduate i, friends' noise (track by track) then own noise, so a seed
//! fully determines a run.

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::error::Result;
use crate::params::CareerParams;

/// Expected and Monte-Carlo average utility of each track when values are known
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnownValues {
    pub expected_utility: Vec<f64>,
    pub average_realized_utility: Vec<f64>,
}

/// Averages over the draws for one graduate in one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraduateSummary {
    /// 1-based graduate index
    pub graduate: usize,
    pub friends: usize,
    /// Share of draws in which each track was chosen
    pub choice_shares: Vec<f64>,
    pub subjective_expected_utility: f64,
    pub realized_utility: f64,
}

/// First and second year of the switching scenario for one graduate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchingSummary {
    pub first_year: GraduateSummary,
    pub second_year: GraduateSummary,
    /// Share switching away from each first-year track; `None` if nobody started there
    pub switch_shares: Vec<Option<f64>>,
}

/// Running sums for one graduate
struct Tally {
    choices: Vec<usize>,
    subjective: f64,
    realized: f64,
}

impl Tally {
    fn new(num_tracks: usize) -> Self {
        Tally {
            choices: vec![0; num_tracks],
            subjective: 0.0,
            realized: 0.0,
        }
    }

    fn record(&mut self, track: usize, subjective: f64, realized: f64) {
        self.choices[track] += 1;
        self.subjective += subjective;
        self.realized += realized;
    }

    fn summary(&self, graduate: usize, friends: usize, draws: usize) -> GraduateSummary {
        let n = draws as f64;
        GraduateSummary {
            graduate: graduate + 1,
            friends,
            choice_shares: self.choices.iter().map(|&c| c as f64 / n).collect(),
            subjective_expected_utility: self.subjective / n,
            realized_utility: self.realized / n,
        }
    }
}

/// Index of the largest value; the first one wins ties
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0, |best, (j, v)| if *v > values[best] { j } else { best })
}

/// One graduate's information in one draw
struct Draw {
    prior: Vec<f64>,
    own_noise: Vec<f64>,
}

fn draw_graduate(
    params: &CareerParams,
    friends: usize,
    noise: &Normal<f64>,
    rng: &mut StdRng,
) -> Draw {
    let mut prior = Vec::with_capacity(params.num_tracks);
    for v in &params.values {
        let mut total = 0.0;
        for _ in 0..friends {
            total += v + noise.sample(rng);
        }
        prior.push(total / friends as f64);
    }
    let own_noise = (0..params.num_tracks).map(|_| noise.sample(rng)).collect();
    Draw { prior, own_noise }
}

/// Track values known; compare expected utility with the average of K draws
pub fn simulate_known_values(params: &CareerParams, seed: u64) -> Result<KnownValues> {
    params.validate()?;
    let noise = Normal::new(0.0, params.sigma)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let average_realized_utility = params
        .values
        .iter()
        .map(|v| {
            let total: f64 = (0..params.num_draws).map(|_| v + noise.sample(&mut rng)).sum();
            total / params.num_draws as f64
        })
        .collect();

    Ok(KnownValues {
        expected_utility: params.values.clone(),
        average_realized_utility,
    })
}

/// Each graduate chooses on priors formed from friends' experiences
pub fn simulate_priors(params: &CareerParams, seed: u64) -> Result<Vec<GraduateSummary>> {
    params.validate()?;
    let noise = Normal::new(0.0, params.sigma)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tallies: Vec<Tally> = (0..params.num_graduates)
        .map(|_| Tally::new(params.num_tracks))
        .collect();

    for _ in 0..params.num_draws {
        for (i, tally) in tallies.iter_mut().enumerate() {
            let draw = draw_graduate(params, params.friends[i], &noise, &mut rng);
            let track = argmax(&draw.prior);
            tally.record(
                track,
                draw.prior[track],
                params.values[track] + draw.own_noise[track],
            );
        }
    }

    let summaries = tallies
        .iter()
        .enumerate()
        .map(|(i, t)| t.summary(i, params.friends[i], params.num_draws))
        .collect();
    debug!("simulated {} draws for {} graduates", params.num_draws, params.num_graduates);
    Ok(summaries)
}

/// As [`simulate_priors`], then after a year each graduate knows the realised
/// utility of their track and may switch to another at `switching_cost`.
pub fn simulate_with_switching(params: &CareerParams, seed: u64) -> Result<Vec<SwitchingSummary>> {
    params.validate()?;
    let noise = Normal::new(0.0, params.sigma)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let cost = params.switching_cost;

    let mut first: Vec<Tally> = (0..params.num_graduates)
        .map(|_| Tally::new(params.num_tracks))
        .collect();
    let mut second: Vec<Tally> = (0..params.num_graduates)
        .map(|_| Tally::new(params.num_tracks))
        .collect();
    let mut switches = vec![vec![0usize; params.num_tracks]; params.num_graduates];

    for _ in 0..params.num_draws {
        for i in 0..params.num_graduates {
            let draw = draw_graduate(params, params.friends[i], &noise, &mut rng);
            let start = argmax(&draw.prior);
            let experienced = params.values[start] + draw.own_noise[start];
            first[i].record(start, draw.prior[start], experienced);

            // Staying is valued at what was experienced, moving at the prior net of the cost.
            let mut updated: Vec<f64> = draw.prior.iter().map(|p| p - cost).collect();
            updated[start] = experienced;
            let track = argmax(&updated);
            let realized = if track == start {
                experienced
            } else {
                switches[i][start] += 1;
                params.values[track] + draw.own_noise[track] - cost
            };
            second[i].record(track, updated[track], realized);
        }
    }

    let summaries = (0..params.num_graduates)
        .map(|i| {
            let switch_shares = switches[i]
                .iter()
                .zip(&first[i].choices)
                .map(|(&moved, &started)| (started > 0).then(|| moved as f64 / started as f64))
                .collect();
            SwitchingSummary {
                first_year: first[i].summary(i, params.friends[i], params.num_draws),
                second_year: second[i].summary(i, params.friends[i], params.num_draws),
                switch_shares,
            }
        })
        .collect();
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn argmax_takes_first_of_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), 1);
        assert_eq!(argmax(&[5.0, 3.0, 4.0]), 0);
    }

    #[test]
    fn known_values_average_close_to_expectation() {
        let params = CareerParams::default();
        let known = simulate_known_values(&params, 2024).unwrap();
        assert_eq!(known.expected_utility, vec![1.0, 2.0, 3.0]);
        // Four standard errors of a mean of 10,000 N(0, 4) draws
        for (e, r) in known.expected_utility.iter().zip(&known.average_realized_utility) {
            assert_abs_diff_eq!(*e, *r, epsilon = 4.0 * 2.0 / 100.0);
        }
    }

    #[test]
    fn negative_sigma_is_rejected_before_simulating() {
        let params = CareerParams {
            sigma: -1.0,
            ..CareerParams::default().with_draws(100)
        };
        for result in [
            simulate_priors(&params, 1).map(|_| ()),
            simulate_known_values(&params, 1).map(|_| ()),
            simulate_with_switching(&params, 1).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(crate::error::SimulationError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn no_switching_when_cost_is_prohibitive() {
        let params = CareerParams {
            switching_cost: 1e6,
            ..CareerParams::default().with_draws(200)
        };
        for graduate in simulate_with_switching(&params, 7).unwrap() {
            assert_eq!(
                graduate.first_year.choice_shares,
                graduate.second_year.choice_shares
            );
            for share in graduate.switch_shares.into_iter().flatten() {
                assert_eq!(share, 0.0);
            }
        }
    }
}
