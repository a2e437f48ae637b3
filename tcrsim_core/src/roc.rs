// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// ROC curves, area under the curve, and partial area up to a false positive rate bound.
//
// Scores are ranked from high to low.  Tied scores are consumed as a block, so the curve moves
// diagonally across a tie rather than in an order-dependent staircase.

use crate::errors::ScoreError;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub fps: Vec<usize>, // false positive count at each point
    pub tps: Vec<usize>, // true positive count at each point
    pub positives: usize,
    pub negatives: usize,
}

pub fn roc_curve(labels: &[bool], scores: &[f64]) -> Result<RocCurve, ScoreError> {
    if labels.len() != scores.len() {
        return Err(ScoreError::DimensionMismatch {
            left: labels.len(),
            right: scores.len(),
        });
    }
    let positives = labels.iter().filter(|&&b| b).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(ScoreError::DegenerateLabels {
            positives,
            negatives,
        });
    }
    let mut order = (0..scores.len()).collect::<Vec<usize>>();
    order.sort_by(|&i, &j| scores[j].total_cmp(&scores[i]));
    let (mut fps, mut tps) = (vec![0], vec![0]);
    let (mut tp, mut fp) = (0, 0);
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len()
            && scores[order[j]].total_cmp(&scores[order[i]]) == Ordering::Equal
        {
            if labels[order[j]] {
                tp += 1;
            } else {
                fp += 1;
            }
            j += 1;
        }
        fps.push(fp);
        tps.push(tp);
        i = j;
    }
    Ok(RocCurve {
        fpr: fps.iter().map(|&x| x as f64 / negatives as f64).collect(),
        tpr: tps.iter().map(|&x| x as f64 / positives as f64).collect(),
        fps,
        tps,
        positives,
        negatives,
    })
}

impl RocCurve {
    // Trapezoid area under the whole curve.  Summed in counts and scaled once at the end, so
    // a perfect ranking gives exactly 1.

    pub fn auc(&self) -> f64 {
        let mut twice = 0u128;
        for i in 1..self.fps.len() {
            let dx = (self.fps[i] - self.fps[i - 1]) as u128;
            twice += dx * (self.tps[i] + self.tps[i - 1]) as u128;
        }
        twice as f64 / (2 * self.positives * self.negatives) as f64
    }

    // True positive rate at a given false positive rate, interpolating linearly between the
    // bracketing points.  On a vertical stretch the highest value is used.

    pub fn tpr_at(&self, x: f64) -> f64 {
        let n = self.fpr.len();
        let stop = self.fpr.partition_point(|&f| f <= x);
        if stop == 0 {
            return 0.0;
        }
        if stop == n || self.fpr[stop - 1] == x {
            return self.tpr[stop - 1];
        }
        let (x0, x1) = (self.fpr[stop - 1], self.fpr[stop]);
        let (y0, y1) = (self.tpr[stop - 1], self.tpr[stop]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    // Area over [0, max_fpr] divided by max_fpr, so that a perfect ranking scores 1.

    pub fn partial_auc(&self, max_fpr: f64) -> Result<f64, ScoreError> {
        if !(max_fpr > 0.0 && max_fpr <= 1.0) {
            return Err(ScoreError::InvalidFpr(max_fpr));
        }
        let mut area = 0.0;
        for i in 1..self.fpr.len() {
            let (x0, x1) = (self.fpr[i - 1], self.fpr[i]);
            if x0 >= max_fpr {
                break;
            }
            let (y0, y1) = if x1 <= max_fpr {
                (self.tpr[i - 1], self.tpr[i])
            } else {
                (self.tpr[i - 1], self.tpr_at(max_fpr))
            };
            area += (x1.min(max_fpr) - x0) * (y0 + y1) / 2.0;
        }
        Ok(area / max_fpr)
    }
}

pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Result<f64, ScoreError> {
    Ok(roc_curve(labels, scores)?.auc())
}

pub fn partial_roc_auc(labels: &[bool], scores: &[f64], max_fpr: f64) -> Result<f64, ScoreError> {
    roc_curve(labels, scores)?.partial_auc(max_fpr)
}
