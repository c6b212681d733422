//! The six Dubins maneuver families in standard form
//!
//! Every family is solved on the normalized problem where the start lies at
//! `(-1, 0)` and the goal at `(1, 0)`. Inputs are the normalized start and
//! goal headings and the scaled curvature bound; the output is the three
//! normalized arc lengths, or `None` when the family has no real solution.

use std::f64::consts::PI;
use std::fmt;

use crate::geometry::mod2pi;

/// Dubins maneuver family; L = left turn, R = right turn, S = straight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManeuverKind {
    LSL,
    RSR,
    LSR,
    RSL,
    RLR,
    LRL,
}

impl ManeuverKind {
    /// All families in evaluation order; ties keep the earliest one
    pub const ALL: [ManeuverKind; 6] = [
        ManeuverKind::LSL,
        ManeuverKind::RSR,
        ManeuverKind::LSR,
        ManeuverKind::RSL,
        ManeuverKind::RLR,
        ManeuverKind::LRL,
    ];

    /// Position in `ALL`
    pub fn index(self) -> usize {
        match self {
            ManeuverKind::LSL => 0,
            ManeuverKind::RSR => 1,
            ManeuverKind::LSR => 2,
            ManeuverKind::RSL => 3,
            ManeuverKind::RLR => 4,
            ManeuverKind::LRL => 5,
        }
    }

    /// Sign of the curvature of each of the three arcs
    pub fn curvature_signs(self) -> [f64; 3] {
        match self {
            ManeuverKind::LSL => [1.0, 0.0, 1.0],
            ManeuverKind::RSR => [-1.0, 0.0, -1.0],
            ManeuverKind::LSR => [1.0, 0.0, -1.0],
            ManeuverKind::RSL => [-1.0, 0.0, 1.0],
            ManeuverKind::RLR => [-1.0, 1.0, -1.0],
            ManeuverKind::LRL => [1.0, -1.0, 1.0],
        }
    }

    /// Normalized arc lengths for this family, `None` if infeasible
    pub fn solve(self, th0: f64, thf: f64, kmax: f64) -> Option<[f64; 3]> {
        match self {
            ManeuverKind::LSL => lsl(th0, thf, kmax),
            ManeuverKind::RSR => rsr(th0, thf, kmax),
            ManeuverKind::LSR => lsr(th0, thf, kmax),
            ManeuverKind::RSL => rsl(th0, thf, kmax),
            ManeuverKind::RLR => rlr(th0, thf, kmax),
            ManeuverKind::LRL => lrl(th0, thf, kmax),
        }
    }
}

impl fmt::Display for ManeuverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManeuverKind::LSL => "LSL",
            ManeuverKind::RSR => "RSR",
            ManeuverKind::LSR => "LSR",
            ManeuverKind::RSL => "RSL",
            ManeuverKind::RLR => "RLR",
            ManeuverKind::LRL => "LRL",
        };
        write!(f, "{}", name)
    }
}

fn lsl(th0: f64, thf: f64, k: f64) -> Option<[f64; 3]> {
    let inv_k = 1.0 / k;
    let c = thf.cos() - th0.cos();
    let s = 2.0 * k + th0.sin() - thf.sin();
    let temp1 = c.atan2(s);
    let temp2 = 2.0 + 4.0 * k * k - 2.0 * (th0 - thf).cos() + 4.0 * k * (th0.sin() - thf.sin());
    if temp2 < 0.0 {
        return None;
    }
    let s1 = inv_k * mod2pi(temp1 - th0);
    let s2 = inv_k * temp2.sqrt();
    let s3 = inv_k * mod2pi(thf - temp1);
    Some([s1, s2, s3])
}

fn rsr(th0: f64, thf: f64, k: f64) -> Option<[f64; 3]> {
    let inv_k = 1.0 / k;
    let c = th0.cos() - thf.cos();
    let s = 2.0 * k - th0.sin() + thf.sin();
    let temp1 = c.atan2(s);
    let temp2 = 2.0 + 4.0 * k * k - 2.0 * (th0 - thf).cos() - 4.0 * k * (th0.sin() - thf.sin());
    if temp2 < 0.0 {
        return None;
    }
    let s1 = inv_k * mod2pi(th0 - temp1);
    let s2 = inv_k * temp2.sqrt();
    let s3 = inv_k * mod2pi(temp1 - thf);
    Some([s1, s2, s3])
}

fn lsr(th0: f64, thf: f64, k: f64) -> Option<[f64; 3]> {
    let inv_k = 1.0 / k;
    let c = th0.cos() + thf.cos();
    let s = 2.0 * k + th0.sin() + thf.sin();
    let temp1 = (-c).atan2(s);
    let temp3 = 4.0 * k * k - 2.0 + 2.0 * (th0 - thf).cos() + 4.0 * k * (th0.sin() + thf.sin());
    if temp3 < 0.0 {
        return None;
    }
    let s2 = inv_k * temp3.sqrt();
    let temp2 = -(-2.0f64).atan2(s2 * k);
    let s1 = inv_k * mod2pi(temp1 + temp2 - th0);
    let s3 = inv_k * mod2pi(temp1 + temp2 - thf);
    Some([s1, s2, s3])
}

fn rsl(th0: f64, thf: f64, k: f64) -> Option<[f64; 3]> {
    let inv_k = 1.0 / k;
    let c = th0.cos() + thf.cos();
    let s = 2.0 * k - th0.sin() - thf.sin();
    let temp1 = c.atan2(s);
    let temp3 = 4.0 * k * k - 2.0 + 2.0 * (th0 - thf).cos() - 4.0 * k * (th0.sin() + thf.sin());
    if temp3 < 0.0 {
        return None;
    }
    let s2 = inv_k * temp3.sqrt();
    let temp2 = 2.0f64.atan2(s2 * k);
    let s1 = inv_k * mod2pi(th0 - temp1 + temp2);
    let s3 = inv_k * mod2pi(thf - temp1 + temp2);
    Some([s1, s2, s3])
}

fn rlr(th0: f64, thf: f64, k: f64) -> Option<[f64; 3]> {
    let inv_k = 1.0 / k;
    let c = th0.cos() - thf.cos();
    let s = 2.0 * k - th0.sin() + thf.sin();
    let temp1 = c.atan2(s);
    let temp2 = 0.125 * (6.0 - 4.0 * k * k + 2.0 * (th0 - thf).cos() + 4.0 * k * (th0.sin() - thf.sin()));
    if temp2.abs() > 1.0 {
        return None;
    }
    let s2 = inv_k * mod2pi(2.0 * PI - temp2.acos());
    let s1 = inv_k * mod2pi(th0 - temp1 + 0.5 * s2 * k);
    let s3 = inv_k * mod2pi(th0 - thf + k * (s2 - s1));
    Some([s1, s2, s3])
}

fn lrl(th0: f64, thf: f64, k: f64) -> Option<[f64; 3]> {
    let inv_k = 1.0 / k;
    let c = thf.cos() - th0.cos();
    let s = 2.0 * k + th0.sin() - thf.sin();
    let temp1 = c.atan2(s);
    let temp2 = 0.125 * (6.0 - 4.0 * k * k + 2.0 * (th0 - thf).cos() - 4.0 * k * (th0.sin() - thf.sin()));
    if temp2.abs() > 1.0 {
        return None;
    }
    let s2 = inv_k * mod2pi(2.0 * PI - temp2.acos());
    let s1 = inv_k * mod2pi(temp1 - th0 + 0.5 * s2 * k);
    let s3 = inv_k * mod2pi(thf - th0 + k * (s2 - s1));
    Some([s1, s2, s3])
}
